use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Payload of {len} bytes exceeds the {max}-byte frame limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Unknown modulation scheme: {0}")]
    UnknownScheme(String),

    #[error("Unknown framing discipline: {0}")]
    UnknownFraming(String),

    #[error("Unknown error detection code: {0}")]
    UnknownDetection(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Output of any decoder that can notice channel corruption.
///
/// Corruption is reported through `error`, never through `Err`: the payload is
/// always returned, best-effort when the flag is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub payload: T,
    pub error: bool,
}

impl<T> Decoded<T> {
    pub fn clean(payload: T) -> Self {
        Self { payload, error: false }
    }

    pub fn corrupted(payload: T) -> Self {
        Self { payload, error: true }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            payload: f(self.payload),
            error: self.error,
        }
    }
}
