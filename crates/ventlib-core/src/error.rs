//! Error types for ventlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. The taxonomy is deliberately small:
//! the ventilation unit speaks an unauthenticated request/reply protocol
//! with no error responses of its own, so every failure is either a missing
//! reply, a socket fault, a reply we cannot decode, or a caller asking for
//! something the device cannot do.

/// The error type for all ventlib operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No reply datagram arrived within the configured deadline.
    ///
    /// The unit is usually powered down, on another address, or the reply
    /// was lost on the network. The core never retries on its own.
    #[error("timeout waiting for reply")]
    Timeout,

    /// A socket-level fault other than a timeout (unreachable host,
    /// refused port, DNS failure, bind failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// The reply was shorter than a status frame or carried a field value
    /// outside its valid wire range.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The caller requested a target the device cannot be commanded into
    /// (e.g. Party mode or Manual fan speed).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns `true` if the error leaves the device state unknown.
    ///
    /// `Timeout`, `Transport` and `MalformedFrame` all mean the exchange did
    /// not yield a trustworthy status. `InvalidArgument` is a caller bug and
    /// says nothing about the device.
    pub fn is_communication_failure(&self) -> bool {
        !matches!(self, Error::InvalidArgument(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut => Error::Timeout,
            _ => Error::Transport(e.to_string()),
        }
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
