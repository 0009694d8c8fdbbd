//! Error types for rasniffer-rs

use thiserror::Error;

/// Result type alias for rasniffer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rasniffer-rs
#[derive(Error, Debug)]
pub enum Error {
    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An extension header length runs past the captured datagram
    #[error("IPv6 extension header chain is truncated")]
    TruncatedHeaderChain,

    /// A Fragment header was found; reassembly is not supported
    #[error("IPv6 fragment header found, packet skipped")]
    FragmentedPacket,

    /// The header chain ends in something other than ICMPv6
    #[error("Unsupported IPv6 next header {0}")]
    UnsupportedHeader(u8),

    /// A fixed-size header or message is shorter than its layout
    #[error("Truncated message: need {needed} bytes, have {available}")]
    TruncatedMessage { needed: usize, available: usize },

    /// An ND option declared a length of zero units
    #[error("Zero-length ND option at offset {offset}")]
    ZeroLengthOption { offset: usize },

    /// An ND option declared more bytes than remain in the message
    #[error("ND option at offset {offset} declares {declared} bytes, only {remaining} remain")]
    OptionOverrun {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    /// A known ND option is too short for its fixed layout
    #[error("Malformed ND option type {option_type} with length {len}")]
    MalformedOption { option_type: u8, len: u8 },

    /// Output buffer for a crafted packet could not be allocated
    #[error("Failed to allocate {0} bytes for crafted packet")]
    AllocationFailure(usize),

    /// Hardware address of the capture interface could not be read
    #[error("Interface lookup failed: {0}")]
    InterfaceLookupFailure(String),

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Capture error
    #[error("Packet capture error: {0}")]
    Capture(String),

    /// Raw socket transmission error
    #[error("Send error: {0}")]
    Send(String),

    /// Invalid parameter error
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl Error {
    /// Create a capture error with a custom message
    pub fn capture<S: Into<String>>(msg: S) -> Self {
        Error::Capture(msg.into())
    }

    /// Create a send error with a custom message
    pub fn send<S: Into<String>>(msg: S) -> Self {
        Error::Send(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Errors that must stop the whole process rather than the current frame.
    ///
    /// A failed self-origin check could make the sniffer re-spoof its own
    /// injected advertisements in a loop, so it is never skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InterfaceLookupFailure(_))
    }
}
