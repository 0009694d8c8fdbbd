//! rasniffer-rs core library
//!
//! Fundamental types shared by every rasniffer crate: the error type, MAC
//! addresses, captured packets, the immutable operator configuration and the
//! link boundaries (hardware address lookup and raw ICMPv6 transmission).

pub mod config;
pub mod error;
pub mod interface;
pub mod packet;
pub mod types;

// Re-export commonly used types
pub use config::SnifferConfig;
pub use error::{Error, Result};
pub use interface::{Interface, MacLookup, NdSender, RawIcmpv6Sender, SendMode, SystemMacLookup};
pub use packet::Packet;
pub use types::*;
