//! Packet capture library for rasniffer-rs
//!
//! A blocking wrapper around pcap that hands every captured frame to a
//! callback on the calling thread, until a [`StopToken`] is set.
//!
//! ## Example
//!
//! ```no_run
//! use rasniffer_capture::{filters, PacketCapture, StopToken};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut capture = PacketCapture::new("eth0")?;
//! capture.set_filter(&filters::icmpv6_filter())?;
//!
//! let stop = StopToken::new();
//! let stats = capture.run(&stop, |packet| {
//!     println!("Got packet: {} bytes", packet.len());
//!     Ok(())
//! })?;
//! println!("{}", stats);
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod filters;
pub mod stats;

// Re-export main types
pub use capture::{compile_filter, CaptureConfig, CaptureState, PacketCapture, StopToken};
pub use stats::{CaptureStats, StatsAccumulator};
