//! Link and network layer views for rasniffer-rs
//!
//! This crate turns a captured frame into the pieces the Neighbor Discovery
//! decoder needs:
//!
//! - [`ethernet`] - Ethernet II header (source MAC, EtherType) and frame construction
//! - [`ipv6`] - fixed IPv6 header and the extension header walk that locates ICMPv6
//!
//! # Locating an ICMPv6 message
//!
//! ```rust
//! use rasniffer_packet::{EthernetHeader, Ipv6Header};
//!
//! let header = Ipv6Header::new("fe80::1".parse().unwrap(), "ff02::1".parse().unwrap(), 58, 4);
//! let mut datagram = header.to_bytes();
//! datagram.extend_from_slice(&[134, 0, 0, 0]);
//!
//! let parsed = Ipv6Header::parse(&datagram).unwrap();
//! assert_eq!(parsed.icmpv6_offset(&datagram).unwrap(), 40);
//! assert_eq!(EthernetHeader::SIZE, 14);
//! ```

pub mod ethernet;
pub mod ipv6;

pub use ethernet::{EtherType, EthernetFrame, EthernetHeader};
pub use ipv6::{ExtensionHeader, ExtensionHeaderIter, Ipv6Header};
