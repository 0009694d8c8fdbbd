//! Protocol implementations for rasniffer-rs
//!
//! ## Available Protocols
//!
//! ### IPv6 Neighbor Discovery (RFC 4861)
//! Router Advertisement decoding and reporting, default router preference
//! spoofing (RFC 4191) and Router Solicitation crafting.
//! See [`ipv6_nd`] module for details.

pub mod ipv6_nd;

pub use ipv6_nd::{FrameOutcome, NdSniffer, SnifferStats};
