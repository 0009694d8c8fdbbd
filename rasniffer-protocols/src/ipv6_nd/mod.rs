//! IPv6 Neighbor Discovery / Router Advertisement - RFC 4861
//!
//! Decodes captured Router Advertisements and their option chain, prints a
//! report per advertisement and optionally re-injects a copy with the
//! default router preference forced to low (RFC 4191).

pub mod attack;
pub mod option;
pub mod packet;
pub mod protocol;
pub mod report;

#[cfg(test)]
mod tests;

pub use attack::{build_solicitation, deprioritize, origin_is_self};
pub use option::NdOptionIter;
pub use packet::{
    Ipv6NdOptionType, Ipv6NdType, NdOption, PrefixInformation, RaFlags, RecursiveDnsServer,
    RouteInformation, RouterAdvertisement, RouterPreference, RouterSolicitation,
};
pub use protocol::{FrameOutcome, NdSniffer, SnifferStats};
pub use report::RaReport;
