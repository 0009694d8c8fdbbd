//! Per-frame Router Advertisement handling

use rasniffer_core::{
    MacLookup, NdSender, Packet, Result, SendMode, SnifferConfig, ALL_NODES_MULTICAST,
    ALL_ROUTERS_MULTICAST,
};
use rasniffer_packet::{EtherType, EthernetHeader, Ipv6Header};
use std::fmt;
use std::io::Write;
use tracing::{debug, info, warn};

use super::attack::{build_solicitation, deprioritize, origin_is_self};
use super::packet::{Ipv6NdType, RouterAdvertisement};
use super::report::RaReport;

/// What happened to one captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not IPv6, not ICMPv6, or not a Router Advertisement
    Ignored,
    /// IPv6 datagram whose ICMPv6 message could not be reached
    Skipped,
    /// Router Advertisement reported, nothing sent
    Reported,
    /// Router Advertisement sent by this host, not spoofed again
    OwnAdvertisement,
    /// Deprioritized copy sent to all nodes
    Spoofed,
    /// Deprioritized copy could not be built or sent
    SpoofFailed,
}

/// Counters kept across frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnifferStats {
    /// Frames handed to the sniffer
    pub frames: u64,
    /// Router Advertisements reported
    pub router_advertisements: u64,
    /// Advertisements with a malformed fixed header or option chain
    pub malformed: u64,
    /// IPv6 datagrams skipped by the extension header walk
    pub skipped: u64,
    /// Own advertisements seen on the wire
    pub own_advertisements: u64,
    /// Deprioritized copies sent
    pub spoofed: u64,
    /// Copies that could not be built or sent
    pub send_failures: u64,
}

impl fmt::Display for SnifferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {} router advertisements ({} malformed, {} own), {} skipped, {} spoofed, {} send failures",
            self.frames,
            self.router_advertisements,
            self.malformed,
            self.own_advertisements,
            self.skipped,
            self.spoofed,
            self.send_failures
        )
    }
}

/// Router Advertisement sniffer bound to one interface
pub struct NdSniffer<L, S> {
    config: SnifferConfig,
    lookup: L,
    sender: S,
    stats: SnifferStats,
}

impl<L: MacLookup, S: NdSender> NdSniffer<L, S> {
    pub fn new(config: SnifferConfig, lookup: L, sender: S) -> Self {
        Self {
            config,
            lookup,
            sender,
            stats: SnifferStats::default(),
        }
    }

    pub fn config(&self) -> &SnifferConfig {
        &self.config
    }

    pub fn stats(&self) -> SnifferStats {
        self.stats
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Send one Router Solicitation to all routers
    pub fn solicit(&mut self) -> Result<usize> {
        let mac = self.lookup.mac_address(&self.config.interface)?;
        let solicitation = build_solicitation(mac);
        let sent = self
            .sender
            .send(&solicitation, ALL_ROUTERS_MULTICAST, SendMode::Solicitation)?;

        info!(interface = %self.config.interface, mac = %mac, "Sent router solicitation");
        Ok(sent)
    }

    /// Handle one captured frame, writing a report to `out` for every
    /// Router Advertisement.
    ///
    /// Problems confined to this frame are logged and reflected in the
    /// outcome. Errors are a failed self-origin check or a failed report
    /// write.
    pub fn handle_frame<W: Write>(&mut self, packet: &Packet, out: &mut W) -> Result<FrameOutcome> {
        self.stats.frames += 1;
        let frame = packet.data();

        let ethernet = match EthernetHeader::parse(frame) {
            Ok(header) if header.ethertype == EtherType::IPv6 => header,
            _ => return Ok(FrameOutcome::Ignored),
        };

        let datagram = EthernetHeader::payload(frame);
        let ip = match Ipv6Header::parse(datagram) {
            Ok(ip) if ip.version == 6 => ip,
            _ => return Ok(FrameOutcome::Ignored),
        };

        let icmp = match ip.icmpv6_message(datagram) {
            Ok(icmp) => icmp,
            Err(e) => {
                debug!(
                    source = %ip.source,
                    truncated = packet.is_truncated(),
                    "Skipping datagram: {}",
                    e
                );
                self.stats.skipped += 1;
                return Ok(FrameOutcome::Skipped);
            }
        };

        if icmp.first().copied().and_then(Ipv6NdType::from_u8) != Some(Ipv6NdType::RouterAdvertisement) {
            return Ok(FrameOutcome::Ignored);
        }

        let ra = match RouterAdvertisement::parse(icmp) {
            Ok(ra) => ra,
            Err(e) => {
                warn!(source = %ip.source, "Malformed router advertisement: {}", e);
                self.stats.malformed += 1;
                return Ok(FrameOutcome::Skipped);
            }
        };

        self.stats.router_advertisements += 1;
        write!(out, "{}", RaReport::new(&ip, &ra))?;

        if let Err(e) = ra.collect_options() {
            warn!(source = %ip.source, "Malformed router advertisement options: {}", e);
            self.stats.malformed += 1;
        }

        if !self.config.emit {
            return Ok(FrameOutcome::Reported);
        }

        if origin_is_self(frame, &self.config.interface, &self.lookup)? {
            debug!(source = %ethernet.source, "Ignoring own router advertisement");
            self.stats.own_advertisements += 1;
            return Ok(FrameOutcome::OwnAdvertisement);
        }

        let spoofed = match deprioritize(icmp, icmp.len()) {
            Ok(spoofed) => spoofed,
            Err(e) => {
                warn!("Cannot build spoofed router advertisement: {}", e);
                self.stats.send_failures += 1;
                return Ok(FrameOutcome::SpoofFailed);
            }
        };

        match self
            .sender
            .send(&spoofed, ALL_NODES_MULTICAST, SendMode::Advertisement)
        {
            Ok(_) => {
                debug!(router = %ip.source, "Sent low preference copy");
                self.stats.spoofed += 1;
                Ok(FrameOutcome::Spoofed)
            }
            Err(e) => {
                warn!(router = %ip.source, "Couldn't send packet: {}", e);
                self.stats.send_failures += 1;
                Ok(FrameOutcome::SpoofFailed)
            }
        }
    }
}
