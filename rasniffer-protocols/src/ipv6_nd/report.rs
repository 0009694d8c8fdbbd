//! Human readable Router Advertisement reports

use rasniffer_packet::Ipv6Header;
use std::fmt;

use super::packet::{NdOption, RouterAdvertisement};

/// Closing line of every report block
pub const REPORT_SEPARATOR: &str = "==========";

/// One report block for a captured Router Advertisement.
///
/// Options are decoded while formatting. A broken option chain ends the
/// option list with an error line instead of failing the whole report.
pub struct RaReport<'a> {
    ip: &'a Ipv6Header,
    ra: &'a RouterAdvertisement<'a>,
}

impl<'a> RaReport<'a> {
    pub fn new(ip: &'a Ipv6Header, ra: &'a RouterAdvertisement<'a>) -> Self {
        Self { ip, ra }
    }
}

impl fmt::Display for RaReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ra = self.ra;

        writeln!(
            f,
            "Source address: {}\tDestination address: {}",
            self.ip.source, self.ip.destination
        )?;

        let names = ra.flags.names();
        let flags = if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        };
        writeln!(
            f,
            "Hop limit: {}\tFlags: {}\tRouter preference: {}\tRouter lifetime: {}s",
            ra.cur_hop_limit,
            flags,
            ra.flags.preference(),
            ra.router_lifetime
        )?;
        writeln!(
            f,
            "Reachable time: {}ms\tRetransmit time: {}ms",
            ra.reachable_time, ra.retrans_timer
        )?;

        for option in ra.options() {
            match option {
                Ok(option) => write_option(f, &option)?,
                Err(e) => writeln!(f, "Malformed option chain: {}", e)?,
            }
        }

        writeln!(f, "{}", REPORT_SEPARATOR)
    }
}

fn write_option(f: &mut fmt::Formatter<'_>, option: &NdOption) -> fmt::Result {
    match option {
        NdOption::SourceLinkAddress(mac) => writeln!(f, "Source link-layer address: {}", mac),
        NdOption::TargetLinkAddress(mac) => writeln!(f, "Target link-layer address: {}", mac),
        NdOption::PrefixInformation(pio) => {
            let mut flags = Vec::new();
            if pio.on_link {
                flags.push("on-link");
            }
            if pio.autonomous {
                flags.push("autonomous");
            }
            let flags = if flags.is_empty() {
                "none".to_string()
            } else {
                flags.join(", ")
            };
            writeln!(
                f,
                "Prefix information: {}/{}\tFlags: {}",
                pio.prefix, pio.prefix_length, flags
            )?;
            writeln!(
                f,
                "\tValid lifetime: {}s\tPreferred lifetime: {}s",
                pio.valid_lifetime, pio.preferred_lifetime
            )
        }
        NdOption::Mtu(mtu) => writeln!(f, "MTU: {}", mtu),
        NdOption::RouteInformation(rio) => writeln!(
            f,
            "Route information: {}/{}\tPreference: {}\tLifetime: {}s",
            rio.prefix, rio.prefix_length, rio.preference, rio.route_lifetime
        ),
        NdOption::RecursiveDnsServer(rdnss) => {
            let servers: Vec<String> = rdnss.servers.iter().map(|s| s.to_string()).collect();
            writeln!(
                f,
                "Recursive DNS servers: {}\tLifetime: {}s",
                servers.join(", "),
                rdnss.lifetime
            )
        }
        NdOption::NonEthernetLinkAddress { option_type, len } => writeln!(
            f,
            "Link-layer address option {} ({} bytes): not an Ethernet address",
            option_type,
            *len as usize * 8
        ),
        NdOption::Unknown { option_type, len } => {
            writeln!(f, "Unknown option {} ({} bytes)", option_type, *len as usize * 8)
        }
    }
}
