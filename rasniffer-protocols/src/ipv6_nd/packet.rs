//! IPv6 Neighbor Discovery Packet Structures

use rasniffer_core::{Error, MacAddr, Result};
use std::fmt;
use std::net::Ipv6Addr;

use super::option::NdOptionIter;

/// ICMPv6 ND Message Types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Ipv6NdType {
    RouterSolicitation = 133,
    RouterAdvertisement = 134,
    NeighborSolicitation = 135,
    NeighborAdvertisement = 136,
    Redirect = 137,
}

impl Ipv6NdType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            133 => Some(Self::RouterSolicitation),
            134 => Some(Self::RouterAdvertisement),
            135 => Some(Self::NeighborSolicitation),
            136 => Some(Self::NeighborAdvertisement),
            137 => Some(Self::Redirect),
            _ => None,
        }
    }
}

/// IPv6 ND Option Types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Ipv6NdOptionType {
    SourceLinkLayerAddress = 1,
    TargetLinkLayerAddress = 2,
    PrefixInformation = 3,
    RedirectedHeader = 4,
    Mtu = 5,
    RouteInformation = 24,   // RFC 4191
    RecursiveDnsServer = 25, // RFC 8106
    DnsSearchList = 31,      // RFC 8106
}

impl Ipv6NdOptionType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::SourceLinkLayerAddress),
            2 => Some(Self::TargetLinkLayerAddress),
            3 => Some(Self::PrefixInformation),
            4 => Some(Self::RedirectedHeader),
            5 => Some(Self::Mtu),
            24 => Some(Self::RouteInformation),
            25 => Some(Self::RecursiveDnsServer),
            31 => Some(Self::DnsSearchList),
            _ => None,
        }
    }
}

/// Default router preference (RFC 4191), bits 3-4 of the RA flags byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterPreference {
    Medium,
    High,
    Reserved,
    Low,
}

impl RouterPreference {
    /// Preference field mask within the flags byte
    pub const MASK: u8 = 0x18;

    /// Decode from a flags byte, ignoring the other bits
    pub fn from_bits(flags: u8) -> Self {
        match flags & Self::MASK {
            0x08 => Self::High,
            0x10 => Self::Reserved,
            0x18 => Self::Low,
            _ => Self::Medium,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Medium => 0x00,
            Self::High => 0x08,
            Self::Reserved => 0x10,
            Self::Low => 0x18,
        }
    }
}

impl fmt::Display for RouterPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Reserved => write!(f, "reserved"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Router Advertisement flags byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RaFlags(pub u8);

impl RaFlags {
    /// M flag (DHCPv6)
    pub const MANAGED: u8 = 0x80;
    /// O flag (DHCPv6 for other config)
    pub const OTHER: u8 = 0x40;
    /// H flag (Mobile IPv6 home agent)
    pub const HOME_AGENT: u8 = 0x20;
    /// P flag (ND proxy, RFC 4389)
    pub const PROXY: u8 = 0x04;

    pub fn managed(self) -> bool {
        self.0 & Self::MANAGED != 0
    }

    pub fn other(self) -> bool {
        self.0 & Self::OTHER != 0
    }

    pub fn home_agent(self) -> bool {
        self.0 & Self::HOME_AGENT != 0
    }

    pub fn proxied(self) -> bool {
        self.0 & Self::PROXY != 0
    }

    pub fn preference(self) -> RouterPreference {
        RouterPreference::from_bits(self.0)
    }

    /// Names of the set flags, in wire order
    pub fn names(self) -> Vec<&'static str> {
        [
            (self.managed(), "managed"),
            (self.other(), "other"),
            (self.home_agent(), "home agent"),
            (self.proxied(), "proxied"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect()
    }
}

/// Prefix Information option body (RFC 4861 4.6.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixInformation {
    pub prefix_length: u8,
    pub on_link: bool,
    pub autonomous: bool,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub prefix: Ipv6Addr,
}

impl PrefixInformation {
    /// Option length in 8-octet units
    pub const UNITS: u8 = 4;

    pub const ON_LINK: u8 = 0x80;
    pub const AUTONOMOUS: u8 = 0x40;

    /// SLAAC prefix with both L and A set
    pub fn slaac(prefix: Ipv6Addr, prefix_length: u8, valid_lifetime: u32, preferred_lifetime: u32) -> Self {
        Self {
            prefix_length,
            on_link: true,
            autonomous: true,
            valid_lifetime,
            preferred_lifetime,
            prefix,
        }
    }
}

/// Route Information option body (RFC 4191 2.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteInformation {
    pub prefix_length: u8,
    pub preference: RouterPreference,
    pub route_lifetime: u32,
    pub prefix: Ipv6Addr,
}

/// Recursive DNS Server option body (RFC 8106 5.1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveDnsServer {
    pub lifetime: u32,
    pub servers: Vec<Ipv6Addr>,
}

/// A decoded IPv6 ND option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NdOption {
    SourceLinkAddress(MacAddr),
    TargetLinkAddress(MacAddr),
    PrefixInformation(PrefixInformation),
    Mtu(u32),
    RouteInformation(RouteInformation),
    RecursiveDnsServer(RecursiveDnsServer),
    /// Link-layer address option longer than one unit (not Ethernet)
    NonEthernetLinkAddress { option_type: u8, len: u8 },
    /// Any other option type, skipped by its declared length
    Unknown { option_type: u8, len: u8 },
}

impl NdOption {
    /// Decode one option. `data` holds exactly `len * 8` bytes, type and
    /// length included; the caller has already checked `len != 0`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let option_type = data[0];
        let len = data[1];
        let malformed = || Error::MalformedOption { option_type, len };

        let option = match Ipv6NdOptionType::from_u8(option_type) {
            Some(kind @ (Ipv6NdOptionType::SourceLinkLayerAddress | Ipv6NdOptionType::TargetLinkLayerAddress)) => {
                if len != 1 {
                    return Ok(Self::NonEthernetLinkAddress { option_type, len });
                }
                let mac = MacAddr::from_slice(&data[2..8]).ok_or_else(malformed)?;
                if kind == Ipv6NdOptionType::SourceLinkLayerAddress {
                    Self::SourceLinkAddress(mac)
                } else {
                    Self::TargetLinkAddress(mac)
                }
            }
            Some(Ipv6NdOptionType::PrefixInformation) => {
                if len < PrefixInformation::UNITS {
                    return Err(malformed());
                }
                let flags = data[3];
                Self::PrefixInformation(PrefixInformation {
                    prefix_length: data[2],
                    on_link: flags & PrefixInformation::ON_LINK != 0,
                    autonomous: flags & PrefixInformation::AUTONOMOUS != 0,
                    valid_lifetime: read_u32(data, 4),
                    preferred_lifetime: read_u32(data, 8),
                    prefix: read_prefix(&data[16..32]),
                })
            }
            Some(Ipv6NdOptionType::Mtu) => Self::Mtu(read_u32(data, 4)),
            Some(Ipv6NdOptionType::RouteInformation) => {
                if len > 3 || data[2] > 128 {
                    return Ok(Self::Unknown { option_type, len });
                }
                Self::RouteInformation(RouteInformation {
                    prefix_length: data[2],
                    preference: RouterPreference::from_bits(data[3]),
                    route_lifetime: read_u32(data, 4),
                    prefix: read_prefix(&data[8..]),
                })
            }
            Some(Ipv6NdOptionType::RecursiveDnsServer) => {
                if len < 3 {
                    return Ok(Self::Unknown { option_type, len });
                }
                Self::RecursiveDnsServer(RecursiveDnsServer {
                    lifetime: read_u32(data, 4),
                    servers: data[8..].chunks_exact(16).map(read_prefix).collect(),
                })
            }
            _ => Self::Unknown { option_type, len },
        };

        Ok(option)
    }

    /// Wire type code
    pub fn option_type(&self) -> u8 {
        match self {
            Self::SourceLinkAddress(_) => Ipv6NdOptionType::SourceLinkLayerAddress as u8,
            Self::TargetLinkAddress(_) => Ipv6NdOptionType::TargetLinkLayerAddress as u8,
            Self::PrefixInformation(_) => Ipv6NdOptionType::PrefixInformation as u8,
            Self::Mtu(_) => Ipv6NdOptionType::Mtu as u8,
            Self::RouteInformation(_) => Ipv6NdOptionType::RouteInformation as u8,
            Self::RecursiveDnsServer(_) => Ipv6NdOptionType::RecursiveDnsServer as u8,
            Self::NonEthernetLinkAddress { option_type, .. } | Self::Unknown { option_type, .. } => *option_type,
        }
    }

    /// Encode option to bytes (Type + Length + Data)
    /// Length is in units of 8 octets
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();

        match self {
            Self::SourceLinkAddress(mac) | Self::TargetLinkAddress(mac) => {
                data.extend_from_slice(mac.as_bytes());
            }
            Self::PrefixInformation(pio) => {
                data.push(pio.prefix_length);

                // Flags: L (on-link), A (autonomous)
                let mut flags = 0u8;
                if pio.on_link {
                    flags |= PrefixInformation::ON_LINK;
                }
                if pio.autonomous {
                    flags |= PrefixInformation::AUTONOMOUS;
                }
                data.push(flags);

                data.extend_from_slice(&pio.valid_lifetime.to_be_bytes());
                data.extend_from_slice(&pio.preferred_lifetime.to_be_bytes());
                data.extend_from_slice(&[0u8; 4]); // Reserved
                data.extend_from_slice(&pio.prefix.octets());
            }
            Self::Mtu(mtu) => {
                data.extend_from_slice(&[0u8; 2]); // Reserved
                data.extend_from_slice(&mtu.to_be_bytes());
            }
            Self::RouteInformation(rio) => {
                data.push(rio.prefix_length);
                data.push(rio.preference.bits());
                data.extend_from_slice(&rio.route_lifetime.to_be_bytes());
                let prefix_bytes = (rio.prefix_length as usize).div_ceil(64) * 8;
                data.extend_from_slice(&rio.prefix.octets()[..prefix_bytes.min(16)]);
            }
            Self::RecursiveDnsServer(rdnss) => {
                data.extend_from_slice(&[0u8; 2]); // Reserved
                data.extend_from_slice(&rdnss.lifetime.to_be_bytes());
                for server in &rdnss.servers {
                    data.extend_from_slice(&server.octets());
                }
            }
            Self::NonEthernetLinkAddress { len, .. } | Self::Unknown { len, .. } => {
                data.resize((*len as usize * 8).saturating_sub(2), 0);
            }
        }

        let total_len = 2 + data.len(); // type + len + data
        let len_8octets = total_len.div_ceil(8);

        let mut bytes = Vec::with_capacity(len_8octets * 8);
        bytes.push(self.option_type());
        bytes.push(len_8octets as u8);
        bytes.extend_from_slice(&data);

        // Pad to 8-octet boundary
        bytes.resize(len_8octets * 8, 0);
        bytes
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

/// Zero-extend up to 16 prefix bytes into an address
fn read_prefix(bytes: &[u8]) -> Ipv6Addr {
    let mut octets = [0u8; 16];
    let n = bytes.len().min(16);
    octets[..n].copy_from_slice(&bytes[..n]);
    Ipv6Addr::from(octets)
}

/// Router Advertisement view over a captured ICMPv6 message
#[derive(Debug, Clone, Copy)]
pub struct RouterAdvertisement<'a> {
    pub cur_hop_limit: u8,
    pub flags: RaFlags,
    pub router_lifetime: u16,
    pub reachable_time: u32,
    pub retrans_timer: u32,
    options: &'a [u8],
}

impl<'a> RouterAdvertisement<'a> {
    /// ICMPv6 header + RA fixed fields
    pub const HEADER_LEN: usize = 16;
    /// Offset of the flags byte within the ICMPv6 message
    pub const FLAGS_OFFSET: usize = 5;

    /// Decode the fixed part of `icmp`, which must already be bounded by
    /// the datagram's declared length. The message type is not checked.
    pub fn parse(icmp: &'a [u8]) -> Result<Self> {
        if icmp.len() < Self::HEADER_LEN {
            return Err(Error::TruncatedMessage {
                needed: Self::HEADER_LEN,
                available: icmp.len(),
            });
        }

        Ok(Self {
            cur_hop_limit: icmp[4],
            flags: RaFlags(icmp[Self::FLAGS_OFFSET]),
            router_lifetime: u16::from_be_bytes([icmp[6], icmp[7]]),
            reachable_time: read_u32(icmp, 8),
            retrans_timer: read_u32(icmp, 12),
            options: &icmp[Self::HEADER_LEN..],
        })
    }

    /// Lazily decode the option chain
    pub fn options(&self) -> NdOptionIter<'a> {
        NdOptionIter::new(self.options, Self::HEADER_LEN)
    }

    /// Decode every option, or return the first error
    pub fn collect_options(&self) -> Result<Vec<NdOption>> {
        self.options().collect()
    }
}

/// Router Solicitation carrying the sender's link-layer address
#[derive(Debug, Clone, Default)]
pub struct RouterSolicitation {
    pub options: Vec<NdOption>,
}

impl RouterSolicitation {
    /// ICMPv6 header + reserved word
    pub const HEADER_LEN: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_ll(mut self, mac: MacAddr) -> Self {
        self.options.push(NdOption::SourceLinkAddress(mac));
        self
    }

    /// Full ICMPv6 message; checksum left zero for the kernel to fill in
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![Ipv6NdType::RouterSolicitation as u8, 0, 0, 0, 0, 0, 0, 0];

        for option in &self.options {
            bytes.extend_from_slice(&option.to_bytes());
        }

        bytes
    }
}
