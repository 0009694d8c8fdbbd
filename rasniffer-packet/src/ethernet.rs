//! Ethernet frame construction and parsing
//!
//! Captured frames are assumed to carry a plain Ethernet II header. Parsing
//! only looks at the 14-byte header and hands back offsets into the caller's
//! buffer; construction is used to build frames for replay and tests.

use bytes::{BufMut, BytesMut};
use rasniffer_core::{Error, MacAddr, Result};
use std::fmt;

/// Common EtherType values seen by the sniffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 (0x0800)
    IPv4,
    /// ARP (0x0806)
    ARP,
    /// VLAN-tagged frame (0x8100)
    VLAN,
    /// IPv6 (0x86DD)
    IPv6,
    /// Custom EtherType
    Custom(u16),
}

impl EtherType {
    /// Convert EtherType to u16 value
    pub fn to_u16(self) -> u16 {
        match self {
            EtherType::IPv4 => 0x0800,
            EtherType::ARP => 0x0806,
            EtherType::VLAN => 0x8100,
            EtherType::IPv6 => 0x86DD,
            EtherType::Custom(val) => val,
        }
    }

    /// Create EtherType from u16 value
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0800 => EtherType::IPv4,
            0x0806 => EtherType::ARP,
            0x8100 => EtherType::VLAN,
            0x86DD => EtherType::IPv6,
            val => EtherType::Custom(val),
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::IPv4 => write!(f, "IPv4"),
            EtherType::ARP => write!(f, "ARP"),
            EtherType::VLAN => write!(f, "VLAN"),
            EtherType::IPv6 => write!(f, "IPv6"),
            EtherType::Custom(val) => write!(f, "0x{:04X}", val),
        }
    }
}

/// Ethernet II header of a captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination MAC address
    pub destination: MacAddr,
    /// Source MAC address
    pub source: MacAddr,
    /// EtherType field
    pub ethertype: EtherType,
}

impl EthernetHeader {
    /// Ethernet header size (dst + src + type)
    pub const SIZE: usize = 14;

    /// Parse the header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::TruncatedMessage {
                needed: Self::SIZE,
                available: data.len(),
            });
        }

        Ok(Self {
            destination: MacAddr::new([data[0], data[1], data[2], data[3], data[4], data[5]]),
            source: MacAddr::new([data[6], data[7], data[8], data[9], data[10], data[11]]),
            ethertype: EtherType::from_u16(u16::from_be_bytes([data[12], data[13]])),
        })
    }

    /// Source MAC of a raw frame, without parsing anything else
    pub fn source_of(frame: &[u8]) -> Option<MacAddr> {
        frame.get(6..12).and_then(MacAddr::from_slice)
    }

    /// Bytes following the header
    pub fn payload(frame: &[u8]) -> &[u8] {
        frame.get(Self::SIZE..).unwrap_or(&[])
    }
}

/// Ethernet II frame
#[derive(Debug, Clone)]
pub struct EthernetFrame {
    /// Destination MAC address
    pub destination: MacAddr,
    /// Source MAC address
    pub source: MacAddr,
    /// EtherType field
    pub ethertype: EtherType,
    /// Payload data
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    /// Minimum Ethernet frame size (without FCS)
    pub const MIN_FRAME_SIZE: usize = 60;

    /// Create a new Ethernet frame
    pub fn new(destination: MacAddr, source: MacAddr, ethertype: EtherType, payload: Vec<u8>) -> Self {
        EthernetFrame {
            destination,
            source,
            ethertype,
            payload,
        }
    }

    /// IPv6 multicast MAC (33:33 + low 32 bits of the group address)
    pub fn ipv6_multicast_mac(group: &std::net::Ipv6Addr) -> MacAddr {
        let o = group.octets();
        MacAddr::new([0x33, 0x33, o[12], o[13], o[14], o[15]])
    }

    /// Convert the frame to bytes, padded to the minimum frame size
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(EthernetHeader::SIZE + self.payload.len());

        buffer.put_slice(self.destination.as_bytes());
        buffer.put_slice(self.source.as_bytes());
        buffer.put_u16(self.ethertype.to_u16());
        buffer.put_slice(&self.payload);

        let mut result = buffer.to_vec();
        if result.len() < Self::MIN_FRAME_SIZE {
            result.resize(Self::MIN_FRAME_SIZE, 0);
        }

        result
    }
}
