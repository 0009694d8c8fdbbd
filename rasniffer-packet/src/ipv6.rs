//! IPv6 header parsing and extension header traversal
//!
//! The fixed 40-byte header is decoded into an [`Ipv6Header`]. Locating the
//! upper-layer ICMPv6 message means walking the extension header chain, where
//! every record states its own length. Those lengths come straight off the
//! wire, so the walk is an iterator whose every stride is checked against the
//! bytes that were actually captured and declared before it is taken.

use bytes::{BufMut, BytesMut};
use rasniffer_core::next_header;
use rasniffer_core::{Error, Result};
use std::net::Ipv6Addr;

/// IPv6 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Header {
    /// Version (6)
    pub version: u8,
    /// Traffic class
    pub traffic_class: u8,
    /// Flow label (20 bits)
    pub flow_label: u32,
    /// Payload length (extension headers + upper layer) in bytes
    pub payload_length: u16,
    /// Next header
    pub next_header: u8,
    /// Hop limit
    pub hop_limit: u8,
    /// Source address
    pub source: Ipv6Addr,
    /// Destination address
    pub destination: Ipv6Addr,
}

impl Ipv6Header {
    /// Fixed IPv6 header size
    pub const SIZE: usize = 40;

    /// Create a header for an upper-layer payload of `payload_length` bytes
    pub fn new(source: Ipv6Addr, destination: Ipv6Addr, next_header: u8, payload_length: u16) -> Self {
        Self {
            version: 6,
            traffic_class: 0,
            flow_label: 0,
            payload_length,
            next_header,
            hop_limit: 255,
            source,
            destination,
        }
    }

    /// Parse the fixed header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::TruncatedMessage {
                needed: Self::SIZE,
                available: data.len(),
            });
        }

        let word = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let mut source = [0u8; 16];
        source.copy_from_slice(&data[8..24]);
        let mut destination = [0u8; 16];
        destination.copy_from_slice(&data[24..40]);

        Ok(Self {
            version: (word >> 28) as u8,
            traffic_class: ((word >> 20) & 0xFF) as u8,
            flow_label: word & 0x000F_FFFF,
            payload_length: u16::from_be_bytes([data[4], data[5]]),
            next_header: data[6],
            hop_limit: data[7],
            source: Ipv6Addr::from(source),
            destination: Ipv6Addr::from(destination),
        })
    }

    /// Convert the header to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(Self::SIZE);

        let word = ((self.version as u32) << 28)
            | ((self.traffic_class as u32) << 20)
            | (self.flow_label & 0x000F_FFFF);
        buffer.put_u32(word);
        buffer.put_u16(self.payload_length);
        buffer.put_u8(self.next_header);
        buffer.put_u8(self.hop_limit);
        buffer.put_slice(&self.source.octets());
        buffer.put_slice(&self.destination.octets());

        buffer.to_vec()
    }

    /// End of the datagram: the declared length, clipped to what was captured
    pub fn walk_limit(&self, datagram: &[u8]) -> usize {
        datagram
            .len()
            .min(Self::SIZE + self.payload_length as usize)
    }

    /// Iterate over the extension headers between this header and ICMPv6
    pub fn extension_headers<'a>(&self, datagram: &'a [u8]) -> ExtensionHeaderIter<'a> {
        ExtensionHeaderIter::new(datagram, self.walk_limit(datagram), self.next_header)
    }

    /// Offset of the first ICMPv6 byte within `datagram`
    pub fn icmpv6_offset(&self, datagram: &[u8]) -> Result<usize> {
        if self.next_header == next_header::ICMPV6 {
            return Ok(Self::SIZE);
        }

        let mut chain = self.extension_headers(datagram);
        for header in &mut chain {
            header?;
        }
        Ok(chain.offset())
    }

    /// The whole ICMPv6 message, bounded by the declared payload length
    pub fn icmpv6_message<'a>(&self, datagram: &'a [u8]) -> Result<&'a [u8]> {
        let start = self.icmpv6_offset(datagram)?;
        let end = Self::SIZE + self.payload_length as usize;

        if end > datagram.len() {
            return Err(Error::TruncatedMessage {
                needed: end,
                available: datagram.len(),
            });
        }

        Ok(&datagram[start..end])
    }
}

/// One extension header record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionHeader {
    /// Type of this header (the previous header's next-header value)
    pub header_type: u8,
    /// Offset of the record within the datagram
    pub offset: usize,
    /// Record length in bytes
    pub len: usize,
    /// Next header announced by this record
    pub next_header: u8,
}

/// Lazy walk over an IPv6 extension header chain.
///
/// Yields one record per extension header and stops (returns `None`) once
/// the next header is ICMPv6. Any error is yielded once and fuses the
/// iterator. Strides are at least 8 bytes, so the walk always terminates.
#[derive(Debug, Clone)]
pub struct ExtensionHeaderIter<'a> {
    data: &'a [u8],
    limit: usize,
    offset: usize,
    next: u8,
    done: bool,
}

impl<'a> ExtensionHeaderIter<'a> {
    fn new(data: &'a [u8], limit: usize, next: u8) -> Self {
        Self {
            data,
            limit,
            offset: Ipv6Header::SIZE,
            next,
            done: false,
        }
    }

    /// Current position: the ICMPv6 offset once the walk has finished
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte length of the extension header at the current offset
    fn stride(&self, header_type: u8) -> Result<usize> {
        if self.offset + 2 > self.limit {
            return Err(Error::TruncatedHeaderChain);
        }
        let len_field = self.data[self.offset + 1] as usize;

        match header_type {
            next_header::HOP_BY_HOP
            | next_header::ROUTING
            | next_header::DESTINATION_OPTIONS
            | next_header::MOBILITY => Ok((len_field + 1) * 8),
            next_header::AUTH => Ok((len_field + 2) * 4),
            next_header::FRAGMENT => Err(Error::FragmentedPacket),
            other => Err(Error::UnsupportedHeader(other)),
        }
    }
}

impl Iterator for ExtensionHeaderIter<'_> {
    type Item = Result<ExtensionHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next == next_header::ICMPV6 {
            return None;
        }

        let header_type = self.next;
        let len = match self.stride(header_type) {
            Ok(len) => len,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if self.offset + len > self.limit {
            self.done = true;
            return Some(Err(Error::TruncatedHeaderChain));
        }

        let header = ExtensionHeader {
            header_type,
            offset: self.offset,
            len,
            next_header: self.data[self.offset],
        };

        self.offset += len;
        self.next = header.next_header;
        Some(Ok(header))
    }
}

impl std::iter::FusedIterator for ExtensionHeaderIter<'_> {}
