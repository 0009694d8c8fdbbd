//! Packet types

use std::time::SystemTime;

/// A captured frame, as handed over by the capture loop
#[derive(Debug, Clone)]
pub struct Packet {
    /// When the packet was captured
    pub timestamp: SystemTime,
    /// Interface the packet was received on
    pub interface: String,
    /// Packet data (including the link-layer header)
    pub data: Vec<u8>,
    /// Length on the wire (may exceed data.len() if truncated by snaplen)
    pub len: usize,
}

impl Packet {
    /// Create a new packet
    pub fn new(interface: String, data: Vec<u8>) -> Self {
        let len = data.len();
        Self {
            timestamp: SystemTime::now(),
            interface,
            data,
            len,
        }
    }

    /// Get packet data as slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get packet length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if packet is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the capture kept fewer bytes than were on the wire
    pub fn is_truncated(&self) -> bool {
        self.data.len() < self.len
    }
}
