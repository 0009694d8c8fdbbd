//! Network interface types and link boundaries
//!
//! The sniffer core never talks to the operating system directly. It looks
//! up hardware addresses through [`MacLookup`] and hands finished ICMPv6
//! messages to an [`NdSender`]. The system implementations live here.

use crate::{Error, MacAddr, Result};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::fmt;
use std::net::{Ipv6Addr, SocketAddrV6};
use tracing::{debug, info};

/// Hardware address lookup for a named interface
pub trait MacLookup {
    /// Return the 6-byte hardware address of `interface`
    fn mac_address(&self, interface: &str) -> Result<MacAddr>;
}

/// Kind of Neighbor Discovery message being transmitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    /// Deprioritized copy of a captured Router Advertisement
    Advertisement,
    /// Initial Router Solicitation
    Solicitation,
}

impl SendMode {
    /// Hop limit for the outgoing datagram.
    ///
    /// Receivers drop ND messages whose hop limit is not 255 (RFC 4861).
    pub fn hop_limit(self) -> u32 {
        255
    }

    pub fn label(self) -> &'static str {
        match self {
            SendMode::Advertisement => "router advertisement",
            SendMode::Solicitation => "router solicitation",
        }
    }
}

/// Transmission boundary for crafted ICMPv6 messages
pub trait NdSender {
    /// Send `message` (ICMPv6 header onwards) to `destination`
    fn send(&mut self, message: &[u8], destination: Ipv6Addr, mode: SendMode) -> Result<usize>;
}

/// A missing sender rejects every message, for passive runs
impl<S: NdSender> NdSender for Option<S> {
    fn send(&mut self, message: &[u8], destination: Ipv6Addr, mode: SendMode) -> Result<usize> {
        match self {
            Some(sender) => sender.send(message, destination, mode),
            None => Err(Error::send(format!("no socket open for {}", mode.label()))),
        }
    }
}

/// Network interface
#[derive(Debug, Clone)]
pub struct Interface {
    /// Interface name (e.g., "eth0", "en0")
    pub name: String,
    /// Interface index
    pub index: u32,
    /// MAC address
    pub mac_address: MacAddr,
    /// Is interface up?
    pub is_up: bool,
    /// Is interface a loopback?
    pub is_loopback: bool,
}

impl Interface {
    /// Get interface by name
    pub fn by_name(name: &str) -> Result<Self> {
        pnet_datalink::interfaces()
            .iter()
            .find(|i| i.name == name)
            .map(Self::from)
            .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
    }

    /// List all available interfaces
    pub fn list_all() -> Vec<Self> {
        pnet_datalink::interfaces().iter().map(Self::from).collect()
    }
}

impl From<&pnet_datalink::NetworkInterface> for Interface {
    fn from(iface: &pnet_datalink::NetworkInterface) -> Self {
        let mac_address = iface
            .mac
            .map(|mac| MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]))
            .unwrap_or_default();

        Self {
            name: iface.name.clone(),
            index: iface.index,
            mac_address,
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}), index {}", self.name, self.mac_address, self.index)
    }
}

/// Hardware address lookup backed by the operating system interface table
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMacLookup;

impl MacLookup for SystemMacLookup {
    fn mac_address(&self, interface: &str) -> Result<MacAddr> {
        let iface = pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == interface)
            .ok_or_else(|| {
                Error::InterfaceLookupFailure(format!("interface {} not found", interface))
            })?;

        let mac = iface.mac.ok_or_else(|| {
            Error::InterfaceLookupFailure(format!("interface {} has no hardware address", interface))
        })?;

        Ok(MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]))
    }
}

/// Raw `AF_INET6` ICMPv6 socket pinned to one interface.
///
/// The kernel builds the IPv6 header and fills in the ICMPv6 checksum.
pub struct RawIcmpv6Sender {
    socket: Socket,
    interface: String,
    index: u32,
}

impl RawIcmpv6Sender {
    /// Open a raw ICMPv6 socket on `interface`
    pub fn open(interface: &Interface) -> Result<Self> {
        let socket = Socket::new(Domain::IPV6, Type::RAW, Some(Protocol::ICMPV6))?;

        #[cfg(any(target_os = "linux", target_os = "android"))]
        socket.bind_device(Some(interface.name.as_bytes()))?;

        socket.set_multicast_if_v6(interface.index)?;
        socket.set_multicast_loop_v6(false)?;
        socket.set_multicast_hops_v6(SendMode::Solicitation.hop_limit())?;

        info!(
            interface = %interface.name,
            index = interface.index,
            "Opened raw ICMPv6 socket"
        );

        Ok(Self {
            socket,
            interface: interface.name.clone(),
            index: interface.index,
        })
    }
}

impl NdSender for RawIcmpv6Sender {
    fn send(&mut self, message: &[u8], destination: Ipv6Addr, mode: SendMode) -> Result<usize> {
        self.socket.set_multicast_hops_v6(mode.hop_limit())?;

        let dest = SockAddr::from(SocketAddrV6::new(destination, 0, 0, self.index));
        let sent = self
            .socket
            .send_to(message, &dest)
            .map_err(|e| Error::send(format!("{} to {}: {}", mode.label(), destination, e)))?;

        debug!(
            interface = %self.interface,
            dest = %destination,
            bytes = sent,
            "Sent {}",
            mode.label()
        );
        Ok(sent)
    }
}
