//! Tests for Router Advertisement decoding, reporting and spoofing

use super::*;
use rasniffer_core::{
    next_header, Error, MacAddr, MacLookup, NdSender, Packet, Result, SendMode, SnifferConfig,
    ALL_NODES_MULTICAST, ALL_ROUTERS_MULTICAST,
};
use rasniffer_packet::{EtherType, EthernetFrame, Ipv6Header};
use std::net::Ipv6Addr;

const ROUTER_MAC: MacAddr = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
const OWN_MAC: MacAddr = MacAddr([0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);

struct MockLookup {
    mac: Option<MacAddr>,
}

impl MacLookup for MockLookup {
    fn mac_address(&self, interface: &str) -> Result<MacAddr> {
        self.mac
            .ok_or_else(|| Error::InterfaceLookupFailure(format!("{} has no address", interface)))
    }
}

#[derive(Default)]
struct MockSender {
    sent: Vec<(Vec<u8>, Ipv6Addr, SendMode)>,
    fail: bool,
}

impl NdSender for MockSender {
    fn send(&mut self, message: &[u8], destination: Ipv6Addr, mode: SendMode) -> Result<usize> {
        if self.fail {
            return Err(Error::send("network unreachable"));
        }
        self.sent.push((message.to_vec(), destination, mode));
        Ok(message.len())
    }
}

/// RA fixed header followed by `options`
fn ra_message(hop_limit: u8, flags: u8, lifetime: u16, options: &[u8]) -> Vec<u8> {
    let mut msg = vec![134, 0, 0x12, 0x34, hop_limit, flags];
    msg.extend_from_slice(&lifetime.to_be_bytes());
    msg.extend_from_slice(&30000u32.to_be_bytes());
    msg.extend_from_slice(&1000u32.to_be_bytes());
    msg.extend_from_slice(options);
    msg
}

fn router_addr() -> Ipv6Addr {
    "fe80::1".parse().unwrap()
}

/// IPv6 datagram with `message` behind the given extension headers
fn datagram(first_header: u8, extensions: &[u8], message: &[u8]) -> Vec<u8> {
    let payload_len = (extensions.len() + message.len()) as u16;
    let mut data = Ipv6Header::new(router_addr(), ALL_NODES_MULTICAST, first_header, payload_len)
        .to_bytes();
    data.extend_from_slice(extensions);
    data.extend_from_slice(message);
    data
}

fn frame(source: MacAddr, ethertype: EtherType, payload: Vec<u8>) -> Packet {
    let dst = EthernetFrame::ipv6_multicast_mac(&ALL_NODES_MULTICAST);
    Packet::new("eth0".into(), EthernetFrame::new(dst, source, ethertype, payload).to_bytes())
}

fn ra_frame(source: MacAddr, message: &[u8]) -> Packet {
    frame(source, EtherType::IPv6, datagram(next_header::ICMPV6, &[], message))
}

fn sniffer(emit: bool, mac: Option<MacAddr>) -> NdSniffer<MockLookup, MockSender> {
    NdSniffer::new(
        SnifferConfig::new("eth0").with_emit(emit),
        MockLookup { mac },
        MockSender::default(),
    )
}

fn handle(sniffer: &mut NdSniffer<MockLookup, MockSender>, packet: &Packet) -> (Result<FrameOutcome>, String) {
    let mut out = Vec::new();
    let outcome = sniffer.handle_frame(packet, &mut out);
    (outcome, String::from_utf8(out).unwrap())
}

// ===== Decoder Tests =====

#[test]
fn test_ra_without_options() {
    let msg = ra_message(64, 0x00, 1800, &[]);
    let ra = RouterAdvertisement::parse(&msg).unwrap();

    assert_eq!(ra.cur_hop_limit, 64);
    assert_eq!(ra.flags, RaFlags(0));
    assert!(ra.flags.names().is_empty());
    assert_eq!(ra.flags.preference(), RouterPreference::Medium);
    assert_eq!(ra.router_lifetime, 1800);
    assert_eq!(ra.reachable_time, 30000);
    assert_eq!(ra.retrans_timer, 1000);
    assert!(ra.collect_options().unwrap().is_empty());
}

#[test]
fn test_ra_too_short() {
    let msg = ra_message(64, 0, 1800, &[]);
    assert!(matches!(
        RouterAdvertisement::parse(&msg[..12]),
        Err(Error::TruncatedMessage { needed: 16, available: 12 })
    ));
}

#[test]
fn test_ra_flags() {
    let flags = RaFlags(RaFlags::MANAGED | RaFlags::OTHER | RaFlags::PROXY | 0x08);
    assert!(flags.managed());
    assert!(flags.other());
    assert!(!flags.home_agent());
    assert!(flags.proxied());
    assert_eq!(flags.names(), vec!["managed", "other", "proxied"]);
    assert_eq!(flags.preference(), RouterPreference::High);

    assert_eq!(RouterPreference::from_bits(0x10), RouterPreference::Reserved);
    assert_eq!(RouterPreference::from_bits(0xF8), RouterPreference::Low);
}

#[test]
fn test_mtu_option_consumes_chain() {
    let msg = ra_message(64, 0, 1800, &NdOption::Mtu(1500).to_bytes());
    let ra = RouterAdvertisement::parse(&msg).unwrap();

    let mut options = ra.options();
    assert_eq!(options.next().unwrap().unwrap(), NdOption::Mtu(1500));
    assert_eq!(options.consumed(), 8);
    assert_eq!(options.remaining(), 0);
    assert!(options.next().is_none());
}

#[test]
fn test_option_chain_decoding() {
    let prefix = PrefixInformation::slaac("2001:db8::".parse().unwrap(), 64, 86400, 14400);
    let route = RouteInformation {
        prefix_length: 48,
        preference: RouterPreference::High,
        route_lifetime: 600,
        prefix: "2001:db8:1::".parse().unwrap(),
    };
    let rdnss = RecursiveDnsServer {
        lifetime: 300,
        servers: vec!["2001:db8::53".parse().unwrap(), "2001:db8::54".parse().unwrap()],
    };

    let mut options = Vec::new();
    options.extend_from_slice(&NdOption::SourceLinkAddress(ROUTER_MAC).to_bytes());
    options.extend_from_slice(&NdOption::PrefixInformation(prefix).to_bytes());
    options.extend_from_slice(&NdOption::RouteInformation(route).to_bytes());
    options.extend_from_slice(&NdOption::RecursiveDnsServer(rdnss.clone()).to_bytes());

    let msg = ra_message(64, 0, 1800, &options);
    let decoded = RouterAdvertisement::parse(&msg).unwrap().collect_options().unwrap();

    assert_eq!(
        decoded,
        vec![
            NdOption::SourceLinkAddress(ROUTER_MAC),
            NdOption::PrefixInformation(prefix),
            NdOption::RouteInformation(route),
            NdOption::RecursiveDnsServer(rdnss),
        ]
    );
}

#[test]
fn test_prefix_option_layout() {
    let prefix = PrefixInformation::slaac("2001:db8::".parse().unwrap(), 64, 86400, 14400);
    let bytes = NdOption::PrefixInformation(prefix).to_bytes();

    assert_eq!(bytes.len(), 32);
    assert_eq!(&bytes[0..4], &[3, 4, 64, 0xC0]);
    assert_eq!(&bytes[4..8], &86400u32.to_be_bytes());
    assert_eq!(&bytes[8..12], &14400u32.to_be_bytes());
    assert_eq!(&bytes[16..18], &[0x20, 0x01]);
}

#[test]
fn test_zero_length_option_terminates() {
    let msg = ra_message(64, 0, 1800, &[1, 0, 0, 0, 0, 0, 0, 0]);
    let ra = RouterAdvertisement::parse(&msg).unwrap();

    let mut options = ra.options();
    assert!(matches!(
        options.next(),
        Some(Err(Error::ZeroLengthOption { offset: 16 }))
    ));
    assert!(options.next().is_none());
    assert!(matches!(
        ra.collect_options(),
        Err(Error::ZeroLengthOption { .. })
    ));
}

#[test]
fn test_option_overrun_after_valid_option() {
    let mut options = NdOption::Mtu(1280).to_bytes();
    options.extend_from_slice(&[3, 4, 64, 0xC0, 0, 0, 0, 0]);
    let msg = ra_message(64, 0, 1800, &options);
    let ra = RouterAdvertisement::parse(&msg).unwrap();

    let mut iter = ra.options();
    assert_eq!(iter.next().unwrap().unwrap(), NdOption::Mtu(1280));
    assert!(matches!(
        iter.next(),
        Some(Err(Error::OptionOverrun {
            offset: 24,
            declared: 32,
            remaining: 8
        }))
    ));
    assert!(iter.next().is_none());
}

#[test]
fn test_short_prefix_option_is_malformed() {
    let mut option = vec![3, 2, 64, 0xC0];
    option.resize(16, 0);
    let msg = ra_message(64, 0, 1800, &option);

    assert!(matches!(
        RouterAdvertisement::parse(&msg).unwrap().collect_options(),
        Err(Error::MalformedOption { option_type: 3, len: 2 })
    ));
}

#[test]
fn test_short_dns_server_option_skipped() {
    let mut options = vec![25, 2];
    options.resize(16, 0);
    options.extend_from_slice(&NdOption::Mtu(1500).to_bytes());
    let msg = ra_message(64, 0, 1800, &options);

    assert_eq!(
        RouterAdvertisement::parse(&msg).unwrap().collect_options().unwrap(),
        vec![
            NdOption::Unknown { option_type: 25, len: 2 },
            NdOption::Mtu(1500),
        ]
    );
}

#[test]
fn test_oversized_route_information_skipped() {
    let mut options = vec![24, 4, 64, 0];
    options.resize(32, 0);
    options.extend_from_slice(&NdOption::Mtu(1500).to_bytes());
    let msg = ra_message(64, 0, 1800, &options);

    assert_eq!(
        RouterAdvertisement::parse(&msg).unwrap().collect_options().unwrap(),
        vec![
            NdOption::Unknown { option_type: 24, len: 4 },
            NdOption::Mtu(1500),
        ]
    );
}

#[test]
fn test_route_information_bad_prefix_length_skipped() {
    let mut options = vec![24, 2, 200, 0];
    options.resize(16, 0);
    options.extend_from_slice(&NdOption::Mtu(1500).to_bytes());
    let msg = ra_message(64, 0, 1800, &options);

    assert_eq!(
        RouterAdvertisement::parse(&msg).unwrap().collect_options().unwrap(),
        vec![
            NdOption::Unknown { option_type: 24, len: 2 },
            NdOption::Mtu(1500),
        ]
    );
}

#[test]
fn test_long_link_address_is_not_ethernet() {
    let mut option = vec![1, 2];
    option.resize(16, 0xEE);
    let msg = ra_message(64, 0, 1800, &option);

    assert_eq!(
        RouterAdvertisement::parse(&msg).unwrap().collect_options().unwrap(),
        vec![NdOption::NonEthernetLinkAddress { option_type: 1, len: 2 }]
    );
}

// ===== Report Tests =====

#[test]
fn test_report_contents() {
    let mut options = NdOption::Mtu(1500).to_bytes();
    options.extend_from_slice(&NdOption::SourceLinkAddress(ROUTER_MAC).to_bytes());
    options.extend_from_slice(
        &NdOption::PrefixInformation(PrefixInformation::slaac("2001:db8::".parse().unwrap(), 64, 86400, 14400))
            .to_bytes(),
    );
    let msg = ra_message(64, RaFlags::MANAGED, 1800, &options);
    let data = datagram(next_header::ICMPV6, &[], &msg);
    let ip = Ipv6Header::parse(&data).unwrap();
    let ra = RouterAdvertisement::parse(&msg).unwrap();

    let report = RaReport::new(&ip, &ra).to_string();
    assert!(report.contains("Source address: fe80::1"));
    assert!(report.contains("Destination address: ff02::1"));
    assert!(report.contains("Hop limit: 64"));
    assert!(report.contains("Flags: managed"));
    assert!(report.contains("Router preference: medium"));
    assert!(report.contains("Router lifetime: 1800s"));
    assert!(report.contains("MTU: 1500"));
    assert!(report.contains("Source link-layer address: 00:11:22:33:44:55"));
    assert!(report.contains("Prefix information: 2001:db8::/64"));
    assert!(report.contains("on-link, autonomous"));
    assert!(report.trim_end().ends_with(report::REPORT_SEPARATOR));
}

#[test]
fn test_report_survives_malformed_chain() {
    let mut options = NdOption::Mtu(1500).to_bytes();
    options.extend_from_slice(&[5, 0, 0, 0, 0, 0, 0, 0]);
    let msg = ra_message(64, 0, 1800, &options);
    let data = datagram(next_header::ICMPV6, &[], &msg);
    let ip = Ipv6Header::parse(&data).unwrap();
    let ra = RouterAdvertisement::parse(&msg).unwrap();

    let report = RaReport::new(&ip, &ra).to_string();
    assert!(report.contains("Flags: none"));
    assert!(report.contains("MTU: 1500"));
    assert!(report.contains("Malformed option chain"));
}

// ===== Crafter Tests =====

#[test]
fn test_deprioritize_sets_low_preference() {
    for flags in 0..=u8::MAX {
        let msg = ra_message(64, flags, 1800, &NdOption::Mtu(1500).to_bytes());
        let spoofed = deprioritize(&msg, msg.len()).unwrap();

        assert_eq!(spoofed[5] & 0x18, 0x18, "flags {:#04x}", flags);
        assert_eq!(spoofed[5] & !0x18, flags & !0x18, "flags {:#04x}", flags);
        for (i, (a, b)) in msg.iter().zip(&spoofed).enumerate() {
            if i != 5 {
                assert_eq!(a, b, "byte {} changed", i);
            }
        }
    }
}

#[test]
fn test_deprioritize_is_idempotent() {
    for flags in 0..=u8::MAX {
        let msg = ra_message(64, flags, 1800, &[]);
        let once = deprioritize(&msg, msg.len()).unwrap();
        let twice = deprioritize(&once, once.len()).unwrap();
        assert_eq!(once, twice, "flags {:#04x}", flags);
        assert_eq!(
            RouterAdvertisement::parse(&twice).unwrap().flags.preference(),
            RouterPreference::Low
        );
    }
}

#[test]
fn test_solicitation_carries_mac() {
    let rs = build_solicitation(OWN_MAC);

    assert_eq!(rs.len(), 16);
    assert_eq!(Ipv6NdType::from_u8(rs[0]), Some(Ipv6NdType::RouterSolicitation));
    let options: Vec<_> = NdOptionIter::new(&rs[RouterSolicitation::HEADER_LEN..], 8)
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(options, vec![NdOption::SourceLinkAddress(OWN_MAC)]);
}

#[test]
fn test_origin_is_self() {
    let own = ra_frame(OWN_MAC, &ra_message(64, 0, 1800, &[]));
    let foreign = ra_frame(ROUTER_MAC, &ra_message(64, 0, 1800, &[]));
    let lookup = MockLookup { mac: Some(OWN_MAC) };

    assert!(origin_is_self(own.data(), "eth0", &lookup).unwrap());
    assert!(!origin_is_self(foreign.data(), "eth0", &lookup).unwrap());
    assert!(matches!(
        origin_is_self(own.data(), "eth0", &MockLookup { mac: None }),
        Err(Error::InterfaceLookupFailure(_))
    ));
}

// ===== Dispatch Tests =====

#[test]
fn test_passive_mode_reports_only() {
    let mut sniffer = sniffer(false, Some(OWN_MAC));
    let packet = ra_frame(ROUTER_MAC, &ra_message(64, 0, 1800, &[]));

    let (outcome, out) = handle(&mut sniffer, &packet);
    assert_eq!(outcome.unwrap(), FrameOutcome::Reported);
    assert!(out.contains("Hop limit: 64"));
    assert!(sniffer.sender().sent.is_empty());
    assert_eq!(sniffer.stats().router_advertisements, 1);
}

#[test]
fn test_foreign_ra_is_spoofed_to_all_nodes() {
    let mut sniffer = sniffer(true, Some(OWN_MAC));
    let msg = ra_message(64, 0x80, 1800, &NdOption::Mtu(1500).to_bytes());
    let packet = ra_frame(ROUTER_MAC, &msg);

    let (outcome, _) = handle(&mut sniffer, &packet);
    assert_eq!(outcome.unwrap(), FrameOutcome::Spoofed);

    let sent = &sniffer.sender().sent;
    assert_eq!(sent.len(), 1);
    let (bytes, destination, mode) = &sent[0];
    assert_eq!(*destination, ALL_NODES_MULTICAST);
    assert_eq!(*mode, SendMode::Advertisement);
    assert_eq!(bytes.len(), msg.len());
    assert_eq!(bytes[5], 0x98);
    assert_eq!(sniffer.stats().spoofed, 1);
}

#[test]
fn test_own_ra_is_not_spoofed() {
    let mut sniffer = sniffer(true, Some(OWN_MAC));
    let packet = ra_frame(OWN_MAC, &ra_message(64, 0x18, 1800, &[]));

    let (outcome, out) = handle(&mut sniffer, &packet);
    assert_eq!(outcome.unwrap(), FrameOutcome::OwnAdvertisement);
    assert!(!out.is_empty());
    assert!(sniffer.sender().sent.is_empty());
}

#[test]
fn test_lookup_failure_is_returned() {
    let mut sniffer = sniffer(true, None);
    let packet = ra_frame(ROUTER_MAC, &ra_message(64, 0, 1800, &[]));

    let (outcome, _) = handle(&mut sniffer, &packet);
    let err = outcome.unwrap_err();
    assert!(err.is_fatal());
    assert!(sniffer.sender().sent.is_empty());
}

#[test]
fn test_send_failure_keeps_going() {
    let mut sniffer = NdSniffer::new(
        SnifferConfig::new("eth0").with_emit(true),
        MockLookup { mac: Some(OWN_MAC) },
        MockSender {
            fail: true,
            ..Default::default()
        },
    );
    let packet = ra_frame(ROUTER_MAC, &ra_message(64, 0, 1800, &[]));

    let (outcome, _) = handle(&mut sniffer, &packet);
    assert_eq!(outcome.unwrap(), FrameOutcome::SpoofFailed);
    assert_eq!(sniffer.stats().send_failures, 1);
}

#[test]
fn test_ra_behind_extension_headers() {
    let mut sniffer = sniffer(false, Some(OWN_MAC));
    let hop_by_hop = [next_header::ICMPV6, 0, 5, 2, 0, 0, 1, 0];
    let msg = ra_message(255, 0, 600, &[]);
    let packet = frame(
        ROUTER_MAC,
        EtherType::IPv6,
        datagram(next_header::HOP_BY_HOP, &hop_by_hop, &msg),
    );

    let (outcome, out) = handle(&mut sniffer, &packet);
    assert_eq!(outcome.unwrap(), FrameOutcome::Reported);
    assert!(out.contains("Hop limit: 255"));
    assert!(out.contains("Router lifetime: 600s"));
}

#[test]
fn test_fragmented_datagram_is_skipped() {
    let mut sniffer = sniffer(true, Some(OWN_MAC));
    let fragment = [next_header::ICMPV6, 0, 0, 1, 0, 0, 0, 42];
    let packet = frame(
        ROUTER_MAC,
        EtherType::IPv6,
        datagram(next_header::FRAGMENT, &fragment, &ra_message(64, 0, 1800, &[])),
    );

    let (outcome, out) = handle(&mut sniffer, &packet);
    assert_eq!(outcome.unwrap(), FrameOutcome::Skipped);
    assert!(out.is_empty());
    assert_eq!(sniffer.stats().skipped, 1);
}

#[test]
fn test_non_ra_traffic_is_ignored() {
    let mut sniffer = sniffer(true, Some(OWN_MAC));

    let echo = ra_frame(ROUTER_MAC, &[128, 0, 0, 0, 0, 1, 0, 1]);
    assert_eq!(handle(&mut sniffer, &echo).0.unwrap(), FrameOutcome::Ignored);

    let ipv4 = frame(ROUTER_MAC, EtherType::IPv4, vec![0x45; 40]);
    assert_eq!(handle(&mut sniffer, &ipv4).0.unwrap(), FrameOutcome::Ignored);

    let runt = Packet::new("eth0".into(), vec![0u8; 10]);
    assert_eq!(handle(&mut sniffer, &runt).0.unwrap(), FrameOutcome::Ignored);

    assert!(sniffer.sender().sent.is_empty());
    assert_eq!(sniffer.stats().frames, 3);
}

#[test]
fn test_malformed_options_still_spoofed() {
    let mut sniffer = sniffer(true, Some(OWN_MAC));
    let msg = ra_message(64, 0, 1800, &[25, 0, 0, 0, 0, 0, 0, 0]);
    let packet = ra_frame(ROUTER_MAC, &msg);

    let (outcome, out) = handle(&mut sniffer, &packet);
    assert_eq!(outcome.unwrap(), FrameOutcome::Spoofed);
    assert!(out.contains("Malformed option chain"));
    assert_eq!(sniffer.stats().malformed, 1);
}

#[test]
fn test_solicit_sends_to_all_routers() {
    let mut sniffer = sniffer(false, Some(OWN_MAC));

    assert_eq!(sniffer.solicit().unwrap(), 16);
    let (bytes, destination, mode) = &sniffer.sender().sent[0];
    assert_eq!(*destination, ALL_ROUTERS_MULTICAST);
    assert_eq!(*mode, SendMode::Solicitation);
    assert_eq!(&bytes[10..16], OWN_MAC.as_bytes());

    let mut broken = self::sniffer(false, None);
    assert!(matches!(broken.solicit(), Err(Error::InterfaceLookupFailure(_))));
}
