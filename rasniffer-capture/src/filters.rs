//! BPF (Berkeley Packet Filter) filter builders for Neighbor Discovery capture
//!
//! The `ip6[40]` forms only look at the byte after the fixed IPv6 header, so
//! they miss messages behind extension headers. The default capture filter is
//! plain `icmp6` and leaves message selection to the decoder.

/// ICMPv6 filter
pub fn icmpv6_filter() -> String {
    "icmp6".to_string()
}

/// Filter for IPv6 router advertisements without extension headers
pub fn ipv6_ra_filter() -> String {
    "icmp6 and ip6[40] == 134".to_string()
}

/// Combine multiple filters with AND logic
pub fn combine_filters(filters: &[&str]) -> String {
    if filters.is_empty() {
        return String::new();
    }

    filters
        .iter()
        .map(|f| format!("({})", f))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Capture filter for the sniffer, narrowed by an optional operator
/// supplied expression
pub fn sniffer_filter(ra_only: bool, extra: Option<&str>) -> String {
    let base = if ra_only {
        ipv6_ra_filter()
    } else {
        icmpv6_filter()
    };

    match extra {
        Some(extra) if !extra.trim().is_empty() => combine_filters(&[&base, extra]),
        _ => base,
    }
}
