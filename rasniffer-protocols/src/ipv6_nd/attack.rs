//! Router Advertisement spoofing and Router Solicitation crafting

use rasniffer_core::{Error, MacAddr, MacLookup, Result};
use rasniffer_packet::EthernetHeader;

use super::packet::{RouterAdvertisement, RouterPreference, RouterSolicitation};

/// Router Solicitation carrying `own_mac` in a Source Link-Layer Address
/// option (16 bytes).
pub fn build_solicitation(own_mac: MacAddr) -> Vec<u8> {
    RouterSolicitation::new().with_source_ll(own_mac).to_bytes()
}

/// Copy the first `payload_len` bytes of a captured Router Advertisement
/// and force its default router preference to low.
///
/// Only the preference bits of the flags byte change; every other byte,
/// the stale checksum included, is copied as captured. The kernel
/// recomputes the checksum on send.
pub fn deprioritize(captured_ra: &[u8], payload_len: usize) -> Result<Vec<u8>> {
    if payload_len < RouterAdvertisement::HEADER_LEN {
        return Err(Error::TruncatedMessage {
            needed: RouterAdvertisement::HEADER_LEN,
            available: payload_len,
        });
    }
    if payload_len > captured_ra.len() {
        return Err(Error::TruncatedMessage {
            needed: payload_len,
            available: captured_ra.len(),
        });
    }

    let mut spoofed = Vec::new();
    spoofed
        .try_reserve_exact(payload_len)
        .map_err(|_| Error::AllocationFailure(payload_len))?;
    spoofed.extend_from_slice(&captured_ra[..payload_len]);
    spoofed[RouterAdvertisement::FLAGS_OFFSET] |= RouterPreference::Low.bits();

    Ok(spoofed)
}

/// Whether `frame` was sent from `interface` itself, judged by the
/// Ethernet source address.
///
/// A failed lookup is returned as [`Error::InterfaceLookupFailure`] and
/// must not be treated as "foreign".
pub fn origin_is_self<L: MacLookup + ?Sized>(frame: &[u8], interface: &str, lookup: &L) -> Result<bool> {
    let own = lookup.mac_address(interface)?;
    Ok(EthernetHeader::source_of(frame) == Some(own))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solicitation_layout() {
        let mac = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let rs = build_solicitation(mac);
        assert_eq!(
            rs,
            vec![133, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55]
        );
    }

    #[test]
    fn test_deprioritize_rejects_short_lengths() {
        let ra = [134u8; 24];
        assert!(matches!(
            deprioritize(&ra, 8),
            Err(Error::TruncatedMessage { needed: 16, available: 8 })
        ));
        assert!(matches!(
            deprioritize(&ra, 32),
            Err(Error::TruncatedMessage { needed: 32, available: 24 })
        ));
    }

    #[test]
    fn test_deprioritize_copies_prefix_only() {
        let mut ra = vec![134u8, 0, 0xAB, 0xCD, 64, 0x00, 0x07, 0x08];
        ra.extend_from_slice(&[0u8; 16]);
        let spoofed = deprioritize(&ra, 16).unwrap();
        assert_eq!(spoofed.len(), 16);
        assert_eq!(&spoofed[2..4], &[0xAB, 0xCD]);
        assert_eq!(spoofed[5], 0x18);
    }
}
