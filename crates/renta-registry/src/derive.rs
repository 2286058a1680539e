//! Identifier derivation.
//!
//! Device ids pack a 24-byte name digest with an 8-byte big-endian counter,
//! so sibling units of the same device name form a contiguous group.  Node
//! ids fold the dot-separated contract name right-to-left over a digest,
//! seeded with the registry's root node, so `a.b` and `b.a` never collide.

use sha2::{Digest, Sha256};

use renta_types::{Bytes32, DeviceId};

/// Leading 24 bytes of the device-name digest.
pub fn name_digest(name: &str) -> [u8; 24] {
    let hash = Sha256::digest(name.as_bytes());
    let mut out = [0u8; 24];
    out.copy_from_slice(&hash[..24]);
    out
}

/// Derive the 32-byte device id for `name` unit `counter`.
pub fn device_id(name: &str, counter: u32) -> DeviceId {
    DeviceId::from_parts(name_digest(name), counter as u64)
}

/// Hierarchical name hash of a contract name under `root`.
///
/// Labels are folded right-to-left: `acc = digest(acc || digest(label))`,
/// starting from `root`.  `myCompany.usn` therefore hashes `usn` first.
pub fn node_id(contract_name: &str, root: Bytes32) -> Bytes32 {
    contract_name.split('.').rev().fold(root, |acc, label| {
        let label_hash = Sha256::digest(label.as_bytes());
        let mut hasher = Sha256::new();
        hasher.update(acc.as_bytes());
        hasher.update(label_hash);
        Bytes32(hasher.finalize().into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_round_trips_counter() {
        let id = device_id("bike", 3);
        assert_eq!(id.counter(), 3);
        assert_eq!(id.name_hash(), name_digest("bike"));
        assert_eq!(id.with_counter(7).counter(), 7);
        assert_eq!(id.with_counter(7).name_hash(), id.name_hash());
    }

    #[test]
    fn device_ids_differ_only_in_trailing_bytes() {
        let a = device_id("bike", 0);
        let b = device_id("bike", 1);
        assert_ne!(a, b);
        assert_eq!(a.name_hash(), b.name_hash());
    }

    #[test]
    fn node_id_is_order_sensitive() {
        let root = Bytes32::ZERO;
        assert_ne!(node_id("a.b", root), node_id("b.a", root));
        assert_ne!(node_id("a", root), node_id("a.a", root));
    }

    #[test]
    fn node_id_depends_on_root() {
        let other = Bytes32([1u8; 32]);
        assert_ne!(node_id("myCompany.usn", Bytes32::ZERO), node_id("myCompany.usn", other));
    }

    #[test]
    fn node_id_is_deterministic() {
        let root = Bytes32::ZERO;
        assert_eq!(node_id("myCompany.usn", root), node_id("myCompany.usn", root));
    }
}
