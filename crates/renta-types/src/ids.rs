//! Fixed-width identifier types.
//!
//! All on-ledger identifiers in this system are fixed-width byte arrays that
//! travel as lowercase `0x`-prefixed hex strings on every wire and config
//! surface.  Parsing is strict about width except where the source format is
//! explicitly a shorter literal (see [`Bytes32::from_hex_padded`]).

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from parsing a hex identifier string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexParseError {
    /// The string does not start with `0x`.
    MissingPrefix,
    /// The hex payload has the wrong length for this identifier type.
    BadLength { expected: usize, got: usize },
    /// The payload contains non-hex characters.
    BadDigit,
}

impl fmt::Display for HexParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexParseError::MissingPrefix => write!(f, "identifier must start with 0x"),
            HexParseError::BadLength { expected, got } => {
                write!(f, "expected {expected} hex chars, got {got}")
            }
            HexParseError::BadDigit => write!(f, "identifier contains non-hex characters"),
        }
    }
}

impl std::error::Error for HexParseError {}

fn decode_exact<const N: usize>(s: &str) -> Result<[u8; N], HexParseError> {
    let payload = s.strip_prefix("0x").ok_or(HexParseError::MissingPrefix)?;
    if payload.len() != N * 2 {
        return Err(HexParseError::BadLength {
            expected: N * 2,
            got: payload.len(),
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(payload, &mut out).map_err(|_| HexParseError::BadDigit)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Address (20 bytes)
// ---------------------------------------------------------------------------

/// A 20-byte account/contract address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address. On the ledger this marks "no account":
    /// an unregistered name, an unset controller, the native token.
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_exact::<20>(s).map(Address)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Bytes32
// ---------------------------------------------------------------------------

/// An opaque 32-byte identifier (namehash node, digest, raw device id).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a `0x` literal of up to 64 hex chars, left-padded with zeros.
    ///
    /// URL components may carry an already-resolved identifier shorter than
    /// the full width (`0x0`, `0x1234`); the ledger treats those as the
    /// zero-extended 32-byte value.
    pub fn from_hex_padded(s: &str) -> Result<Self, HexParseError> {
        let payload = s.strip_prefix("0x").ok_or(HexParseError::MissingPrefix)?;
        if payload.len() > 64 {
            return Err(HexParseError::BadLength {
                expected: 64,
                got: payload.len(),
            });
        }
        let mut padded = String::with_capacity(64);
        for _ in payload.len()..64 {
            padded.push('0');
        }
        padded.push_str(payload);
        let mut out = [0u8; 32];
        hex::decode_to_slice(&padded, &mut out).map_err(|_| HexParseError::BadDigit)?;
        Ok(Bytes32(out))
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes32({self})")
    }
}

impl FromStr for Bytes32 {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_exact::<32>(s).map(Bytes32)
    }
}

impl Serialize for Bytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Documents may carry short literals; accept them zero-extended.
        let s = String::deserialize(deserializer)?;
        Bytes32::from_hex_padded(&s).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// DeviceId
// ---------------------------------------------------------------------------

/// A 32-byte device identifier.
///
/// Layout: the leading 24 bytes are a stable digest of the device name (the
/// "device group" key — every unit of the same device shares them), the
/// trailing 8 bytes are a big-endian counter selecting the unit within the
/// group.  The counter sub-range must round-trip exactly; see
/// [`DeviceId::counter`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub Bytes32);

impl DeviceId {
    pub fn from_parts(name_hash: [u8; 24], counter: u64) -> Self {
        let mut raw = [0u8; 32];
        raw[..24].copy_from_slice(&name_hash);
        raw[24..].copy_from_slice(&counter.to_be_bytes());
        DeviceId(Bytes32(raw))
    }

    /// The leading 24 bytes: stable per device name, independent of counter.
    pub fn name_hash(&self) -> [u8; 24] {
        let mut out = [0u8; 24];
        out.copy_from_slice(&self.0 .0[..24]);
        out
    }

    /// The trailing 8 bytes decoded big-endian.
    pub fn counter(&self) -> u64 {
        let mut out = [0u8; 8];
        out.copy_from_slice(&self.0 .0[24..]);
        u64::from_be_bytes(out)
    }

    /// The sibling identifier with the same name hash and a different counter.
    pub fn with_counter(&self, counter: u64) -> Self {
        DeviceId::from_parts(self.name_hash(), counter)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({self})")
    }
}

impl FromStr for DeviceId {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(DeviceId)
    }
}

impl From<Bytes32> for DeviceId {
    fn from(raw: Bytes32) -> Self {
        DeviceId(raw)
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Bytes32::deserialize(deserializer).map(DeviceId)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
