//! Scalar values exchanged with the embedding protocol stack.
//!
//! [`Value`] and [`SyntaxTag`] form the abstraction boundary between the
//! codec layer and whatever SNMP library the embedder uses: the codecs only
//! ever see these types, and an adapter maps them onto the library's own
//! variable model.

use super::oid::Oid;

/// Tag identifying a native scalar syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyntaxTag {
    /// Signed 32-bit integer.
    Integer,
    /// OCTET STRING.
    OctetString,
    /// OBJECT IDENTIFIER.
    ObjectIdentifier,
    /// ASN.1 NULL.
    Null,
    /// IPv4 address.
    IpAddress,
    /// 32-bit wrapping counter.
    Counter32,
    /// 32-bit gauge / unsigned integer.
    Gauge32,
    /// 64-bit counter.
    Counter64,
    /// Hundredths of a second since an epoch.
    TimeTicks,
    /// Double-wrapped arbitrary bytes.
    Opaque,
}

impl SyntaxTag {
    /// Conventional display name of the tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::OctetString => "OCTET STRING",
            Self::ObjectIdentifier => "OBJECT IDENTIFIER",
            Self::Null => "NULL",
            Self::IpAddress => "IpAddress",
            Self::Counter32 => "Counter32",
            Self::Gauge32 => "Gauge32",
            Self::Counter64 => "Counter64",
            Self::TimeTicks => "TimeTicks",
            Self::Opaque => "Opaque",
        }
    }

    /// Compact numeric form for serialization.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        match self {
            Self::Integer => 0,
            Self::OctetString => 1,
            Self::ObjectIdentifier => 2,
            Self::Null => 3,
            Self::IpAddress => 4,
            Self::Counter32 => 5,
            Self::Gauge32 => 6,
            Self::Counter64 => 7,
            Self::TimeTicks => 8,
            Self::Opaque => 9,
        }
    }

    /// Inverse of [`as_u8`](Self::as_u8).
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Integer),
            1 => Some(Self::OctetString),
            2 => Some(Self::ObjectIdentifier),
            3 => Some(Self::Null),
            4 => Some(Self::IpAddress),
            5 => Some(Self::Counter32),
            6 => Some(Self::Gauge32),
            7 => Some(Self::Counter64),
            8 => Some(Self::TimeTicks),
            9 => Some(Self::Opaque),
            _ => None,
        }
    }
}

/// An already-decoded protocol scalar.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Signed 32-bit integer (widened for convenience).
    Integer(i64),
    /// Raw octets.
    OctetString(Vec<u8>),
    /// An OID-valued variable.
    ObjectIdentifier(Oid),
    /// NULL.
    Null,
    /// IPv4 address octets.
    IpAddress([u8; 4]),
    /// 32-bit counter.
    Counter32(u32),
    /// 32-bit gauge / Unsigned32.
    Gauge32(u32),
    /// 64-bit counter.
    Counter64(u64),
    /// Hundredths of a second.
    TimeTicks(u32),
    /// Opaque bytes.
    Opaque(Vec<u8>),
}

impl Value {
    /// The tag of this value.
    #[must_use]
    pub fn tag(&self) -> SyntaxTag {
        match self {
            Self::Integer(_) => SyntaxTag::Integer,
            Self::OctetString(_) => SyntaxTag::OctetString,
            Self::ObjectIdentifier(_) => SyntaxTag::ObjectIdentifier,
            Self::Null => SyntaxTag::Null,
            Self::IpAddress(_) => SyntaxTag::IpAddress,
            Self::Counter32(_) => SyntaxTag::Counter32,
            Self::Gauge32(_) => SyntaxTag::Gauge32,
            Self::Counter64(_) => SyntaxTag::Counter64,
            Self::TimeTicks(_) => SyntaxTag::TimeTicks,
            Self::Opaque(_) => SyntaxTag::Opaque,
        }
    }

    /// The value as a signed integer, when it has a numeric shape.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Counter32(v) | Self::Gauge32(v) | Self::TimeTicks(v) => Some(i64::from(*v)),
            Self::Counter64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The value as an unsigned integer, when non-negative and numeric.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(v) => u64::try_from(*v).ok(),
            Self::Counter32(v) | Self::Gauge32(v) | Self::TimeTicks(v) => Some(u64::from(*v)),
            Self::Counter64(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as raw bytes, when it has a byte-buffer shape.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::OctetString(b) | Self::Opaque(b) => Some(b),
            Self::IpAddress(b) => Some(b),
            _ => None,
        }
    }

    /// Construct a value of the given tag from an integer.
    ///
    /// Returns `None` when the integer does not fit the tag or the tag is
    /// not integer-shaped.
    #[must_use]
    pub fn from_i64(tag: SyntaxTag, v: i64) -> Option<Self> {
        match tag {
            SyntaxTag::Integer => Some(Self::Integer(v)),
            SyntaxTag::Counter32 => u32::try_from(v).ok().map(Self::Counter32),
            SyntaxTag::Gauge32 => u32::try_from(v).ok().map(Self::Gauge32),
            SyntaxTag::TimeTicks => u32::try_from(v).ok().map(Self::TimeTicks),
            SyntaxTag::Counter64 => u64::try_from(v).ok().map(Self::Counter64),
            _ => None,
        }
    }

    /// Construct a value of the given tag from bytes.
    #[must_use]
    pub fn from_bytes(tag: SyntaxTag, bytes: Vec<u8>) -> Option<Self> {
        match tag {
            SyntaxTag::OctetString => Some(Self::OctetString(bytes)),
            SyntaxTag::Opaque => Some(Self::Opaque(bytes)),
            SyntaxTag::IpAddress => {
                let octets: [u8; 4] = bytes.try_into().ok()?;
                Some(Self::IpAddress(octets))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for raw in 0..10u8 {
            let tag = SyntaxTag::from_u8(raw).unwrap();
            assert_eq!(tag.as_u8(), raw);
        }
        assert!(SyntaxTag::from_u8(10).is_none());
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Value::Integer(-5).as_i64(), Some(-5));
        assert_eq!(Value::Counter32(7).as_i64(), Some(7));
        assert_eq!(Value::Counter64(u64::MAX).as_i64(), None);
        assert_eq!(Value::Null.as_i64(), None);
    }

    #[test]
    fn test_as_bytes() {
        assert_eq!(
            Value::OctetString(vec![1, 2]).as_bytes(),
            Some(&[1u8, 2][..])
        );
        assert_eq!(
            Value::IpAddress([10, 0, 0, 1]).as_bytes(),
            Some(&[10u8, 0, 0, 1][..])
        );
        assert_eq!(Value::Integer(1).as_bytes(), None);
    }

    #[test]
    fn test_from_i64_respects_range() {
        assert_eq!(
            Value::from_i64(SyntaxTag::Counter32, -1),
            None,
            "counters are unsigned"
        );
        assert_eq!(
            Value::from_i64(SyntaxTag::TimeTicks, 100),
            Some(Value::TimeTicks(100))
        );
    }

    #[test]
    fn test_from_bytes_ip_needs_four() {
        assert!(Value::from_bytes(SyntaxTag::IpAddress, vec![1, 2, 3]).is_none());
        assert_eq!(
            Value::from_bytes(SyntaxTag::IpAddress, vec![10, 1, 2, 3]),
            Some(Value::IpAddress([10, 1, 2, 3]))
        );
    }
}
