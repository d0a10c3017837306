//! Arena index types.
//!
//! `NonZeroU32` keeps `Option<T>` at four bytes via niche optimization, which
//! matters for the trie where every node stores an optional parent.

use core::num::NonZeroU32;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Create from a 1-based raw value. Zero is not a valid id.
            #[must_use]
            pub const fn from_raw(raw: u32) -> Option<Self> {
                match NonZeroU32::new(raw) {
                    Some(n) => Some(Self(n)),
                    None => None,
                }
            }

            /// Create from a 0-based arena index.
            #[must_use]
            pub fn from_index(index: usize) -> Option<Self> {
                u32::try_from(index + 1).ok().and_then(Self::from_raw)
            }

            /// The 1-based raw value.
            #[must_use]
            pub const fn to_raw(self) -> u32 {
                self.0.get()
            }

            /// The 0-based arena index.
            #[must_use]
            pub const fn to_index(self) -> usize {
                (self.0.get() - 1) as usize
            }
        }
    };
}

define_id!(
    /// Interned string identifier.
    StrId
);

define_id!(
    /// OID trie node identifier.
    NodeId
);

define_id!(
    /// Identifier of a resolved syntax entry in the codec registry.
    SyntaxId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_invalid() {
        assert!(NodeId::from_raw(0).is_none());
    }

    #[test]
    fn test_round_trip() {
        let id = NodeId::from_index(7).unwrap();
        assert_eq!(id.to_raw(), 8);
        assert_eq!(id.to_index(), 7);
    }

    #[test]
    fn test_option_is_free() {
        assert_eq!(
            core::mem::size_of::<Option<NodeId>>(),
            core::mem::size_of::<NodeId>()
        );
    }
}
