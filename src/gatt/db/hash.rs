use std::fmt::{Debug, Display, Formatter};

use structbuf::{Pack, StructBuf};

use gattdb_crypto::AesCmac;

use super::*;

/// Maximum length of one canonical attribute record: handle, 128-bit type,
/// and the include declaration payload.
const MAX_RECORD_LEN: usize = 2 + 16 + (2 + 2 + 16);

/// Database hash ([Vol 3] Part G, Section 7.3). It carries no meaning beyond
/// equality with a previously calculated hash.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[must_use]
#[repr(transparent)]
pub struct DbHash(u128);

impl DbHash {
    /// Hash of a database without any attributes.
    pub const EMPTY: Self = Self(0x4387C14B_46EF7E17_6DCEEFA8_62D72FF9);

    /// Creates a hash from its byte representation.
    #[inline(always)]
    pub const fn from_bytes(b: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(b))
    }

    /// Returns the 16-byte hash value, starting with the first byte of the MAC.
    #[inline(always)]
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }
}

impl Debug for DbHash {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DbHash({:032X})", self.0)
    }
}

impl Display for DbHash {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032X}", self.0)
    }
}

impl From<u128> for DbHash {
    #[inline(always)]
    fn from(v: u128) -> Self {
        Self(v)
    }
}

impl From<DbHash> for u128 {
    #[inline(always)]
    fn from(h: DbHash) -> Self {
        h.0
    }
}

impl serde::Serialize for DbHash {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for DbHash {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error;
        let s = <std::borrow::Cow<'de, str>>::deserialize(d)?;
        if s.len() != 32 {
            return Err(D::Error::invalid_length(s.len(), &"32 hex digits"));
        }
        if !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(D::Error::invalid_value(
                serde::de::Unexpected::Str(&s),
                &"32 hex digits",
            ));
        }
        u128::from_str_radix(&s, 16)
            .map(Self)
            .map_err(D::Error::custom)
    }
}

/// Fixed-key message authentication code used to calculate the database hash.
pub trait DbMac {
    /// Appends `b` to the message.
    fn update(&mut self, b: &[u8]);

    /// Returns the 128-bit MAC of the message.
    fn finalize(self) -> u128;
}

impl DbMac for AesCmac {
    #[inline(always)]
    fn update(&mut self, b: &[u8]) {
        Self::update(self, b);
    }

    #[inline(always)]
    fn finalize(self) -> u128 {
        Self::finalize(self)
    }
}

impl Database {
    /// Calculates the database hash using AES-CMAC with an all-zero key.
    ///
    /// Only the structure participates: service declarations with their end
    /// handles, includes, characteristic declarations, and descriptor types,
    /// plus the Characteristic Extended Properties values. Two databases with the same attributes always have
    /// the same hash.
    #[inline]
    pub fn hash(&self) -> DbHash {
        self.hash_with(AesCmac::db_hash())
    }

    /// Calculates the database hash using the specified MAC.
    pub fn hash_with<M: DbMac>(&self, mut m: M) -> DbHash {
        for at in self.records() {
            m.update(&canonical(&at));
        }
        DbHash(m.finalize())
    }

    /// Returns the canonical byte stream from which the hash is calculated.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.records().count() * MAX_RECORD_LEN);
        for at in self.records() {
            v.extend_from_slice(&canonical(&at));
        }
        v
    }
}

/// Returns the canonical encoding of one attribute. All multi-byte values are
/// big-endian and all UUIDs are expanded to 128 bits.
fn canonical(at: &StoredAttribute) -> StructBuf {
    let mut b = StructBuf::new(MAX_RECORD_LEN);
    {
        let mut p = b.append();
        p.put(u16::from(at.hdl).to_be_bytes()).put(at.typ.to_be_bytes());
        match at.val {
            AttrValue::Service { uuid, end } => {
                p.put(uuid.to_be_bytes()).put(u16::from(end).to_be_bytes());
            }
            AttrValue::Include { start, end, uuid } => {
                p.put(u16::from(start).to_be_bytes())
                    .put(u16::from(end).to_be_bytes())
                    .put(uuid.to_be_bytes());
            }
            AttrValue::Characteristic { props, value, uuid } => {
                p.u8(props)
                    .put(u16::from(value).to_be_bytes())
                    .put(uuid.to_be_bytes());
            }
            AttrValue::ExtProps(v) => {
                p.put(v.to_be_bytes());
            }
            AttrValue::Opaque => {}
        }
    }
    b
}
