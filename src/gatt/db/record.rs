use std::iter;

use tracing::{debug, warn};

use crate::gap::Declaration;

use super::*;

/// Flat representation of one attribute for bonded-device storage.
///
/// The payload is determined by the attribute type. Characteristic values are
/// implied by their declarations and are not stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StoredAttribute {
    pub hdl: Handle,
    pub typ: Uuid,
    pub val: AttrValue,
}

/// Type-specific payload of a [`StoredAttribute`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
pub enum AttrValue {
    /// Primary or secondary service declaration.
    Service { uuid: Uuid, end: Handle },
    /// Include declaration.
    Include {
        start: Handle,
        end: Handle,
        uuid: Uuid,
    },
    /// Characteristic declaration.
    Characteristic { props: u8, value: Handle, uuid: Uuid },
    /// Characteristic Extended Properties descriptor value.
    ExtProps(u16),
    /// Any other descriptor, whose value is not tracked.
    Opaque,
}

impl Database {
    /// Returns the flat attribute records in handle order.
    pub fn records(&self) -> impl Iterator<Item = StoredAttribute> + '_ {
        self.services.iter().flat_map(|s| {
            iter::once(s.record())
                .chain(s.included_services.iter().map(IncludedService::record))
                .chain(s.characteristics.iter().flat_map(|c| {
                    iter::once(c.record()).chain(c.descriptors.iter().map(Descriptor::record))
                }))
        })
    }

    /// Converts the database into a list of attribute records for storage.
    #[must_use]
    pub fn serialize(&self) -> Vec<StoredAttribute> {
        self.records().collect()
    }

    /// Restores a database from attribute records created by
    /// [`Database::serialize`]. The records are validated exactly like
    /// discovery results.
    pub fn deserialize(attrs: &[StoredAttribute]) -> Result<Self> {
        let mut b = Builder::new();
        for (i, at) in attrs.iter().enumerate() {
            b.add_record(i, at)?;
        }
        let db = b.finish()?;
        debug!("Restored GATT database from {} record(s)", attrs.len());
        Ok(db)
    }

    /// Restores a database from attribute records, returning an empty database
    /// and `false` if the records are invalid. The caller is expected to fall
    /// back to service discovery in that case.
    pub fn load(attrs: &[StoredAttribute]) -> (Self, bool) {
        match Self::deserialize(attrs) {
            Ok(db) => (db, true),
            Err(e) => {
                warn!("Discarding cached GATT database: {e}");
                (Self::new(), false)
            }
        }
    }
}

impl Service {
    fn record(&self) -> StoredAttribute {
        let typ = if self.is_primary {
            Declaration::PrimaryService
        } else {
            Declaration::SecondaryService
        };
        StoredAttribute {
            hdl: self.handle,
            typ: typ.uuid(),
            val: AttrValue::Service {
                uuid: self.uuid,
                end: self.end_handle,
            },
        }
    }
}

impl IncludedService {
    fn record(&self) -> StoredAttribute {
        StoredAttribute {
            hdl: self.handle,
            typ: Declaration::Include.uuid(),
            val: AttrValue::Include {
                start: self.start_handle,
                end: self.end_handle,
                uuid: self.uuid,
            },
        }
    }
}

impl Characteristic {
    fn record(&self) -> StoredAttribute {
        StoredAttribute {
            hdl: self.declaration_handle,
            typ: Declaration::Characteristic.uuid(),
            val: AttrValue::Characteristic {
                props: self.properties.bits(),
                value: self.value_handle,
                uuid: self.uuid,
            },
        }
    }
}

impl Descriptor {
    fn record(&self) -> StoredAttribute {
        let val = if self.is_ext_props() {
            AttrValue::ExtProps(self.ext_props.bits())
        } else {
            AttrValue::Opaque
        };
        StoredAttribute {
            hdl: self.handle,
            typ: self.uuid,
            val,
        }
    }
}

/// Versioned database cache for bonded-device storage.
///
/// The hash is stored alongside the records so that a cache can be compared
/// with the peer's Database Hash characteristic without restoring it, and so
/// that a modified or truncated cache is detected on load.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[must_use]
pub struct Cache {
    pub version: u16,
    pub hash: DbHash,
    pub attrs: Vec<StoredAttribute>,
}

impl Cache {
    /// Current cache format version.
    pub const VERSION: u16 = 1;

    /// Creates a cache of the specified database.
    #[inline]
    pub fn new(db: &Database) -> Self {
        Self {
            version: Self::VERSION,
            hash: db.hash(),
            attrs: db.serialize(),
        }
    }

    /// Restores the cached database.
    pub fn into_database(self) -> Result<Database> {
        if self.version != Self::VERSION {
            warn!("Unsupported GATT cache version {}", self.version);
            return Err(Error::UnsupportedVersion(self.version));
        }
        let db = Database::deserialize(&self.attrs)?;
        if db.hash() != self.hash {
            warn!("GATT cache hash mismatch");
            return Err(Error::DeserializeCorrupt {
                index: self.attrs.len(),
                reason: "hash mismatch",
            });
        }
        Ok(db)
    }

    /// Encodes the cache as JSON.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a JSON cache. The version is checked before the rest of the
    /// cache is decoded, so caches written by a newer format are rejected with
    /// [`Error::UnsupportedVersion`].
    #[cfg(feature = "json")]
    pub fn from_json(s: &str) -> Result<Self> {
        #[derive(serde::Deserialize)]
        struct Version {
            version: u16,
        }
        let Version { version } = serde_json::from_str(s)?;
        if version != Self::VERSION {
            warn!("Unsupported GATT cache version {version}");
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(serde_json::from_str(s)?)
    }
}
