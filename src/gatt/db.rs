use std::fmt::{Display, Formatter};

use tracing::info;

pub use {builder::*, hash::*, record::*};

use crate::att::HandleRange;
use crate::gap::{self, UuidType};

use super::*;

mod builder;
mod hash;
mod record;
#[cfg(test)]
mod tests;

/// Attribute database of a single peer, as discovered by the GATT client.
///
/// The database is a read-only tree of services sorted by handle. It can only
/// be created by a [`Builder`], which validates the discovery results, or
/// restored from its flat [`StoredAttribute`] form. Replacing a database means
/// building a new one and swapping it in.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct Database {
    services: Vec<Service>,
}

impl Database {
    /// Creates an empty database.
    #[inline]
    pub const fn new() -> Self {
        Self {
            services: Vec::new(),
        }
    }

    /// Creates a new database builder.
    #[inline(always)]
    pub fn build() -> Builder {
        Builder::new()
    }

    /// Returns whether the database contains no services.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Removes all services and releases the allocated memory.
    #[inline]
    pub fn clear(&mut self) {
        self.services = Vec::new();
    }

    /// Returns all services in handle order.
    #[inline(always)]
    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Returns the service that contains `hdl`.
    #[inline]
    #[must_use]
    pub fn find_service(&self, hdl: Handle) -> Option<&Service> {
        find_service(&self.services, hdl)
    }

    /// Returns the characteristic whose declaration, value, or descriptors
    /// contain `hdl`.
    #[must_use]
    pub fn find_characteristic(&self, hdl: Handle) -> Option<&Characteristic> {
        let s = self.find_service(hdl)?;
        let i = (s.characteristics).partition_point(|c| c.declaration_handle <= hdl);
        s.characteristics[..i].last()
    }

    /// Returns the descriptor at `hdl`.
    #[must_use]
    pub fn find_descriptor(&self, hdl: Handle) -> Option<&Descriptor> {
        let c = self.find_characteristic(hdl)?;
        let i = (c.descriptors).binary_search_by(|d| d.handle.cmp(&hdl)).ok()?;
        c.descriptors.get(i)
    }

    /// Resolves the target of an include declaration. Returns [`None`] if the
    /// target is not part of this database or its range is invalid.
    #[must_use]
    pub fn included_target(&self, inc: &IncludedService) -> Option<&Service> {
        let target = inc.target_range()?;
        self.find_service(target.start())
            .filter(|s| s.handle_range() == target)
    }

    /// Logs database contents.
    pub fn dump(&self) {
        info!("GATT database:");
        for line in self.to_string().lines() {
            info!("{line}");
        }
    }
}

impl Display for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn name(u: Uuid, generic: &str) -> String {
            match u.typ() {
                UuidType::Service(s) => s.to_string(),
                UuidType::Characteristic(c) => c.to_string(),
                UuidType::Descriptor(d) => d.to_string(),
                _ => generic.to_owned(),
            }
        }
        for s in &self.services {
            let sec = if s.is_primary { "" } else { "(Secondary) " };
            writeln!(
                f,
                "[{}] {sec}{} <{:?}> end={}",
                s.handle,
                name(s.uuid, "Service"),
                s.uuid,
                s.end_handle
            )?;
            for inc in &s.included_services {
                writeln!(
                    f,
                    "[{}] |__ [Include <{:?}> {}..={}]",
                    inc.handle, inc.uuid, inc.start_handle, inc.end_handle
                )?;
            }
            for (i, c) in s.characteristics.iter().enumerate() {
                let cont = if i + 1 < s.characteristics.len() { '|' } else { ' ' };
                writeln!(
                    f,
                    "[{}] |__ {} <{:?}> value={} props={:#04X}",
                    c.declaration_handle,
                    name(c.uuid, "Characteristic"),
                    c.uuid,
                    c.value_handle,
                    c.properties.bits()
                )?;
                for d in &c.descriptors {
                    write!(
                        f,
                        "[{}] {cont}   |__ {} <{:?}>",
                        d.handle,
                        name(d.uuid, "Descriptor"),
                        d.uuid
                    )?;
                    if d.is_ext_props() {
                        write!(f, " ext_props={:#06X}", d.ext_props.bits())?;
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}

/// Returns the service that contains `hdl` from a list of services sorted by
/// handle with non-overlapping handle ranges.
#[must_use]
pub fn find_service(services: &[Service], hdl: Handle) -> Option<&Service> {
    let i = services.partition_point(|s| s.handle <= hdl);
    services[..i].last().filter(|s| hdl <= s.end_handle)
}

/// Primary or secondary service definition ([Vol 3] Part G, Section 3.1).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Service {
    /// Service declaration handle.
    pub handle: Handle,
    pub uuid: Uuid,
    pub is_primary: bool,
    /// Last handle of the service group, as reported by the peer.
    pub end_handle: Handle,
    pub included_services: Vec<IncludedService>,
    pub characteristics: Vec<Characteristic>,
}

impl Service {
    /// Returns the service group handle range.
    #[inline]
    pub const fn handle_range(&self) -> HandleRange {
        HandleRange::new(self.handle, self.end_handle)
    }

    /// Returns whether `hdl` is within the service group.
    #[inline]
    #[must_use]
    pub fn contains(&self, hdl: Handle) -> bool {
        self.handle <= hdl && hdl <= self.end_handle
    }
}

/// Include definition ([Vol 3] Part G, Section 3.2). The target is referenced
/// by its handle range only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IncludedService {
    /// Include declaration handle.
    pub handle: Handle,
    pub uuid: Uuid,
    pub start_handle: Handle,
    pub end_handle: Handle,
}

impl IncludedService {
    /// Returns the handle range of the included service or [`None`] if the
    /// range is inverted.
    #[inline]
    #[must_use]
    pub const fn target_range(&self) -> Option<HandleRange> {
        HandleRange::try_new(self.start_handle, self.end_handle)
    }
}

/// Characteristic definition ([Vol 3] Part G, Section 3.3).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Characteristic {
    pub declaration_handle: Handle,
    pub uuid: Uuid,
    pub value_handle: Handle,
    pub properties: Prop,
    pub descriptors: Vec<Descriptor>,
}

/// Characteristic descriptor ([Vol 3] Part G, Section 3.3.3). Only the value of
/// the Characteristic Extended Properties descriptor is tracked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Descriptor {
    pub handle: Handle,
    pub uuid: Uuid,
    /// Extended properties value. Always empty for other descriptor types.
    pub ext_props: ExtProp,
}

impl Descriptor {
    /// Returns whether this is a Characteristic Extended Properties descriptor.
    #[inline]
    #[must_use]
    pub fn is_ext_props(&self) -> bool {
        self.uuid == gap::Descriptor::CharacteristicExtendedProperties
    }
}
