use bitflags::bitflags;
use tracing::{debug, trace, warn};

use crate::gap::Declaration;

use super::*;

bitflags! {
    /// Builder options.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct BuildOpt: u8 {
        /// Fail with [`Error::EmptyDatabaseNotAllowed`] if discovery did not
        /// find any services.
        const REQUIRE_SERVICES = 1 << 0;
        /// Require the characteristic value to immediately follow its
        /// declaration ([Vol 3] Part G, Section 3.3.2).
        const ADJACENT_VALUE = 1 << 1;
    }
}

/// Innermost open container that receives the next attribute.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Open {
    #[default]
    None,
    Service,
    Characteristic,
}

/// Database builder that consumes discovery results in handle order.
///
/// Each `add_*` call validates one attribute against everything seen so far.
/// The first invalid attribute fails the entire pass: the same error is
/// returned for all subsequent calls, including [`Builder::finish`]. Dropping
/// the builder cancels the pass.
#[derive(Debug, Default)]
#[must_use]
pub struct Builder {
    services: Vec<Service>,
    last: Option<Handle>,
    open: Open,
    opt: BuildOpt,
    err: Option<Error>,
}

impl Builder {
    /// Creates a new database builder with default options.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new database builder with the specified options.
    #[inline]
    pub fn with_options(opt: BuildOpt) -> Self {
        Self {
            opt,
            ..Self::default()
        }
    }

    /// Returns whether no services were added.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Returns the highest handle consumed so far. For characteristics, this
    /// is the value handle.
    #[inline(always)]
    #[must_use]
    pub const fn last_handle(&self) -> Option<Handle> {
        self.last
    }

    /// Adds a primary or secondary service declaration and makes it the open
    /// service.
    pub fn add_service(
        &mut self,
        hdl: Handle,
        uuid: Uuid,
        is_primary: bool,
        end: Handle,
    ) -> Result<()> {
        self.try_add(|b| {
            b.check_order(hdl)?;
            if end < hdl {
                return Err(Error::InvalidRange { start: hdl, end });
            }
            if let Some(prev) = b.services.last() {
                if hdl <= prev.end_handle {
                    return Err(Error::OverlappingService {
                        hdl,
                        prev_end: prev.end_handle,
                    });
                }
            }
            // Includes that referenced this service before it was discovered
            let range = HandleRange::new(hdl, end);
            let fwd = (b.services.iter().flat_map(|s| &s.included_services)).find(|inc| {
                (inc.target_range()).map_or(false, |t| t.overlaps(range) && t != range)
            });
            if let Some(inc) = fwd {
                return Err(Error::IncludeMismatch {
                    hdl: inc.handle,
                    start: inc.start_handle,
                    end: inc.end_handle,
                });
            }
            trace!("Service {hdl}..={end} <{uuid:?}>");
            b.services.push(Service {
                handle: hdl,
                uuid,
                is_primary,
                end_handle: end,
                included_services: Vec::new(),
                characteristics: Vec::new(),
            });
            b.open = Open::Service;
            b.last = Some(hdl);
            Ok(())
        })
    }

    /// Adds an include declaration to the open service. Includes must precede
    /// all characteristics of the service.
    ///
    /// The target may refer to a service that has not been discovered yet or
    /// that is not part of this database. If the target overlaps a service in
    /// this database, the handle ranges must be equal.
    pub fn add_included_service(
        &mut self,
        hdl: Handle,
        start: Handle,
        end: Handle,
        uuid: Uuid,
    ) -> Result<()> {
        self.try_add(|b| {
            b.check_order(hdl)?;
            match b.open {
                Open::None => return Err(Error::NoOpenService(hdl)),
                Open::Characteristic => return Err(Error::IncludeAfterCharacteristic(hdl)),
                Open::Service => {}
            }
            b.check_contained(hdl)?;
            let Some(target) = HandleRange::try_new(start, end) else {
                return Err(Error::InvalidRange { start, end });
            };
            let mismatch = (b.services.iter())
                .any(|s| s.handle_range().overlaps(target) && s.handle_range() != target);
            if mismatch {
                return Err(Error::IncludeMismatch { hdl, start, end });
            }
            trace!("Include {hdl} -> {target} <{uuid:?}>");
            b.service_mut()?.included_services.push(IncludedService {
                handle: hdl,
                uuid,
                start_handle: start,
                end_handle: end,
            });
            b.last = Some(hdl);
            Ok(())
        })
    }

    /// Adds a characteristic declaration to the open service and makes it the
    /// open characteristic.
    pub fn add_characteristic(
        &mut self,
        hdl: Handle,
        uuid: Uuid,
        value: Handle,
        props: Prop,
    ) -> Result<()> {
        self.try_add(|b| {
            b.check_order(hdl)?;
            if b.open == Open::None {
                return Err(Error::NoOpenService(hdl));
            }
            if value <= hdl {
                return Err(Error::InvalidRange {
                    start: hdl,
                    end: value,
                });
            }
            if b.opt.contains(BuildOpt::ADJACENT_VALUE) && hdl.next() != Some(value) {
                return Err(Error::NonAdjacentValue { decl: hdl, value });
            }
            b.check_contained(value)?;
            trace!("Characteristic {hdl} value={value} <{uuid:?}>");
            b.service_mut()?.characteristics.push(Characteristic {
                declaration_handle: hdl,
                uuid,
                value_handle: value,
                properties: props,
                descriptors: Vec::new(),
            });
            b.open = Open::Characteristic;
            b.last = Some(value);
            Ok(())
        })
    }

    /// Adds a descriptor to the open characteristic. `ext_props` must be
    /// specified for the Characteristic Extended Properties descriptor and must
    /// be either [`None`] or zero for all other descriptors.
    pub fn add_descriptor(
        &mut self,
        hdl: Handle,
        uuid: Uuid,
        ext_props: Option<u16>,
    ) -> Result<()> {
        self.try_add(|b| {
            b.check_order(hdl)?;
            if b.open != Open::Characteristic {
                return Err(Error::NoOpenCharacteristic(hdl));
            }
            b.check_contained(hdl)?;
            if matches!(uuid.typ(), UuidType::Declaration(_)) {
                return Err(Error::ReservedDescriptorType { hdl, uuid });
            }
            let is_ext_props = uuid == gap::Descriptor::CharacteristicExtendedProperties;
            let ext_props = match (is_ext_props, ext_props) {
                (true, Some(v)) => ExtProp::from_bits_retain(v),
                (false, None | Some(0)) => ExtProp::empty(),
                _ => return Err(Error::InconsistentDescriptorPayload(hdl)),
            };
            trace!("Descriptor {hdl} <{uuid:?}>");
            let c = (b.service_mut()?.characteristics.last_mut())
                .ok_or(Error::NoOpenCharacteristic(hdl))?;
            c.descriptors.push(Descriptor {
                handle: hdl,
                uuid,
                ext_props,
            });
            b.last = Some(hdl);
            Ok(())
        })
    }

    /// Returns the final read-only database.
    pub fn finish(self) -> Result<Database> {
        if let Some(e) = self.err {
            return Err(e);
        }
        if self.services.is_empty() && self.opt.contains(BuildOpt::REQUIRE_SERVICES) {
            warn!("Discovery did not return any services");
            return Err(Error::EmptyDatabaseNotAllowed);
        }
        debug!(
            "GATT database with {} service(s) ending at {}",
            self.services.len(),
            self.last.map_or_else(|| "<none>".to_owned(), |h| h.to_string())
        );
        Ok(Database {
            services: self.services,
        })
    }

    /// Runs one validation step. Any failure is recorded and returned for all
    /// further calls.
    fn try_add(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        if let Some(ref e) = self.err {
            return Err(e.clone());
        }
        f(self).map_err(|e| {
            warn!("Invalid GATT database: {e}");
            self.err = Some(e.clone());
            e
        })
    }

    /// Ensures that handles are strictly increasing.
    #[inline]
    fn check_order(&self, hdl: Handle) -> Result<()> {
        match self.last {
            Some(last) if hdl <= last => Err(Error::OutOfOrderHandle { hdl, last }),
            _ => Ok(()),
        }
    }

    /// Ensures that `hdl` is within the open service group.
    #[inline]
    fn check_contained(&self, hdl: Handle) -> Result<()> {
        match self.services.last() {
            Some(s) if hdl <= s.end_handle => Ok(()),
            Some(s) => Err(Error::OutsideService {
                hdl,
                end: s.end_handle,
            }),
            None => Err(Error::NoOpenService(hdl)),
        }
    }

    /// Returns the open service.
    #[inline]
    fn service_mut(&mut self) -> Result<&mut Service> {
        let last = self.last.unwrap_or(Handle::MIN);
        self.services.last_mut().ok_or(Error::NoOpenService(last))
    }
}

/// Routes stored attributes to the matching builder operation.
impl Builder {
    /// Adds one stored attribute. `index` identifies the record in errors.
    pub(super) fn add_record(&mut self, index: usize, at: &StoredAttribute) -> Result<()> {
        let corrupt = |reason| Error::DeserializeCorrupt { index, reason };
        let hdl = at.hdl;
        match (at.typ.typ(), at.val) {
            (UuidType::Declaration(d), AttrValue::Service { uuid, end })
                if matches!(d, Declaration::PrimaryService | Declaration::SecondaryService) =>
            {
                self.add_service(hdl, uuid, d == Declaration::PrimaryService, end)
            }
            (UuidType::Declaration(Declaration::Include), AttrValue::Include { start, end, uuid }) => {
                self.add_included_service(hdl, start, end, uuid)
            }
            (
                UuidType::Declaration(Declaration::Characteristic),
                AttrValue::Characteristic { props, value, uuid },
            ) => self.add_characteristic(hdl, uuid, value, Prop::from_bits_retain(props)),
            (UuidType::Declaration(_), _) => Err(corrupt("declaration payload mismatch")),
            (UuidType::Descriptor(gap::Descriptor::CharacteristicExtendedProperties), v) => {
                let AttrValue::ExtProps(v) = v else {
                    return Err(corrupt("missing extended properties value"));
                };
                self.add_descriptor(hdl, at.typ, Some(v))
            }
            (_, AttrValue::Opaque) => self.add_descriptor(hdl, at.typ, None),
            (_, _) => Err(corrupt("unexpected descriptor payload")),
        }
    }
}
