//! Generic Access Profile ([Vol 3] Part C).

pub use gattdb_const::{
    Characteristic, Declaration, Descriptor, ParseUuidError, Service, Uuid, Uuid16, UuidType,
};
