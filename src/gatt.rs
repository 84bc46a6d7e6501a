//! Generic Attribute Profile ([Vol 3] Part G).

pub use {consts::*, db::*};

use crate::att::Handle;
use crate::gap::Uuid;

mod consts;
mod db;

/// Error type returned by the database builder and cache decoder.
///
/// Builder errors mean that the peer returned an invalid service table. They
/// are fatal to the discovery pass and no partial database is ever produced.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("attribute {hdl} does not follow the previous attribute {last}")]
    OutOfOrderHandle { hdl: Handle, last: Handle },
    #[error("invalid handle range {start}..={end}")]
    InvalidRange { start: Handle, end: Handle },
    #[error("service {hdl} overlaps the previous service ending at {prev_end}")]
    OverlappingService { hdl: Handle, prev_end: Handle },
    #[error("attribute {0} is not part of a service")]
    NoOpenService(Handle),
    #[error("descriptor {0} is not part of a characteristic")]
    NoOpenCharacteristic(Handle),
    #[error("attribute {hdl} is beyond the service end handle {end}")]
    OutsideService { hdl: Handle, end: Handle },
    #[error("include {0} follows a characteristic declaration")]
    IncludeAfterCharacteristic(Handle),
    #[error("include {hdl} target {start}..={end} does not match the service in that range")]
    IncludeMismatch {
        hdl: Handle,
        start: Handle,
        end: Handle,
    },
    #[error("descriptor {hdl} has a declaration type {uuid}")]
    ReservedDescriptorType { hdl: Handle, uuid: Uuid },
    #[error("characteristic {decl} value handle {value} is not adjacent to its declaration")]
    NonAdjacentValue { decl: Handle, value: Handle },
    #[error("descriptor {0} has an inconsistent extended properties value")]
    InconsistentDescriptorPayload(Handle),
    #[error("discovery did not return any services")]
    EmptyDatabaseNotAllowed,
    #[error("corrupt attribute record #{index}: {reason}")]
    DeserializeCorrupt { index: usize, reason: &'static str },
    #[error("unsupported cache version {0}")]
    UnsupportedVersion(u16),
    #[cfg(feature = "json")]
    #[error("invalid cache encoding: {0}")]
    Json(String),
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    #[inline]
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

/// Common GATT database result type.
pub type Result<T> = std::result::Result<T, Error>;
