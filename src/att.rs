//! Attribute Protocol ([Vol 3] Part F).

pub use handle::*;

mod handle;
