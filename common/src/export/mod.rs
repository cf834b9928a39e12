//! Export core modules shared across CLI and store wrappers.

#[cfg(feature = "excel")]
pub mod store_core;
