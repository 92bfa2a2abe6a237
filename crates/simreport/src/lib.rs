//! Public facade crate for `simreport`.
//!
//! This crate intentionally contains no IO or backend-specific logic.
//! It re-exports the backend-agnostic types/traits from `simreport-core`.

pub use simreport_core::*;
