//! # dockyard-common
//!
//! Ambient utilities shared by the dockyard tools.
//!
//! This crate provides:
//! - The common error type used by every dockyard crate
//! - Log subscriber setup for the binaries

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::{DockyardError, DockyardResult};
