//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`VesperError`] separates three families of failure:
//! - Backend failures, with device loss reported as its own variant because
//!   recovering from it means rebuilding the whole resource store
//! - Configuration errors raised by constructors (e.g. degenerate shapes)
//! - Stale or malformed ids handed to fallible scene-graph APIs
//!
//! Programming defects (reading a dirty transform, drawing an unsynced
//! component, resolving a destroyed identity) are not represented here:
//! they panic at the point of misuse.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, VesperError>`.
//!
//! ```rust,ignore
//! use vesper::errors::{VesperError, Result};
//!
//! fn frame(engine: &mut Engine) -> Result<()> {
//!     match engine.frame(|_, _, _| Ok(())) {
//!         Err(e) if e.is_device_lost() => engine.recover(new_backend()),
//!         other => other.map(|_| ()),
//!     }
//! }
//! ```

use thiserror::Error;

/// The main error type for the Vesper engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VesperError {
    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// The GPU device was removed or reset. Every backend object is gone;
    /// the caller must rebuild the resource store before drawing again.
    #[error("GPU device lost: {0}")]
    DeviceLost(String),

    /// A backend call failed without invalidating the device.
    #[error("Backend error: {0}")]
    Backend(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A shape generator was invoked with degenerate parameters.
    #[error("Invalid {shape} parameters: {reason}")]
    InvalidShape {
        /// Name of the generator (e.g. `"sphere"`)
        shape: &'static str,
        /// Human readable description of the offending parameter
        reason: String,
    },

    /// Settings that cannot be used to build the engine.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// A re-parenting request would create a cycle.
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// A node handle does not refer to a live node.
    #[error("Transform node not found")]
    MissingNode,

    /// A layer id is out of range for the scene.
    #[error("Unknown layer: {0}")]
    UnknownLayer(usize),

    /// A component key does not refer to a live draw component.
    #[error("Draw component not found")]
    MissingComponent,
}

impl VesperError {
    /// Returns `true` when the error requires a full device/resource rebuild.
    #[inline]
    #[must_use]
    pub fn is_device_lost(&self) -> bool {
        matches!(self, Self::DeviceLost(_))
    }
}

/// Alias for `Result<T, VesperError>`.
pub type Result<T> = std::result::Result<T, VesperError>;
