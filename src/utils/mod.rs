//! Utility Module
//!
//! - [`OrbitControls`]: orbit/pan/zoom controller driving a camera node

pub mod orbit_control;

pub use orbit_control::OrbitControls;
