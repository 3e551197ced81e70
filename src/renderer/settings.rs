//! Engine Settings
//!
//! Configuration for the resource store, the rebind guard and the frame
//! driver. All fields have sensible defaults; override individual values with
//! struct update syntax.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vesper::renderer::settings::EngineSettings;
//!
//! // Default: 64 × 4 tag cache, redundant binds suppressed
//! let settings = EngineSettings::default();
//!
//! // Driver workaround: rebind everything, every draw
//! let settings = EngineSettings {
//!     always_rebind: true,
//!     ..Default::default()
//! };
//! ```

use crate::errors::{Result, VesperError};

// ---------------------------------------------------------------------------
// TagCacheConfig
// ---------------------------------------------------------------------------

/// Geometry of the bounded tag → identity cache.
///
/// The cache is set-associative: a tag hashes to exactly one bucket and each
/// bucket holds at most `depth` entries. When a bucket is full, inserting a
/// new tag evicts the bucket's least-recently-used entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagCacheConfig {
    /// Number of buckets.
    pub buckets: usize,
    /// Entries per bucket.
    pub depth: usize,
}

impl TagCacheConfig {
    /// Total number of tags the cache can hold at once.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets * self.depth
    }

    /// Rejects a cache that could never hold a tag.
    pub fn validate(&self) -> Result<()> {
        if self.buckets == 0 {
            return Err(VesperError::InvalidSettings(
                "tag cache needs at least one bucket".to_string(),
            ));
        }
        if self.depth == 0 {
            return Err(VesperError::InvalidSettings(
                "tag cache buckets need a depth of at least one".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TagCacheConfig {
    #[inline]
    fn default() -> Self {
        Self {
            buckets: 64,
            depth: 4,
        }
    }
}

// ---------------------------------------------------------------------------
// EngineSettings
// ---------------------------------------------------------------------------

/// Engine-wide configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    // === Resource Store ===
    /// Tag-cache geometry used by every [`ResourceStore`](crate::resources::ResourceStore).
    pub tag_cache: TagCacheConfig,

    // === Rebind Guard ===
    /// Global "always rebind" switch.
    ///
    /// When `true`, the rebind guard forwards every bind request to the
    /// backend even if the same object is already bound. Useful to rule out
    /// state-tracking bugs or to work around drivers that lose state.
    pub always_rebind: bool,

    // === Frame Defaults ===
    /// Background clear color (linear RGBA).
    pub clear_color: [f32; 4],

    /// Emit a `log::debug!` line with bind statistics after every frame.
    pub log_frame_stats: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tag_cache: TagCacheConfig::default(),
            always_rebind: false,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            log_frame_stats: false,
        }
    }
}

impl EngineSettings {
    /// Checks that the settings describe a usable configuration.
    pub fn validate(&self) -> Result<()> {
        self.tag_cache.validate()
    }
}
