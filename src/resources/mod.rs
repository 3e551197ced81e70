//! Resource management
//!
//! Bindable GPU objects and the bookkeeping that shares them between draw
//! components:
//! - [`ResourceDesc`]: construction recipe of one object
//! - [`Bindable`]: a created object plus its binding slot
//! - [`ResourceStore`]: identity → object table with a bounded tag cache
//! - [`ResourceHandle`]: lazily (re)materialized reference held by users
//! - [`primitives`]: CPU mesh generators feeding vertex/index buffers

pub mod bindable;
pub mod desc;
pub mod handle;
pub mod primitives;
pub mod store;
pub mod tag_cache;

pub use bindable::{Bindable, ResourceId};
pub use desc::{FilterMode, PrimitiveTopology, ResourceDesc, ShaderStage, VertexElement, VertexFormat};
pub use handle::{HandleMode, ResourceHandle};
pub use store::{HandleId, ResourceStore, StoreStats};
pub use tag_cache::{TagCache, TagKey};
