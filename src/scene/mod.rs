//! Scene module
//!
//! - [`TransformGraph`]: hierarchical frames of reference with dirty tracking
//! - [`Transform`]: TRS authoring helper
//! - [`Scene`] / [`Layer`]: ordered draw components and per-layer bindees
//! - [`DrawComponent`] / [`Material`]: what one draw call depends on
//! - [`Camera`]: projection parameters, placed by a graph node

pub mod camera;
pub mod component;
pub mod graph;
pub mod layer;
pub mod node;
pub mod scene;
pub mod transform;

pub use camera::{Camera, ProjectionType};
pub use component::{DrawComponent, DrawRange, Material};
pub use graph::TransformGraph;
pub use layer::{Layer, LayerId};
pub use node::TransformNode;
pub use scene::{Scene, ViewParams};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct ComponentKey;
}
