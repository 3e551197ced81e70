#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Scene and resource management core of a real-time 3D renderer.
//!
//! - [`resources`]: device objects, handles and the deduplicating store
//! - [`scene`]: transform graph, layers, draw components, camera
//! - [`renderer`]: techniques, descriptors, the rebind guard and the draw loop
//! - [`backend`]: the GPU capability the core drives, plus a recording
//!   headless implementation
//! - [`Engine`]: frame driver tying them together

pub mod app;
pub mod backend;
pub mod engine;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

pub use app::{InputState, MouseButton};
pub use backend::{BackendCall, BackendHandle, BindSlot, ClientArea, GpuBackend, HeadlessBackend, ResourceKind};
pub use engine::Engine;
pub use errors::{Result, VesperError};
pub use renderer::{EngineSettings, FrameStats, RebindGuard, RenderDescriptor, Renderer, TagCacheConfig, Technique};
pub use resources::primitives::{
    MeshData, PlaneOptions, SphereOptions, Vertex, create_box, create_plane, create_sphere,
};
pub use resources::{HandleMode, ResourceDesc, ResourceHandle, ResourceId, ResourceStore, TagKey};
pub use scene::{
    Camera, ComponentKey, DrawComponent, Layer, LayerId, Material, NodeHandle, Scene, Transform, TransformGraph,
};
pub use utils::orbit_control::OrbitControls;
