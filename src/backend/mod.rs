//! Backend Capabilities
//!
//! The core never talks to a graphics API directly. Everything that touches
//! the device goes through the narrow [`GpuBackend`] trait, and everything
//! that depends on the window goes through [`ClientArea`]:
//!
//! - [`GpuBackend`]: create / bind / draw / present (plus optional destroy
//!   and write hooks)
//! - [`ClientArea`]: the drawable size of the output surface
//! - [`HeadlessBackend`]: an in-memory backend that records every call,
//!   used for tests and for running frames without a device

pub mod headless;

pub use headless::{BackendCall, HeadlessBackend};

use crate::errors::Result;
use crate::resources::ResourceDesc;

/// Opaque handle the backend hands out for a created object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendHandle(pub u64);

/// Category of a bindable object.
///
/// Each kind has its own set of binding slots; binding one kind never
/// disturbs the state of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    VertexBuffer,
    IndexBuffer,
    VertexShader,
    PixelShader,
    InputLayout,
    Topology,
    VertexConstantBuffer,
    PixelConstantBuffer,
    Texture,
    Sampler,
    Viewport,
    DepthStencil,
    RenderTarget,
}

/// A binding point: the kind of object plus the slot index inside that kind.
///
/// Single-slot kinds (shaders, topology, index buffer, ...) always use
/// slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindSlot {
    pub kind: ResourceKind,
    pub slot: u32,
}

impl BindSlot {
    #[inline]
    #[must_use]
    pub const fn new(kind: ResourceKind, slot: u32) -> Self {
        Self { kind, slot }
    }

    /// Slot 0 of `kind`.
    #[inline]
    #[must_use]
    pub const fn single(kind: ResourceKind) -> Self {
        Self { kind, slot: 0 }
    }
}

/// GPU backend capability consumed by the resource store and the renderer.
///
/// Implementations report device removal as
/// [`VesperError::DeviceLost`](crate::errors::VesperError::DeviceLost) so the
/// frame driver can distinguish it from ordinary failures.
pub trait GpuBackend {
    /// Creates a device object of `kind` from its description.
    fn create_resource(&mut self, kind: ResourceKind, desc: &ResourceDesc) -> Result<BackendHandle>;

    /// Attaches a previously created object to the pipeline at `slot`.
    fn bind(&mut self, handle: BackendHandle, slot: BindSlot) -> Result<()>;

    /// Submits one draw using the currently bound state.
    ///
    /// With an index buffer bound, `count` is an index count and `start` the
    /// first index; otherwise they address vertices.
    fn issue_draw(&mut self, count: u32, start: u32, base_vertex: i32) -> Result<()>;

    /// Presents the finished frame.
    fn present(&mut self) -> Result<()>;

    /// Clears the current render target and depth buffer.
    fn clear(&mut self, _rgba: [f32; 4]) -> Result<()> {
        Ok(())
    }

    /// Releases a device object. Backends that free lazily may ignore it.
    fn destroy_resource(&mut self, _handle: BackendHandle) {}

    /// Overwrites the contents of a writable object (constant buffers).
    fn write_resource(&mut self, _handle: BackendHandle, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Window capability: the size of the client area in pixels.
pub trait ClientArea {
    fn client_size(&self) -> (u32, u32);
}

impl ClientArea for (u32, u32) {
    #[inline]
    fn client_size(&self) -> (u32, u32) {
        *self
    }
}
