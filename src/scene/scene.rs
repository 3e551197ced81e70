use std::borrow::Cow;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Affine3A, Mat4, Vec3};
use slotmap::SlotMap;

use crate::backend::GpuBackend;
use crate::errors::{Result, VesperError};
use crate::renderer::{Renderer, RendererId};
use crate::resources::{ResourceHandle, ResourceStore};
use crate::scene::camera::Camera;
use crate::scene::component::DrawComponent;
use crate::scene::graph::TransformGraph;
use crate::scene::layer::{Layer, LayerId};
use crate::scene::{ComponentKey, NodeHandle};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Viewing parameters of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub eye: Vec3,
}

/// Ordered layers of draw components plus the active camera.
///
/// Components live in the scene's arena; layers only hold keys. The
/// per-layer order is the draw order once [`sort_for`](Self::sort_for) ran.
pub struct Scene {
    id: u32,

    layers: Vec<Layer>,
    components: SlotMap<ComponentKey, DrawComponent>,

    camera: Camera,
    camera_node: Option<NodeHandle>,

    sorted_for: Option<RendererId>,
    needs_sort: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            layers: Vec::new(),
            components: SlotMap::with_key(),
            camera: Camera::default(),
            camera_node: None,
            sorted_for: None,
            needs_sort: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    // ========================================================================
    // Layers
    // ========================================================================

    pub fn add_layer(&mut self, name: impl Into<Cow<'static, str>>) -> LayerId {
        self.layers.push(Layer::new(name.into()));
        LayerId(self.layers.len() - 1)
    }

    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    /// Adds a handle bound once at the start of the layer.
    pub fn add_bindee(&mut self, layer: LayerId, handle: ResourceHandle) -> Result<()> {
        let layer = self
            .layers
            .get_mut(layer.0)
            .ok_or(VesperError::UnknownLayer(layer.0))?;
        layer.bindees.push(handle);
        Ok(())
    }

    /// Mutable access to a layer's bindees, e.g. to rebuild a viewport
    /// after a resize.
    pub fn bindees_mut(&mut self, layer: LayerId) -> Result<&mut [ResourceHandle]> {
        self.layers
            .get_mut(layer.0)
            .map(|l| l.bindees.as_mut_slice())
            .ok_or(VesperError::UnknownLayer(layer.0))
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Moves a component into the scene and appends it to `layer`.
    pub fn add_draw_component(&mut self, layer: LayerId, component: DrawComponent) -> Result<ComponentKey> {
        if layer.0 >= self.layers.len() {
            return Err(VesperError::UnknownLayer(layer.0));
        }
        let key = self.components.insert(component);
        self.layers[layer.0].components.push(key);
        self.needs_sort = true;
        Ok(key)
    }

    /// Draws an existing component in one more layer.
    pub fn attach_to_layer(&mut self, layer: LayerId, key: ComponentKey) -> Result<()> {
        if !self.components.contains_key(key) {
            return Err(VesperError::MissingComponent);
        }
        let layer = self
            .layers
            .get_mut(layer.0)
            .ok_or(VesperError::UnknownLayer(layer.0))?;
        if !layer.components.contains(&key) {
            layer.components.push(key);
            self.needs_sort = true;
        }
        Ok(())
    }

    /// Takes a component out of the scene and every layer. The caller
    /// decides whether to [`release`](DrawComponent::release) it.
    pub fn remove_draw_component(&mut self, key: ComponentKey) -> Option<DrawComponent> {
        let component = self.components.remove(key)?;
        for layer in &mut self.layers {
            layer.components.retain(|&k| k != key);
        }
        Some(component)
    }

    #[must_use]
    pub fn component(&self, key: ComponentKey) -> Option<&DrawComponent> {
        self.components.get(key)
    }

    /// Mutable access marks the scene for re-sorting: the component may be
    /// re-synced with different resources.
    pub fn component_mut(&mut self, key: ComponentKey) -> Option<&mut DrawComponent> {
        let component = self.components.get_mut(key)?;
        self.needs_sort = true;
        Some(component)
    }

    pub fn components(&self) -> impl Iterator<Item = (ComponentKey, &DrawComponent)> {
        self.components.iter()
    }

    #[inline]
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    // ========================================================================
    // Camera
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Graph node supplying the camera's world transform. `None` puts the
    /// camera at the origin looking down -Z.
    pub fn set_camera_node(&mut self, node: Option<NodeHandle>) {
        self.camera_node = node;
    }

    #[inline]
    #[must_use]
    pub fn camera_node(&self) -> Option<NodeHandle> {
        self.camera_node
    }

    /// Active viewing parameters. Reads the camera node's total, so the
    /// graph must be traversed.
    #[must_use]
    pub fn view(&self, graph: &TransformGraph) -> ViewParams {
        let world = self
            .camera_node
            .map_or(Affine3A::IDENTITY, |node| *graph.total(node));
        ViewParams {
            view: self.camera.view_matrix(&world),
            projection: self.camera.projection_matrix(),
            view_projection: self.camera.view_projection(&world),
            eye: world.translation.into(),
        }
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    /// `true` when components changed or `renderer` is not the one the
    /// layers were last sorted for.
    #[must_use]
    pub fn needs_sort(&self, renderer: &Renderer) -> bool {
        self.needs_sort || self.sorted_for != Some(renderer.id())
    }

    /// Forces the next [`needs_sort`](Self::needs_sort) to report `true`.
    pub fn invalidate_sort(&mut self) {
        self.needs_sort = true;
    }

    /// Syncs the renderer, every bindee and every component, then stably
    /// sorts each layer by descriptor. Equal descriptors keep their
    /// insertion order.
    pub fn sort_for(
        &mut self,
        renderer: &mut Renderer,
        store: &mut ResourceStore,
        backend: &mut dyn GpuBackend,
    ) -> Result<()> {
        renderer.sync(store, backend)?;

        for layer in &mut self.layers {
            for bindee in &mut layer.bindees {
                bindee.materialize(store, backend)?;
            }
        }
        for (_, component) in &mut self.components {
            component.sync(renderer, store, backend)?;
        }

        let components = &self.components;
        for layer in &mut self.layers {
            layer
                .components
                .sort_by(|a, b| components[*a].descriptor().cmp(components[*b].descriptor()));
        }

        self.sorted_for = Some(renderer.id());
        self.needs_sort = false;
        log::debug!(
            "Scene {}: sorted {} components in {} layers for {:?}",
            self.id,
            self.components.len(),
            self.layers.len(),
            renderer.id()
        );
        Ok(())
    }

    /// Releases every component and bindee, leaving an empty scene.
    pub fn release(&mut self, store: &mut ResourceStore, backend: &mut dyn GpuBackend) {
        for layer in self.layers.drain(..) {
            for bindee in layer.bindees {
                bindee.release(store, backend);
            }
        }
        for (_, component) in self.components.drain() {
            component.release(store, backend);
        }
        self.sorted_for = None;
        self.needs_sort = false;
    }
}
