//! Engine Core Module
//!
//! [`Engine`] owns every subsystem of one rendering context and drives the
//! frame in the only order that is valid:
//!
//! 1. user edits (transforms, scene contents)
//! 2. a single traversal of the transform graph
//! 3. re-sort of the scene if components or the renderer changed
//! 4. render, then present
//!
//! It holds no window. A frontend feeds [`InputState`] and the client area
//! size, and hands in a [`GpuBackend`].
//!
//! # Device loss
//!
//! A frame that fails with [`VesperError::DeviceLost`](crate::errors::VesperError::DeviceLost) leaves the engine
//! untouched. Call [`Engine::recover`] with a fresh backend: the store is
//! abandoned and every handle re-materializes from its recipe on the
//! following sort.
//!
//! ```rust,ignore
//! use vesper::{Engine, EngineSettings, HeadlessBackend, Technique};
//!
//! let mut engine = Engine::new(HeadlessBackend::new(), Technique::Flat, EngineSettings::default())?;
//! loop {
//!     match engine.frame(|graph, scene, input| { /* edits */ Ok(()) }) {
//!         Err(e) if e.is_device_lost() => engine.recover(HeadlessBackend::new())?,
//!         other => { other?; }
//!     }
//! }
//! ```

use crate::app::input::InputState;
use crate::backend::{ClientArea, GpuBackend};
use crate::errors::Result;
use crate::renderer::{EngineSettings, FrameStats, Renderer, Technique};
use crate::resources::ResourceStore;
use crate::scene::{Scene, TransformGraph};

pub struct Engine<B: GpuBackend> {
    backend: B,
    store: ResourceStore,
    graph: TransformGraph,
    scene: Scene,
    renderer: Renderer,
    input: InputState,
    settings: EngineSettings,

    frame_count: u64,
}

impl<B: GpuBackend> Engine<B> {
    /// # Errors
    ///
    /// [`VesperError::InvalidSettings`](crate::errors::VesperError::InvalidSettings) when `settings` fail validation.
    pub fn new(backend: B, technique: Technique, settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        log::info!(
            "Engine: technique '{}', tag cache {}x{}",
            technique.name(),
            settings.tag_cache.buckets,
            settings.tag_cache.depth
        );
        Ok(Self {
            backend,
            store: ResourceStore::with_settings(&settings)?,
            graph: TransformGraph::new(),
            scene: Scene::new(),
            renderer: Renderer::new(technique, &settings),
            input: InputState::new(),
            settings,
            frame_count: 0,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn graph(&self) -> &TransformGraph {
        &self.graph
    }

    #[inline]
    pub fn graph_mut(&mut self) -> &mut TransformGraph {
        &mut self.graph
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[inline]
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[inline]
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Store and backend together, for work that materializes or destroys
    /// objects outside a frame.
    pub fn resources_mut(&mut self) -> (&mut ResourceStore, &mut B) {
        (&mut self.store, &mut self.backend)
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Follows a client-area resize: camera aspect and input screen size.
    pub fn resize(&mut self, area: &impl ClientArea) {
        let (width, height) = area.client_size();
        self.input.handle_resize(width, height);
        self.scene.camera_mut().fit_client_area(area);
    }

    /// Switches the renderer's technique; the scene re-sorts next frame.
    pub fn set_technique(&mut self, technique: Technique) {
        self.renderer
            .set_technique(technique, &mut self.store, &mut self.backend);
    }

    /// Runs one frame. `edit` is the only place transforms and scene
    /// contents may change.
    ///
    /// An error from `edit` ends the frame before traversal: nothing is
    /// drawn and the frame counter does not advance. Edits applied before
    /// the error stay in place.
    pub fn frame<F>(&mut self, edit: F) -> Result<FrameStats>
    where
        F: FnOnce(&mut TransformGraph, &mut Scene, &InputState) -> Result<()>,
    {
        edit(&mut self.graph, &mut self.scene, &self.input).inspect_err(|e| {
            log::warn!("Engine: frame {} edit failed: {e}", self.frame_count);
        })?;
        self.graph.traverse_all();

        let stats = self.draw().inspect_err(|e| {
            if e.is_device_lost() {
                log::error!("Engine: frame {} lost the device: {e}", self.frame_count);
            } else {
                log::warn!("Engine: frame {} failed: {e}", self.frame_count);
            }
        })?;

        self.input.end_frame();
        self.frame_count += 1;
        if self.settings.log_frame_stats {
            log::debug!(
                "frame {}: {} draws, {} binds ({} suppressed, {} skipped by diff)",
                self.frame_count,
                stats.draws,
                stats.binds_performed,
                stats.binds_suppressed,
                stats.binds_skipped_by_diff
            );
        }
        Ok(stats)
    }

    fn draw(&mut self) -> Result<FrameStats> {
        if self.scene.needs_sort(&self.renderer) {
            self.scene
                .sort_for(&mut self.renderer, &mut self.store, &mut self.backend)?;
        }
        let stats = self
            .renderer
            .render(&self.scene, &self.graph, &self.store, &mut self.backend)?;
        self.renderer.present(&mut self.backend)?;
        Ok(stats)
    }

    /// Rebuilds every device object on `backend` after
    /// [`VesperError::DeviceLost`](crate::errors::VesperError::DeviceLost).
    ///
    /// Graph, scene and handles survive; the store forgets every object and
    /// the re-sort re-materializes them from their recipes.
    pub fn recover(&mut self, backend: B) -> Result<()> {
        log::warn!(
            "Engine: recovering from device loss ({} objects abandoned)",
            self.store.len()
        );
        self.store.abandon();
        self.backend = backend;
        self.renderer.reset_state();
        self.scene.invalidate_sort();
        self.scene
            .sort_for(&mut self.renderer, &mut self.store, &mut self.backend)
    }

    /// Releases the scene, the renderer and every remaining store object,
    /// then hands back the backend.
    #[must_use]
    pub fn shutdown(mut self) -> B {
        self.scene.release(&mut self.store, &mut self.backend);
        self.renderer.release(&mut self.store, &mut self.backend);
        self.store.clear(&mut self.backend);
        log::info!("Engine: shut down after {} frames", self.frame_count);
        self.backend
    }
}

impl<B: GpuBackend> std::fmt::Debug for Engine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("technique", &self.renderer.technique())
            .field("objects", &self.store.len())
            .field("nodes", &self.graph.len())
            .field("components", &self.scene.component_count())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}
