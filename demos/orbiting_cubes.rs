//! Orbiting cubes, headless.
//!
//! A ring of cubes parented to a spinning pivot, a sphere in the middle and
//! an orbit camera. Runs a fixed number of frames against the recording
//! backend, simulates a device reset halfway through and prints the bind
//! statistics.
//!
//! ```text
//! RUST_LOG=debug cargo run --example orbiting_cubes
//! ```

use std::f32::consts::TAU;

use glam::{Affine3A, Quat, Vec3};
use vesper::{
    DrawComponent, Engine, EngineSettings, HeadlessBackend, Material, MouseButton, OrbitControls, ResourceDesc,
    ResourceHandle, SphereOptions, Technique, create_box, create_sphere,
};

const CUBES: usize = 8;
const FRAMES: u64 = 240;
const DT: f32 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = EngineSettings {
        clear_color: [0.05, 0.05, 0.08, 1.0],
        log_frame_stats: true,
        ..Default::default()
    };
    let mut engine = Engine::new(HeadlessBackend::new(), Technique::Textured, settings)?;
    engine.resize(&(1280, 720));

    let cube = create_box(1.0, 1.0, 1.0)?;
    let sphere = create_sphere(&SphereOptions {
        radius: 1.5,
        ..Default::default()
    })?;

    let mut controls = OrbitControls::new(Vec3::ZERO, 14.0);
    let mut pivot = None;
    let mut camera = None;

    engine.frame(|graph, scene, _| {
        let layer = scene.add_layer("opaque");
        scene.add_bindee(layer, ResourceHandle::owned(ResourceDesc::viewport_for(&(1280, 720))))?;
        scene.add_bindee(layer, ResourceHandle::owned(ResourceDesc::depth_stencil_for(&(1280, 720))))?;

        let center = graph.create_node();
        scene.add_draw_component(
            layer,
            DrawComponent::from_mesh(
                "sun",
                &sphere,
                Some("sphere"),
                Material::flat([1.0, 0.8, 0.2, 1.0]),
            )
            .with_node(center),
        )?;

        let ring = graph.create_node();
        for i in 0..CUBES {
            let angle = i as f32 / CUBES as f32 * TAU;
            let local = Affine3A::from_rotation_y(angle);
            let global = Affine3A::from_translation(Vec3::new(angle.cos() * 5.0, 0.0, angle.sin() * 5.0));
            let node = graph.add_child(ring, local, global)?;

            let material = if i % 2 == 0 {
                Material::textured(
                    [1.0; 4],
                    ResourceHandle::cached_named(
                        "checker",
                        ResourceDesc::solid_texture("checker", [200, 200, 200, 255], 0),
                    ),
                    ResourceHandle::cached_named(
                        "linear",
                        ResourceDesc::Sampler {
                            filter: vesper::resources::FilterMode::Linear,
                            slot: 0,
                        },
                    ),
                )
            } else {
                Material::flat([0.2, 0.5, 1.0, 1.0])
            };
            scene.add_draw_component(
                layer,
                DrawComponent::from_mesh(format!("cube-{i}"), &cube, Some("cube"), material).with_node(node),
            )?;
        }

        let eye = graph.create_node();
        scene.set_camera_node(Some(eye));

        pivot = Some(ring);
        camera = Some(eye);
        Ok(())
    })?;

    let (Some(pivot), Some(camera)) = (pivot, camera) else {
        anyhow::bail!("scene setup did not create its nodes");
    };

    // Fake a left drag so the camera swings around.
    engine.input_mut().handle_button(MouseButton::Left, true);

    let mut totals = (0u64, 0u64, 0u64);
    let mut device_reset = false;
    while engine.frame_count() < FRAMES {
        let t = engine.frame_count() as f32 * DT;
        engine.input_mut().handle_cursor_move(640.0 + t * 20.0, 360.0);
        let fov = engine.scene().camera().fov.to_degrees();

        if !device_reset && engine.frame_count() == FRAMES / 2 {
            device_reset = true;
            engine.backend_mut().lose_device("simulated driver reset");
        }

        let result = engine.frame(|graph, _, input| {
            graph.set_local(pivot, Affine3A::from_quat(Quat::from_rotation_y(t * 0.8)))?;
            controls.update(graph, camera, input, fov, DT)
        });

        match result {
            Ok(stats) => {
                totals.0 += stats.binds_requested;
                totals.1 += stats.binds_performed;
                totals.2 += stats.binds_suppressed;
            }
            Err(e) if e.is_device_lost() => {
                log::warn!("{e}; recovering on a fresh backend");
                engine.recover(HeadlessBackend::new())?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!(
        "{FRAMES} frames: {} binds requested, {} performed, {} suppressed",
        totals.0, totals.1, totals.2
    );
    println!("{engine:?}");

    let backend = engine.shutdown();
    println!("live objects after shutdown: {}", backend.live_resources());
    Ok(())
}
