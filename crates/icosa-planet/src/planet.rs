//! The planet: owns the mesh worker and drives the shading backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use glam::{DMat4, DVec3};
use icosa_config::Config;
use icosa_lod::{LodView, PlanetQuadtree};
use icosa_mesh::{MeshExchange, MeshSnapshot};
use icosa_render::{PlanetUniforms, RenderMode, ShadingBackend};
use icosa_terrain::TerrainNoise;
use tracing::{info, warn};

use crate::diagnostics::{DiagnosticSink, JsonLinesSink};
use crate::error::PlanetError;
use crate::rotation::{RotationState, sun_direction};
use crate::settings::PlanetSettings;
use crate::viewer::{ViewerHandoff, ViewerState};
use crate::worker::{MeshWorker, Shared};

/// A procedurally generated planet refined around the viewer.
///
/// Construction spawns the worker thread that owns the quadtree. Everything
/// else on this type runs on the caller's (render) thread: once per frame,
/// call [`draw`](Self::draw) with the time since the previous frame and the
/// current viewer. [`shutdown`](Self::shutdown) stops the worker and releases
/// the backend; dropping the planet does the same.
pub struct Planet<B: ShadingBackend> {
    settings: PlanetSettings,
    backend: B,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    rotation: RotationState,
    render_mode: RenderMode,
    sea_level: f64,
    sea_level_step: f64,
    rotation_rate_step: f64,
    elapsed_time: f64,
    uploaded_generation: u64,
    uploaded_index_count: usize,
    closed: bool,
}

impl<B: ShadingBackend> Planet<B> {
    pub fn new(settings: PlanetSettings, backend: B) -> Result<Self, PlanetError> {
        Self::with_diagnostics(settings, backend, None)
    }

    /// Build a planet from the loaded configuration. Rebuild samples go to
    /// `debug.diagnostics_path` when it is set.
    pub fn from_config(config: &Config, backend: B) -> Result<Self, PlanetError> {
        let diagnostics = match &config.debug.diagnostics_path {
            Some(path) => Some(Box::new(JsonLinesSink::create(path)?) as Box<dyn DiagnosticSink>),
            None => None,
        };
        Self::with_diagnostics(PlanetSettings::from_config(config), backend, diagnostics)
    }

    pub fn with_diagnostics(
        settings: PlanetSettings,
        backend: B,
        diagnostics: Option<Box<dyn DiagnosticSink>>,
    ) -> Result<Self, PlanetError> {
        settings.validate()?;

        let rotation = RotationState::new(
            settings.rotation_axis,
            settings.rotation_rate_deg,
            settings.rotating,
        );
        let closing = Arc::new(AtomicBool::new(false));
        let quadtree = PlanetQuadtree::new(
            settings.radius,
            settings.lod.clone(),
            TerrainNoise::new(settings.terrain.clone()),
            Arc::clone(&closing),
        );
        let start = rotation.quat().inverse() * (settings.starting_viewer() - settings.position);
        let shared = Arc::new(Shared {
            closing,
            viewer: ViewerHandoff::new(LodView::at(start)),
            exchange: MeshExchange::new(),
        });

        let worker = MeshWorker {
            quadtree,
            shared: Arc::clone(&shared),
            diagnostics,
            idle_sleep: settings.idle_sleep,
        }
        .spawn()?;

        info!(
            radius = settings.radius,
            seed = settings.terrain.seed,
            max_lod = settings.lod.max_lod,
            lod_multiplier = settings.lod.lod_multiplier,
            "planet created"
        );

        Ok(Self {
            rotation,
            render_mode: settings.render_mode,
            sea_level: settings.sea_level,
            sea_level_step: settings.sea_level * 0.025,
            rotation_rate_step: settings.rotation_rate_deg * 10.0,
            settings,
            backend,
            shared,
            worker: Some(worker),
            elapsed_time: 0.0,
            uploaded_generation: 0,
            uploaded_index_count: 0,
            closed: false,
        })
    }

    /// Render one frame.
    ///
    /// Advances the planet clock by `elapsed` seconds, hands the viewer to
    /// the worker, pushes uniforms, uploads the newest mesh if it has not
    /// been uploaded yet and draws it. Does nothing after shutdown.
    pub fn draw(&mut self, elapsed: f64, viewer: &ViewerState) {
        if self.closed {
            return;
        }
        let elapsed = elapsed.max(0.0);
        self.elapsed_time += elapsed;
        self.rotation.advance(elapsed);
        self.update_viewer(viewer);

        let model = self.model_matrix();
        let transform = viewer.view_projection.map_or(model, |vp| vp * model);
        let sun = sun_direction(
            self.elapsed_time,
            self.rotation.rate_deg,
            self.rotation.enabled,
        );
        let uniforms = PlanetUniforms::new(
            transform,
            model,
            sun,
            &self.settings.palette,
            self.settings.position,
            self.settings.radius,
            self.elapsed_time,
            self.sea_level,
        );
        self.backend.set_uniforms(&uniforms);

        if let Some(snapshot) = self.shared.exchange.latest_if_newer(self.uploaded_generation) {
            self.backend
                .upload_mesh(&snapshot.vertices, &snapshot.indices);
            self.uploaded_generation = snapshot.generation;
            self.uploaded_index_count = snapshot.indices.len();
        }

        if self.uploaded_index_count > 0 {
            let count = u32::try_from(self.uploaded_index_count).unwrap_or(u32::MAX);
            self.backend.draw_indexed(count, self.render_mode);
        }
    }

    /// Hand a new viewer to the worker without drawing.
    ///
    /// The position and view-projection are moved into the planet's
    /// unrotated frame, centred on the planet.
    pub fn update_viewer(&mut self, viewer: &ViewerState) {
        if self.closed {
            return;
        }
        let local = self.rotation.quat().inverse() * (viewer.position - self.settings.position);
        let model = self.model_matrix();
        self.shared.viewer.store(LodView {
            viewer: local,
            view_projection: viewer.view_projection.map(|vp| vp * model),
        });
    }

    /// Translation to the planet centre after its current spin.
    pub fn model_matrix(&self) -> DMat4 {
        DMat4::from_translation(self.settings.position) * self.rotation.matrix()
    }

    pub fn toggle_render_mode(&mut self) -> RenderMode {
        self.render_mode = self.render_mode.toggled();
        self.render_mode
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn toggle_rotation(&mut self) -> bool {
        self.rotation.enabled = !self.rotation.enabled;
        self.rotation.enabled
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.enabled
    }

    pub fn increase_rotation_rate(&mut self) {
        self.rotation.rate_deg += self.rotation_rate_step;
    }

    /// May take the rate below zero, which spins the planet the other way.
    pub fn decrease_rotation_rate(&mut self) {
        self.rotation.rate_deg -= self.rotation_rate_step;
    }

    /// Degrees per second.
    pub fn rotation_rate(&self) -> f64 {
        self.rotation.rate_deg
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn raise_sea_level(&mut self) {
        self.sea_level += self.sea_level_step;
    }

    pub fn lower_sea_level(&mut self) {
        self.sea_level -= self.sea_level_step;
    }

    pub fn sea_level(&self) -> f64 {
        self.sea_level
    }

    /// Distance from the viewer to the nearest corner of the last published
    /// mesh, infinite before the first publish.
    pub fn min_surface_distance(&self) -> f64 {
        self.shared.exchange.latest().min_surface_distance
    }

    pub fn latest_snapshot(&self) -> Arc<MeshSnapshot> {
        self.shared.exchange.latest()
    }

    /// Generation of the newest published mesh, 0 before the first.
    pub fn mesh_generation(&self) -> u64 {
        self.shared.exchange.generation()
    }

    /// Generation of the mesh currently held by the backend.
    pub fn uploaded_generation(&self) -> u64 {
        self.uploaded_generation
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn settings(&self) -> &PlanetSettings {
        &self.settings
    }

    pub fn radius(&self) -> f64 {
        self.settings.radius
    }

    pub fn position(&self) -> DVec3 {
        self.settings.position
    }

    pub fn mass(&self) -> f64 {
        self.settings.mass
    }

    /// Seconds accumulated by [`draw`](Self::draw).
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stop the worker, wait for it, then release the backend.
    ///
    /// Safe to call more than once; only the first call does anything. The
    /// backend is released even when the worker panicked.
    pub fn shutdown(&mut self) -> Result<(), PlanetError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.shared.closing.store(true, Ordering::Release);

        let joined = match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| PlanetError::WorkerPanicked),
            None => Ok(()),
        };
        self.backend.release();
        info!(
            generation = self.shared.exchange.generation(),
            elapsed = self.elapsed_time,
            "planet shut down"
        );
        joined
    }
}

impl<B: ShadingBackend> Drop for Planet<B> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(%err, "planet shutdown failed");
        }
    }
}
