//! The background thread that owns the quadtree.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use icosa_lod::{LodView, PlanetQuadtree};
use icosa_mesh::MeshExchange;
use tracing::{debug, warn};

use crate::diagnostics::{DiagnosticSink, RebuildSample};
use crate::error::PlanetError;
use crate::viewer::ViewerHandoff;

pub(crate) const WORKER_THREAD_NAME: &str = "planet-lod";

/// State shared between the render thread and the worker.
pub(crate) struct Shared {
    pub(crate) closing: Arc<AtomicBool>,
    pub(crate) viewer: ViewerHandoff,
    pub(crate) exchange: MeshExchange,
}

impl Shared {
    pub(crate) fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }
}

pub(crate) struct MeshWorker {
    pub(crate) quadtree: PlanetQuadtree,
    pub(crate) shared: Arc<Shared>,
    pub(crate) diagnostics: Option<Box<dyn DiagnosticSink>>,
    pub(crate) idle_sleep: Duration,
}

impl MeshWorker {
    pub(crate) fn spawn(self) -> Result<JoinHandle<()>, PlanetError> {
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || self.run())
            .map_err(PlanetError::WorkerSpawn)
    }

    /// Tick, rebuild and publish until the closing flag is raised.
    ///
    /// A rebuild happens when the tree changed, when nothing has been
    /// published yet, or when the view moved. The view matters even with a
    /// static tree because horizon and screen culling and the minimum
    /// surface distance all depend on it.
    fn run(mut self) {
        let mut previous: Option<LodView> = None;
        let mut published = false;

        while !self.shared.is_closing() {
            let view = self.shared.viewer.load();
            let stats = self.quadtree.tick(view.viewer);
            let view_changed = previous != Some(view);

            if stats.changed() || !published || view_changed {
                let snapshot = self.quadtree.rebuild_mesh(&view);
                // A walk cut short by shutdown leaves a partial mesh.
                if self.shared.is_closing() {
                    break;
                }
                let sample = RebuildSample::from_snapshot(&snapshot);
                let generation = self.shared.exchange.publish(snapshot);
                published = true;
                debug!(
                    generation,
                    splits = stats.splits,
                    merges = stats.merges,
                    leaves = sample.leaf_count,
                    indices = sample.index_count,
                    duration_us = sample.duration_us,
                    "published planet mesh"
                );
                self.record(&sample);
            }

            previous = Some(view);
            if !stats.changed() && !view_changed {
                thread::sleep(self.idle_sleep);
            }
        }
        debug!("planet worker stopped");
    }

    fn record(&mut self, sample: &RebuildSample) {
        if let Some(sink) = self.diagnostics.as_mut()
            && let Err(err) = sink.record(sample)
        {
            warn!(%err, "disabling rebuild diagnostics");
            self.diagnostics = None;
        }
    }
}
