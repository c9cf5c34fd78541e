//! Viewer input and its hand-off to the LOD worker.

use std::sync::{Mutex, PoisonError};

use glam::{DMat4, DVec3};
use icosa_lod::LodView;

/// Where the viewer is this frame, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewerState {
    pub position: DVec3,
    /// World-space view-projection, when the camera knows one. Enables
    /// screen-space culling of the planet mesh.
    pub view_projection: Option<DMat4>,
}

impl ViewerState {
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            view_projection: None,
        }
    }

    pub fn with_view_projection(position: DVec3, view_projection: DMat4) -> Self {
        Self {
            position,
            view_projection: Some(view_projection),
        }
    }
}

/// Latest object-space view, written by the render thread and copied out by
/// the worker at the top of every tick. The lock is only held for the copy.
pub(crate) struct ViewerHandoff {
    frame: Mutex<LodView>,
}

impl ViewerHandoff {
    pub(crate) fn new(initial: LodView) -> Self {
        Self {
            frame: Mutex::new(initial),
        }
    }

    pub(crate) fn store(&self, view: LodView) {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner) = view;
    }

    pub(crate) fn load(&self) -> LodView {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
