//! Scripted descent used to drive the planet without a window.

use glam::{DMat4, DVec3};
use icosa_config::FlightConfig;
use icosa_planet::ViewerState;

const FIELD_OF_VIEW_DEG: f64 = 60.0;
const ASPECT_RATIO: f64 = 16.0 / 9.0;

/// Straight-down approach from `start_altitude` to `end_altitude` (both in
/// planet radii) with a constant ratio between successive frames, so each
/// octave of altitude takes equally long.
pub struct Descent {
    center: DVec3,
    radius: f64,
    direction: DVec3,
    start: f64,
    end: f64,
    frames: u32,
}

impl Descent {
    pub fn new(center: DVec3, radius: f64, flight: &FlightConfig) -> Self {
        Self {
            center,
            radius,
            direction: DVec3::new(0.3, 0.2, 1.0).normalize(),
            start: flight.start_altitude.max(f64::EPSILON),
            end: flight.end_altitude.max(f64::EPSILON),
            frames: flight.frames,
        }
    }

    /// Altitude above the surface, in radii, at `frame`.
    pub fn altitude(&self, frame: u32) -> f64 {
        if self.frames <= 1 {
            return self.end;
        }
        let t = f64::from(frame.min(self.frames - 1)) / f64::from(self.frames - 1);
        self.start * (self.end / self.start).powf(t)
    }

    /// Viewer at `frame`, looking at the planet centre.
    pub fn viewer(&self, frame: u32) -> ViewerState {
        let altitude = self.altitude(frame) * self.radius;
        let eye = self.center + self.direction * (self.radius + altitude);
        let view = DMat4::look_at_rh(eye, self.center, DVec3::Y);
        let near = (altitude * 0.1).max(self.radius * 1e-7);
        let far = altitude + self.radius * 2.0;
        let projection =
            DMat4::perspective_rh(FIELD_OF_VIEW_DEG.to_radians(), ASPECT_RATIO, near, far);
        ViewerState::with_view_projection(eye, projection * view)
    }
}
