//! Planet spin and the sun direction derived from the planet clock.

use std::f64::consts::TAU;

use glam::{DMat4, DQuat, DVec3};

/// Spin of the planet about a fixed axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationState {
    /// Unit rotation axis.
    pub axis: DVec3,
    /// Current angle in radians, kept in `[0, 2π)`.
    pub angle: f64,
    /// Degrees per second.
    pub rate_deg: f64,
    pub enabled: bool,
}

impl RotationState {
    pub fn new(axis: DVec3, rate_deg: f64, enabled: bool) -> Self {
        Self {
            axis: axis.try_normalize().unwrap_or(DVec3::Z),
            angle: 0.0,
            rate_deg,
            enabled,
        }
    }

    /// Advance the angle by `elapsed` seconds when spinning.
    pub fn advance(&mut self, elapsed: f64) {
        if self.enabled {
            self.angle = (self.angle + self.rate_deg.to_radians() * elapsed).rem_euclid(TAU);
        }
    }

    pub fn quat(&self) -> DQuat {
        DQuat::from_axis_angle(self.axis, self.angle)
    }

    pub fn matrix(&self) -> DMat4 {
        DMat4::from_quat(self.quat())
    }
}

/// Direction towards the sun after `time` seconds on the planet clock.
///
/// The sun circles in the XY plane at the spin rate. When the planet is
/// not spinning the sun runs the other way round, so the lit side still
/// sweeps across the surface.
pub fn sun_direction(time: f64, rate_deg: f64, rotating: bool) -> DVec3 {
    let sign = if rotating { 1.0 } else { -1.0 };
    let angle = sign * time * rate_deg.to_radians();
    DVec3::new(angle.sin(), angle.cos(), 0.0)
}
