//! Player view-point in world space.

use glam::Vec2;

/// Read-only snapshot of the player consumed by the renderer each frame.
///
/// * Only **heading** (yaw) is simulated; `pitch` is a vertical screen
///   offset in pixels, not a true rotation.
/// * `zoomed` narrows the field of view, `moving` lets the caller drive
///   view-bob through the frame's vertical offset.
#[derive(Clone, Copy, Debug)]
pub struct PlayerView {
    pub pos: Vec2,
    pub heading: f32, // radians (0 = east, counter-clockwise)
    pub pitch: f32,   // vertical look offset in screen pixels
    pub zoomed: bool,
    pub moving: bool,
}

impl PlayerView {
    pub fn new(pos: Vec2, heading: f32) -> Self {
        Self {
            pos,
            heading,
            pitch: 0.0,
            zoomed: false,
            moving: false,
        }
    }

    /// Unit vector pointing where the player looks on the X-Y plane.
    #[inline(always)]
    pub fn forward(&self) -> Vec2 {
        let (s, c) = self.heading.sin_cos();
        Vec2::new(c, s)
    }

    /// Unit vector pointing to the player's right on the X-Y plane.
    #[inline(always)]
    pub fn right(&self) -> Vec2 {
        self.forward().perp()
    }

    /*──────────────────── movement helpers (demo driver) ───────────────*/

    /// Move by `forward` units and `side` (strafe).
    pub fn step(&mut self, forward: f32, side: f32) {
        let f = self.forward();
        let r = self.right();
        self.pos += f * forward + r * side;
    }

    /// Rotate around the vertical axis (positive = turn left).
    pub fn turn(&mut self, delta: f32) {
        self.heading = (self.heading + delta).rem_euclid(std::f32::consts::TAU);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;
    use std::f32::consts::{FRAC_PI_2, TAU};

    #[test]
    fn forward_and_right_are_orthonormal() {
        let p = PlayerView::new(Vec2::ZERO, 0.3);
        let f = p.forward();
        let r = p.right();
        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!((r.length() - 1.0).abs() < 1e-5);
        assert!(f.dot(r).abs() < 1e-5);
    }

    #[test]
    fn turn_wraps_to_tau() {
        let mut p = PlayerView::new(Vec2::ZERO, TAU - 0.1);
        p.turn(0.2);
        assert!((p.heading - 0.1).abs() < 1e-5);
    }

    #[test]
    fn step_moves_along_heading() {
        let mut p = PlayerView::new(vec2(1.0, 1.0), FRAC_PI_2);
        p.step(2.0, 0.0);
        assert!((p.pos - vec2(1.0, 3.0)).length() < 1e-5);
    }
}
