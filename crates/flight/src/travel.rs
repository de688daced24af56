//! Scripted travel: the craft follows a cubic Bézier curve with eased timing
//! while flight control is suspended.

use crate::config::TravelTuning;
use engine_core::look_rotation;
use glam::{Quat, Vec3};
use rand::Rng;

/// Cubic Bézier curve through four control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierPath {
    pub points: [Vec3; 4],
}

impl BezierPath {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self {
            points: [p0, p1, p2, p3],
        }
    }

    /// Curve from `start` to `end` whose inner control points sit at the
    /// thirds of the chord, pushed sideways by a random amount up to
    /// `spread` × chord length.
    pub fn with_random_offsets(start: Vec3, end: Vec3, spread: f32, rng: &mut impl Rng) -> Self {
        let chord = end - start;
        let length = chord.length();
        let Some(direction) = chord.try_normalize() else {
            return Self::new(start, start, end, end);
        };
        let side = direction
            .cross(Vec3::Y)
            .try_normalize()
            .unwrap_or_else(|| direction.cross(Vec3::X).normalize());
        let lift = side.cross(direction);

        let mut offset = || {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let magnitude = length * spread * rng.gen_range(0.5..1.0);
            (side * angle.cos() + lift * angle.sin()) * magnitude
        };
        Self::new(
            start,
            start + chord / 3.0 + offset(),
            start + chord * (2.0 / 3.0) + offset(),
            end,
        )
    }

    pub fn point(&self, t: f32) -> Vec3 {
        let [p0, p1, p2, p3] = self.points;
        let u = 1.0 - t;
        p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
    }

    /// First derivative with respect to `t`.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let [p0, p1, p2, p3] = self.points;
        let u = 1.0 - t;
        (p1 - p0) * (3.0 * u * u) + (p2 - p1) * (6.0 * u * t) + (p3 - p2) * (3.0 * t * t)
    }

    /// Second derivative with respect to `t`.
    pub fn acceleration(&self, t: f32) -> Vec3 {
        let [p0, p1, p2, p3] = self.points;
        (p2 - p1 * 2.0 + p0) * (6.0 * (1.0 - t)) + (p3 - p2 * 2.0 + p1) * (6.0 * t)
    }

    /// Signed curvature about the local up axis: positive when the curve
    /// bends to the left of `forward`.
    pub fn turn_curvature(&self, t: f32, up: Vec3) -> f32 {
        let velocity = self.tangent(t);
        let speed = velocity.length();
        if speed <= f32::EPSILON {
            return 0.0;
        }
        velocity.cross(self.acceleration(t)).dot(up) / (speed * speed * speed)
    }
}

/// Cubic ease-in/ease-out on [0, 1].
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Pose produced by one [`TravelSequence::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelFrame {
    pub position: Vec3,
    pub rotation: Quat,
    /// Eased curve parameter.
    pub progress: f32,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct TravelSequence {
    path: BezierPath,
    duration: f32,
    elapsed: f32,
    rotation: Quat,
    bank_gain: f32,
    max_bank: f32,
}

impl TravelSequence {
    pub fn new(
        start: Vec3,
        start_rotation: Quat,
        end: Vec3,
        tuning: &TravelTuning,
        rng: &mut impl Rng,
    ) -> Self {
        Self::along(
            BezierPath::with_random_offsets(start, end, tuning.lateral_spread, rng),
            start_rotation,
            tuning,
        )
    }

    pub fn along(path: BezierPath, start_rotation: Quat, tuning: &TravelTuning) -> Self {
        Self {
            path,
            duration: tuning.duration.max(f32::EPSILON),
            elapsed: 0.0,
            rotation: start_rotation,
            bank_gain: tuning.bank_gain,
            max_bank: tuning.max_bank,
        }
    }

    pub fn path(&self) -> &BezierPath {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Move along the curve by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> TravelFrame {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        let linear = self.elapsed / self.duration;
        let t = ease_in_out(linear);

        // A degenerate path has no tangent; keep the last heading there.
        let tangent = self.path.tangent(t);
        if let Some(heading) = look_rotation(tangent, Vec3::Y) {
            let up = heading * Vec3::Y;
            let bank = (self.path.turn_curvature(t, up) * self.bank_gain)
                .clamp(-self.max_bank, self.max_bank);
            self.rotation = heading * Quat::from_rotation_z(bank);
        }

        TravelFrame {
            position: self.path.point(t),
            rotation: self.rotation,
            progress: t,
            finished: self.is_finished(),
        }
    }
}
