//! Vector and quaternion math
//!
//! Vectors are `nalgebra` 3-vectors. Orientation is a hand-rolled unit
//! quaternion so that the exact sandwich-product, slerp and normalization
//! behaviour the integrator depends on is pinned down here.

use std::ops::Mul;

pub type Vec3 = na::Vector3<f64>;

/// World up
pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const DOWN: Vec3 = Vec3::new(0.0, -1.0, 0.0);
/// World right. Points along -x to match the NoLimits convention, keep it
/// that way or exported rolls come out mirrored.
pub const RIGHT: Vec3 = Vec3::new(-1.0, 0.0, 0.0);
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Projects `a` onto `b`
pub fn vector_projection(a: &Vec3, b: &Vec3) -> Vec3 {
    b * (a.dot(b) / b.magnitude_squared())
}

pub fn scaler_projection(a: &Vec3, b: &Vec3) -> f64 {
    a.dot(b) / b.magnitude()
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}

pub fn vlerp(a: &Vec3, b: &Vec3, t: f64) -> Vec3 {
    Vec3::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t), lerp(a.z, b.z, t))
}

/// Only suitable for rotations
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `angle` radians about `axis`. The axis is expected to be
    /// unit length already.
    pub fn from_axis_angle(axis: &Vec3, angle: f64) -> Self {
        let half_angle = angle / 2.0;
        let sin_half = half_angle.sin();
        Self {
            w: half_angle.cos(),
            x: axis.x * sin_half,
            y: axis.y * sin_half,
            z: axis.z * sin_half,
        }
    }

    /// Inverse of `from_axis_angle`, the axis is +x for (near) identity
    pub fn to_axis_angle(&self) -> (Vec3, f64) {
        let q = self.normalize();
        let angle = 2.0 * q.w.clamp(-1.0, 1.0).acos();
        let s = (1.0 - q.w * q.w).max(0.0).sqrt();
        if s < 1e-9 {
            (Vec3::new(1.0, 0.0, 0.0), angle)
        } else {
            (Vec3::new(q.x / s, q.y / s, q.z / s), angle)
        }
    }

    pub fn conjugate(&self) -> Self {
        Self {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    pub fn dot(&self, other: &Quat) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// A zero quaternion stays zero rather than turning into NaNs
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return Self::new(0.0, 0.0, 0.0, 0.0);
        }
        let inv = 1.0 / mag;
        Self {
            w: self.w * inv,
            x: self.x * inv,
            y: self.y * inv,
            z: self.z * inv,
        }
    }

    /// Rotates `v` by the sandwich product `q v q*`
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        let p = Quat::new(0.0, v.x, v.y, v.z);
        let r = *self * p * self.conjugate();
        Vec3::new(r.x, r.y, r.z)
    }

    /// Spherical interpolation taking the short way round. Falls back to a
    /// normalized lerp when the two rotations are nearly parallel.
    pub fn slerp(&self, other: &Quat, t: f64) -> Self {
        let q0 = self.normalize();
        let mut q1 = other.normalize();
        let mut cos_half_theta = q0.dot(&q1);

        if cos_half_theta < 0.0 {
            q1 = Quat::new(-q1.w, -q1.x, -q1.y, -q1.z);
            cos_half_theta = -cos_half_theta;
        }
        if cos_half_theta >= 1.0 {
            return q0;
        }

        let half_theta = cos_half_theta.acos();
        let sin_half_theta = half_theta.sin();

        if sin_half_theta.abs() < 0.001 {
            return Quat::new(
                lerp(q0.w, q1.w, t),
                lerp(q0.x, q1.x, t),
                lerp(q0.y, q1.y, t),
                lerp(q0.z, q1.z, t),
            )
            .normalize();
        }

        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let ratio_b = (t * half_theta).sin() / sin_half_theta;
        Quat::new(
            q0.w * ratio_a + q1.w * ratio_b,
            q0.x * ratio_a + q1.x * ratio_b,
            q0.y * ratio_a + q1.y * ratio_b,
            q0.z * ratio_a + q1.z * ratio_b,
        )
        .normalize()
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }

    pub fn from_array(a: [f64; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }
}

impl Mul<Quat> for Quat {
    type Output = Quat;
    fn mul(self, other: Quat) -> Quat {
        Quat {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }
}

impl From<na::UnitQuaternion<f64>> for Quat {
    fn from(q: na::UnitQuaternion<f64>) -> Self {
        Quat::new(q.w, q.i, q.j, q.k)
    }
}

impl From<Quat> for na::UnitQuaternion<f64> {
    fn from(q: Quat) -> Self {
        na::UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOLERANCE: f64 = 1e-10;

    fn random_unit_quat(rng: &mut StdRng) -> Quat {
        Quat::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .normalize()
    }

    fn random_vec(rng: &mut StdRng) -> Vec3 {
        Vec3::new(
            rng.gen_range(-50.0..50.0),
            rng.gen_range(-50.0..50.0),
            rng.gen_range(-50.0..50.0),
        )
    }

    #[test]
    fn rotate_then_conjugate_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let q = random_unit_quat(&mut rng);
            let v = random_vec(&mut rng);
            let back = q.conjugate().rotate(&q.rotate(&v));
            assert_relative_eq!(back, v, epsilon = 1e-9);
        }
    }

    #[test]
    fn rotate_matches_nalgebra() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let q = random_unit_quat(&mut rng);
            let v = random_vec(&mut rng);
            let oracle: na::UnitQuaternion<f64> = q.into();
            assert_relative_eq!(q.rotate(&v), oracle * v, epsilon = 1e-9);
        }
    }

    #[test]
    fn multiply_matches_nalgebra() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = random_unit_quat(&mut rng);
        let b = random_unit_quat(&mut rng);
        let ours = a * b;
        let theirs: Quat = (na::UnitQuaternion::from(a) * na::UnitQuaternion::from(b)).into();
        // same rotation, possibly opposite sign
        assert_relative_eq!(ours.dot(&theirs).abs(), 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn axis_angle_quarter_turn() {
        let q = Quat::from_axis_angle(&UP, FRAC_PI_2);
        // a quarter turn about up carries forward (+z) onto +x
        assert_relative_eq!(q.rotate(&FORWARD), Vec3::new(1.0, 0.0, 0.0), epsilon = TOLERANCE);
        let (axis, angle) = q.to_axis_angle();
        assert_relative_eq!(axis, UP, epsilon = TOLERANCE);
        assert_relative_eq!(angle, FRAC_PI_2, epsilon = TOLERANCE);
    }

    #[test]
    fn normalize_zero_stays_zero() {
        let z = Quat::new(0.0, 0.0, 0.0, 0.0).normalize();
        assert_eq!(z, Quat::new(0.0, 0.0, 0.0, 0.0));
        let q = Quat::new(2.0, 0.0, 0.0, 0.0).normalize();
        assert_eq!(q, Quat::IDENTITY);
    }

    #[test]
    fn slerp_endpoints_and_midpoint() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(&FORWARD, PI / 2.0);
        assert_relative_eq!(a.slerp(&b, 0.0).dot(&a), 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(a.slerp(&b, 1.0).dot(&b), 1.0, epsilon = TOLERANCE);
        let mid = a.slerp(&b, 0.5);
        let expected = Quat::from_axis_angle(&FORWARD, PI / 4.0);
        assert_relative_eq!(mid.dot(&expected), 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn slerp_takes_short_path() {
        let a = Quat::from_axis_angle(&UP, 0.1);
        let b = Quat::from_axis_angle(&UP, 0.3);
        let b_flipped = Quat::new(-b.w, -b.x, -b.y, -b.z);
        let mid = a.slerp(&b_flipped, 0.5);
        let expected = Quat::from_axis_angle(&UP, 0.2);
        assert_relative_eq!(mid.dot(&expected).abs(), 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn slerp_small_steps_stay_unit() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let a = random_unit_quat(&mut rng);
            let b = a * Quat::from_axis_angle(&FORWARD, rng.gen_range(0.003..0.05));
            let q = a.slerp(&b, rng.gen_range(0.0..1.0));
            assert_relative_eq!(q.magnitude(), 1.0, epsilon = 1e-14);
        }
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(&FORWARD, 0.025);
        assert_relative_eq!(
            a.slerp(&b, 0.5).dot(&Quat::from_axis_angle(&FORWARD, 0.0125)),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn slerp_nearly_parallel_interpolates() {
        let a = Quat::from_axis_angle(&UP, 0.0);
        let b = Quat::from_axis_angle(&UP, 0.001);
        let q = a.slerp(&b, 0.25);
        assert_relative_eq!(q.magnitude(), 1.0, epsilon = TOLERANCE);
        let (_, angle) = q.to_axis_angle();
        assert_relative_eq!(angle, 0.00025, epsilon = 1e-6);
    }

    #[test]
    fn projections() {
        let a = Vec3::new(3.0, 4.0, 0.0);
        let b = Vec3::new(2.0, 0.0, 0.0);
        assert_relative_eq!(vector_projection(&a, &b), Vec3::new(3.0, 0.0, 0.0));
        assert_relative_eq!(scaler_projection(&a, &b), 3.0);
    }

    #[test]
    fn right_is_negative_x() {
        assert_eq!(RIGHT, Vec3::new(-1.0, 0.0, 0.0));
        // forward x up gives -x, which is what the format calls right
        assert_relative_eq!(FORWARD.cross(&UP), RIGHT);
    }
}
