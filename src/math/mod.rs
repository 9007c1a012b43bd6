//! Geometry helpers shared by perturbation, repositioning and scoring

use nalgebra::Vector3;
use rand::Rng;

/// Return `v` scaled to unit length, or `v` itself when its magnitude is exactly zero
pub fn normalize(v: &Vector3<f64>) -> Vector3<f64> {
    let magnitude = v.norm();
    if magnitude == 0.0 {
        *v
    } else {
        v / magnitude
    }
}

/// Euclidean distance between two points
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b).norm()
}

/// Rotate `point` about `axis` (through the origin) by `theta` radians.
///
/// Uses Rodrigues' rotation formula:
/// `p cos(theta) + (k x p) sin(theta) + k (k . p)(1 - cos(theta))`.
///
/// `axis` is expected to be a unit vector. It is not normalized here; a
/// non-unit axis yields a transform that also scales the point.
pub fn rotate_around_axis(point: &Vector3<f64>, axis: &Vector3<f64>, theta: f64) -> Vector3<f64> {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let dot = axis.dot(point);

    point * cos_theta + axis.cross(point) * sin_theta + axis * (dot * (1.0 - cos_theta))
}

/// Pick a random rotation axis: three independent uniforms in [-1, 1], normalized
pub fn random_unit_axis<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    let axis = Vector3::new(
        rng.gen::<f64>() * 2.0 - 1.0,
        rng.gen::<f64>() * 2.0 - 1.0,
        rng.gen::<f64>() * 2.0 - 1.0,
    );
    normalize(&axis)
}
