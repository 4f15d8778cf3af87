// Rotation about one principal axis, used by the rotated-instance wrapper.
//
// Object-to-world is the right-handed rotation by the given angle; the
// inverse is its transpose since the matrix is orthonormal.

use crate::{Aabb, DMat3, Point3, Vec3};

/// One of the three principal axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis (0=X, 1=Y, 2=Z).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A cached rotation and its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    to_world: DMat3,
    to_local: DMat3,
}

impl Rotation {
    /// Rotation by `degrees` about `axis`.
    pub fn new(axis: Axis, degrees: f64) -> Self {
        let radians = degrees.to_radians();
        let to_world = match axis {
            Axis::X => DMat3::from_rotation_x(radians),
            Axis::Y => DMat3::from_rotation_y(radians),
            Axis::Z => DMat3::from_rotation_z(radians),
        };
        Self {
            to_world,
            to_local: to_world.transpose(),
        }
    }

    /// Map a world-space vector or point into object space.
    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        self.to_local * v
    }

    /// Map an object-space vector or point back into world space.
    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.to_world * v
    }

    /// World-space box enclosing an object-space box after rotation.
    ///
    /// Computes the bounding box of all 8 rotated corners.
    pub fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let mut lo = Point3::splat(f64::INFINITY);
        let mut hi = Point3::splat(f64::NEG_INFINITY);

        for corner in aabb.corners() {
            let rotated = self.to_world(corner);
            lo = lo.min(rotated);
            hi = hi.max(rotated);
        }

        Aabb::from_points(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let rot = Rotation::new(Axis::Y, 90.0);
        // Right-handed: +X goes to -Z about +Y.
        assert_close(rot.to_world(Vec3::X), Vec3::new(0.0, 0.0, -1.0));
        assert_close(rot.to_world(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let rot = Rotation::new(Axis::Z, 90.0);
        assert_close(rot.to_world(Vec3::X), Vec3::Y);
    }

    #[test]
    fn test_rotation_x_quarter_turn() {
        let rot = Rotation::new(Axis::X, 90.0);
        assert_close(rot.to_world(Vec3::Y), Vec3::Z);
        assert_close(rot.to_world(Vec3::Z), -Vec3::Y);
    }

    #[test]
    fn test_negative_angle_is_inverse() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let p = Point3::new(1.0, -2.0, 0.5);
            let forward = Rotation::new(axis, 30.0);
            let back = Rotation::new(axis, -30.0);
            assert_close(back.to_world(p), forward.to_local(p));
        }
    }

    #[test]
    fn test_rotation_round_trip() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let rot = Rotation::new(axis, 37.5);
            let p = Point3::new(5.0, 3.0, -2.0);
            assert_close(rot.to_local(rot.to_world(p)), p);
            assert_close(rot.to_world(rot.to_local(p)), p);
        }
    }

    #[test]
    fn test_transform_aabb_quarter_turn_swaps_extents() {
        let rot = Rotation::new(Axis::Z, 90.0);
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0));
        let rotated = rot.transform_aabb(&aabb);

        assert!((rotated.x.min - -1.0).abs() < 1e-9);
        assert!((rotated.x.max - 0.0).abs() < 1e-9);
        assert!((rotated.y.min - 0.0).abs() < 1e-9);
        assert!((rotated.y.max - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_aabb_contains_rotated_corners() {
        let rot = Rotation::new(Axis::X, 30.0);
        let aabb = Aabb::from_points(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let rotated = rot.transform_aabb(&aabb);

        for corner in aabb.corners() {
            let p = rot.to_world(corner);
            for axis in 0..3 {
                assert!(rotated.axis_interval(axis).expand(1e-9).contains(p[axis]));
            }
        }
    }

    #[test]
    fn test_axis_index() {
        let indices: Vec<usize> = [Axis::X, Axis::Y, Axis::Z].map(Axis::index).to_vec();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
