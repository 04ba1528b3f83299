//! # Orientation Module
//!
//! Maps pattern offsets from their local frame into world grid indices.
//!
//! Only the 24 proper rotations that carry the integer lattice onto itself are
//! representable. They are enumerated once from every combination of 90°
//! Euler turns (64 combinations, 24 distinct rotations) and stored in a lazily
//! built table, so a [`Rotation`] is just an index into that table and can
//! never hold an arbitrary angle.
//!
//! ## Rounding
//!
//! Rotating with a quaternion leaves values like `0.9999999` or `-1e-17`.
//! Each component is rounded half away from zero (`f64::round`) to land back
//! on the lattice. Changing this policy changes which cells a pattern claims.

use cgmath::{Deg, Euler, Point3, Quaternion, Vector3};
use lazy_static::lazy_static;

use super::axis::Axis;

/// Number of distinct lattice-preserving rotations.
pub const ROTATION_COUNT: usize = 24;

/// Tolerance used when deciding whether an Euler angle is a multiple of 90°.
const RIGHT_ANGLE_TOLERANCE: f64 = 1e-6;

/// One entry of the rotation table.
struct LatticeRotation {
    /// The Euler angles (degrees) this rotation was first produced from
    euler: [i32; 3],
    /// The rotation as a quaternion
    quaternion: Quaternion<f64>,
    /// Images of the X, Y and Z unit vectors, used to tell rotations apart
    basis: [Vector3<i32>; 3],
}

lazy_static! {
    static ref LATTICE_ROTATIONS: Vec<LatticeRotation> = enumerate_lattice_rotations();
}

fn euler_quaternion(x: f64, y: f64, z: f64) -> Quaternion<f64> {
    Quaternion::from(Euler {
        x: Deg(x),
        y: Deg(y),
        z: Deg(z),
    })
}

fn lattice_basis(quaternion: Quaternion<f64>) -> [Vector3<i32>; 3] {
    Axis::all().map(|axis| round_to_lattice(quaternion * axis.unit_f64()))
}

fn enumerate_lattice_rotations() -> Vec<LatticeRotation> {
    let mut rotations: Vec<LatticeRotation> = Vec::with_capacity(ROTATION_COUNT);

    for x in 0..4 {
        for y in 0..4 {
            for z in 0..4 {
                let euler = [x * 90, y * 90, z * 90];
                let quaternion =
                    euler_quaternion(euler[0] as f64, euler[1] as f64, euler[2] as f64);
                let basis = lattice_basis(quaternion);

                if rotations.iter().all(|rotation| rotation.basis != basis) {
                    rotations.push(LatticeRotation {
                        euler,
                        quaternion,
                        basis,
                    });
                }
            }
        }
    }

    rotations
}

/// A rotation that maps the integer lattice to itself.
///
/// Wraps an index into the table of the 24 axis-aligned rotations. Index 0 is
/// the identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

impl Rotation {
    /// The rotation that leaves every offset unchanged.
    pub const IDENTITY: Rotation = Rotation(0);

    /// Iterates over all 24 lattice rotations, identity first.
    pub fn all() -> impl Iterator<Item = Rotation> {
        (0..ROTATION_COUNT as u8).map(Rotation)
    }

    /// Returns the rotation at `index` in the rotation table, if there is one.
    pub fn from_index(index: usize) -> Option<Rotation> {
        (index < ROTATION_COUNT).then_some(Rotation(index as u8))
    }

    /// Position of this rotation in the rotation table.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Builds a rotation from Euler angles in degrees.
    ///
    /// # Returns
    /// `None` unless every angle is a (finite) multiple of 90°, since any other
    /// rotation would move lattice points off the lattice.
    pub fn from_euler_degrees(x: f64, y: f64, z: f64) -> Option<Rotation> {
        let is_right_angle =
            |a: f64| a.is_finite() && ((a / 90.0).round() * 90.0 - a).abs() < RIGHT_ANGLE_TOLERANCE;
        if !(is_right_angle(x) && is_right_angle(y) && is_right_angle(z)) {
            return None;
        }

        let basis = lattice_basis(euler_quaternion(x, y, z));
        LATTICE_ROTATIONS
            .iter()
            .position(|rotation| rotation.basis == basis)
            .map(|index| Rotation(index as u8))
    }

    /// Picks one of the 24 rotations uniformly.
    pub fn random(rng: &mut fastrand::Rng) -> Rotation {
        Rotation(rng.u8(0..ROTATION_COUNT as u8))
    }

    /// The quaternion for this rotation.
    pub fn quaternion(self) -> Quaternion<f64> {
        LATTICE_ROTATIONS[self.index()].quaternion
    }

    /// Euler angles, in degrees, that produce this rotation.
    pub fn euler_degrees(self) -> [i32; 3] {
        LATTICE_ROTATIONS[self.index()].euler
    }

    /// Rotates an integer offset and snaps the result back onto the lattice.
    pub fn rotate(self, offset: Vector3<i32>) -> Vector3<i32> {
        let offset = Vector3::new(offset.x as f64, offset.y as f64, offset.z as f64);
        round_to_lattice(self.quaternion() * offset)
    }
}

/// Rounds each component to the nearest integer, halves away from zero.
pub fn round_to_lattice(vector: Vector3<f64>) -> Vector3<i32> {
    Vector3::new(
        vector.x.round() as i32,
        vector.y.round() as i32,
        vector.z.round() as i32,
    )
}

/// Checks whether an index lies inside a grid of the given size.
///
/// # Returns
/// `true` when `0 <= index < size` on every axis.
pub fn check_bounds(index: Point3<i32>, size: Vector3<i32>) -> bool {
    (0..size.x).contains(&index.x) && (0..size.y).contains(&index.y) && (0..size.z).contains(&index.z)
}

/// Orients a local pattern offset into the world grid.
///
/// The offset is rotated, rounded onto the lattice and translated by the
/// anchor.
///
/// # Arguments
/// * `local` - The offset relative to the pattern's zero offset
/// * `anchor` - The world index the zero offset is placed on
/// * `rotation` - The rotation applied to the pattern
/// * `size` - The grid dimensions
///
/// # Returns
/// The world index, or `None` when it falls outside the grid.
pub fn orient_index(
    local: Vector3<i32>,
    anchor: Point3<i32>,
    rotation: Rotation,
    size: Vector3<i32>,
) -> Option<Point3<i32>> {
    let world = anchor + rotation.rotate(local);
    check_bounds(world, size).then_some(world)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_table_has_24_distinct_rotations() {
        assert_eq!(LATTICE_ROTATIONS.len(), ROTATION_COUNT);
        let bases: HashSet<_> = Rotation::all()
            .map(|rotation| {
                let b = LATTICE_ROTATIONS[rotation.index()].basis;
                [b[0].x, b[0].y, b[0].z, b[1].x, b[1].y, b[1].z, b[2].x, b[2].y, b[2].z]
            })
            .collect();
        assert_eq!(bases.len(), ROTATION_COUNT);
    }

    #[test]
    fn test_identity_is_first() {
        assert_eq!(Rotation::IDENTITY.euler_degrees(), [0, 0, 0]);
        let offset = Vector3::new(3, -1, 2);
        assert_eq!(Rotation::IDENTITY.rotate(offset), offset);
    }

    #[test]
    fn test_zero_offset_maps_to_anchor_for_every_rotation() {
        let size = Vector3::new(4, 4, 4);
        let anchor = Point3::new(1, 2, 3);
        for rotation in Rotation::all() {
            assert_eq!(
                orient_index(Vector3::new(0, 0, 0), anchor, rotation, size),
                Some(anchor)
            );
        }
    }

    #[test]
    fn test_rotations_preserve_length() {
        let offset = Vector3::new(3, 0, 0);
        for rotation in Rotation::all() {
            let rotated = rotation.rotate(offset);
            assert_eq!(rotated.x.abs() + rotated.y.abs() + rotated.z.abs(), 3);
        }
    }

    #[test]
    fn test_every_rotation_of_an_axis_step_is_reached() {
        let images: HashSet<_> = Rotation::all()
            .map(|rotation| {
                let v = rotation.rotate(Vector3::new(1, 0, 0));
                (v.x, v.y, v.z)
            })
            .collect();
        assert_eq!(images.len(), 6);
    }

    #[test]
    fn test_from_euler_degrees() {
        assert_eq!(Rotation::from_euler_degrees(0.0, 0.0, 0.0), Some(Rotation::IDENTITY));
        assert_eq!(Rotation::from_euler_degrees(360.0, -360.0, 0.0), Some(Rotation::IDENTITY));
        assert!(Rotation::from_euler_degrees(45.0, 0.0, 0.0).is_none());
        assert!(Rotation::from_euler_degrees(f64::NAN, 0.0, 0.0).is_none());

        let quarter = Rotation::from_euler_degrees(0.0, 0.0, 90.0).unwrap();
        assert_eq!(quarter.rotate(Vector3::new(1, 0, 0)), Vector3::new(0, 1, 0));

        let negative = Rotation::from_euler_degrees(0.0, 0.0, -90.0).unwrap();
        assert_eq!(negative.rotate(Vector3::new(1, 0, 0)), Vector3::new(0, -1, 0));
    }

    #[test]
    fn test_from_index_bounds() {
        assert_eq!(Rotation::from_index(23).map(Rotation::index), Some(23));
        assert!(Rotation::from_index(ROTATION_COUNT).is_none());
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to_lattice(Vector3::new(0.5, -0.5, 1.49)), Vector3::new(1, -1, 1));
        assert_eq!(round_to_lattice(Vector3::new(-1e-17, 0.9999999, -2.5)), Vector3::new(0, 1, -3));
    }

    #[test]
    fn test_orient_out_of_bounds() {
        let size = Vector3::new(4, 4, 4);
        let anchor = Point3::new(3, 0, 0);
        assert_eq!(orient_index(Vector3::new(1, 0, 0), anchor, Rotation::IDENTITY, size), None);
        assert!(check_bounds(Point3::new(3, 3, 3), size));
        assert!(!check_bounds(Point3::new(0, -1, 0), size));
    }

    #[test]
    fn test_random_stays_in_table() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..200 {
            assert!(Rotation::random(&mut rng).index() < ROTATION_COUNT);
        }
    }
}
