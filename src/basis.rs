//! The fixed icosahedral basis shared by every fit.
//!
//! Vertices come in three groups of four, one group per coordinate plane:
//! `(±Ks, ±Kt, 0)`, `(0, ±Ks, ±Kt)` and `(±Kt, 0, ±Ks)`. Each index bit within
//! a group is the sign of one axis: x/y for the first group, y/z for the second
//! and z/x for the third (low bit first). The antipode of vertex `i` is `i ^ 3`.

use glam::Vec3;

pub const BASIS_COUNT: usize = 12;

const PHI: f32 = 0.618_033_988_749_894_8;
// sqrt(1 + PHI^2), folded so the table can stay const.
const LENGTH: f32 = 1.175_570_504_584_946_3;
const KS: f32 = 1.0 / LENGTH;
const KT: f32 = PHI / LENGTH;

pub static BASIS_DIRECTIONS: [Vec3; BASIS_COUNT] = [
    Vec3::new(KS, KT, 0.0),
    Vec3::new(-KS, KT, 0.0),
    Vec3::new(KS, -KT, 0.0),
    Vec3::new(-KS, -KT, 0.0),
    Vec3::new(0.0, KS, KT),
    Vec3::new(0.0, -KS, KT),
    Vec3::new(0.0, KS, -KT),
    Vec3::new(0.0, -KS, -KT),
    Vec3::new(KT, 0.0, KS),
    Vec3::new(KT, 0.0, -KS),
    Vec3::new(-KT, 0.0, KS),
    Vec3::new(-KT, 0.0, -KS),
];

/// Sign pattern of a direction. Zero components count as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Octant {
    bits: u8,
}

impl Octant {
    pub fn of(direction: Vec3) -> Self {
        let x = (direction.x < 0.0) as u8;
        let y = (direction.y < 0.0) as u8;
        let z = (direction.z < 0.0) as u8;
        Self { bits: x | (y << 1) | (z << 2) }
    }

    pub fn from_bits(bits: u8) -> Self {
        Self { bits: bits & 0b111 }
    }

    pub fn all() -> impl Iterator<Item = Octant> {
        (0u8..8).map(Octant::from_bits)
    }

    pub fn bits(self) -> u8 {
        self.bits
    }

    pub fn flipped(self) -> Self {
        Self { bits: !self.bits & 0b111 }
    }

    /// Unit direction through the centre of the octant.
    pub fn center(self) -> Vec3 {
        let sign = |bit: u8| if self.bits & bit != 0 { -1.0 } else { 1.0 };
        Vec3::new(sign(0b001), sign(0b010), sign(0b100)).normalize()
    }

    fn negative(self) -> (usize, usize, usize) {
        (
            (self.bits & 0b001) as usize,
            ((self.bits >> 1) & 1) as usize,
            ((self.bits >> 2) & 1) as usize,
        )
    }
}

pub fn antipode(index: usize) -> usize {
    index ^ 0b11
}

/// Indices of the six basis vertices used for hemisphere-limited evaluation
/// around `direction`.
///
/// The first three form the icosahedron face that owns the direction's
/// octant. The last three are the neighbouring vertices that share the
/// octant's sign on one axis and flip it on the other.
pub fn nearest_six(direction: Vec3) -> [usize; 6] {
    nearest_six_in(Octant::of(direction))
}

pub fn nearest_six_in(octant: Octant) -> [usize; 6] {
    let (x, y, z) = octant.negative();
    let (fx, fy, fz) = (1 - x, 1 - y, 1 - z);
    [
        y * 2 + x,
        4 + z * 2 + y,
        8 + x * 2 + z,
        8 + fx * 2 + z,
        fy * 2 + x,
        4 + fz * 2 + y,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn directions_are_unit_length() {
        for dir in BASIS_DIRECTIONS.iter() {
            assert!((dir.length() - 1.0).abs() < 1e-5, "{dir:?} is not normalized");
        }
    }

    #[test]
    fn pairwise_dots_take_two_values() {
        let expected = 1.0 / 5.0f32.sqrt();
        for i in 0..BASIS_COUNT {
            for j in 0..BASIS_COUNT {
                if i == j {
                    continue;
                }
                let dot = BASIS_DIRECTIONS[i].dot(BASIS_DIRECTIONS[j]).abs();
                if j == antipode(i) {
                    assert!((dot - 1.0).abs() < 1e-5);
                } else {
                    assert!((dot - expected).abs() < 1e-5, "dot({i}, {j}) = {dot}");
                }
            }
        }
    }

    #[test]
    fn antipode_negates_direction() {
        for i in 0..BASIS_COUNT {
            let sum = BASIS_DIRECTIONS[i] + BASIS_DIRECTIONS[antipode(i)];
            assert!(sum.length() < 1e-6);
        }
    }

    #[test]
    fn nearest_six_is_distinct_in_every_octant() {
        for octant in Octant::all() {
            let indices = nearest_six_in(octant);
            let unique: HashSet<_> = indices.iter().copied().collect();
            assert_eq!(unique.len(), 6, "octant {:03b} repeats an index", octant.bits());
            assert!(indices.iter().all(|&i| i < BASIS_COUNT));
        }
    }

    #[test]
    fn nearest_six_flips_to_antipodes() {
        for octant in Octant::all() {
            let forward = nearest_six_in(octant);
            let flipped = nearest_six_in(octant.flipped());
            for (a, b) in forward.iter().zip(flipped.iter()) {
                assert_eq!(antipode(*a), *b);
            }
        }
    }

    #[test]
    fn first_three_are_closest_to_octant_center() {
        for octant in Octant::all() {
            let center = octant.center();
            let indices = nearest_six_in(octant);
            let mut dots: Vec<f32> = BASIS_DIRECTIONS.iter().map(|d| d.dot(center)).collect();
            dots.sort_by(|a, b| b.total_cmp(a));
            let face_min =
                indices[..3].iter().map(|&i| BASIS_DIRECTIONS[i].dot(center)).fold(f32::MAX, f32::min);
            assert!((face_min - dots[2]).abs() < 1e-6);
            assert!(face_min > dots[3]);
        }
    }

    #[test]
    fn indices_match_octant_signs() {
        for octant in Octant::all() {
            let center = octant.center();
            let indices = nearest_six_in(octant);
            for &i in &indices[..3] {
                let dir = BASIS_DIRECTIONS[i];
                for axis in 0..3 {
                    assert!(dir[axis] == 0.0 || dir[axis].signum() == center[axis].signum());
                }
            }
        }
    }

    #[test]
    fn zero_components_count_as_positive() {
        assert_eq!(Octant::of(Vec3::ZERO), Octant::from_bits(0));
        assert_eq!(Octant::of(Vec3::new(0.0, -1.0, 0.0)), Octant::from_bits(0b010));
        assert_eq!(nearest_six(Vec3::X), nearest_six_in(Octant::from_bits(0)));
    }
}
