//! # Value Noise Implementation
//!
//! Smooth, deterministic 3D noise for organic variation in block models.
//!
//! ## Algorithm
//!
//! 1. Scale the sample point and find the unit lattice cell containing it
//! 2. Hash each of the 8 cell corners to a value in [-1, 1]
//! 3. Trilinearly interpolate with smoothstep easing `t²(3 − 2t)`
//! 4. Remap to [0, 1]
//!
//! Corner values are shared between neighbouring cells, so the field has no
//! seams at cell boundaries. That matters because it is sampled at closely
//! spaced block centroids.
//!
//! ## Determinism Guarantee
//!
//! The output depends only on the seed and the input coordinates. There is
//! no permutation table or recorded state; the seed space is the full `u64`.

use orebody_core::ModelSeed;

/// Seed used by [`noise3d`].
const DEFAULT_NOISE_SEED: u64 = 0x6E6F_6973_6533_6421;

/// Samples the shared value-noise field at `(x, y, z) * scale`.
///
/// # Returns
///
/// A value in the range [0, 1].
#[must_use]
pub fn noise3d(x: f64, y: f64, z: f64, scale: f64) -> f64 {
    sample_value_noise(DEFAULT_NOISE_SEED, x * scale, y * scale, z * scale)
}

/// Seeded 3D value noise.
///
/// # Example
///
/// ```rust,ignore
/// let noise = ValueNoise::new(ModelSeed::new(42));
///
/// let value = noise.sample(100.5, 200.3, -40.0, 0.05);
/// assert!((0.0..=1.0).contains(&value));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueNoise {
    seed: u64,
}

impl ValueNoise {
    /// Creates a noise field from a seed.
    #[must_use]
    pub const fn new(seed: ModelSeed) -> Self {
        Self { seed: seed.value() }
    }

    /// Samples the field at `(x, y, z) * scale`.
    ///
    /// # Returns
    ///
    /// A value in the range [0, 1].
    #[inline]
    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64, scale: f64) -> f64 {
        sample_value_noise(self.seed, x * scale, y * scale, z * scale)
    }

    /// Multiplicative jitter factor `1 + (n − 0.5) · amplitude`.
    ///
    /// With `amplitude = 0.2` the factor lies in [0.9, 1.1].
    #[inline]
    #[must_use]
    pub fn jitter(&self, x: f64, y: f64, z: f64, scale: f64, amplitude: f64) -> f64 {
        1.0 + (self.sample(x, y, z, scale) - 0.5) * amplitude
    }

    /// Raw seed of this field.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

fn sample_value_noise(seed: u64, x: f64, y: f64, z: f64) -> f64 {
    let (ix, tx) = split_cell(x);
    let (iy, ty) = split_cell(y);
    let (iz, tz) = split_cell(z);

    let sx = smoothstep(tx);
    let sy = smoothstep(ty);
    let sz = smoothstep(tz);

    let c000 = lattice_value(seed, ix, iy, iz);
    let c100 = lattice_value(seed, ix.wrapping_add(1), iy, iz);
    let c010 = lattice_value(seed, ix, iy.wrapping_add(1), iz);
    let c110 = lattice_value(seed, ix.wrapping_add(1), iy.wrapping_add(1), iz);
    let c001 = lattice_value(seed, ix, iy, iz.wrapping_add(1));
    let c101 = lattice_value(seed, ix.wrapping_add(1), iy, iz.wrapping_add(1));
    let c011 = lattice_value(seed, ix, iy.wrapping_add(1), iz.wrapping_add(1));
    let c111 = lattice_value(seed, ix.wrapping_add(1), iy.wrapping_add(1), iz.wrapping_add(1));

    let x00 = lerp(c000, c100, sx);
    let x10 = lerp(c010, c110, sx);
    let x01 = lerp(c001, c101, sx);
    let x11 = lerp(c011, c111, sx);

    let y0 = lerp(x00, x10, sy);
    let y1 = lerp(x01, x11, sy);

    let value = lerp(y0, y1, sz);
    ((value + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Splits a coordinate into its lattice cell and fractional offset.
#[inline]
fn split_cell(v: f64) -> (i64, f64) {
    let floor = v.floor();
    // Saturating cast: astronomically large inputs collapse onto one cell.
    let cell = floor as i64;
    let t = (v - floor).clamp(0.0, 1.0);
    (cell, if t.is_nan() { 0.0 } else { t })
}

/// Hashes a lattice corner to a value in [-1, 1).
#[inline]
fn lattice_value(seed: u64, ix: i64, iy: i64, iz: i64) -> f64 {
    let h = mix(seed, ix as u64, iy as u64, iz as u64);
    unit_from_bits(h) * 2.0 - 1.0
}

/// Integer mixer: per-axis odd multipliers, XOR, rotate, xor-shift avalanche.
#[inline]
fn mix(seed: u64, a: u64, b: u64, c: u64) -> u64 {
    let mut h = seed
        ^ a.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ b.wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ c.wrapping_mul(0x1656_67B1_9E37_79F9);
    h = h.rotate_left(31);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    h = h.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    h ^ (h >> 33)
}

/// Maps the top 53 bits of a hash to [0, 1).
#[inline]
fn unit_from_bits(h: u64) -> f64 {
    (h >> 11) as f64 / (1u64 << 53) as f64
}

/// Order-independent per-block random draw in [0, 1).
///
/// `channel` selects independent streams for the same block (e.g. one for
/// the rock type, one for the density jitter).
#[inline]
#[must_use]
pub fn hash_unit(seed: u64, i: u32, j: u32, k: u32, channel: u32) -> f64 {
    let salted = seed ^ u64::from(channel).wrapping_mul(0xD6E8_FEB8_6659_FD93);
    unit_from_bits(mix(salted, u64::from(i), u64::from(j), u64::from(k)))
}

/// Smoothstep easing `t²(3 − 2t)` on a clamped input.
#[inline]
#[must_use]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation.
#[inline]
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let noise1 = ValueNoise::new(ModelSeed::new(12345));
        let noise2 = ValueNoise::new(ModelSeed::new(12345));

        // Same seed should produce identical results
        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let y = f64::from(i) * 0.17;
            let z = f64::from(i) * -0.23;
            assert_eq!(
                noise1.sample(x, y, z, 1.0),
                noise2.sample(x, y, z, 1.0),
                "Noise should be deterministic"
            );
        }
    }

    #[test]
    fn test_different_seeds_different_results() {
        let noise1 = ValueNoise::new(ModelSeed::new(1));
        let noise2 = ValueNoise::new(ModelSeed::new(2));

        let v1 = noise1.sample(100.3, 100.7, -3.1, 1.0);
        let v2 = noise2.sample(100.3, 100.7, -3.1, 1.0);

        assert_ne!(v1, v2, "Different seeds should produce different results");
    }

    #[test]
    fn test_range() {
        // Sample many points and verify range
        for i in 0..10000 {
            let f = f64::from(i);
            let x = f * 0.1 - 500.0;
            let y = f * 0.13 - 650.0;
            let z = f * -0.07;
            let value = noise3d(x, y, z, 0.37);

            assert!(
                (0.0..=1.0).contains(&value),
                "Value {value} out of range at ({x}, {y}, {z})"
            );
        }
    }

    #[test]
    fn test_extreme_inputs_stay_in_range() {
        for v in [1e300, -1e300, 1e18, -1e18, 0.0, -0.0, f64::MIN_POSITIVE] {
            let value = noise3d(v, -v, v * 0.5, 1.0);
            assert!((0.0..=1.0).contains(&value), "Value {value} out of range for {v}");
        }
    }

    #[test]
    fn test_continuity() {
        let noise = ValueNoise::new(ModelSeed::new(42));

        // Sample adjacent points - should be similar
        let (x, y, z) = (100.25, 100.75, -20.5);
        let delta = 0.001;

        let v1 = noise.sample(x, y, z, 1.0);
        let v2 = noise.sample(x + delta, y, z, 1.0);
        let v3 = noise.sample(x, y + delta, z, 1.0);
        let v4 = noise.sample(x, y, z + delta, 1.0);

        for (axis, v) in [("x", v2), ("y", v3), ("z", v4)] {
            let diff = (v1 - v).abs();
            assert!(diff < 0.01, "Noise should be continuous along {axis}: diff = {diff}");
        }
    }

    #[test]
    fn test_no_seams_at_cell_boundaries() {
        let noise = ValueNoise::new(ModelSeed::new(7));

        // Straddle integer lattice planes on every axis
        for cell in -5..5 {
            let c = f64::from(cell);
            let eps = 1e-9;
            let below = noise.sample(c - eps, c + 0.3, c - 0.6, 1.0);
            let above = noise.sample(c + eps, c + 0.3, c - 0.6, 1.0);
            assert!((below - above).abs() < 1e-6, "Seam at x = {c}");

            let below = noise.sample(c + 0.4, c + 0.2, c - eps, 1.0);
            let above = noise.sample(c + 0.4, c + 0.2, c + eps, 1.0);
            assert!((below - above).abs() < 1e-6, "Seam at z = {c}");
        }
    }

    #[test]
    fn test_lattice_points_hit_corner_values() {
        // At integer points the interpolation collapses onto one corner
        let noise = ValueNoise::new(ModelSeed::new(99));
        let v = noise.sample(3.0, -2.0, 5.0, 1.0);
        let corner = (lattice_value(99, 3, -2, 5) + 1.0) * 0.5;
        assert!((v - corner).abs() < 1e-12);
    }

    #[test]
    fn test_hash_unit_channels_independent() {
        let a = hash_unit(5, 1, 2, 3, 0);
        let b = hash_unit(5, 1, 2, 3, 1);
        let a_again = hash_unit(5, 1, 2, 3, 0);

        assert_eq!(a, a_again);
        assert_ne!(a, b);
        assert!((0.0..1.0).contains(&a));
    }

    #[test]
    fn test_hash_unit_is_roughly_uniform() {
        let mut buckets = [0u32; 4];
        for i in 0..40 {
            for j in 0..50 {
                let u = hash_unit(11, i, j, 0, 0);
                buckets[(u * 4.0) as usize] += 1;
            }
        }
        // 2000 draws, 500 expected per bucket
        for count in buckets {
            assert!((400..600).contains(&count), "Skewed bucket: {buckets:?}");
        }
    }

    #[test]
    fn test_smoothstep_shape() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-3.0), 0.0);
        assert_eq!(smoothstep(4.0), 1.0);
        assert!(smoothstep(0.1) < 0.1);
    }
}
