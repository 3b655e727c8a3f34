//! # Ore-Body Synthesis
//!
//! Continuous grade fields: each generator computes Cu/Au (or fluid
//! saturations) per block, then derives rock type, density and value.
//!
//! Randomized parameters are scaled to the model bounds and cell size, and
//! drawn once per call in a fixed order. Overriding one parameter therefore
//! leaves the draws of the others unchanged.

pub mod ellipsoid;
pub mod porphyry;
pub mod salt_dome;
pub mod vein;

pub use ellipsoid::{ellipsoid, grade_at, Ellipsoid, EllipsoidParams};
pub use porphyry::{porphyry, FaultTrace, Porphyry, PorphyryParams, PorphyryZone};
pub use salt_dome::{salt_dome, ReservoirEconomics, SaltDome, SaltDomeParams};
pub use vein::{vein, Vein, VeinParams};

use orebody_core::{ModelError, ModelResult, Vec3};

/// Orientation of an elongated body.
///
/// The long axis points along `azimuth` (degrees clockwise from north) and
/// plunges `plunge` degrees below horizontal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    sin_az: f64,
    cos_az: f64,
    sin_pl: f64,
    cos_pl: f64,
}

impl Orientation {
    /// Creates an orientation from angles in degrees.
    #[must_use]
    pub fn new(azimuth_deg: f64, plunge_deg: f64) -> Self {
        let (sin_az, cos_az) = azimuth_deg.to_radians().sin_cos();
        let (sin_pl, cos_pl) = plunge_deg.to_radians().sin_cos();
        Self {
            sin_az,
            cos_az,
            sin_pl,
            cos_pl,
        }
    }

    /// Expresses an offset in body coordinates: `x` across strike, `y` down
    /// the plunge, `z` normal to both.
    ///
    /// Rotates about vertical by the azimuth, then about the rotated
    /// horizontal axis by the plunge.
    #[inline]
    #[must_use]
    pub fn to_local(&self, offset: Vec3) -> Vec3 {
        let x1 = offset.x * self.cos_az - offset.y * self.sin_az;
        let y1 = offset.x * self.sin_az + offset.y * self.cos_az;
        let z1 = offset.z;

        let y2 = y1 * self.cos_pl - z1 * self.sin_pl;
        let z2 = y1 * self.sin_pl + z1 * self.cos_pl;
        Vec3::new(x1, y2, z2)
    }
}

/// Normalized ellipsoidal distance: 1 on the surface with the given semi-axes.
#[inline]
#[must_use]
pub fn ellipsoid_distance(local: Vec3, semi_axes: Vec3) -> f64 {
    let x = local.x / semi_axes.x;
    let y = local.y / semi_axes.y;
    let z = local.z / semi_axes.z;
    (x * x + y * y + z * z).sqrt()
}

pub(crate) fn check_positive(name: &'static str, value: Option<f64>) -> ModelResult<()> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(ModelError::invalid(name, format!("must be positive, got {v}"))),
        _ => Ok(()),
    }
}

pub(crate) fn check_non_negative(name: &'static str, value: Option<f64>) -> ModelResult<()> {
    match value {
        Some(v) if !(v.is_finite() && v >= 0.0) => {
            Err(ModelError::invalid(name, format!("must be non-negative, got {v}")))
        }
        _ => Ok(()),
    }
}

pub(crate) fn check_finite(name: &'static str, values: &[f64]) -> ModelResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::invalid(name, "must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_azimuth_direction_maps_to_long_axis() {
        for azimuth in [0.0, 30.0, 90.0, 217.0] {
            let orientation = Orientation::new(azimuth, 0.0);
            let local = orientation.to_local(orebody_core::math::azimuth_direction(azimuth));
            assert!(local.x.abs() < EPS && (local.y - 1.0).abs() < EPS && local.z.abs() < EPS);
        }
    }

    #[test]
    fn test_plunging_direction_maps_to_long_axis() {
        let (az, pl) = (40.0_f64, 25.0_f64);
        let h = orebody_core::math::azimuth_direction(az) * pl.to_radians().cos();
        let dir = Vec3::new(h.x, h.y, -pl.to_radians().sin());

        let local = Orientation::new(az, pl).to_local(dir);
        assert!(local.x.abs() < EPS);
        assert!((local.y - 1.0).abs() < EPS);
        assert!(local.z.abs() < EPS);
    }

    #[test]
    fn test_rotation_preserves_length() {
        let orientation = Orientation::new(123.0, 37.0);
        let v = Vec3::new(3.0, -4.0, 12.0);
        assert!((orientation.to_local(v).length() - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_ellipsoid_distance_on_surface() {
        let axes = Vec3::new(10.0, 20.0, 5.0);
        assert!((ellipsoid_distance(Vec3::new(10.0, 0.0, 0.0), axes) - 1.0).abs() < EPS);
        assert!((ellipsoid_distance(Vec3::new(0.0, -20.0, 0.0), axes) - 1.0).abs() < EPS);
        assert!((ellipsoid_distance(Vec3::new(0.0, 0.0, 2.5), axes) - 0.5).abs() < EPS);
    }
}
