//! Named map projections: geographic (lon, lat) in degrees to planar map coordinates.
//!
//! The names mirror the CRS class names users already pass to `-p`
//! (`PlateCarree`, `SouthPolarStereo`, …). Plate Carrée keeps degrees; every other
//! projection yields metres on a sphere.

use crate::error::{Error, Result};
use std::f64::consts::FRAC_PI_4;
use std::fmt;
use std::str::FromStr;

/// Mean Earth radius (authalic sphere), metres.
pub const EARTH_RADIUS_M: f64 = 6_371_007.0;

const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    PlateCarree,
    Mercator,
    Miller,
    LambertCylindrical,
    /// Orthographic view centred on (0°, 0°).
    Orthographic,
    /// Stereographic centred on (0°, 0°).
    Stereographic,
    NorthPolarStereo,
    SouthPolarStereo,
}

impl Projection {
    pub const ALL: [Projection; 8] = [
        Projection::PlateCarree,
        Projection::Mercator,
        Projection::Miller,
        Projection::LambertCylindrical,
        Projection::Orthographic,
        Projection::Stereographic,
        Projection::NorthPolarStereo,
        Projection::SouthPolarStereo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Projection::PlateCarree => "PlateCarree",
            Projection::Mercator => "Mercator",
            Projection::Miller => "Miller",
            Projection::LambertCylindrical => "LambertCylindrical",
            Projection::Orthographic => "Orthographic",
            Projection::Stereographic => "Stereographic",
            Projection::NorthPolarStereo => "NorthPolarStereo",
            Projection::SouthPolarStereo => "SouthPolarStereo",
        }
    }

    /// Latitude range the projection can show without blowing up.
    pub fn lat_limits(&self) -> (f64, f64) {
        match self {
            Projection::Mercator => (-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG),
            Projection::Miller => (-89.9, 89.9),
            _ => (-90.0, 90.0),
        }
    }

    /// Forward transform. `None` when the point is not visible in this projection.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() {
            return None;
        }
        let lon = wrap_lon_deg(lon_deg).to_radians();
        let lat = lat_deg.clamp(-90.0, 90.0).to_radians();
        let r = EARTH_RADIUS_M;
        match self {
            Projection::PlateCarree => Some((wrap_lon_deg(lon_deg), lat_deg.clamp(-90.0, 90.0))),
            Projection::Mercator => {
                let lat = lat_deg
                    .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
                    .to_radians();
                Some((r * lon, r * (FRAC_PI_4 + 0.5 * lat).tan().ln()))
            }
            Projection::Miller => Some((r * lon, r * 1.25 * (FRAC_PI_4 + 0.4 * lat).tan().ln())),
            Projection::LambertCylindrical => Some((r * lon, r * lat.sin())),
            Projection::Orthographic => {
                // Visible hemisphere around (0, 0): cos(c) = cos(lat) cos(lon) >= 0
                if lat.cos() * lon.cos() < 0.0 {
                    return None;
                }
                Some((r * lat.cos() * lon.sin(), r * lat.sin()))
            }
            Projection::Stereographic => {
                let denom = 1.0 + lat.cos() * lon.cos();
                if denom <= 1e-12 {
                    return None;
                }
                let k = 2.0 * r / denom;
                Some((k * lat.cos() * lon.sin(), k * lat.sin()))
            }
            Projection::NorthPolarStereo => {
                if lat_deg <= -90.0 {
                    return None;
                }
                let rho = 2.0 * r * (FRAC_PI_4 - lat / 2.0).tan();
                Some((rho * lon.sin(), -rho * lon.cos()))
            }
            Projection::SouthPolarStereo => {
                if lat_deg >= 90.0 {
                    return None;
                }
                let rho = 2.0 * r * (FRAC_PI_4 + lat / 2.0).tan();
                Some((rho * lon.sin(), rho * lon.cos()))
            }
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Projection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Projection::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Projection::ALL.iter().map(|p| p.name()).collect();
                Error::config(format!(
                    "`{}` is not a supported map projection (expected one of: {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// Normalise a longitude into [-180, 180).
pub fn wrap_lon_deg(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
