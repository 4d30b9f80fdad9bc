//! Great-circle distance between GPS fixes and stops

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Reported in place of a distance that couldn't be computed.
pub const FALLBACK_DISTANCE_M: f64 = 999_999.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum DistanceError {
    #[error("non-finite coordinates {0:?}")]
    NonFiniteInput(Coordinates),

    #[error("distance came out as {0}")]
    NonFiniteResult(f64),
}

/// Haversine distance in meters. Out of range coordinates aren't rejected,
/// they just give a meaningless number.
pub fn haversine_distance(from: Coordinates, to: Coordinates) -> Result<f64, DistanceError> {
    for c in [from, to] {
        if !c.is_finite() {
            return Err(DistanceError::NonFiniteInput(c));
        }
    }

    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // rounding can push `a` a hair above 1 for antipodal points
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    let meters = EARTH_RADIUS_M * c;
    if !meters.is_finite() {
        return Err(DistanceError::NonFiniteResult(meters));
    }

    Ok(meters)
}

/// Outcome of a distance computation that never fails outright.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Distance {
    Measured { meters: f64 },
    Failed,
}

impl Distance {
    /// Meters, or [`FALLBACK_DISTANCE_M`] when the computation failed.
    pub fn meters(&self) -> f64 {
        match self {
            Distance::Measured { meters } => *meters,
            Distance::Failed => FALLBACK_DISTANCE_M,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Distance::Failed)
    }
}

pub fn distance(from: Coordinates, to: Coordinates) -> Distance {
    match haversine_distance(from, to) {
        Ok(meters) => Distance::Measured { meters },
        Err(e) => {
            warn!("falling back to {FALLBACK_DISTANCE_M} m: {e}");
            Distance::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Coordinates = Coordinates {
        latitude: 47.6,
        longitude: 7.2,
    };
    const B: Coordinates = Coordinates {
        latitude: 47.61,
        longitude: 7.21,
    };

    #[test]
    fn test_same_point_is_zero() {
        for c in [A, B, Coordinates::new(-33.86, 151.21), Coordinates::new(0.0, 0.0)] {
            assert_eq!(distance(c, c), Distance::Measured { meters: 0.0 });
        }
    }

    #[test]
    fn test_symmetric() {
        let there = distance(A, B).meters();
        let back = distance(B, A).meters();

        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_known_pair() {
        let meters = distance(A, B).meters();

        // 0.01° of latitude and longitude around 47.6°N, roughly 1.34 km
        assert!(meters > 1330.0 && meters < 1345.0, "got {meters}");
        assert!((meters - 1341.085).abs() < 0.01, "got {meters}");
    }

    #[test]
    fn test_antipodes_stay_finite() {
        let d = distance(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0));

        assert!(!d.is_failed());
        assert!((d.meters() - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn test_out_of_range_is_not_rejected() {
        assert!(!distance(Coordinates::new(120.0, 400.0), A).is_failed());
    }

    #[test]
    fn test_nan_falls_back() {
        let d = distance(Coordinates::new(f64::NAN, 7.2), B);

        assert!(d.is_failed());
        assert_eq!(d.meters(), FALLBACK_DISTANCE_M);
        assert!(matches!(
            haversine_distance(A, Coordinates::new(47.0, f64::INFINITY)),
            Err(DistanceError::NonFiniteInput(_))
        ));
    }
}
