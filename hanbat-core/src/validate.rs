//! Validation of raw coordinate pairs.
//!
//! A pair is accepted only if both parts parse to finite numbers, lie on the globe,
//! and fall inside the configured region. Anything else yields `None`; geocoding gaps
//! in the source data are routine and never reported as errors.

use crate::geo::{Bounds, Coordinates};
use crate::model::Scalar;

/// Approximate bounds of the municipality, used to reject obviously wrong geocodes.
pub const MUNICIPAL_REGION: Bounds = Bounds::new(
    Coordinates::new(36.18, 127.24),
    Coordinates::new(36.50, 127.56),
);

#[derive(Debug, Clone, Copy, PartialEq)]
/// Validator bound to a regional bounding box.
pub struct CoordinateValidator {
    region: Bounds,
}

impl Default for CoordinateValidator {
    fn default() -> Self {
        Self::new(MUNICIPAL_REGION)
    }
}

impl CoordinateValidator {
    /// Create a validator accepting points inside `region`.
    #[must_use]
    pub const fn new(region: Bounds) -> Self {
        Self { region }
    }

    /// Validate a raw latitude/longitude pair.
    #[must_use]
    pub fn validate(&self, raw_lat: &Scalar, raw_lng: &Scalar) -> Option<Coordinates> {
        let lat = parse_finite(raw_lat)?;
        let lng = parse_finite(raw_lng)?;

        if lat.abs() > 90.0 || lng.abs() > 180.0 {
            return None;
        }

        let point = Coordinates::new(lat, lng);
        self.region.contains(point).then_some(point)
    }

    /// Same as [`Self::validate`] but tolerates absent fields.
    #[must_use]
    pub fn validate_opt(
        &self,
        raw_lat: Option<&Scalar>,
        raw_lng: Option<&Scalar>,
    ) -> Option<Coordinates> {
        self.validate(raw_lat?, raw_lng?)
    }
}

fn parse_finite(raw: &Scalar) -> Option<f64> {
    let value = match raw {
        Scalar::Number(number) => *number,
        Scalar::Text(text) => text.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}
