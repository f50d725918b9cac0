//! Geographic primitives used by the validator, the filters, and the map port.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// A validated WGS84 position.
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinates {
    /// Construct a coordinate pair without validation.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Axis-aligned rectangle in degrees.
pub struct Bounds {
    /// South-west corner.
    pub south_west: Coordinates,
    /// North-east corner.
    pub north_east: Coordinates,
}

impl Bounds {
    /// Rectangle spanning the two corners.
    #[must_use]
    pub const fn new(south_west: Coordinates, north_east: Coordinates) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Degenerate rectangle covering a single point.
    #[must_use]
    pub const fn from_point(point: Coordinates) -> Self {
        Self::new(point, point)
    }

    /// Smallest rectangle covering all points, `None` for an empty input.
    pub fn covering<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        points.into_iter().fold(None, |bounds, point| {
            Some(match bounds {
                None => Self::from_point(point),
                Some(mut bounds) => {
                    bounds.extend(point);
                    bounds
                }
            })
        })
    }

    /// Grow the rectangle to include `point`.
    pub fn extend(&mut self, point: Coordinates) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    /// Midpoint of the rectangle.
    #[must_use]
    pub fn center(&self) -> Coordinates {
        Coordinates::new(
            self.south_west.lat.midpoint(self.north_east.lat),
            self.south_west.lng.midpoint(self.north_east.lng),
        )
    }

    /// Latitude extent in degrees.
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    /// Longitude extent in degrees.
    #[must_use]
    pub fn lng_span(&self) -> f64 {
        self.north_east.lng - self.south_west.lng
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Map zoom level; higher levels are closer to the ground.
pub struct ZoomLevel(pub u8);

impl ZoomLevel {
    /// Furthest level any adapter has to support.
    pub const MIN: Self = Self(1);
    /// Closest level any adapter has to support.
    pub const MAX: Self = Self(19);
    /// Level used when the map is first created.
    pub const DEFAULT: Self = Self(12);
    /// Auto-framing never zooms in further than this.
    pub const MAX_AUTO_FRAME: Self = Self(15);
    /// Level used when the user focuses a single place.
    pub const DETAIL: Self = Self(16);

    /// Clamp into the supported range.
    #[must_use]
    pub fn clamped(self) -> Self {
        self.clamp(Self::MIN, Self::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// What the map is currently looking at.
pub struct Viewport {
    /// Center of the visible area.
    pub center: Coordinates,
    /// Current zoom level.
    pub zoom: ZoomLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covering_grows_to_all_points() {
        let bounds = Bounds::covering([
            Coordinates::new(36.35, 127.38),
            Coordinates::new(36.30, 127.42),
            Coordinates::new(36.40, 127.30),
        ])
        .expect("non-empty input");

        assert_eq!(bounds.south_west, Coordinates::new(36.30, 127.30));
        assert_eq!(bounds.north_east, Coordinates::new(36.40, 127.42));
        assert!(bounds.contains(Coordinates::new(36.35, 127.38)));
        assert!(!bounds.contains(Coordinates::new(36.41, 127.38)));
    }

    #[test]
    fn covering_nothing_is_none() {
        assert!(Bounds::covering(std::iter::empty()).is_none());
    }

    #[test]
    fn zoom_clamps_into_supported_range() {
        assert_eq!(ZoomLevel(0).clamped(), ZoomLevel::MIN);
        assert_eq!(ZoomLevel(40).clamped(), ZoomLevel::MAX);
        assert_eq!(ZoomLevel(10).clamped(), ZoomLevel(10));
    }
}
