//! Domain data structures for places and the raw records they are built from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Category tab a place belongs to. Exactly one is active at a time.
pub enum Category {
    /// Tourist attractions.
    Tour,
    /// Restaurants.
    Food,
    /// Parking lots.
    Parking,
}

impl Category {
    /// All categories in tab order.
    pub const ALL: [Self; 3] = [Self::Tour, Self::Food, Self::Parking];

    /// Human-friendly tab label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tour => "관광지",
            Self::Food => "맛집",
            Self::Parking => "주차장",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Self::Tour => "tour",
            Self::Food => "food",
            Self::Parking => "parking",
        };
        write!(formatter, "{slug}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier of a place, unique within the active category.
pub struct PlaceId(pub String);

impl fmt::Display for PlaceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Category-specific metadata. Rendering only, no invariants.
pub enum PlaceAttributes {
    /// Attraction details.
    Tour {
        /// Short description.
        summary: Option<String>,
        /// Contact phone number.
        phone: Option<String>,
    },
    /// Restaurant details.
    Food {
        /// Signature dishes.
        menu: Option<String>,
        /// Contact phone number.
        phone: Option<String>,
        /// Short description.
        summary: Option<String>,
    },
    /// Parking lot details.
    Parking {
        /// Number of spaces.
        capacity: Option<u32>,
        /// Fee description.
        fee: Option<String>,
        /// Lot type label such as public or private.
        lot_type: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Normalized geo-taggable entity shown in the list and on the map.
pub struct Place {
    /// Identifier, source-provided or falling back to the name.
    pub id: PlaceId,
    /// Display name, possibly empty.
    pub name: String,
    /// Street address; the only input of geographic filtering.
    pub address: String,
    /// Category the place was fetched for.
    pub category: Category,
    /// Position, present only when it passed validation.
    pub coordinates: Option<Coordinates>,
    /// Category-specific metadata.
    pub attributes: PlaceAttributes,
}

impl Place {
    /// Whether a marker may be created for this place.
    #[must_use]
    pub const fn is_mappable(&self) -> bool {
        self.coordinates.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Raw numeric field as delivered by a source: either a JSON number or text.
pub enum Scalar {
    /// Numeric value.
    Number(f64),
    /// Textual value, possibly not a number at all.
    Text(String),
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Attraction record as returned by the tour repository.
pub struct TourRecord {
    /// Source identifier.
    pub id: Option<String>,
    /// Attraction name.
    pub name: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Address supplement such as a building name.
    pub detail_address: Option<String>,
    /// Raw latitude.
    pub lat: Option<Scalar>,
    /// Raw longitude.
    pub lng: Option<Scalar>,
    /// Short description.
    pub summary: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Restaurant record as returned by the food repository.
pub struct FoodRecord {
    /// Source identifier.
    pub id: Option<String>,
    /// Restaurant name.
    pub name: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Raw latitude.
    pub lat: Option<Scalar>,
    /// Raw longitude.
    pub lng: Option<Scalar>,
    /// Signature dishes.
    pub menu: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Short description.
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Parking lot record as returned by the parking repository.
pub struct ParkingRecord {
    /// Source identifier.
    pub id: Option<String>,
    /// Lot name.
    pub name: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Raw latitude.
    pub lat: Option<Scalar>,
    /// Raw longitude.
    pub lng: Option<Scalar>,
    /// Number of spaces.
    pub capacity: Option<u32>,
    /// Fee description.
    pub fee: Option<String>,
    /// Lot type label.
    pub lot_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// A record from any of the three repositories.
pub enum RawRecord {
    /// Attraction.
    Tour(TourRecord),
    /// Restaurant.
    Food(FoodRecord),
    /// Parking lot.
    Parking(ParkingRecord),
}

impl RawRecord {
    /// Category implied by the record shape.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Tour(_) => Category::Tour,
            Self::Food(_) => Category::Food,
            Self::Parking(_) => Category::Parking,
        }
    }
}
