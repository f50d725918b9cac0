//! Mapping of the three repository record shapes into [`Place`].

use crate::geo::Coordinates;
use crate::model::{
    Category, FoodRecord, ParkingRecord, Place, PlaceAttributes, PlaceId, RawRecord, TourRecord,
};
use crate::validate::CoordinateValidator;

/// Normalize one raw record. Missing fields default to absent, never to an error.
#[must_use]
pub fn normalize(record: RawRecord, validator: &CoordinateValidator) -> Place {
    let category = record.category();
    match record {
        RawRecord::Tour(record) => tour(record, validator),
        RawRecord::Food(record) => food(record, validator),
        RawRecord::Parking(record) => parking(record, validator),
    }
    .tagged(category)
}

/// Normalize a whole batch, preserving source order.
pub fn normalize_all<I>(records: I, validator: &CoordinateValidator) -> Vec<Place>
where
    I: IntoIterator<Item = RawRecord>,
{
    records
        .into_iter()
        .map(|record| normalize(record, validator))
        .collect()
}

struct Draft {
    id: Option<String>,
    name: Option<String>,
    address: Option<String>,
    coordinates: Option<Coordinates>,
    attributes: PlaceAttributes,
}

impl Draft {
    fn tagged(self, category: Category) -> Place {
        let name = self.name.unwrap_or_default();
        // Two records without identifier and name end up sharing the empty id.
        let id = self.id.unwrap_or_else(|| name.clone());

        Place {
            id: PlaceId(id),
            name,
            address: self.address.unwrap_or_default(),
            category,
            coordinates: self.coordinates,
            attributes: self.attributes,
        }
    }
}

fn tour(record: TourRecord, validator: &CoordinateValidator) -> Draft {
    Draft {
        id: non_empty(record.id),
        name: non_empty(record.name),
        address: non_empty(record.address).or_else(|| non_empty(record.detail_address)),
        coordinates: validator.validate_opt(record.lat.as_ref(), record.lng.as_ref()),
        attributes: PlaceAttributes::Tour {
            summary: non_empty(record.summary),
            phone: non_empty(record.phone),
        },
    }
}

fn food(record: FoodRecord, validator: &CoordinateValidator) -> Draft {
    Draft {
        id: non_empty(record.id),
        name: non_empty(record.name),
        address: non_empty(record.address),
        coordinates: validator.validate_opt(record.lat.as_ref(), record.lng.as_ref()),
        attributes: PlaceAttributes::Food {
            menu: non_empty(record.menu),
            phone: non_empty(record.phone),
            summary: non_empty(record.summary),
        },
    }
}

fn parking(record: ParkingRecord, validator: &CoordinateValidator) -> Draft {
    Draft {
        id: non_empty(record.id),
        name: non_empty(record.name),
        address: non_empty(record.address),
        coordinates: validator.validate_opt(record.lat.as_ref(), record.lng.as_ref()),
        attributes: PlaceAttributes::Parking {
            capacity: record.capacity,
            fee: non_empty(record.fee),
            lot_type: non_empty(record.lot_type),
        },
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
