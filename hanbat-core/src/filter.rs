//! District and sub-district (dong) filtering over normalized places.
//!
//! Filters never reorder: results are a subsequence of the input.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::Place;

/// Districts of the municipality, as they appear in addresses.
pub const DISTRICTS: [&str; 5] = ["동구", "중구", "서구", "유성구", "대덕구"];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Rejected filter updates.
pub enum FilterError {
    /// Dong filtering needs a concrete district.
    #[error("Select a district before a dong")]
    NoDistrict,
    /// The dong is not offered for the current district.
    #[error("Dong not offered for this district: {0}")]
    UnknownDong(String),
    /// The district is not one of [`DISTRICTS`].
    #[error("Unknown district: {0}")]
    UnknownDistrict(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Selection of one filter level.
pub enum AreaFilter {
    /// No filtering at this level.
    #[default]
    All,
    /// Keep only places in the named area.
    Only(String),
}

impl AreaFilter {
    /// Name of the selected area, `None` for [`AreaFilter::All`].
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Ordering of the list after filtering.
pub enum SortOrder {
    /// Keep the repository order.
    #[default]
    Source,
    /// Alphabetical by name.
    Name,
}

impl SortOrder {
    /// Switch to the other order.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Source => Self::Name,
            Self::Name => Self::Source,
        }
    }

    /// Sort in place. Stable, so equal names keep their source order.
    pub fn apply(self, places: &mut [Place]) {
        if self == Self::Name {
            places.sort_by(|left, right| left.name.cmp(&right.name));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Current district and dong filter. A dong never survives a district change.
pub struct FilterState {
    district: AreaFilter,
    dong: AreaFilter,
}

impl FilterState {
    /// Selected district.
    #[must_use]
    pub const fn district(&self) -> &AreaFilter {
        &self.district
    }

    /// Selected dong; always [`AreaFilter::All`] while the district is.
    #[must_use]
    pub const fn dong(&self) -> &AreaFilter {
        &self.dong
    }

    /// Change the district and reset the dong in the same update.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownDistrict`] for names outside [`DISTRICTS`].
    pub fn set_district(&mut self, district: AreaFilter) -> Result<(), FilterError> {
        if let AreaFilter::Only(name) = &district
            && !DISTRICTS.contains(&name.as_str())
        {
            return Err(FilterError::UnknownDistrict(name.clone()));
        }
        self.district = district;
        self.dong = AreaFilter::All;
        Ok(())
    }

    /// Change the dong, accepting only values offered by [`available_dongs`].
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::NoDistrict`] while no district is selected and
    /// [`FilterError::UnknownDong`] for dongs absent from `places`.
    pub fn set_dong(&mut self, dong: AreaFilter, places: &[Place]) -> Result<(), FilterError> {
        if let AreaFilter::Only(name) = &dong {
            if self.district == AreaFilter::All {
                return Err(FilterError::NoDistrict);
            }
            if !available_dongs(places, &self.district).contains(name) {
                return Err(FilterError::UnknownDong(name.clone()));
            }
        }
        self.dong = dong;
        Ok(())
    }

    /// Drop the dong while keeping the district.
    pub fn reset_dong(&mut self) {
        self.dong = AreaFilter::All;
    }

    /// Apply both levels to `places`.
    #[must_use]
    pub fn apply(&self, places: &[Place]) -> Vec<Place> {
        filter(places, &self.district, &self.dong)
    }
}

/// Keep places matching the district and, when a district is set, the dong.
#[must_use]
pub fn filter(places: &[Place], district: &AreaFilter, dong: &AreaFilter) -> Vec<Place> {
    let Some(district) = district.name() else {
        return places.to_vec();
    };

    places
        .iter()
        .filter(|place| extract_district(&place.address) == Some(district))
        .filter(|place| match dong.name() {
            None => true,
            Some(dong) => extract_dong(&place.address).as_deref() == Some(dong),
        })
        .cloned()
        .collect()
}

/// Distinct, sorted dongs among places in `district`. Empty without a district.
#[must_use]
pub fn available_dongs(places: &[Place], district: &AreaFilter) -> Vec<String> {
    let Some(district) = district.name() else {
        return Vec::new();
    };

    places
        .iter()
        .filter(|place| extract_district(&place.address) == Some(district))
        .filter_map(|place| extract_dong(&place.address))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// First address token naming a known district.
#[must_use]
pub fn extract_district(address: &str) -> Option<&'static str> {
    tokens(address).find_map(district_of)
}

/// First token after the district token that names a dong.
#[must_use]
pub fn extract_dong(address: &str) -> Option<String> {
    tokens(address)
        .skip_while(|token| district_of(token).is_none())
        .skip(1)
        .find(|token| is_dong(token))
        .map(str::to_owned)
}

/// Case-insensitive keyword match on name or address. Blank keywords match everything.
#[must_use]
pub fn matches_keyword(place: &Place, keyword: &str) -> bool {
    let needle = keyword.trim().to_lowercase();
    needle.is_empty()
        || place.name.to_lowercase().contains(&needle)
        || place.address.to_lowercase().contains(&needle)
}

fn tokens(address: &str) -> impl Iterator<Item = &str> {
    address
        .split(|ch: char| ch.is_whitespace() || matches!(ch, ',' | '(' | ')'))
        .filter(|token| !token.is_empty())
}

fn district_of(token: &str) -> Option<&'static str> {
    DISTRICTS.into_iter().find(|district| *district == token)
}

fn is_dong(token: &str) -> bool {
    token.chars().count() >= 2 && token.ends_with('동')
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::model::{Category, PlaceAttributes, PlaceId};

    fn place(id: &str, address: &str) -> Place {
        Place {
            id: PlaceId(id.to_owned()),
            name: id.to_owned(),
            address: address.to_owned(),
            category: Category::Parking,
            coordinates: None,
            attributes: PlaceAttributes::Parking {
                capacity: None,
                fee: None,
                lot_type: None,
            },
        }
    }

    fn fixture() -> Vec<Place> {
        vec![
            place("a", "대전광역시 유성구 봉명동 540-1"),
            place("b", "대전광역시 서구 둔산동 1420"),
            place("c", "대전광역시 유성구 대학로 99 (궁동)"),
            place("d", "대전광역시 유성구 봉명동 1023"),
            place("e", "대전광역시 중구 대종로 480"),
            place("f", "주소 미상"),
        ]
    }

    fn ids(places: &[Place]) -> Vec<&str> {
        places.iter().map(|place| place.id.0.as_str()).collect()
    }

    #[rstest]
    #[case("대전광역시 유성구 봉명동 540-1", Some("유성구"))]
    #[case("대전 동구 중앙로 215", Some("동구"))]
    #[case("대전광역시 대덕구 신탄진동", Some("대덕구"))]
    #[case("세종특별자치시 조치원읍", None)]
    #[case("", None)]
    fn extracts_district(#[case] address: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_district(address), expected);
    }

    #[rstest]
    #[case("대전광역시 유성구 봉명동 540-1", Some("봉명동"))]
    #[case("대전광역시 유성구 대학로 99 (궁동)", Some("궁동"))]
    #[case("대전광역시 중구 대종로 480", None)]
    #[case("봉명동 유성구", None)]
    fn extracts_dong(#[case] address: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_dong(address).as_deref(), expected);
    }

    #[test]
    fn all_keeps_everything_in_order() {
        let places = fixture();

        let filtered = filter(&places, &AreaFilter::All, &AreaFilter::Only("봉명동".into()));

        assert_eq!(ids(&filtered), ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn district_and_dong_narrow_the_list() {
        let places = fixture();
        let yuseong = AreaFilter::Only("유성구".into());

        assert_eq!(ids(&filter(&places, &yuseong, &AreaFilter::All)), ["a", "c", "d"]);
        assert_eq!(
            ids(&filter(&places, &yuseong, &AreaFilter::Only("봉명동".into()))),
            ["a", "d"]
        );
    }

    #[test]
    fn available_dongs_are_sorted_and_distinct() {
        let places = fixture();

        let dongs = available_dongs(&places, &AreaFilter::Only("유성구".into()));

        assert_eq!(dongs, ["궁동", "봉명동"]);
        assert!(available_dongs(&places, &AreaFilter::All).is_empty());
    }

    #[test]
    fn every_offered_dong_yields_results() {
        let places = fixture();
        for district in DISTRICTS {
            let district = AreaFilter::Only(district.to_owned());
            for dong in available_dongs(&places, &district) {
                let filtered = filter(&places, &district, &AreaFilter::Only(dong.clone()));
                assert!(!filtered.is_empty(), "{dong} yields nothing");
            }
        }
    }

    #[rstest]
    #[case(AreaFilter::All)]
    #[case(AreaFilter::Only("봉명동".into()))]
    #[case(AreaFilter::Only("궁동".into()))]
    fn district_change_resets_dong(#[case] prior_dong: AreaFilter) {
        let places = fixture();
        let mut state = FilterState::default();
        state
            .set_district(AreaFilter::Only("유성구".into()))
            .expect("known district");
        state.set_dong(prior_dong, &places).expect("offered dong");

        state
            .set_district(AreaFilter::Only("서구".into()))
            .expect("known district");

        assert_eq!(state.dong(), &AreaFilter::All);
    }

    #[test]
    fn dong_must_be_offered() {
        let places = fixture();
        let mut state = FilterState::default();

        assert_eq!(
            state.set_dong(AreaFilter::Only("봉명동".into()), &places),
            Err(FilterError::NoDistrict)
        );

        state
            .set_district(AreaFilter::Only("유성구".into()))
            .expect("known district");
        assert_eq!(
            state.set_dong(AreaFilter::Only("둔산동".into()), &places),
            Err(FilterError::UnknownDong("둔산동".into()))
        );
        assert_eq!(state.dong(), &AreaFilter::All);
    }

    #[test]
    fn unknown_district_is_rejected() {
        let mut state = FilterState::default();

        assert!(state.set_district(AreaFilter::Only("강남구".into())).is_err());
        assert_eq!(state.district(), &AreaFilter::All);
    }

    #[test]
    fn keyword_matches_name_or_address() {
        let target = place("Expo", "대전광역시 유성구 대덕대로 480");

        assert!(matches_keyword(&target, "expo"));
        assert!(matches_keyword(&target, "대덕대로"));
        assert!(matches_keyword(&target, "  "));
        assert!(!matches_keyword(&target, "둔산"));
    }

    #[test]
    fn name_sort_is_stable() {
        let mut places = vec![place("b", ""), place("a", ""), place("b", "second")];

        SortOrder::Name.apply(&mut places);

        assert_eq!(ids(&places), ["a", "b", "b"]);
        assert_eq!(places.get(2).map(|place| place.address.as_str()), Some("second"));
    }
}
