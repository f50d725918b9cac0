//! The map page: category tabs, fetch bookkeeping, filters, and the map controller.
//!
//! Fetches are tagged with a [`FetchTicket`]. Only the ticket issued last, for the tab
//! that is still active, may replace the working set; anything else resolved late and
//! is dropped.

use crate::controller::MapController;
use crate::filter::{
    AreaFilter, FilterError, FilterState, SortOrder, available_dongs, matches_keyword,
};
use crate::geo::Coordinates;
use crate::map::{MapError, MapEvent, MapProvider};
use crate::model::{Category, Place, PlaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Tag of an issued fetch.
pub struct FetchTicket {
    /// Tab the fetch was issued for.
    pub category: Category,
    sequence: u64,
}

/// State behind the map page.
pub struct MapPage<P: MapProvider> {
    controller: MapController<P>,
    active: Category,
    issued: u64,
    latest: Option<FetchTicket>,
    loading: bool,
    working_set: Vec<Place>,
    filters: FilterState,
    keyword: String,
    sort: SortOrder,
    visible: Vec<Place>,
}

impl<P: MapProvider> MapPage<P> {
    /// Create a page showing `initial`. Call [`Self::reload`] to issue the first fetch.
    #[must_use]
    pub fn new(controller: MapController<P>, initial: Category) -> Self {
        Self {
            controller,
            active: initial,
            issued: 0,
            latest: None,
            loading: false,
            working_set: Vec::new(),
            filters: FilterState::default(),
            keyword: String::new(),
            sort: SortOrder::default(),
            visible: Vec::new(),
        }
    }

    /// Bring up the map. The list works regardless of the outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`MapError`] that made the map unavailable.
    pub async fn initialize_map(&mut self, center: Coordinates) -> Result<(), MapError> {
        self.controller.initialize(center).await
    }

    /// Switch the active tab and issue a fetch for it.
    pub fn switch_tab(&mut self, category: Category) -> FetchTicket {
        log::debug!("Switching tab {} -> {category}", self.active);
        self.active = category;
        self.reload()
    }

    /// Issue a fresh fetch for the active tab, dropping the current working set.
    pub fn reload(&mut self) -> FetchTicket {
        self.issued += 1;
        let ticket = FetchTicket {
            category: self.active,
            sequence: self.issued,
        };
        self.latest = Some(ticket);
        self.loading = true;
        self.controller.clear_selection();
        self.working_set.clear();
        // District names are shared by all tabs, dongs are derived from the new data.
        self.filters.reset_dong();
        self.refresh();
        ticket
    }

    /// Deliver the places a fetch resolved with. Returns `false` for stale tickets,
    /// which leave the page untouched.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, places: Vec<Place>) -> bool {
        if self.latest != Some(ticket) || ticket.category != self.active {
            log::warn!(
                "Discarding {} result for abandoned fetch (active tab: {})",
                ticket.category,
                self.active
            );
            return false;
        }

        self.latest = None;
        self.loading = false;
        self.working_set = places
            .into_iter()
            .filter(|place| place.category == self.active)
            .collect();
        self.refresh();
        true
    }

    /// Change the district filter; resets the dong and clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownDistrict`] for names outside the district list.
    pub fn set_district(&mut self, district: AreaFilter) -> Result<(), FilterError> {
        self.filters.set_district(district)?;
        self.controller.clear_selection();
        self.refresh();
        Ok(())
    }

    /// Change the dong filter; clears the selection.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] for dongs not offered by [`Self::available_dongs`].
    pub fn set_dong(&mut self, dong: AreaFilter) -> Result<(), FilterError> {
        self.filters.set_dong(dong, &self.working_set)?;
        self.controller.clear_selection();
        self.refresh();
        Ok(())
    }

    /// Change the keyword filter; clears the selection.
    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
        self.controller.clear_selection();
        self.refresh();
    }

    /// Change the list order. The selection survives.
    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.refresh();
    }

    /// Focus a visible place as if its list item was clicked.
    pub fn select(&mut self, id: &PlaceId) {
        if let Some(place) = self.visible.iter().find(|candidate| &candidate.id == id) {
            self.controller.select_from_list(place);
        }
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.controller.clear_selection();
    }

    /// Forward a marker event to the controller.
    pub fn handle_map_event(&mut self, event: MapEvent) {
        self.controller.handle_event(event);
    }

    /// Step the map zoom from the zoom control.
    pub fn zoom_by(&mut self, steps: i8) {
        self.controller.zoom_by(steps);
    }

    fn refresh(&mut self) {
        let mut visible = self.filters.apply(&self.working_set);
        visible.retain(|place| matches_keyword(place, &self.keyword));
        self.sort.apply(&mut visible);

        let selection_gone = self
            .controller
            .selected()
            .is_some_and(|selected| !visible.iter().any(|place| place.id == selected.id));
        if selection_gone {
            self.controller.clear_selection();
        }

        self.controller.sync(visible.clone());
        self.visible = visible;
    }

    /// Places for the list, in display order.
    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.visible
    }

    /// Identifier the list should highlight.
    #[must_use]
    pub fn selected_id(&self) -> Option<&PlaceId> {
        self.controller.selected().map(|place| &place.id)
    }

    /// Dongs offered for the current district.
    #[must_use]
    pub fn available_dongs(&self) -> Vec<String> {
        available_dongs(&self.working_set, self.filters.district())
    }

    /// Active tab.
    #[must_use]
    pub const fn active_tab(&self) -> Category {
        self.active
    }

    /// Whether the active tab's fetch is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current district and dong filter.
    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Current keyword.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Current list order.
    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        self.sort
    }

    /// The map controller.
    #[must_use]
    pub const fn controller(&self) -> &MapController<P> {
        &self.controller
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    use super::*;
    use crate::fake::FakeMap;
    use crate::map::MarkerEventKind;
    use crate::model::PlaceAttributes;

    const CENTER: Coordinates = Coordinates::new(36.3504, 127.3845);

    fn place(category: Category, id: &str, address: &str, at: Option<(f64, f64)>) -> Place {
        Place {
            id: PlaceId(id.to_owned()),
            name: id.to_owned(),
            address: address.to_owned(),
            category,
            coordinates: at.map(|(lat, lng)| Coordinates::new(lat, lng)),
            attributes: PlaceAttributes::Parking {
                capacity: None,
                fee: None,
                lot_type: None,
            },
        }
    }

    fn parking() -> Vec<Place> {
        vec![
            place(Category::Parking, "p1", "대전광역시 유성구 봉명동 1", Some((36.355, 127.34))),
            place(Category::Parking, "p2", "대전광역시 유성구 궁동 2", Some((36.362, 127.35))),
            place(Category::Parking, "p3", "대전광역시 서구 둔산동 3", Some((36.351, 127.38))),
            place(Category::Parking, "p4", "대전광역시 서구 둔산동 4", None),
        ]
    }

    async fn page(category: Category) -> (MapPage<FakeMap>, UnboundedReceiver<MapEvent>) {
        let (events, rx) = unbounded_channel();
        let mut page = MapPage::new(MapController::new(FakeMap::new(), events), category);
        page.initialize_map(CENTER).await.expect("fake map loads");
        (page, rx)
    }

    fn pump(page: &mut MapPage<FakeMap>, rx: &mut UnboundedReceiver<MapEvent>) {
        while let Ok(event) = rx.try_recv() {
            page.handle_map_event(event);
        }
    }

    fn ids(page: &MapPage<FakeMap>) -> Vec<&str> {
        page.places().iter().map(|place| place.id.0.as_str()).collect()
    }

    #[tokio::test]
    async fn fetch_result_drives_list_and_markers() {
        let (mut page, _rx) = page(Category::Parking).await;
        let ticket = page.reload();
        assert!(page.is_loading());

        assert!(page.complete_fetch(ticket, parking()));

        assert!(!page.is_loading());
        assert_eq!(ids(&page), ["p1", "p2", "p3", "p4"]);
        assert_eq!(page.controller().marker_count(), 3);
    }

    #[tokio::test]
    async fn late_fetch_for_abandoned_tab_is_discarded() {
        let (mut page, _rx) = page(Category::Tour).await;
        let tour = page.reload();
        let parking_ticket = page.switch_tab(Category::Parking);
        let rebuilds = page.controller().rebuild_count();

        let tour_places = vec![place(Category::Tour, "t1", "대전광역시 중구", Some((36.32, 127.42)))];
        assert!(!page.complete_fetch(tour, tour_places));

        assert!(page.places().is_empty());
        assert!(page.is_loading());
        assert_eq!(page.controller().rebuild_count(), rebuilds);

        assert!(page.complete_fetch(parking_ticket, parking()));
        assert_eq!(page.places().len(), 4);
    }

    #[tokio::test]
    async fn superseded_fetch_for_same_tab_is_discarded() {
        let (mut page, _rx) = page(Category::Parking).await;
        let first = page.reload();
        let second = page.reload();

        assert!(!page.complete_fetch(first, parking()));
        assert!(page.complete_fetch(second, parking()));
        assert!(!page.complete_fetch(second, Vec::new()));
        assert_eq!(page.places().len(), 4);
    }

    #[tokio::test]
    async fn district_change_resets_dong() {
        let (mut page, _rx) = page(Category::Parking).await;
        let ticket = page.reload();
        page.complete_fetch(ticket, parking());

        page.set_district(AreaFilter::Only("유성구".into())).expect("known district");
        assert_eq!(page.available_dongs(), ["궁동", "봉명동"]);
        page.set_dong(AreaFilter::Only("궁동".into())).expect("offered dong");
        assert_eq!(ids(&page), ["p2"]);

        page.set_district(AreaFilter::Only("서구".into())).expect("known district");
        assert_eq!(page.filters().dong(), &AreaFilter::All);
        assert_eq!(ids(&page), ["p3", "p4"]);
        assert!(page.set_dong(AreaFilter::Only("궁동".into())).is_err());
    }

    #[tokio::test]
    async fn excluding_the_selection_clears_it_and_its_marker() {
        let (mut page, mut rx) = page(Category::Parking).await;
        let ticket = page.reload();
        page.complete_fetch(ticket, parking());
        page.controller().provider().fire("p1", MarkerEventKind::Click);
        pump(&mut page, &mut rx);
        assert_eq!(page.selected_id().map(|id| id.0.as_str()), Some("p1"));

        page.set_district(AreaFilter::Only("서구".into())).expect("known district");

        assert!(page.selected_id().is_none());
        assert!(page.controller().marked_places().all(|place| place.id.0 != "p1"));
        assert_eq!(page.controller().provider().info_place(), None);
    }

    #[tokio::test]
    async fn sort_keeps_selection_and_viewport() {
        let (mut page, mut rx) = page(Category::Parking).await;
        let ticket = page.reload();
        page.complete_fetch(ticket, parking());
        page.controller().provider().fire("p3", MarkerEventKind::Click);
        pump(&mut page, &mut rx);
        let focused = page.controller().viewport();

        page.set_sort(SortOrder::Name);

        assert_eq!(page.selected_id().map(|id| id.0.as_str()), Some("p3"));
        assert_eq!(page.controller().viewport(), focused);
    }

    #[tokio::test]
    async fn tab_switch_clears_selection() {
        let (mut page, _rx) = page(Category::Parking).await;
        let ticket = page.reload();
        page.complete_fetch(ticket, parking());
        page.select(&PlaceId("p2".to_owned()));
        assert!(page.selected_id().is_some());

        page.switch_tab(Category::Food);

        assert!(page.selected_id().is_none());
        assert!(page.places().is_empty());
        assert_eq!(page.controller().marker_count(), 0);
    }

    #[tokio::test]
    async fn keyword_narrows_the_list() {
        let (mut page, _rx) = page(Category::Parking).await;
        let ticket = page.reload();
        page.complete_fetch(ticket, parking());

        page.set_keyword("둔산");

        assert_eq!(ids(&page), ["p3", "p4"]);
        assert_eq!(page.controller().marker_count(), 1);
    }

    #[tokio::test]
    async fn list_works_without_map() {
        let (events, _rx) = unbounded_channel();
        let mut page = MapPage::new(
            MapController::new(FakeMap::failing(MapError::UnauthorizedDomain), events),
            Category::Parking,
        );
        assert!(page.initialize_map(CENTER).await.is_err());

        let ticket = page.reload();
        assert!(page.complete_fetch(ticket, parking()));
        page.select(&PlaceId("p1".to_owned()));

        assert_eq!(page.places().len(), 4);
        assert_eq!(page.selected_id().map(|id| id.0.as_str()), Some("p1"));
    }
}
