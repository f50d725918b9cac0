//! Map Synchronization Controller.
//!
//! Owns the map instance, its markers, and the shared info window, and is the only
//! component allowed to mutate them. Every place-list change rebuilds the marker set;
//! the viewport is reframed after a rebuild only while nothing is selected.

use crate::geo::{Coordinates, Viewport, ZoomLevel};
use crate::interaction::{InfoOwner, Interaction, OpenInfo, Transition, interpret};
use crate::map::{
    InfoContent, MapError, MapEvent, MapEventSender, MapProvider, MarkerEventKind, MarkerIcon,
};
use crate::model::{Place, PlaceId};

/// Identifier of the mount point the map attaches to.
pub const MAP_CONTAINER: &str = "map";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Lifecycle of the map surface.
pub enum MapState {
    /// Nothing requested yet.
    Uninitialized,
    /// Waiting for the SDK.
    LoadingSdk,
    /// The SDK or map could not be created; terminal.
    Failed(MapError),
    /// Map exists, no place list applied yet.
    Ready,
    /// Markers match the current place list.
    Synchronized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The single thing the map area shows.
pub enum MapSurface<'state> {
    /// SDK or map still loading.
    Loading,
    /// Map unavailable.
    Error(&'state MapError),
    /// Map rendered.
    Map,
}

struct MarkerEntry<M> {
    place: Place,
    marker: M,
}

/// Reconciles a place list with a live map.
pub struct MapController<P: MapProvider> {
    provider: P,
    state: MapState,
    map: Option<P::Map>,
    info_window: Option<P::InfoWindow>,
    markers: Vec<MarkerEntry<P::Marker>>,
    places: Option<Vec<Place>>,
    selection: Option<Place>,
    open_info: Option<OpenInfo>,
    events: MapEventSender,
    rebuilds: u64,
}

impl<P: MapProvider> MapController<P> {
    /// Create a controller; marker events are delivered on `events`.
    #[must_use]
    pub const fn new(provider: P, events: MapEventSender) -> Self {
        Self {
            provider,
            state: MapState::Uninitialized,
            map: None,
            info_window: None,
            markers: Vec::new(),
            places: None,
            selection: None,
            open_info: None,
            events,
            rebuilds: 0,
        }
    }

    /// Load the SDK, create the map, and apply any place list received meanwhile.
    ///
    /// # Errors
    ///
    /// Returns the [`MapError`] that made the map unavailable.
    pub async fn initialize(&mut self, center: Coordinates) -> Result<(), MapError> {
        match &self.state {
            MapState::Uninitialized => {}
            MapState::Failed(err) => return Err(err.clone()),
            MapState::LoadingSdk | MapState::Ready | MapState::Synchronized => return Ok(()),
        }

        self.state = MapState::LoadingSdk;
        let created = match self.provider.ensure_ready().await {
            Ok(()) => self
                .provider
                .create_map(MAP_CONTAINER, center, ZoomLevel::DEFAULT),
            Err(err) => Err(err),
        };
        let map = match created {
            Ok(map) => map,
            Err(err) => {
                log::error!("Map unavailable: {err}");
                self.state = MapState::Failed(err.clone());
                return Err(err);
            }
        };

        self.info_window = Some(self.provider.create_info_window(&map));
        self.map = Some(map);
        self.state = MapState::Ready;
        log::debug!("Map ready");

        if self.places.is_some() {
            self.rebuild();
        }
        Ok(())
    }

    /// Apply a new place list. Rebuilds immediately when the map exists, otherwise
    /// once it does.
    pub fn sync(&mut self, places: Vec<Place>) {
        self.places = Some(places);
        if self.map.is_some() {
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let (Some(map), Some(window)) = (self.map.as_ref(), self.info_window.as_ref()) else {
            return;
        };
        let places = self.places.as_deref().unwrap_or_default();

        for entry in self.markers.drain(..) {
            self.provider.remove_marker(entry.marker);
        }
        self.provider.close_info_window(window);
        self.open_info = None;

        let mut markers = Vec::new();
        for place in places {
            let Some(at) = place.coordinates else {
                continue;
            };
            let marker =
                self.provider
                    .create_marker(map, at, MarkerIcon::for_category(Some(place.category)));
            for kind in MarkerEventKind::ALL {
                self.provider
                    .listen(&marker, kind, place.id.clone(), self.events.clone());
            }
            markers.push(MarkerEntry {
                place: place.clone(),
                marker,
            });
        }
        self.markers = markers;

        if self.selection.is_none() {
            self.provider.set_bounds(map, places);
        }

        self.rebuilds += 1;
        self.state = MapState::Synchronized;
        log::debug!(
            "Rebuilt {} markers for {} places (selection kept: {})",
            self.markers.len(),
            places.len(),
            self.selection.is_some()
        );
    }

    /// React to a marker event from the provider.
    pub fn handle_event(&mut self, event: MapEvent) {
        self.interact(&Interaction::from(event));
    }

    /// Focus a place picked from the list.
    ///
    /// The list may be one rebuild ahead of the markers; the marker is looked up in the
    /// live registry, and without one only selection and viewport change.
    pub fn select_from_list(&mut self, place: &Place) {
        self.selection = Some(place.clone());
        self.apply(Transition::Focus(place.id.clone()));
    }

    /// Drop the selection and any window it owns.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        if self
            .open_info
            .as_ref()
            .is_some_and(|open| open.owner == InfoOwner::Selection)
            && let Some(window) = self.info_window.as_ref()
        {
            self.provider.close_info_window(window);
            self.open_info = None;
        }
    }

    /// Step the zoom level the way the map's zoom control does. Selection and markers
    /// are untouched.
    pub fn zoom_by(&mut self, steps: i8) {
        let Some(map) = self.map.as_ref() else {
            return;
        };
        let current = self.provider.viewport(map).zoom;
        let next = ZoomLevel(current.0.saturating_add_signed(steps)).clamped();
        if next != current {
            self.provider.set_zoom(map, next);
        }
    }

    fn interact(&mut self, interaction: &Interaction) {
        let transition = interpret(
            interaction,
            self.selection.as_ref().map(|place| &place.id),
            self.open_info.as_ref(),
            |place| self.marker_for(place).is_some(),
        );
        log::debug!("{interaction:?} -> {transition:?}");
        self.apply(transition);
    }

    fn apply(&mut self, transition: Transition) {
        let Some(map) = self.map.as_ref() else {
            return;
        };

        match transition {
            Transition::Focus(place_id) => {
                let entry = self
                    .markers
                    .iter()
                    .find(|entry| entry.place.id == place_id);
                if let Some(entry) = entry {
                    self.selection = Some(entry.place.clone());
                }
                let Some(selected) = self.selection.as_ref() else {
                    return;
                };
                match (entry, self.info_window.as_ref()) {
                    (Some(entry), Some(window)) => {
                        self.provider.open_info_window(
                            window,
                            &entry.marker,
                            &InfoContent::for_place(&entry.place),
                        );
                        self.open_info = Some(OpenInfo {
                            place: place_id,
                            owner: InfoOwner::Selection,
                        });
                    }
                    // No marker to anchor on: the previous place's window must not linger.
                    (None, Some(window)) => {
                        self.provider.close_info_window(window);
                        self.open_info = None;
                    }
                    (_, None) => self.open_info = None,
                }
                if let Some(at) = selected.coordinates {
                    self.provider.pan_to(map, at);
                    self.provider.set_zoom(map, ZoomLevel::DETAIL);
                }
            }
            Transition::Preview(place_id) | Transition::RestoreSelection(place_id) => {
                let owner = if self.selection.as_ref().is_some_and(|place| place.id == place_id)
                {
                    InfoOwner::Selection
                } else {
                    InfoOwner::Preview
                };
                let entry = self
                    .markers
                    .iter()
                    .find(|entry| entry.place.id == place_id);
                if let (Some(entry), Some(window)) = (entry, self.info_window.as_ref()) {
                    self.provider.open_info_window(
                        window,
                        &entry.marker,
                        &InfoContent::for_place(&entry.place),
                    );
                    self.open_info = Some(OpenInfo {
                        place: place_id,
                        owner,
                    });
                }
            }
            Transition::ClosePreview => {
                if let Some(window) = self.info_window.as_ref() {
                    self.provider.close_info_window(window);
                }
                self.open_info = None;
            }
            Transition::Ignore => {}
        }
    }

    fn marker_for(&self, place: &PlaceId) -> Option<&MarkerEntry<P::Marker>> {
        self.markers.iter().find(|entry| &entry.place.id == place)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &MapState {
        &self.state
    }

    /// What the map area should show.
    #[must_use]
    pub const fn surface(&self) -> MapSurface<'_> {
        match &self.state {
            MapState::Uninitialized | MapState::LoadingSdk => MapSurface::Loading,
            MapState::Failed(err) => MapSurface::Error(err),
            MapState::Ready | MapState::Synchronized => MapSurface::Map,
        }
    }

    /// Selected place, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<&Place> {
        self.selection.as_ref()
    }

    /// Place the info window currently shows.
    #[must_use]
    pub const fn open_info(&self) -> Option<&OpenInfo> {
        self.open_info.as_ref()
    }

    /// Number of live markers.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Places that currently have a marker, in list order.
    pub fn marked_places(&self) -> impl Iterator<Item = &Place> {
        self.markers.iter().map(|entry| &entry.place)
    }

    /// How many rebuilds ran so far.
    #[must_use]
    pub const fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Viewport of the map, `None` before it exists.
    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.map.as_ref().map(|map| self.provider.viewport(map))
    }

    /// Read access to the adapter, for rendering and pointer hit-testing.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}
