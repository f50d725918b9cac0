//! Capability interface isolating a third-party map SDK.
//!
//! The controller only ever talks to a [`MapProvider`]; SDK types stay behind its
//! associated handle types and SDK failures are translated into [`MapError`].

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::geo::{Bounds, Coordinates, Viewport, ZoomLevel};
use crate::model::{Category, Place, PlaceAttributes, PlaceId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Closed set of failures a map SDK can surface. All of them are terminal for the map.
pub enum MapError {
    /// No API key was configured.
    #[error("Map API key is missing")]
    MissingApiKey,
    /// The key is not authorized for this client or domain.
    #[error("Map API key is not authorized for this client")]
    UnauthorizedDomain,
    /// The SDK could not be fetched or initialized.
    #[error("Map SDK failed to load: {0}")]
    ScriptLoad(String),
    /// An operation needed a map that does not exist yet.
    #[error("Map is not ready")]
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Marker image, one per category plus a fallback.
pub enum MarkerIcon {
    /// Attraction pin.
    Tour,
    /// Restaurant pin.
    Food,
    /// Parking pin.
    Parking,
    /// Generic pin.
    Default,
}

impl MarkerIcon {
    /// Icon for a category; `None` yields the fallback.
    #[must_use]
    pub const fn for_category(category: Option<Category>) -> Self {
        match category {
            Some(Category::Tour) => Self::Tour,
            Some(Category::Food) => Self::Food,
            Some(Category::Parking) => Self::Parking,
            None => Self::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Marker events a provider can deliver.
pub enum MarkerEventKind {
    /// Pointer click.
    Click,
    /// Pointer entered the marker.
    MouseOver,
    /// Pointer left the marker.
    MouseOut,
}

impl MarkerEventKind {
    /// Every kind the controller subscribes to.
    pub const ALL: [Self; 3] = [Self::Click, Self::MouseOver, Self::MouseOut];
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Marker event tagged with the place the marker was built for.
pub struct MapEvent {
    /// Place behind the marker.
    pub place: PlaceId,
    /// What happened.
    pub kind: MarkerEventKind,
}

/// Channel marker events are delivered on.
pub type MapEventSender = UnboundedSender<MapEvent>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Text shown in the shared info window.
pub struct InfoContent {
    /// Place the content describes.
    pub place: PlaceId,
    /// Headline, usually the place name.
    pub title: String,
    /// Street address.
    pub address: String,
    /// Optional category-specific line.
    pub detail: Option<String>,
}

impl InfoContent {
    /// Build the info window content for a place.
    #[must_use]
    pub fn for_place(place: &Place) -> Self {
        let detail = match &place.attributes {
            PlaceAttributes::Tour { summary, .. } => summary.clone(),
            PlaceAttributes::Food { menu, .. } => menu.as_ref().map(|menu| format!("대표메뉴 {menu}")),
            PlaceAttributes::Parking { capacity, fee, .. } => match (capacity, fee) {
                (Some(capacity), Some(fee)) => Some(format!("{capacity}면 · {fee}")),
                (Some(capacity), None) => Some(format!("{capacity}면")),
                (None, fee) => fee.clone(),
            },
        };

        Self {
            place: place.id.clone(),
            title: place.name.clone(),
            address: place.address.clone(),
            detail,
        }
    }
}

#[async_trait(?Send)]
/// Map SDK adapter. Handles are owned by whoever created them; the SDK lives on the UI thread.
pub trait MapProvider {
    /// Map instance handle.
    type Map;
    /// Marker handle.
    type Marker;
    /// Info window handle.
    type InfoWindow;

    /// Make sure the SDK is loaded. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns the [`MapError`] the SDK load failed with.
    async fn ensure_ready(&self) -> Result<(), MapError>;

    /// Construct the map inside `container` and attach a zoom control.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotReady`] before [`Self::ensure_ready`] succeeded.
    fn create_map(
        &mut self,
        container: &str,
        center: Coordinates,
        zoom: ZoomLevel,
    ) -> Result<Self::Map, MapError>;

    /// Place a marker.
    fn create_marker(&mut self, map: &Self::Map, at: Coordinates, icon: MarkerIcon) -> Self::Marker;

    /// Dispose a marker together with its listeners.
    fn remove_marker(&mut self, marker: Self::Marker);

    /// Create the info window shared by all markers of `map`.
    fn create_info_window(&mut self, map: &Self::Map) -> Self::InfoWindow;

    /// Show `content` in `window`, anchored at `marker`.
    fn open_info_window(
        &mut self,
        window: &Self::InfoWindow,
        marker: &Self::Marker,
        content: &InfoContent,
    );

    /// Hide `window`.
    fn close_info_window(&mut self, window: &Self::InfoWindow);

    /// Deliver `kind` events of `marker` as [`MapEvent`]s for `place` on `events`.
    fn listen(
        &mut self,
        marker: &Self::Marker,
        kind: MarkerEventKind,
        place: PlaceId,
        events: MapEventSender,
    );

    /// Move the center without changing the zoom.
    fn pan_to(&mut self, map: &Self::Map, at: Coordinates);

    /// Change the zoom level.
    fn set_zoom(&mut self, map: &Self::Map, zoom: ZoomLevel);

    /// Frame the viewport around `bounds` as tightly as the SDK allows.
    fn fit_bounds(&mut self, map: &Self::Map, bounds: Bounds);

    /// Current center and zoom.
    fn viewport(&self, map: &Self::Map) -> Viewport;

    /// Frame all places with coordinates, never zooming in past
    /// [`ZoomLevel::MAX_AUTO_FRAME`]. Leaves the viewport alone when nothing is placed.
    fn set_bounds(&mut self, map: &Self::Map, places: &[Place]) {
        let Some(bounds) = Bounds::covering(places.iter().filter_map(|place| place.coordinates))
        else {
            return;
        };

        self.fit_bounds(map, bounds);
        if self.viewport(map).zoom > ZoomLevel::MAX_AUTO_FRAME {
            self.set_zoom(map, ZoomLevel::MAX_AUTO_FRAME);
        }
    }
}
