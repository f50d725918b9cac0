//! In-memory map provider recording what the controller asks of it.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::geo::{Bounds, Coordinates, Viewport, ZoomLevel};
use crate::map::{
    InfoContent, MapError, MapEvent, MapEventSender, MapProvider, MarkerEventKind, MarkerIcon,
};
use crate::model::PlaceId;

pub(crate) struct FakeMarker(u32);

struct Listener {
    marker: u32,
    kind: MarkerEventKind,
    place: PlaceId,
    events: MapEventSender,
}

pub(crate) struct FakeMap {
    pub(crate) ready: Result<(), MapError>,
    pub(crate) viewport: Viewport,
    pub(crate) markers: BTreeMap<u32, (Coordinates, MarkerIcon)>,
    pub(crate) info: Option<(u32, InfoContent)>,
    pub(crate) fit_calls: usize,
    next_marker: u32,
    listeners: Vec<Listener>,
}

impl FakeMap {
    pub(crate) fn new() -> Self {
        Self {
            ready: Ok(()),
            viewport: Viewport {
                center: Coordinates::new(0.0, 0.0),
                zoom: ZoomLevel::MIN,
            },
            markers: BTreeMap::new(),
            info: None,
            fit_calls: 0,
            next_marker: 0,
            listeners: Vec::new(),
        }
    }

    pub(crate) fn failing(err: MapError) -> Self {
        Self {
            ready: Err(err),
            ..Self::new()
        }
    }

    /// Emit an SDK event for every marker built for `place`.
    pub(crate) fn fire(&self, place: &str, kind: MarkerEventKind) {
        for listener in &self.listeners {
            if listener.place.0 == place && listener.kind == kind {
                let sent = listener.events.send(MapEvent {
                    place: listener.place.clone(),
                    kind,
                });
                assert!(sent.is_ok(), "event channel closed");
            }
        }
    }

    pub(crate) fn info_place(&self) -> Option<&str> {
        self.info.as_ref().map(|(_, content)| content.place.0.as_str())
    }
}

#[async_trait(?Send)]
impl MapProvider for FakeMap {
    type Map = ();
    type Marker = FakeMarker;
    type InfoWindow = ();

    async fn ensure_ready(&self) -> Result<(), MapError> {
        self.ready.clone()
    }

    fn create_map(
        &mut self,
        _container: &str,
        center: Coordinates,
        zoom: ZoomLevel,
    ) -> Result<Self::Map, MapError> {
        self.ready.clone()?;
        self.viewport = Viewport { center, zoom };
        Ok(())
    }

    fn create_marker(&mut self, _map: &(), at: Coordinates, icon: MarkerIcon) -> FakeMarker {
        self.next_marker += 1;
        self.markers.insert(self.next_marker, (at, icon));
        FakeMarker(self.next_marker)
    }

    fn remove_marker(&mut self, marker: FakeMarker) {
        self.markers.remove(&marker.0);
        self.listeners.retain(|listener| listener.marker != marker.0);
    }

    fn create_info_window(&mut self, _map: &()) {}

    fn open_info_window(&mut self, _window: &(), marker: &FakeMarker, content: &InfoContent) {
        self.info = Some((marker.0, content.clone()));
    }

    fn close_info_window(&mut self, _window: &()) {
        self.info = None;
    }

    fn listen(
        &mut self,
        marker: &FakeMarker,
        kind: MarkerEventKind,
        place: PlaceId,
        events: MapEventSender,
    ) {
        self.listeners.push(Listener {
            marker: marker.0,
            kind,
            place,
            events,
        });
    }

    fn pan_to(&mut self, _map: &(), at: Coordinates) {
        self.viewport.center = at;
    }

    fn set_zoom(&mut self, _map: &(), zoom: ZoomLevel) {
        self.viewport.zoom = zoom;
    }

    fn fit_bounds(&mut self, _map: &(), bounds: Bounds) {
        self.fit_calls += 1;
        let span = bounds.lat_span().max(bounds.lng_span());
        // One level per halving of the visible span, starting from the whole globe.
        let mut zoom = 1_u8;
        let mut visible = 360.0_f64;
        while visible / 2.0 >= span && zoom < ZoomLevel::MAX.0 {
            visible /= 2.0;
            zoom += 1;
        }
        self.viewport = Viewport {
            center: bounds.center(),
            zoom: ZoomLevel(zoom),
        };
    }

    fn viewport(&self, _map: &()) -> Viewport {
        self.viewport
    }
}
