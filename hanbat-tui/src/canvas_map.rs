//! Map provider drawing into a terminal pane.
//!
//! The SDK script is still fetched (the key has to be valid for this client), but the
//! map itself is a projection onto terminal cells. Pointer positions are hit-tested
//! against marker cells to raise the same events a browser map would.

use std::cell::Cell;
use std::collections::BTreeMap;

use async_trait::async_trait;
use ratatui::layout::Rect;
use reqwest::{Client, StatusCode};

use hanbat_core::geo::{Bounds, Coordinates, Viewport, ZoomLevel};
use hanbat_core::loader::{ScriptSource, SdkLoader, SdkStatus};
use hanbat_core::map::{
    InfoContent, MapError, MapEvent, MapEventSender, MapProvider, MarkerEventKind, MarkerIcon,
};
use hanbat_core::model::PlaceId;

const SDK_URL: &str = "https://dapi.kakao.com/v2/maps/sdk.js";

/// Pane size assumed until the first frame was laid out.
const FALLBACK_PANE: (f64, f64) = (80.0, 24.0);

/// Some breathing room around framed markers.
const FIT_MARGIN: f64 = 1.1;

/// Fetches the map SDK script for an app key.
#[derive(Clone)]
pub(crate) struct KakaoScript {
    client: Client,
    app_key: Option<String>,
}

impl KakaoScript {
    pub(crate) const fn new(client: Client, app_key: Option<String>) -> Self {
        Self { client, app_key }
    }

    /// Request the script once; the app key decides whether the map may be shown.
    pub(crate) async fn check_key(&self) -> Result<(), MapError> {
        let Some(app_key) = self.app_key.as_deref().filter(|key| !key.trim().is_empty()) else {
            return Err(MapError::MissingApiKey);
        };

        let response = self
            .client
            .get(SDK_URL)
            .query(&[("appkey", app_key), ("autoload", "false")])
            .send()
            .await
            .map_err(|err| MapError::ScriptLoad(err.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MapError::UnauthorizedDomain),
            status if status.is_success() => Ok(()),
            status => Err(MapError::ScriptLoad(format!("SDK request answered {status}"))),
        }
    }
}

#[async_trait(?Send)]
impl ScriptSource for KakaoScript {
    fn is_loaded(&self) -> bool {
        false
    }

    async fn load(&self) -> Result<(), MapError> {
        self.check_key().await
    }
}

/// Map handle of the terminal map.
#[derive(Debug)]
pub(crate) struct TerminalSurface;

/// Marker handle.
#[derive(Debug)]
pub(crate) struct MarkerHandle(u32);

/// Info window handle; there is a single popup per map.
#[derive(Debug)]
pub(crate) struct InfoPopup;

#[derive(Debug, Clone, Copy)]
struct Pin {
    at: Coordinates,
    icon: MarkerIcon,
}

struct Listener {
    kind: MarkerEventKind,
    place: PlaceId,
    events: MapEventSender,
}

/// A marker as it lands on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlacedPin {
    pub column: u16,
    pub row: u16,
    pub icon: MarkerIcon,
    pub hovered: bool,
}

pub(crate) struct TerminalMap {
    loader: SdkLoader<KakaoScript>,
    viewport: Viewport,
    pane: Cell<Rect>,
    mounted: bool,
    next_marker: u32,
    markers: BTreeMap<u32, Pin>,
    listeners: BTreeMap<u32, Vec<Listener>>,
    info: Option<(u32, InfoContent)>,
    hovered: Cell<Option<u32>>,
}

impl TerminalMap {
    pub(crate) fn new(script: KakaoScript) -> Self {
        Self {
            loader: SdkLoader::new(script),
            viewport: Viewport {
                center: Coordinates::new(0.0, 0.0),
                zoom: ZoomLevel::DEFAULT,
            },
            pane: Cell::new(Rect::default()),
            mounted: false,
            next_marker: 0,
            markers: BTreeMap::new(),
            listeners: BTreeMap::new(),
            info: None,
            hovered: Cell::new(None),
        }
    }

    /// Outcome of a key check run outside the map; settles the loader so creating the
    /// map no longer waits on the network.
    pub(crate) fn sdk_checked(&self, outcome: Result<(), MapError>) {
        match outcome {
            Ok(()) => self.loader.announce_ready(),
            Err(err) => self.loader.announce_failed(err),
        }
    }

    /// Screen area the map is drawn into, borders excluded.
    pub(crate) fn set_pane(&self, pane: Rect) {
        self.pane.set(pane);
    }

    pub(crate) const fn zoom(&self) -> ZoomLevel {
        self.viewport.zoom
    }

    /// Geographic area currently visible.
    pub(crate) fn visible_bounds(&self) -> Bounds {
        let (width, height) = self.pane_size();
        let (lat_span, lng_span) = spans(self.viewport.zoom, self.viewport.center, width, height);
        let center = self.viewport.center;
        Bounds::new(
            Coordinates::new(center.lat - lat_span / 2.0, center.lng - lng_span / 2.0),
            Coordinates::new(center.lat + lat_span / 2.0, center.lng + lng_span / 2.0),
        )
    }

    /// Markers inside the pane, in creation order so later ones draw on top.
    pub(crate) fn placed_pins(&self) -> Vec<PlacedPin> {
        let pane = self.pane.get();
        let hovered = self.hovered.get();
        self.markers
            .iter()
            .filter_map(|(id, pin)| {
                let (column, row) = self.cell_of(pin.at)?;
                Some(PlacedPin {
                    column: pane.x + column,
                    row: pane.y + row,
                    icon: pin.icon,
                    hovered: hovered == Some(*id),
                })
            })
            .collect()
    }

    /// Open info window with the screen cell of its anchor, if the anchor is visible.
    pub(crate) fn open_info(&self) -> Option<(&InfoContent, Option<(u16, u16)>)> {
        let (marker, content) = self.info.as_ref()?;
        let pane = self.pane.get();
        let anchor = self
            .markers
            .get(marker)
            .and_then(|pin| self.cell_of(pin.at))
            .map(|(column, row)| (pane.x + column, pane.y + row));
        Some((content, anchor))
    }

    /// Pointer moved to a screen cell: raises mouseout and mouseover on change.
    pub(crate) fn pointer_moved(&self, column: u16, row: u16) {
        let under = self.marker_at(column, row);
        let previous = self.hovered.replace(under);
        if previous == under {
            return;
        }
        if let Some(left) = previous {
            self.emit(left, MarkerEventKind::MouseOut);
        }
        if let Some(entered) = under {
            self.emit(entered, MarkerEventKind::MouseOver);
        }
    }

    /// Left click on a screen cell. Returns whether a marker was hit.
    pub(crate) fn pointer_clicked(&self, column: u16, row: u16) -> bool {
        let Some(marker) = self.marker_at(column, row) else {
            return false;
        };
        self.emit(marker, MarkerEventKind::Click);
        true
    }

    fn emit(&self, marker: u32, kind: MarkerEventKind) {
        let Some(listeners) = self.listeners.get(&marker) else {
            return;
        };
        for listener in listeners.iter().filter(|listener| listener.kind == kind) {
            let event = MapEvent {
                place: listener.place.clone(),
                kind,
            };
            if listener.events.send(event).is_err() {
                log::debug!("Marker event for {} dropped, nobody listens", listener.place);
            }
        }
    }

    /// Topmost marker drawn at a screen cell.
    fn marker_at(&self, column: u16, row: u16) -> Option<u32> {
        let pane = self.pane.get();
        if !pane.contains((column, row).into()) {
            return None;
        }
        let target = (column - pane.x, row - pane.y);
        self.markers
            .iter()
            .rev()
            .find(|(_, pin)| self.cell_of(pin.at) == Some(target))
            .map(|(id, _)| *id)
    }

    /// Pane-relative cell a coordinate projects onto, `None` outside the view.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "both values are clamped into the pane before the cast"
    )]
    fn cell_of(&self, at: Coordinates) -> Option<(u16, u16)> {
        let bounds = self.visible_bounds();
        if !bounds.contains(at) {
            return None;
        }
        let (width, height) = self.pane_size();
        let column = ((at.lng - bounds.south_west.lng) / bounds.lng_span() * width)
            .floor()
            .clamp(0.0, width - 1.0);
        let row = ((bounds.north_east.lat - at.lat) / bounds.lat_span() * height)
            .floor()
            .clamp(0.0, height - 1.0);
        Some((column as u16, row as u16))
    }

    fn pane_size(&self) -> (f64, f64) {
        let pane = self.pane.get();
        if pane.width == 0 || pane.height == 0 {
            return FALLBACK_PANE;
        }
        (f64::from(pane.width), f64::from(pane.height))
    }
}

/// Visible (lat, lng) spans at a zoom level. Each level halves the span; terminal cells
/// are about twice as tall as wide, and longitude degrees shrink with latitude.
fn spans(zoom: ZoomLevel, center: Coordinates, width: f64, height: f64) -> (f64, f64) {
    let lng_span = 360.0 / 2_f64.powi(i32::from(zoom.0) - 2);
    let lat_span = lng_span * (2.0 * height / width) * center.lat.to_radians().cos();
    (lat_span, lng_span)
}

#[async_trait(?Send)]
impl MapProvider for TerminalMap {
    type Map = TerminalSurface;
    type Marker = MarkerHandle;
    type InfoWindow = InfoPopup;

    async fn ensure_ready(&self) -> Result<(), MapError> {
        self.loader.ensure_ready().await
    }

    fn create_map(
        &mut self,
        container: &str,
        center: Coordinates,
        zoom: ZoomLevel,
    ) -> Result<TerminalSurface, MapError> {
        if self.loader.status() != SdkStatus::Ready || self.mounted {
            return Err(MapError::NotReady);
        }
        self.viewport = Viewport {
            center,
            zoom: zoom.clamped(),
        };
        self.mounted = true;
        log::debug!("Terminal map mounted as {container:?} at {center}");
        Ok(TerminalSurface)
    }

    fn create_marker(
        &mut self,
        _map: &TerminalSurface,
        at: Coordinates,
        icon: MarkerIcon,
    ) -> MarkerHandle {
        self.next_marker += 1;
        self.markers.insert(self.next_marker, Pin { at, icon });
        MarkerHandle(self.next_marker)
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.markers.remove(&marker.0);
        self.listeners.remove(&marker.0);
        if self.hovered.get() == Some(marker.0) {
            self.hovered.set(None);
        }
    }

    fn create_info_window(&mut self, _map: &TerminalSurface) -> InfoPopup {
        InfoPopup
    }

    fn open_info_window(
        &mut self,
        _window: &InfoPopup,
        marker: &MarkerHandle,
        content: &InfoContent,
    ) {
        self.info = Some((marker.0, content.clone()));
    }

    fn close_info_window(&mut self, _window: &InfoPopup) {
        self.info = None;
    }

    fn listen(
        &mut self,
        marker: &MarkerHandle,
        kind: MarkerEventKind,
        place: PlaceId,
        events: MapEventSender,
    ) {
        self.listeners.entry(marker.0).or_default().push(Listener {
            kind,
            place,
            events,
        });
    }

    fn pan_to(&mut self, _map: &TerminalSurface, at: Coordinates) {
        self.viewport.center = at;
    }

    fn set_zoom(&mut self, _map: &TerminalSurface, zoom: ZoomLevel) {
        self.viewport.zoom = zoom.clamped();
    }

    fn fit_bounds(&mut self, _map: &TerminalSurface, bounds: Bounds) {
        let center = bounds.center();
        let (width, height) = self.pane_size();
        let fits = |zoom: ZoomLevel| {
            let (lat_span, lng_span) = spans(zoom, center, width, height);
            bounds.lat_span() * FIT_MARGIN <= lat_span && bounds.lng_span() * FIT_MARGIN <= lng_span
        };
        let zoom = (ZoomLevel::MIN.0..=ZoomLevel::MAX.0)
            .rev()
            .map(ZoomLevel)
            .find(|zoom| fits(*zoom))
            .unwrap_or(ZoomLevel::MIN);
        self.viewport = Viewport { center, zoom };
    }

    fn viewport(&self, _map: &TerminalSurface) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    use super::*;

    const CITY_HALL: Coordinates = Coordinates::new(36.3504, 127.3845);

    fn mounted() -> (TerminalMap, TerminalSurface) {
        let mut map = TerminalMap::new(KakaoScript::new(Client::new(), Some("key".to_owned())));
        map.sdk_checked(Ok(()));
        map.set_pane(Rect::new(10, 5, 60, 20));
        let surface = map
            .create_map("map", CITY_HALL, ZoomLevel::DETAIL)
            .expect("sdk announced ready");
        (map, surface)
    }

    fn drain(rx: &mut UnboundedReceiver<MapEvent>) -> Vec<MarkerEventKind> {
        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event.kind);
        }
        kinds
    }

    #[tokio::test]
    async fn missing_key_fails_the_load() {
        let map = TerminalMap::new(KakaoScript::new(Client::new(), None));

        assert_eq!(map.ensure_ready().await, Err(MapError::MissingApiKey));
    }

    #[tokio::test]
    async fn background_key_check_settles_the_loader() {
        let rejected = TerminalMap::new(KakaoScript::new(Client::new(), Some("key".to_owned())));
        rejected.sdk_checked(Err(MapError::UnauthorizedDomain));
        assert_eq!(rejected.ensure_ready().await, Err(MapError::UnauthorizedDomain));

        let accepted = TerminalMap::new(KakaoScript::new(Client::new(), Some("key".to_owned())));
        accepted.sdk_checked(Ok(()));
        assert_eq!(accepted.ensure_ready().await, Ok(()));
    }

    #[test]
    fn map_needs_a_settled_sdk() {
        let mut map = TerminalMap::new(KakaoScript::new(Client::new(), None));

        assert!(map.create_map("map", CITY_HALL, ZoomLevel::DEFAULT).is_err());
    }

    fn only_pin(map: &TerminalMap) -> PlacedPin {
        let pins = map.placed_pins();
        assert_eq!(pins.len(), 1, "expected a single visible pin");
        *pins.first().expect("one pin")
    }

    #[test]
    fn center_lands_in_the_middle_of_the_pane() {
        let (mut map, surface) = mounted();
        map.create_marker(&surface, CITY_HALL, MarkerIcon::Tour);

        let pin = only_pin(&map);

        assert!(pin.column.abs_diff(10 + 30) <= 1, "column {}", pin.column);
        assert!(pin.row.abs_diff(5 + 10) <= 1, "row {}", pin.row);
        assert_eq!(pin.icon, MarkerIcon::Tour);
    }

    #[test]
    fn markers_outside_the_view_are_not_drawn() {
        let (mut map, surface) = mounted();
        map.create_marker(&surface, Coordinates::new(37.5665, 126.978), MarkerIcon::Food);

        assert!(map.placed_pins().is_empty());
    }

    #[test]
    fn pointer_raises_hover_and_click_events() {
        let (mut map, surface) = mounted();
        let (events, mut rx) = unbounded_channel();
        let marker = map.create_marker(&surface, CITY_HALL, MarkerIcon::Parking);
        for kind in MarkerEventKind::ALL {
            map.listen(&marker, kind, PlaceId("p".to_owned()), events.clone());
        }

        let pin = only_pin(&map);

        map.pointer_moved(pin.column, pin.row);
        map.pointer_moved(pin.column, pin.row);
        assert!(only_pin(&map).hovered);
        assert!(map.pointer_clicked(pin.column, pin.row));
        map.pointer_moved(0, 0);

        assert_eq!(
            drain(&mut rx),
            [
                MarkerEventKind::MouseOver,
                MarkerEventKind::Click,
                MarkerEventKind::MouseOut
            ]
        );
        assert!(!map.pointer_clicked(11, 6));
    }

    #[test]
    fn removed_markers_stop_emitting() {
        let (mut map, surface) = mounted();
        let (events, mut rx) = unbounded_channel();
        let marker = map.create_marker(&surface, CITY_HALL, MarkerIcon::Tour);
        map.listen(&marker, MarkerEventKind::Click, PlaceId("t".to_owned()), events);
        let pin = only_pin(&map);

        map.remove_marker(marker);

        assert!(!map.pointer_clicked(pin.column, pin.row));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn fit_bounds_shows_every_corner() {
        let (mut map, surface) = mounted();
        let bounds = Bounds::new(Coordinates::new(36.30, 127.33), Coordinates::new(36.40, 127.45));

        map.fit_bounds(&surface, bounds);

        let visible = map.visible_bounds();
        assert!(visible.contains(bounds.south_west));
        assert!(visible.contains(bounds.north_east));
        assert!(map.zoom() < ZoomLevel::DETAIL);
    }

    #[test]
    fn info_window_follows_its_marker() {
        let (mut map, surface) = mounted();
        let window = map.create_info_window(&surface);
        let marker = map.create_marker(&surface, CITY_HALL, MarkerIcon::Tour);
        let content = InfoContent {
            place: PlaceId("t".to_owned()),
            title: "대전시청".to_owned(),
            address: "대전광역시 서구 둔산로 100".to_owned(),
            detail: None,
        };

        let pin = only_pin(&map);

        map.open_info_window(&window, &marker, &content);
        assert_eq!(map.open_info(), Some((&content, Some((pin.column, pin.row)))));

        map.close_info_window(&window);
        assert_eq!(map.open_info(), None);
    }
}
