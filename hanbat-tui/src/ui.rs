use ratatui::{
    prelude::*,
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap,
        canvas::{Canvas, Rectangle},
    },
};

use hanbat_core::{
    controller::MapSurface,
    filter::{AreaFilter, SortOrder},
    map::{InfoContent, MarkerIcon},
    model::{Place, PlaceAttributes},
    validate::MUNICIPAL_REGION,
};

use crate::app::App;
use crate::canvas_map::TerminalMap;

/// Screen regions; shared by drawing and pointer handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Panes {
    pub header: Rect,
    pub list: Rect,
    pub detail: Rect,
    pub map: Rect,
    pub status: Rect,
}

impl Panes {
    /// Map drawing area inside its border.
    pub(crate) fn map_inner(&self) -> Rect {
        self.map.inner(Margin::new(1, 1))
    }
}

pub(crate) fn layout(area: Rect) -> Panes {
    let [header, body, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);
    let [left, map] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(body);
    let [list, detail] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(7)]).areas(left);

    Panes {
        header,
        list,
        detail,
        map,
        status,
    }
}

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let panes = layout(frame.area());

    draw_tabs(frame, app, panes.header);
    draw_list(frame, app, panes.list);
    draw_detail(frame, app, panes.detail);
    draw_map(frame, app, &panes);
    draw_status(frame, app, panes.status);
}

fn draw_tabs(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let active = app.page.active_tab();
    let tabs = app.service.categories();
    let titles = tabs
        .iter()
        .enumerate()
        .map(|(idx, category)| format!("{} {}", idx + 1, category.label()));
    let selected = tabs
        .iter()
        .position(|category| *category == active)
        .unwrap_or_default();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("대전 관광 지도"))
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn list_title(app: &App) -> String {
    let filters = app.page.filters();
    let district = filters.district().name().unwrap_or("전체");
    let mut title = format!("{} · {district}", app.page.active_tab().label());
    if let AreaFilter::Only(dong) = filters.dong() {
        title.push(' ');
        title.push_str(dong);
    }
    if !app.page.keyword().is_empty() {
        title.push_str(" · \"");
        title.push_str(app.page.keyword());
        title.push('"');
    }
    if app.page.sort() == SortOrder::Name {
        title.push_str(" · 이름순");
    }
    format!("{title} ({})", app.page.places().len())
}

fn draw_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let places = app.page.places();
    let selected = app.page.selected_id();

    let items = if app.page.is_loading() {
        vec![ListItem::new("Loading…")]
    } else if places.is_empty() {
        vec![ListItem::new("No places match the current filters.")]
    } else {
        places
            .iter()
            .map(|place| {
                let marker = if place.is_mappable() { "●" } else { "○" };
                let style = if selected == Some(&place.id) {
                    Style::default()
                        .fg(icon_color(MarkerIcon::for_category(Some(place.category))))
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!("{marker} {}", place.name)).style(style)
            })
            .collect()
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(list_title(app)))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !places.is_empty() && !app.page.is_loading() {
        state.select(Some(app.list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Selected");
    let Some(place) = app.page.controller().selected() else {
        let hint = Paragraph::new("Enter on a list item or click a marker.").block(block);
        frame.render_widget(hint, area);
        return;
    };

    let paragraph = Paragraph::new(detail_lines(place))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn detail_lines(place: &Place) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(place.name.clone()).bold(),
        Line::from(place.address.clone()),
    ];
    let extra = match &place.attributes {
        PlaceAttributes::Tour { summary, phone } => [summary.clone(), phone.clone()],
        PlaceAttributes::Food { menu, phone, .. } => [menu.clone(), phone.clone()],
        PlaceAttributes::Parking {
            capacity,
            fee,
            lot_type,
        } => [
            capacity.map(|capacity| format!("{capacity}면")),
            match (lot_type, fee) {
                (Some(lot_type), Some(fee)) => Some(format!("{lot_type} · {fee}")),
                (lot_type, fee) => lot_type.clone().or_else(|| fee.clone()),
            },
        ],
    };
    lines.extend(extra.into_iter().flatten().map(Line::from));
    if !place.is_mappable() {
        lines.push(Line::from("No location on the map").italic());
    }
    lines
}

fn draw_map(frame: &mut Frame<'_>, app: &App, panes: &Panes) {
    let controller = app.page.controller();
    let map = controller.provider();
    let zoom = map.zoom().0;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Map [+/-] z{zoom}"));

    match controller.surface() {
        MapSurface::Loading => {
            let paragraph = Paragraph::new("Loading map…").block(block);
            frame.render_widget(paragraph, panes.map);
        }
        MapSurface::Error(err) => {
            let paragraph = Paragraph::new(format!("Map unavailable: {err}"))
                .style(Style::default().fg(Color::Red))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, panes.map);
        }
        MapSurface::Map => {
            draw_canvas(frame, map, block, panes.map);
            draw_pins(frame, map);
            if let Some((content, anchor)) = map.open_info() {
                draw_info(frame, content, anchor, panes.map_inner());
            }
        }
    }
}

fn draw_canvas(frame: &mut Frame<'_>, map: &TerminalMap, block: Block<'_>, area: Rect) {
    let visible = map.visible_bounds();
    let region = MUNICIPAL_REGION;
    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([visible.south_west.lng, visible.north_east.lng])
        .y_bounds([visible.south_west.lat, visible.north_east.lat])
        .paint(move |ctx| {
            ctx.draw(&Rectangle {
                x: region.south_west.lng,
                y: region.south_west.lat,
                width: region.lng_span(),
                height: region.lat_span(),
                color: Color::DarkGray,
            });
        });
    frame.render_widget(canvas, area);
}

/// Markers go straight into the buffer so they sit on the cells pointer hit-testing uses.
fn draw_pins(frame: &mut Frame<'_>, map: &TerminalMap) {
    let buffer = frame.buffer_mut();
    for pin in map.placed_pins() {
        if let Some(cell) = buffer.cell_mut((pin.column, pin.row)) {
            let mut style = Style::default().fg(icon_color(pin.icon)).add_modifier(Modifier::BOLD);
            if pin.hovered {
                style = style.add_modifier(Modifier::REVERSED);
            }
            cell.set_symbol(icon_symbol(pin.icon)).set_style(style);
        }
    }
}

fn draw_info(frame: &mut Frame<'_>, content: &InfoContent, anchor: Option<(u16, u16)>, pane: Rect) {
    let mut lines = vec![Line::from(content.address.clone())];
    if let Some(detail) = &content.detail {
        lines.push(Line::from(detail.clone()).italic());
    }

    let width = pane.width.min(36);
    let height = pane.height.min(u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2));
    let (column, row) = anchor.unwrap_or((pane.x, pane.y));
    // Prefer the row below the marker, flip above when it would leave the pane.
    let top = if row.saturating_add(1).saturating_add(height) <= pane.bottom() {
        row.saturating_add(1)
    } else {
        row.saturating_sub(height).max(pane.y)
    };
    let left = column
        .saturating_sub(width / 2)
        .clamp(pane.x, pane.right().saturating_sub(width));
    let area = Rect::new(left, top, width, height).intersection(pane);

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(content.title.clone()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn draw_status(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let nav_hint =
        "1/2/3 tab · d/D district · o dong · / search · s sort · ↑/↓ Enter select · Esc clear · q quit";

    let (text, style) = if let Some(keyword) = &app.keyword_input {
        (
            format!("Search: {keyword}▏ (Enter/Esc done)"),
            Style::default().fg(Color::Cyan),
        )
    } else if let Some(message) = &app.status {
        (
            format!("{message} · {nav_hint}"),
            Style::default().fg(Color::Red),
        )
    } else if app.page.is_loading() {
        (
            format!("Loading… · {nav_hint}"),
            Style::default().fg(Color::Yellow),
        )
    } else {
        (nav_hint.to_owned(), Style::default())
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style)
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

const fn icon_symbol(icon: MarkerIcon) -> &'static str {
    match icon {
        MarkerIcon::Tour => "★",
        MarkerIcon::Food => "♨",
        MarkerIcon::Parking => "P",
        MarkerIcon::Default => "●",
    }
}

const fn icon_color(icon: MarkerIcon) -> Color {
    match icon {
        MarkerIcon::Tour => Color::Magenta,
        MarkerIcon::Food => Color::LightRed,
        MarkerIcon::Parking => Color::LightBlue,
        MarkerIcon::Default => Color::White,
    }
}
