//! Click, hover, and list-click semantics.
//!
//! The handler only reads the marker registry and the current selection and answers
//! with a [`Transition`] for the controller to carry out. It never touches markers.

use crate::map::{MapEvent, MarkerEventKind};
use crate::model::PlaceId;

#[derive(Debug, Clone, PartialEq, Eq)]
/// User input that concerns a place.
pub enum Interaction {
    /// A marker was clicked.
    MarkerClick(PlaceId),
    /// The pointer entered a marker.
    MarkerOver(PlaceId),
    /// The pointer left a marker.
    MarkerOut(PlaceId),
    /// A list item was clicked.
    ListClick(PlaceId),
}

impl From<MapEvent> for Interaction {
    fn from(event: MapEvent) -> Self {
        match event.kind {
            MarkerEventKind::Click => Self::MarkerClick(event.place),
            MarkerEventKind::MouseOver => Self::MarkerOver(event.place),
            MarkerEventKind::MouseOut => Self::MarkerOut(event.place),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Who opened the shared info window.
pub enum InfoOwner {
    /// A click or list click; stays until the selection changes.
    Selection,
    /// A hover preview; goes away on mouseout.
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Place whose content the shared info window currently shows.
pub struct OpenInfo {
    /// Place shown.
    pub place: PlaceId,
    /// Who opened it.
    pub owner: InfoOwner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What the controller should do in response to an interaction.
pub enum Transition {
    /// Select the place, open its window if it has a marker, pan and zoom to it.
    Focus(PlaceId),
    /// Show the place in the info window without touching selection or viewport.
    Preview(PlaceId),
    /// Put the selected place back into the info window after a preview.
    RestoreSelection(PlaceId),
    /// Close a preview window.
    ClosePreview,
    /// Nothing to do.
    Ignore,
}

/// Decide the transition for `interaction`.
///
/// `has_marker` must answer against the live marker registry, so events that arrive
/// after a rebuild for markers that no longer exist are ignored.
pub fn interpret(
    interaction: &Interaction,
    selection: Option<&PlaceId>,
    open: Option<&OpenInfo>,
    has_marker: impl Fn(&PlaceId) -> bool,
) -> Transition {
    match interaction {
        Interaction::MarkerClick(place) if has_marker(place) => Transition::Focus(place.clone()),
        Interaction::MarkerClick(_) => Transition::Ignore,
        Interaction::ListClick(place) => Transition::Focus(place.clone()),
        Interaction::MarkerOver(place) => {
            let already_shown = open.is_some_and(|open| &open.place == place);
            if already_shown || !has_marker(place) {
                Transition::Ignore
            } else {
                Transition::Preview(place.clone())
            }
        }
        Interaction::MarkerOut(place) => match open {
            Some(OpenInfo {
                place: shown,
                owner: InfoOwner::Preview,
            }) if shown == place => match selection {
                Some(selected) if has_marker(selected) => {
                    Transition::RestoreSelection(selected.clone())
                }
                _ => Transition::ClosePreview,
            },
            _ => Transition::Ignore,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> PlaceId {
        PlaceId(raw.to_owned())
    }

    fn shown(raw: &str, owner: InfoOwner) -> OpenInfo {
        OpenInfo {
            place: id(raw),
            owner,
        }
    }

    #[test]
    fn click_focuses_live_marker_only() {
        let live = |place: &PlaceId| place.0 == "m";

        assert_eq!(
            interpret(&Interaction::MarkerClick(id("m")), None, None, live),
            Transition::Focus(id("m"))
        );
        assert_eq!(
            interpret(&Interaction::MarkerClick(id("gone")), None, None, live),
            Transition::Ignore
        );
    }

    #[test]
    fn list_click_focuses_even_without_marker() {
        assert_eq!(
            interpret(&Interaction::ListClick(id("x")), None, None, |_| false),
            Transition::Focus(id("x"))
        );
    }

    #[test]
    fn hover_previews_without_selecting() {
        let selection = id("n");
        let open = shown("n", InfoOwner::Selection);

        assert_eq!(
            interpret(
                &Interaction::MarkerOver(id("m")),
                Some(&selection),
                Some(&open),
                |_| true
            ),
            Transition::Preview(id("m"))
        );
    }

    #[test]
    fn hover_over_clicked_marker_keeps_its_window() {
        let selection = id("n");
        let open = shown("n", InfoOwner::Selection);

        assert_eq!(
            interpret(
                &Interaction::MarkerOver(id("n")),
                Some(&selection),
                Some(&open),
                |_| true
            ),
            Transition::Ignore
        );
        assert_eq!(
            interpret(
                &Interaction::MarkerOut(id("n")),
                Some(&selection),
                Some(&open),
                |_| true
            ),
            Transition::Ignore
        );
    }

    #[test]
    fn leaving_a_preview_restores_the_clicked_window() {
        let selection = id("n");
        let open = shown("m", InfoOwner::Preview);

        assert_eq!(
            interpret(
                &Interaction::MarkerOut(id("m")),
                Some(&selection),
                Some(&open),
                |_| true
            ),
            Transition::RestoreSelection(id("n"))
        );
    }

    #[test]
    fn leaving_a_preview_without_selection_closes_it() {
        let open = shown("m", InfoOwner::Preview);

        assert_eq!(
            interpret(&Interaction::MarkerOut(id("m")), None, Some(&open), |_| true),
            Transition::ClosePreview
        );
        assert_eq!(
            interpret(&Interaction::MarkerOut(id("other")), None, Some(&open), |_| true),
            Transition::Ignore
        );
    }
}
