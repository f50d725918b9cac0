use std::sync::Arc;

use hanbat_core::{
    filter::{AreaFilter, DISTRICTS},
    model::Place,
    page::MapPage,
    service::PlaceService,
};

use crate::canvas_map::TerminalMap;

pub(crate) struct App {
    pub page: MapPage<TerminalMap>,
    pub service: Arc<PlaceService>,
    pub page_size: u32,

    pub list_index: usize,
    /// Keyword being typed; `None` while not editing.
    pub keyword_input: Option<String>,

    pub status: Option<String>,
}

impl App {
    pub(crate) fn new(
        page: MapPage<TerminalMap>,
        service: Arc<PlaceService>,
        page_size: u32,
    ) -> Self {
        Self {
            page,
            service,
            page_size,
            list_index: 0,
            keyword_input: None,
            status: None,
        }
    }

    pub(crate) fn move_cursor(&mut self, down: bool) {
        let len = self.page.places().len();
        if down {
            if self.list_index + 1 < len {
                self.list_index += 1;
            }
        } else {
            self.list_index = self.list_index.saturating_sub(1);
        }
    }

    /// Keep the cursor inside the list after it changed.
    pub(crate) fn clamp_cursor(&mut self) {
        let len = self.page.places().len();
        self.list_index = self.list_index.min(len.saturating_sub(1));
    }

    /// Move the cursor onto the selected place, e.g. after a marker click.
    pub(crate) fn follow_selection(&mut self) {
        let Some(selected) = self.page.selected_id() else {
            return;
        };
        if let Some(index) = self
            .page
            .places()
            .iter()
            .position(|place| &place.id == selected)
        {
            self.list_index = index;
        }
    }

    pub(crate) fn current_place(&self) -> Option<&Place> {
        self.page.places().get(self.list_index)
    }

    /// List click on the item under the cursor.
    pub(crate) fn select_current(&mut self) {
        let Some(id) = self.current_place().map(|place| place.id.clone()) else {
            return;
        };
        self.page.select(&id);
    }

    pub(crate) fn cycle_district(&mut self, forward: bool) {
        let options: Vec<AreaFilter> = std::iter::once(AreaFilter::All)
            .chain(DISTRICTS.iter().map(|name| AreaFilter::Only((*name).to_owned())))
            .collect();
        let next = step(&options, self.page.filters().district(), forward);

        if let Err(err) = self.page.set_district(next) {
            self.status = Some(err.to_string());
        }
        self.list_index = 0;
    }

    pub(crate) fn cycle_dong(&mut self) {
        if self.page.filters().district() == &AreaFilter::All {
            self.status = Some("Pick a district first (d / D)".to_owned());
            return;
        }

        let options: Vec<AreaFilter> = std::iter::once(AreaFilter::All)
            .chain(self.page.available_dongs().into_iter().map(AreaFilter::Only))
            .collect();
        let next = step(&options, self.page.filters().dong(), true);

        if let Err(err) = self.page.set_dong(next) {
            self.status = Some(err.to_string());
        }
        self.list_index = 0;
    }

    pub(crate) fn toggle_sort(&mut self) {
        let sort = self.page.sort().toggled();
        self.page.set_sort(sort);
        self.follow_selection();
        self.clamp_cursor();
    }

    /// Start editing the keyword, seeded with the current one.
    pub(crate) fn begin_keyword(&mut self) {
        self.keyword_input = Some(self.page.keyword().to_owned());
    }

    /// Apply the keyword as typed so far.
    pub(crate) fn update_keyword(&mut self) {
        if let Some(keyword) = &self.keyword_input {
            self.page.set_keyword(keyword.clone());
            self.list_index = 0;
        }
    }

    pub(crate) fn end_keyword(&mut self) {
        self.keyword_input = None;
    }
}

/// Option after (or before) `current`; unknown values restart at the first option.
fn step(options: &[AreaFilter], current: &AreaFilter, forward: bool) -> AreaFilter {
    let len = options.len();
    let next = match options.iter().position(|option| option == current) {
        Some(index) if forward => (index + 1) % len,
        Some(index) => (index + len - 1) % len,
        None => 0,
    };
    options.get(next).cloned().unwrap_or(AreaFilter::All)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn options() -> Vec<AreaFilter> {
        vec![
            AreaFilter::All,
            AreaFilter::Only("궁동".to_owned()),
            AreaFilter::Only("봉명동".to_owned()),
        ]
    }

    #[rstest]
    #[case(AreaFilter::All, true, AreaFilter::Only("궁동".to_owned()))]
    #[case(AreaFilter::Only("봉명동".to_owned()), true, AreaFilter::All)]
    #[case(AreaFilter::All, false, AreaFilter::Only("봉명동".to_owned()))]
    #[case(AreaFilter::Only("둔산동".to_owned()), true, AreaFilter::All)]
    fn steps_through_options(
        #[case] current: AreaFilter,
        #[case] forward: bool,
        #[case] expected: AreaFilter,
    ) {
        assert_eq!(step(&options(), &current, forward), expected);
    }

    #[test]
    fn empty_options_fall_back_to_all() {
        assert_eq!(step(&[], &AreaFilter::All, true), AreaFilter::All);
    }
}
