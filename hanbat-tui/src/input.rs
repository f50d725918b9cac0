use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use hanbat_core::model::Category;

use crate::app::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Switch tabs and fetch the new category
    SwitchTab(Category),
    /// Fetch the active category again
    Reload,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Up};

    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if let Some(keyword) = app.keyword_input.as_mut() {
        match key.code {
            Char(character)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                keyword.push(character);
                app.update_keyword();
            }
            Backspace => {
                keyword.pop();
                app.update_keyword();
            }
            Enter | Esc => app.end_keyword(),
            _ => {}
        }
        return Action::None;
    }

    app.status = None;
    match key.code {
        Char('q') => return Action::Quit,
        Char(digit @ '1'..='9') => {
            if let Some(category) = tab_for_digit(&app.service.categories(), digit) {
                return Action::SwitchTab(category);
            }
        }
        Char('r') => return Action::Reload,
        Char('d') => app.cycle_district(true),
        Char('D') => app.cycle_district(false),
        Char('o') => app.cycle_dong(),
        Char('s') => app.toggle_sort(),
        Char('/') => app.begin_keyword(),
        Char('+') => app.page.zoom_by(1),
        Char('-') => app.page.zoom_by(-1),
        Up | Char('k') => app.move_cursor(false),
        Down | Char('j') => app.move_cursor(true),
        Enter => app.select_current(),
        Esc => app.page.clear_selection(),
        _ => {}
    }
    Action::None
}

/// Tab bound to a number key; tabs are numbered from 1 in registry order.
fn tab_for_digit(tabs: &[Category], digit: char) -> Option<Category> {
    let index = digit.to_digit(10)?.checked_sub(1)?;
    tabs.get(usize::try_from(index).ok()?).copied()
}

/// Pointer activity over the map pane turns into marker events; the page sees them
/// once the main loop drains the event channel.
pub(crate) fn handle_mouse_event(mouse: MouseEvent, app: &App) {
    let map = app.page.controller().provider();
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            map.pointer_moved(mouse.column, mouse.row);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            map.pointer_moved(mouse.column, mouse.row);
            map.pointer_clicked(mouse.column, mouse.row);
        }
        _ => {}
    }
}
