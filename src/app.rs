use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::page::{MonthPage, PAGE_HEIGHT};
use crate::theme::{BASE_STYLE, STATUS_STYLE};
use crossterm::event::{read, KeyCode, KeyEvent, KeyModifiers};
use monthgrid::{
    CalendarEvent, CalendarGrid, GridCoordinate, GridObserver, RangeProvider, ITEMS_PER_SECTION,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    text::Line,
    widgets::{StatefulWidget, Widget},
    DefaultTerminal,
};
use std::io::{self, Write};
use time::{Date, OffsetDateTime};

/// Number of cells per row of a month page
const WEEK: i16 = 7;

/// Observer that keeps a one-line description of the most recent
/// notification for display under the calendar
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct StatusLine {
    message: String,
    refreshes: usize,
}

impl StatusLine {
    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

impl GridObserver for StatusLine {
    fn did_scroll_to_month(&mut self, month: OffsetDateTime) {
        self.message = format!("{} {}", month.month(), month.year());
    }

    fn did_select_date(&mut self, date: OffsetDateTime, events: &[CalendarEvent]) {
        self.message = if events.is_empty() {
            format!("Selected {} (no events)", date.date())
        } else {
            let titles = events
                .iter()
                .map(|ev| ev.title.as_str())
                .collect::<Vec<_>>();
            format!("Selected {}: {}", date.date(), titles.join(", "))
        };
    }

    fn did_deselect_date(&mut self, date: OffsetDateTime) {
        self.message = format!("Deselected {}", date.date());
    }

    fn grid_needs_refresh(&mut self) {
        self.refreshes += 1;
    }
}

#[derive(Clone, Debug)]
pub(crate) struct App<R> {
    grid: CalendarGrid<R, StatusLine>,
    page: u32,
    cursor: u8,
    state: AppState,
}

impl<R: RangeProvider> App<R> {
    pub(crate) fn new(grid: CalendarGrid<R, StatusLine>) -> App<R> {
        let mut app = App {
            grid,
            page: 0,
            cursor: 0,
            state: AppState::Calendar,
        };
        if !app.reset() {
            app.cursor = app
                .grid
                .month_layout(0)
                .map_or(0, |layout| layout.first_weekday_offset);
            app.settle();
        }
        if app.grid.number_of_sections() == 0 {
            app.grid.observer_mut().message = String::from("No dates in range");
        }
        app
    }

    pub(crate) fn run(mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        while !self.quitting() {
            self.grid.flush_refresh();
            self.draw(terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(&mut *self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key or the key had
    // nothing to act on
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1),
                KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1),
                KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-WEEK),
                KeyCode::Char('j') | KeyCode::Down => self.move_cursor(WEEK),
                KeyCode::Char('p') | KeyCode::PageUp => self.previous_page(),
                KeyCode::Char('n') | KeyCode::PageDown => self.next_page(),
                KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selection(),
                KeyCode::Char('0') | KeyCode::Home => self.reset(),
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char(c) => match c.to_digit(10).and_then(|d| u8::try_from(d).ok()) {
                            Some(d) => state.handle_input(JumpToInput::Digit(d)),
                            None => JumpToOutput::Invalid,
                        },
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(date) => {
                            self.state = AppState::Calendar;
                            self.jump_to(date)
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn coordinate(&self) -> GridCoordinate {
        GridCoordinate::new(self.page, self.cursor)
    }

    fn settle(&mut self) {
        self.grid.on_page_settled(i64::from(self.page));
    }

    fn move_cursor(&mut self, delta: i16) -> bool {
        match u8::try_from(i16::from(self.cursor) + delta) {
            Ok(item) if item < ITEMS_PER_SECTION => {
                self.cursor = item;
                true
            }
            _ => false,
        }
    }

    fn next_page(&mut self) -> bool {
        if self.page + 1 < self.grid.number_of_sections() {
            self.page += 1;
            self.settle();
            true
        } else {
            false
        }
    }

    fn previous_page(&mut self) -> bool {
        let Some(page) = self.page.checked_sub(1) else {
            return false;
        };
        self.page = page;
        self.settle();
        true
    }

    fn toggle_selection(&mut self) -> bool {
        let coordinate = self.coordinate();
        if self.grid.cell_info(coordinate).is_selected {
            return self.grid.on_user_deselect(coordinate);
        }
        if self.grid.day_for_coordinate(coordinate).is_none() {
            return false;
        }
        if !self.grid.allows_multiple_selection() {
            // The grid leaves clearing the old selection to its host
            let selected = self
                .grid
                .selection()
                .iter()
                .map(|&(c, _)| c)
                .collect::<Vec<_>>();
            for c in selected {
                self.grid.on_user_deselect(c);
            }
        }
        self.grid.on_user_select(coordinate)
    }

    /// Moves the cursor to today, if today is in the grid
    fn reset(&mut self) -> bool {
        let Some(today) = self.grid.today() else {
            return false;
        };
        self.page = today.section;
        self.cursor = today.item;
        self.settle();
        true
    }

    fn jump_to(&mut self, date: Date) -> bool {
        let instant = date.midnight().assume_utc();
        let Ok(offset) = self.grid.set_display_date(instant) else {
            return false;
        };
        let Ok(page) = u32::try_from(self.grid.page_for_offset(offset)) else {
            return false;
        };
        let Some(coordinate) = self.grid.coordinate_for_date(instant) else {
            return false;
        };
        self.page = page;
        self.cursor = coordinate.item;
        self.settle();
        true
    }
}

impl<R: RangeProvider> Widget for &mut App<R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [page_area, status_area] = Layout::vertical([
            Constraint::Length(PAGE_HEIGHT + 1),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(area);
        let title = self.grid.month_title(self.page).unwrap_or_default();
        let cells = self.grid.cells(self.page);
        MonthPage::new(&title, &cells)
            .cursor(self.cursor)
            .render(page_area, buf);
        Line::styled(self.grid.observer().message(), STATUS_STYLE)
            .centered()
            .render(status_area, buf);
        if self.state == AppState::Helping {
            Help.render(area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Jumping(JumpToState),
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use monthgrid::{DateRange, GridConfig, ScrollAxis};
    use time::macros::{date, datetime};

    fn app() -> App<DateRange> {
        let mut grid = CalendarGrid::new(
            DateRange::new(
                datetime!(2024 - 01 - 15 0:00 UTC),
                datetime!(2024 - 04 - 01 0:00 UTC),
            ),
            StatusLine::default(),
        )
        .with_now(datetime!(2024 - 02 - 10 12:00 UTC));
        grid.set_events(vec![CalendarEvent::new(
            "Dentist",
            datetime!(2024 - 02 - 10 9:30 UTC),
            datetime!(2024 - 02 - 10 10:00 UTC),
        )]);
        App::new(grid)
    }

    #[test]
    fn test_starts_on_today() {
        let app = app();
        assert_eq!(app.coordinate(), GridCoordinate::new(1, 12));
        assert_eq!(app.grid.observer().message(), "February 2024");
    }

    #[test]
    fn test_select_under_cursor() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.grid.observer().message(), "Selected 2024-02-10: Dentist");
        assert!(app.handle_key(KeyCode::Char(' ')));
        assert_eq!(app.grid.observer().message(), "Deselected 2024-02-10");
        assert!(app.grid.selection().is_empty());
    }

    #[test]
    fn test_single_selection_is_kept_by_host() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Enter));
        assert!(app.handle_key(KeyCode::Right));
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(
            app.grid.selected_dates(),
            [datetime!(2024 - 02 - 11 0:00 UTC)]
        );
        assert_eq!(app.grid.observer().message(), "Selected 2024-02-11 (no events)");
    }

    #[test]
    fn test_blank_cell_is_not_selectable() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Up));
        assert!(app.handle_key(KeyCode::Left));
        assert!(app.handle_key(KeyCode::Left));
        assert!(app.handle_key(KeyCode::Left));
        // Item 2 precedes February 1
        assert_eq!(app.cursor, 2);
        assert!(!app.handle_key(KeyCode::Enter));
        assert!(app.grid.selection().is_empty());
    }

    #[test]
    fn test_cursor_stays_on_page() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Up));
        assert!(!app.handle_key(KeyCode::Up));
        assert!(app.handle_key(KeyCode::Home));
        for _ in 0..4 {
            assert!(app.handle_key(KeyCode::Down));
        }
        assert_eq!(app.cursor, 40);
        assert!(!app.handle_key(KeyCode::Down));
    }

    #[test]
    fn test_paging() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::PageDown));
        assert!(app.handle_key(KeyCode::PageDown));
        assert_eq!(app.grid.observer().message(), "April 2024");
        assert!(!app.handle_key(KeyCode::PageDown));
        for _ in 0..3 {
            assert!(app.handle_key(KeyCode::PageUp));
        }
        assert_eq!(app.grid.observer().message(), "January 2024");
        assert!(!app.handle_key(KeyCode::PageUp));
        assert!(app.handle_key(KeyCode::Char('0')));
        assert_eq!(app.coordinate(), GridCoordinate::new(1, 12));
    }

    #[test]
    fn test_jump_to_date() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('g')));
        for c in "20240315".chars() {
            assert!(app.handle_key(KeyCode::Char(c)));
        }
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Calendar);
        // March 2024 starts on a Friday
        assert_eq!(app.coordinate(), GridCoordinate::new(2, 18));
        assert_eq!(app.grid.observer().message(), "March 2024");
    }

    #[test]
    fn test_jump_out_of_range() {
        let mut app = app();
        assert!(app.jump_to(date!(2024 - 03 - 31)));
        assert!(!app.jump_to(date!(2024 - 04 - 01)));
        assert!(!app.jump_to(date!(2023 - 12 - 25)));
        assert_eq!(app.coordinate(), GridCoordinate::new(2, 34));
    }

    #[test]
    fn test_jump_with_page_extent() {
        let config = GridConfig {
            scroll_axis: ScrollAxis::Vertical,
            page_extent: 480,
            start: Some(datetime!(2024 - 01 - 01 0:00 UTC)),
            end: Some(datetime!(2025 - 01 - 01 0:00 UTC)),
            ..GridConfig::default()
        };
        let mut grid = CalendarGrid::new(config.clone(), StatusLine::default())
            .with_now(datetime!(2023 - 06 - 01 0:00 UTC));
        config.configure(&mut grid);
        let mut app = App::new(grid);
        assert_eq!(app.coordinate(), GridCoordinate::new(0, 0));
        assert!(app.jump_to(date!(2024 - 09 - 01)));
        assert_eq!(app.coordinate(), GridCoordinate::new(8, 6));
    }

    #[test]
    fn test_empty_grid() {
        let grid = CalendarGrid::new((), StatusLine::default())
            .with_now(datetime!(2024 - 02 - 10 0:00 UTC));
        let mut app = App::new(grid);
        assert_eq!(app.grid.observer().message(), "No dates in range");
        assert!(!app.handle_key(KeyCode::Enter));
        assert!(!app.handle_key(KeyCode::PageDown));
        assert!(!app.handle_key(KeyCode::Home));
        let area = Rect::new(0, 0, 40, 12);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
    }

    #[test]
    fn test_refresh_reaches_observer() {
        let mut app = app();
        assert!(app.grid.flush_refresh());
        assert_eq!(app.grid.observer().refreshes, 1);
        assert!(!app.grid.flush_refresh());
    }
}
