use super::events::{CalendarEvent, EventIndex};
use super::mapper::{DateRange, GridMapper};
use super::scroll::{offset_for_section, page_for_offset, ScrollAxis, ScrollOffset};
use super::selection::SelectionSet;
use super::util::{add_months_clamped, GridCoordinate, MonthLayout, ITEMS_PER_SECTION};
use super::{GridObserver, RangeProvider};
use thiserror::Error;
use time::OffsetDateTime;

/// What the host needs to draw one cell of a month page
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CellInfo {
    pub day_number: Option<u8>,
    pub is_blank: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub event_count: usize,
}

impl CellInfo {
    fn blank() -> CellInfo {
        CellInfo {
            day_number: None,
            is_blank: true,
            is_today: false,
            is_selected: false,
            event_count: 0,
        }
    }
}

/// The state behind a paged month grid.
///
/// The range is pulled from `R` on construction and on every [`reload()`];
/// selection, scrolling, and refresh notifications are pushed to `O`.
///
/// [`reload()`]: CalendarGrid::reload
#[derive(Clone, Debug)]
pub struct CalendarGrid<R, O> {
    provider: R,
    observer: O,
    pinned_now: Option<OffsetDateTime>,
    mapper: GridMapper,
    events: Vec<CalendarEvent>,
    event_index: EventIndex,
    selection: SelectionSet,
    display_date: Option<OffsetDateTime>,
    scroll_axis: ScrollAxis,
    page_extent: u32,
    allows_multiple_selection: bool,
    needs_refresh: bool,
}

impl<R: RangeProvider, O: GridObserver> CalendarGrid<R, O> {
    pub fn new(provider: R, observer: O) -> Self {
        let now = OffsetDateTime::now_utc();
        let mapper = GridMapper::normalize(DateRange::new(now, now), now);
        let mut grid = CalendarGrid {
            provider,
            observer,
            pinned_now: None,
            mapper,
            events: Vec::new(),
            event_index: EventIndex::default(),
            selection: SelectionSet::default(),
            display_date: None,
            scroll_axis: ScrollAxis::default(),
            page_extent: 1,
            allows_multiple_selection: false,
            needs_refresh: false,
        };
        grid.reload();
        grid
    }

    /// Use `now` as the current instant instead of the system clock
    pub fn with_now(mut self, now: OffsetDateTime) -> Self {
        self.pinned_now = Some(now);
        self.reload();
        self
    }

    pub fn now(&self) -> OffsetDateTime {
        self.pinned_now.unwrap_or_else(OffsetDateTime::now_utc)
    }

    pub fn provider(&self) -> &R {
        &self.provider
    }

    /// Gives access to the range provider.  Call [`CalendarGrid::reload()`]
    /// after changing the range it reports.
    pub fn provider_mut(&mut self) -> &mut R {
        &mut self.provider
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Pulls the range from the provider again and rebuilds everything
    /// derived from it.
    ///
    /// Selections are kept as they are, coordinates included.  If the start
    /// moves to a different month, a stored coordinate then marks another
    /// day and [`CalendarGrid::deselect_date()`] no longer finds the original
    /// date, so deselect before changing the range.
    pub fn reload(&mut self) {
        let now = self.now();
        let start = self.provider.start_date().unwrap_or(now);
        let end = self.provider.end_date().unwrap_or(now);
        self.mapper = GridMapper::normalize(DateRange::new(start, end), now);
        log::debug!(
            "Loaded range {start} .. {end}: {} sections, today at {:?}",
            self.mapper.sections(),
            self.mapper.today()
        );
        self.reindex_events();
        self.mark_dirty();
    }

    pub fn range(&self) -> DateRange {
        self.mapper.range()
    }

    pub fn number_of_sections(&self) -> u32 {
        self.mapper.sections()
    }

    pub fn number_of_items(&self, section: u32) -> u8 {
        if section < self.mapper.sections() {
            ITEMS_PER_SECTION
        } else {
            0
        }
    }

    pub fn today(&self) -> Option<GridCoordinate> {
        self.mapper.today()
    }

    pub fn month_layout(&mut self, section: u32) -> Option<MonthLayout> {
        self.mapper.month_layout(section)
    }

    pub fn coordinate_for_date(&mut self, date: OffsetDateTime) -> Option<GridCoordinate> {
        self.mapper.coordinate_for_date(date)
    }

    /// Adds `coordinate.section` months and `coordinate.item` days to the
    /// start of the first month.
    ///
    /// This is only the inverse of [`CalendarGrid::coordinate_for_date()`]
    /// once the section's `first_weekday_offset` has been subtracted from
    /// `item`; use [`CalendarGrid::day_for_coordinate()`] to get the day a
    /// cell displays.
    pub fn date_for_coordinate(&self, coordinate: GridCoordinate) -> Option<OffsetDateTime> {
        self.mapper.date_for_coordinate(coordinate)
    }

    /// Midnight UTC of the day shown at `coordinate`, or `None` if the cell
    /// is blank or outside the grid
    pub fn day_for_coordinate(&mut self, coordinate: GridCoordinate) -> Option<OffsetDateTime> {
        self.mapper.day_for_coordinate(coordinate)
    }

    /// Header text for a section, e.g. "February 2024"
    pub fn month_title(&self, section: u32) -> Option<String> {
        if section >= self.mapper.sections() {
            return None;
        }
        self.mapper.month_of_section(section).map(|ym| ym.to_string())
    }

    pub fn cell_info(&mut self, coordinate: GridCoordinate) -> CellInfo {
        let Some(layout) = self.mapper.month_layout(coordinate.section) else {
            return CellInfo::blank();
        };
        let Some(day_number) = layout.day_number(coordinate.item) else {
            return CellInfo::blank();
        };
        CellInfo {
            day_number: Some(day_number),
            is_blank: false,
            is_today: self.mapper.today() == Some(coordinate),
            is_selected: self.selection.contains(coordinate),
            event_count: self.event_index.count_at(coordinate),
        }
    }

    /// All cells of a section's page, in item order
    pub fn cells(&mut self, section: u32) -> Vec<CellInfo> {
        (0..self.number_of_items(section))
            .map(|item| self.cell_info(GridCoordinate::new(section, item)))
            .collect()
    }

    // ----- Events -----

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn event_index(&self) -> &EventIndex {
        &self.event_index
    }

    /// Replaces the event list and reindexes it.  The observer is told to
    /// refresh on the next [`CalendarGrid::flush_refresh()`].
    pub fn set_events(&mut self, events: Vec<CalendarEvent>) {
        self.events = events;
        self.reindex_events();
        self.mark_dirty();
    }

    pub fn clear_events(&mut self) {
        self.set_events(Vec::new());
    }

    fn reindex_events(&mut self) {
        self.event_index = EventIndex::build(&self.events, |date| {
            self.mapper.coordinate_for_date(date)
        });
        log::debug!(
            "Indexed {} events into {} cells",
            self.events.len(),
            self.event_index.len()
        );
    }

    // ----- Selection -----

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selected_dates(&self) -> Vec<OffsetDateTime> {
        self.selection.dates().collect()
    }

    pub fn allows_multiple_selection(&self) -> bool {
        self.allows_multiple_selection
    }

    pub fn set_allows_multiple_selection(&mut self, allow: bool) {
        self.allows_multiple_selection = allow;
    }

    /// Selects the cell containing `date`.  Returns `false`, without
    /// notifying the observer, if the date is outside the grid, is already
    /// selected, or is refused by [`GridObserver::can_select()`].
    ///
    /// When multiple selection is off, an existing selection is not cleared;
    /// the host is expected to deselect it first.
    pub fn select_date(&mut self, date: OffsetDateTime) -> bool {
        self.flush_refresh();
        let Some(coordinate) = self.mapper.coordinate_for_date(date) else {
            return false;
        };
        self.select_at(coordinate, date)
    }

    /// Deselects the cell containing `date`, notifying the observer with the
    /// instant that was originally selected.  Returns `false` if that cell
    /// was not selected.
    pub fn deselect_date(&mut self, date: OffsetDateTime) -> bool {
        self.flush_refresh();
        let Some(coordinate) = self.mapper.coordinate_for_date(date) else {
            return false;
        };
        self.deselect_at(coordinate)
    }

    /// Selection gesture on a cell.  Blank cells are ignored.
    pub fn on_user_select(&mut self, coordinate: GridCoordinate) -> bool {
        self.flush_refresh();
        let Some(date) = self.mapper.day_for_coordinate(coordinate) else {
            return false;
        };
        self.select_at(coordinate, date)
    }

    pub fn on_user_deselect(&mut self, coordinate: GridCoordinate) -> bool {
        self.flush_refresh();
        self.deselect_at(coordinate)
    }

    fn select_at(&mut self, coordinate: GridCoordinate, date: OffsetDateTime) -> bool {
        if self.selection.contains(coordinate) || !self.observer.can_select(date) {
            return false;
        }
        if !self.allows_multiple_selection && !self.selection.is_empty() {
            log::warn!(
                "Selecting {date} while {} other date(s) are selected and multiple selection is off",
                self.selection.len()
            );
        }
        log::debug!("Selected {date} at {coordinate}");
        self.selection.insert(coordinate, date);
        self.observer
            .did_select_date(date, self.event_index.events_at(coordinate));
        true
    }

    fn deselect_at(&mut self, coordinate: GridCoordinate) -> bool {
        let Some(date) = self.selection.remove(coordinate) else {
            return false;
        };
        log::debug!("Deselected {date} at {coordinate}");
        self.observer.did_deselect_date(date);
        true
    }

    // ----- Scrolling -----

    pub fn scroll_axis(&self) -> ScrollAxis {
        self.scroll_axis
    }

    pub fn set_scroll_axis(&mut self, axis: ScrollAxis) {
        if self.scroll_axis != axis {
            self.scroll_axis = axis;
            self.mark_dirty();
        }
    }

    pub fn page_extent(&self) -> u32 {
        self.page_extent
    }

    /// Sets the width (horizontal scrolling) or height (vertical scrolling)
    /// of one month page
    pub fn set_page_extent(&mut self, extent: u32) {
        self.page_extent = extent;
    }

    /// Offset that brings the page containing `date` into view, or
    /// [`ScrollOffset::ZERO`] if `date` is not in the grid
    pub fn offset_for(&mut self, date: OffsetDateTime) -> ScrollOffset {
        match self.mapper.coordinate_for_date(date) {
            Some(c) => offset_for_section(c.section, self.scroll_axis, self.page_extent),
            None => ScrollOffset::ZERO,
        }
    }

    pub fn page_for_offset(&self, offset: ScrollOffset) -> i64 {
        page_for_offset(offset, self.scroll_axis, self.page_extent)
    }

    /// First instant of the month shown on page `page`; negative pages are
    /// treated as page 0
    pub fn month_for_page(&self, page: i64) -> Option<OffsetDateTime> {
        self.mapper.month_for_page(page)
    }

    /// Called by the host when paging comes to rest on `page`
    pub fn on_page_settled(&mut self, page: i64) {
        if let Some(month) = self.mapper.month_for_page(page) {
            log::debug!("Settled on page {page} ({month})");
            self.observer.did_scroll_to_month(month);
        }
    }

    // ----- Display date & navigation -----

    pub fn display_date(&self) -> Option<OffsetDateTime> {
        self.display_date
    }

    /// Makes `date` the display date if it lies strictly inside the range
    pub fn set_display_date(&mut self, date: OffsetDateTime) -> Result<ScrollOffset, OutOfRangeError> {
        let range = self.mapper.range();
        if date <= range.start || range.end <= date {
            return Err(OutOfRangeError);
        }
        self.display_date = Some(date);
        Ok(self.offset_for(date))
    }

    /// Offset for the current display date, or [`ScrollOffset::ZERO`] if
    /// there is none
    pub fn display_offset(&mut self) -> ScrollOffset {
        match self.display_date {
            Some(date) => self.offset_for(date),
            None => ScrollOffset::ZERO,
        }
    }

    /// Moves the display date by `months`.  Does nothing if there is no
    /// display date.
    pub fn go_to_month_with_offset(&mut self, months: i32) -> Result<(), OutOfRangeError> {
        let Some(current) = self.display_date else {
            return Ok(());
        };
        let target = add_months_clamped(current, i64::from(months)).ok_or(OutOfRangeError)?;
        self.set_display_date(target).map(|_| ())
    }

    pub fn go_to_next_month(&mut self) -> Result<(), OutOfRangeError> {
        self.go_to_month_with_offset(1)
    }

    pub fn go_to_previous_month(&mut self) -> Result<(), OutOfRangeError> {
        self.go_to_month_with_offset(-1)
    }

    // ----- Refresh -----

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    fn mark_dirty(&mut self) {
        self.needs_refresh = true;
    }

    /// Delivers a pending refresh notification, if any.  Returns `true` if
    /// the observer was notified.
    pub fn flush_refresh(&mut self) -> bool {
        if std::mem::take(&mut self.needs_refresh) {
            self.observer.grid_needs_refresh();
            true
        } else {
            false
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("date is outside the calendar's range")]
pub struct OutOfRangeError;
