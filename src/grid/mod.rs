mod events;
mod mapper;
mod model;
mod scroll;
mod selection;
mod util;
pub use self::events::{CalendarEvent, EventIndex};
pub use self::mapper::DateRange;
pub use self::model::{CalendarGrid, CellInfo, OutOfRangeError};
pub use self::scroll::{ScrollAxis, ScrollOffset};
pub use self::selection::SelectionSet;
pub use self::util::{GridCoordinate, MonthLayout, ITEMS_PER_SECTION};
use time::OffsetDateTime;

/// Supplies the bounds of the range shown by a [`CalendarGrid`].
///
/// A missing bound is taken to be the current instant, so a provider that
/// implements neither method yields an empty grid.
pub trait RangeProvider {
    fn start_date(&self) -> Option<OffsetDateTime> {
        None
    }

    fn end_date(&self) -> Option<OffsetDateTime> {
        None
    }
}

impl RangeProvider for () {}

/// Receives the notifications a [`CalendarGrid`] emits and decides which
/// dates may be selected.
pub trait GridObserver {
    fn can_select(&self, _date: OffsetDateTime) -> bool {
        true
    }

    /// Called with the first instant of the month whose page the host has
    /// settled on
    fn did_scroll_to_month(&mut self, _month: OffsetDateTime) {}

    fn did_select_date(&mut self, _date: OffsetDateTime, _events: &[CalendarEvent]) {}

    fn did_deselect_date(&mut self, _date: OffsetDateTime) {}

    /// Called (at most once per batch of changes) when the visible grid is
    /// stale and should be redrawn
    fn grid_needs_refresh(&mut self) {}
}

impl GridObserver for () {}
