//! A paged month-grid calendar model.
//!
//! [`CalendarGrid`] maps instants onto a grid of month pages (sections) of 42
//! cells each, tracks the selected days and the events that start on each
//! day, and tells a host UI when to repaint and which month it has scrolled
//! to.  All calendar arithmetic is done on the UTC Gregorian calendar with
//! Monday-first weeks.
mod config;
mod grid;
pub use crate::config::{ConfigError, GridConfig};
pub use crate::grid::{
    CalendarEvent, CalendarGrid, CellInfo, DateRange, EventIndex, GridCoordinate, GridObserver,
    MonthLayout, OutOfRangeError, RangeProvider, ScrollAxis, ScrollOffset, SelectionSet,
    ITEMS_PER_SECTION,
};
