use super::util::{
    add_days, midnight_utc, utc_date, GridCoordinate, MonthLayout, YearMonth,
};
use super::RangeProvider;
use std::collections::HashMap;
use time::OffsetDateTime;

/// A pair of bounds as supplied by the host.  The grid is empty unless
/// `start < end`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DateRange {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl DateRange {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> DateRange {
        DateRange { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Calendar months (on the UTC calendar) from the month of `start` to
    /// the month of `end`
    pub fn months_spanned(&self) -> i64 {
        YearMonth::containing(self.start).months_until(YearMonth::containing(self.end))
    }
}

impl RangeProvider for DateRange {
    fn start_date(&self) -> Option<OffsetDateTime> {
        Some(self.start)
    }

    fn end_date(&self) -> Option<OffsetDateTime> {
        Some(self.end)
    }
}

/// Maps instants to grid coordinates and back for one normalized range.
///
/// Month layouts are computed on first use and kept until the mapper is
/// replaced, which happens whenever the range is reloaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct GridMapper {
    range: DateRange,
    anchor: Option<YearMonth>,
    sections: u32,
    today: Option<GridCoordinate>,
    layouts: HashMap<u32, MonthLayout>,
}

impl GridMapper {
    pub(super) fn normalize(range: DateRange, now: OffsetDateTime) -> GridMapper {
        let mut mapper = GridMapper {
            range,
            anchor: None,
            sections: 0,
            today: None,
            layouts: HashMap::new(),
        };
        if range.is_empty() {
            return mapper;
        }
        let anchor = YearMonth::containing(range.start);
        let Some(anchor_start) = anchor.first_day().map(midnight_utc) else {
            return mapper;
        };
        mapper.anchor = Some(anchor);
        mapper.sections = u32::try_from(range.months_spanned().saturating_add(1)).unwrap_or(u32::MAX);
        if anchor_start < now && now < range.end {
            mapper.today = mapper.coordinate_for_date(now);
        }
        mapper
    }

    pub(super) fn range(&self) -> DateRange {
        self.range
    }

    pub(super) fn sections(&self) -> u32 {
        self.sections
    }

    pub(super) fn today(&self) -> Option<GridCoordinate> {
        self.today
    }

    /// First instant (midnight UTC) of the range's first month
    pub(super) fn anchor(&self) -> Option<OffsetDateTime> {
        self.anchor?.first_day().map(midnight_utc)
    }

    pub(super) fn month_of_section(&self, section: u32) -> Option<YearMonth> {
        self.anchor?.add_months(i64::from(section))
    }

    pub(super) fn month_layout(&mut self, section: u32) -> Option<MonthLayout> {
        if section >= self.sections {
            return None;
        }
        if let Some(&layout) = self.layouts.get(&section) {
            return Some(layout);
        }
        let layout = MonthLayout::for_month(self.month_of_section(section)?)?;
        log::trace!("Computed layout for section {section}: {layout:?}");
        self.layouts.insert(section, layout);
        Some(layout)
    }

    pub(super) fn coordinate_for_date(&mut self, date: OffsetDateTime) -> Option<GridCoordinate> {
        let anchor = self.anchor?;
        let day = utc_date(date);
        let section = u32::try_from(anchor.months_until(YearMonth::of(day))).ok()?;
        let layout = self.month_layout(section)?;
        Some(GridCoordinate::new(section, layout.item_for_day(day.day())))
    }

    // Adds `section` months and `item` days to the anchor without removing
    // the section's weekday offset, so this only inverts
    // `coordinate_for_date()` once the caller has subtracted that offset.
    pub(super) fn date_for_coordinate(&self, coordinate: GridCoordinate) -> Option<OffsetDateTime> {
        let first = self.month_of_section(coordinate.section)?.first_day()?;
        add_days(first, coordinate.item).map(midnight_utc)
    }

    /// The day shown in the cell at `coordinate`, or `None` for blanks and
    /// for coordinates outside the grid
    pub(super) fn day_for_coordinate(&mut self, coordinate: GridCoordinate) -> Option<OffsetDateTime> {
        let day = self.month_layout(coordinate.section)?.day_number(coordinate.item)?;
        self.date_for_coordinate(GridCoordinate::new(coordinate.section, day - 1))
    }

    pub(super) fn month_for_page(&self, page: i64) -> Option<OffsetDateTime> {
        self.anchor?.add_months(page.max(0))?.first_day().map(midnight_utc)
    }
}
