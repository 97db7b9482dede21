use std::fmt;
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset, Weekday};

pub(crate) const DAYS_IN_WEEK: u8 = 7;

const MAXIMUM_ROWS: u8 = 6;

/// Number of cells on every month page: six rows of seven days, whether or
/// not the month needs all of them
pub const ITEMS_PER_SECTION: u8 = DAYS_IN_WEEK * MAXIMUM_ROWS;

pub(super) trait WeekdayExt {
    /// Sunday-origin index, 0 through 6
    fn index0(&self) -> u8;

    /// Column of the weekday in a Monday-first week, 0 through 6
    fn monday_index0(&self) -> u8 {
        (self.index0() + DAYS_IN_WEEK - 1) % DAYS_IN_WEEK
    }
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u8 {
        self.number_days_from_sunday()
    }
}

/// Position of a cell in the grid: `section` counts months from the start of
/// the range, `item` is one of the [`ITEMS_PER_SECTION`] slots in that
/// month's page.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GridCoordinate {
    pub section: u32,
    pub item: u8,
}

impl GridCoordinate {
    pub const fn new(section: u32, item: u8) -> GridCoordinate {
        GridCoordinate { section, item }
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.section, self.item)
    }
}

/// Where a month's days sit on its 42-cell page
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MonthLayout {
    /// Number of blank cells before day 1 in a Monday-first week
    pub first_weekday_offset: u8,
    pub days_in_month: u8,
}

impl MonthLayout {
    pub(crate) fn for_month(month: YearMonth) -> Option<MonthLayout> {
        let first = month.first_day()?;
        Some(MonthLayout {
            first_weekday_offset: first.weekday().monday_index0(),
            days_in_month: month.length()?,
        })
    }

    /// Returns `true` if the cell at `item` holds an actual day of the month
    pub fn is_live(&self, item: u8) -> bool {
        self.first_weekday_offset <= item
            && u16::from(item) < u16::from(self.first_weekday_offset) + u16::from(self.days_in_month)
    }

    /// The day of the month shown in the cell at `item`, or `None` for the
    /// leading and trailing blanks
    pub fn day_number(&self, item: u8) -> Option<u8> {
        self.is_live(item).then(|| item - self.first_weekday_offset + 1)
    }

    pub(crate) fn item_for_day(&self, day: u8) -> u8 {
        day - 1 + self.first_weekday_offset
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    pub(crate) fn of(date: Date) -> YearMonth {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month containing `instant` on the UTC calendar
    pub(crate) fn containing(instant: OffsetDateTime) -> YearMonth {
        YearMonth::of(utc_date(instant))
    }

    fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(u8::from(self.month)) - 1
    }

    fn from_index(index: i64) -> Option<YearMonth> {
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;
        let month = Month::try_from(month).ok()?;
        Some(YearMonth { year, month })
    }

    /// Number of calendar months from `self` to `other`; negative if `other`
    /// is earlier
    pub(crate) fn months_until(self, other: YearMonth) -> i64 {
        other.index() - self.index()
    }

    pub(crate) fn add_months(self, months: i64) -> Option<YearMonth> {
        YearMonth::from_index(self.index().checked_add(months)?)
    }

    pub(crate) fn first_day(self) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month, 1).ok()
    }

    pub(crate) fn length(self) -> Option<u8> {
        let first = self.first_day()?;
        let next = self.add_months(1)?.first_day()?;
        u8::try_from(next.to_julian_day() - first.to_julian_day()).ok()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

pub(crate) fn utc_date(instant: OffsetDateTime) -> Date {
    instant.to_offset(UtcOffset::UTC).date()
}

pub(crate) fn midnight_utc(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}

pub(crate) fn add_days(date: Date, days: u8) -> Option<Date> {
    date.checked_add(Duration::days(i64::from(days)))
}

/// Moves `instant` by a number of calendar months, keeping its UTC time of
/// day and pulling the day of the month back when the target month is
/// shorter (January 31 plus one month is the last day of February).
pub(crate) fn add_months_clamped(instant: OffsetDateTime, months: i64) -> Option<OffsetDateTime> {
    let utc = instant.to_offset(UtcOffset::UTC);
    let target = YearMonth::of(utc.date()).add_months(months)?;
    let day = utc.day().min(target.length()?);
    let date = Date::from_calendar_date(target.year, target.month, day).ok()?;
    Some(date.with_time(utc.time()).assume_utc())
}
