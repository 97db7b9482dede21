use super::util::GridCoordinate;
use serde::Deserialize;
use std::collections::HashMap;
use time::OffsetDateTime;

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl CalendarEvent {
    pub fn new<S: Into<String>>(title: S, start: OffsetDateTime, end: OffsetDateTime) -> Self {
        CalendarEvent {
            title: title.into(),
            start,
            end,
        }
    }
}

/// Events grouped by the grid cell of their start date, each group in the
/// order the events were supplied
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventIndex(HashMap<GridCoordinate, Vec<CalendarEvent>>);

impl EventIndex {
    /// Builds an index by locating each event's start date with `locate`.
    /// Events that `locate` maps to `None` are left out.
    pub(super) fn build<F>(events: &[CalendarEvent], mut locate: F) -> EventIndex
    where
        F: FnMut(OffsetDateTime) -> Option<GridCoordinate>,
    {
        let mut index = EventIndex::default();
        for event in events {
            if let Some(coordinate) = locate(event.start) {
                index.0.entry(coordinate).or_default().push(event.clone());
            } else {
                log::debug!(
                    "Event {:?} starting {} is outside the calendar; not indexed",
                    event.title,
                    event.start
                );
            }
        }
        index
    }

    pub fn events_at(&self, coordinate: GridCoordinate) -> &[CalendarEvent] {
        self.0
            .get(&coordinate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn count_at(&self, coordinate: GridCoordinate) -> usize {
        self.events_at(coordinate).len()
    }

    /// Number of cells with at least one event
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn event(title: &str, start: OffsetDateTime) -> CalendarEvent {
        CalendarEvent::new(title, start, start + time::Duration::hours(1))
    }

    #[test]
    fn test_groups_preserve_input_order() {
        let events = [
            event("standup", datetime!(2024 - 02 - 10 9:00 UTC)),
            event("lunch", datetime!(2024 - 02 - 11 12:00 UTC)),
            event("review", datetime!(2024 - 02 - 10 16:00 UTC)),
            event("standup", datetime!(2024 - 02 - 10 9:00 UTC)),
        ];
        let index = EventIndex::build(&events, |date| {
            Some(GridCoordinate::new(0, date.day()))
        });
        assert_eq!(index.len(), 2);
        let titles = index
            .events_at(GridCoordinate::new(0, 10))
            .iter()
            .map(|ev| ev.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(titles, ["standup", "review", "standup"]);
        assert_eq!(index.count_at(GridCoordinate::new(0, 11)), 1);
        assert_eq!(index.count_at(GridCoordinate::new(0, 12)), 0);
    }

    #[test]
    fn test_unlocated_events_are_skipped() {
        let events = [
            event("early", datetime!(2024 - 01 - 01 9:00 UTC)),
            event("late", datetime!(2024 - 05 - 01 9:00 UTC)),
        ];
        let index = EventIndex::build(&events, |_| None);
        assert!(index.is_empty());
        assert!(index.events_at(GridCoordinate::new(0, 0)).is_empty());
    }

    #[test]
    fn test_deserialize_event() {
        let ev: CalendarEvent = toml::from_str(
            concat!(
                "title = \"Dentist\"\n",
                "start = \"2024-02-10T09:30:00Z\"\n",
                "end = \"2024-02-10T10:00:00Z\"\n",
            ),
        )
        .unwrap();
        assert_eq!(
            ev,
            CalendarEvent::new(
                "Dentist",
                datetime!(2024 - 02 - 10 9:30 UTC),
                datetime!(2024 - 02 - 10 10:00 UTC)
            )
        );
    }
}
