use crate::grid::{CalendarEvent, CalendarGrid, GridObserver, RangeProvider, ScrollAxis};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;

/// Settings for a [`CalendarGrid`], normally read from a TOML file:
///
/// ```toml
/// scroll_axis = "vertical"
/// page_extent = 480
/// allows_multiple_selection = false
/// start = "2024-01-01T00:00:00Z"
/// end = "2025-01-01T00:00:00Z"
///
/// [[events]]
/// title = "Dentist"
/// start = "2024-02-10T09:30:00Z"
/// end = "2024-02-10T10:00:00Z"
/// ```
///
/// A `GridConfig` is also a [`RangeProvider`] for its `start` and `end`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub scroll_axis: ScrollAxis,
    pub page_extent: u32,
    pub allows_multiple_selection: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
    pub events: Vec<CalendarEvent>,
}

impl Default for GridConfig {
    fn default() -> GridConfig {
        GridConfig {
            scroll_axis: ScrollAxis::default(),
            page_extent: 1,
            allows_multiple_selection: false,
            start: None,
            end: None,
            events: Vec::new(),
        }
    }
}

impl GridConfig {
    pub fn from_path(path: &Path) -> Result<GridConfig, ConfigError> {
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        GridConfig::from_toml_str(&src)
    }

    pub fn from_toml_str(src: &str) -> Result<GridConfig, ConfigError> {
        let config = toml::from_str::<GridConfig>(src)?;
        if let Some(ev) = config.events.iter().find(|ev| ev.end < ev.start) {
            return Err(ConfigError::InvertedEvent {
                title: ev.title.clone(),
            });
        }
        log::debug!(
            "Loaded config with {} events, scrolling {:?}",
            config.events.len(),
            config.scroll_axis
        );
        Ok(config)
    }

    /// Applies the scrolling, selection, and event settings to `grid`.  The
    /// range is not touched; it comes from the grid's provider.
    pub fn configure<R, O>(&self, grid: &mut CalendarGrid<R, O>)
    where
        R: RangeProvider,
        O: GridObserver,
    {
        grid.set_scroll_axis(self.scroll_axis);
        grid.set_page_extent(self.page_extent);
        grid.set_allows_multiple_selection(self.allows_multiple_selection);
        grid.set_events(self.events.clone());
    }
}

impl RangeProvider for GridConfig {
    fn start_date(&self) -> Option<OffsetDateTime> {
        self.start
    }

    fn end_date(&self) -> Option<OffsetDateTime> {
        self.end
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    #[error("event {title:?} ends before it starts")]
    InvertedEvent { title: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use time::macros::datetime;

    #[test]
    fn test_defaults() {
        let config = GridConfig::from_toml_str("").unwrap();
        assert_eq!(config, GridConfig::default());
        assert_eq!(config.page_extent, 1);
        assert_eq!(config.start_date(), None);
    }

    #[test]
    fn test_full_config() {
        let config = GridConfig::from_toml_str(concat!(
            "scroll_axis = \"vertical\"\n",
            "page_extent = 480\n",
            "allows_multiple_selection = true\n",
            "start = \"2024-01-15T00:00:00Z\"\n",
            "end = \"2024-04-01T00:00:00+02:00\"\n",
            "\n",
            "[[events]]\n",
            "title = \"Dentist\"\n",
            "start = \"2024-02-10T09:30:00Z\"\n",
            "end = \"2024-02-10T10:00:00Z\"\n",
        ))
        .unwrap();
        assert_eq!(config.scroll_axis, ScrollAxis::Vertical);
        assert_eq!(config.page_extent, 480);
        assert!(config.allows_multiple_selection);
        assert_eq!(config.start_date(), Some(datetime!(2024 - 01 - 15 0:00 UTC)));
        assert_eq!(config.end_date(), Some(datetime!(2024 - 04 - 01 0:00 +2)));
        assert_eq!(config.events.len(), 1);
    }

    #[test]
    fn test_unknown_field() {
        let r = GridConfig::from_toml_str("scroll_direction = \"vertical\"\n");
        assert!(matches!(r, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_inverted_event() {
        let r = GridConfig::from_toml_str(concat!(
            "[[events]]\n",
            "title = \"Backwards\"\n",
            "start = \"2024-02-10T10:00:00Z\"\n",
            "end = \"2024-02-10T09:00:00Z\"\n",
        ));
        match r {
            Err(ConfigError::InvertedEvent { title }) => assert_eq!(title, "Backwards"),
            other => panic!("expected InvertedEvent, got {other:?}"),
        }
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_extent = 320").unwrap();
        let config = GridConfig::from_path(file.path()).unwrap();
        assert_eq!(config.page_extent, 320);
    }

    #[test]
    fn test_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        match GridConfig::from_path(&path) {
            Err(e @ ConfigError::Read { .. }) => {
                assert_eq!(e.to_string(), format!("failed to read config file {}", path.display()));
            }
            other => panic!("expected Read error, got {other:?}"),
        }
    }

    #[test]
    fn test_configure_grid() {
        let config = GridConfig {
            scroll_axis: ScrollAxis::Vertical,
            page_extent: 480,
            start: Some(datetime!(2024 - 01 - 01 0:00 UTC)),
            end: Some(datetime!(2024 - 03 - 01 0:00 UTC)),
            events: vec![CalendarEvent::new(
                "Dentist",
                datetime!(2024 - 02 - 10 9:30 UTC),
                datetime!(2024 - 02 - 10 10:00 UTC),
            )],
            ..GridConfig::default()
        };
        let mut grid = CalendarGrid::new(config.clone(), ()).with_now(datetime!(2024 - 02 - 01 0:00 UTC));
        config.configure(&mut grid);
        assert_eq!(grid.number_of_sections(), 3);
        assert_eq!(grid.scroll_axis(), ScrollAxis::Vertical);
        assert_eq!(grid.page_extent(), 480);
        assert_eq!(grid.event_index().len(), 1);
    }
}
