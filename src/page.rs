use crate::theme::{BASE_STYLE, CURSOR_STYLE, SELECTED_STYLE, TITLE_STYLE, TODAY_STYLE, WEEKDAY_STYLE};
use monthgrid::CellInfo;
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};

static HEADER: &str = " Mo   Tu   We   Th   Fr   Sa   Su  ";

/// Number of columns per day of week
const DAY_WIDTH: u16 = 5;

const DAYS_IN_WEEK: u16 = 7;

/// Width of a month page in columns
pub(crate) const PAGE_WIDTH: u16 = DAY_WIDTH * DAYS_IN_WEEK;

/// Number of lines above the first row of days: title, weekday header, and
/// rule
const HEADER_LINES: u16 = 3;

const ROWS: u16 = 6;

/// Number of lines taken up by a whole page
pub(crate) const PAGE_HEIGHT: u16 = HEADER_LINES + ROWS;

const ACS_HLINE: char = '─';

const EVENT_MARKER: char = '*';

/// One month's 6×7 page of cells
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthPage<'a> {
    title: &'a str,
    cells: &'a [CellInfo],
    cursor: Option<u8>,
}

impl<'a> MonthPage<'a> {
    pub(crate) fn new(title: &'a str, cells: &'a [CellInfo]) -> Self {
        MonthPage {
            title,
            cells,
            cursor: None,
        }
    }

    pub(crate) fn cursor(mut self, item: u8) -> Self {
        self.cursor = Some(item);
        self
    }
}

impl Widget for MonthPage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let left = area.width.saturating_sub(PAGE_WIDTH) / 2;
        let area = Rect {
            x: area.x + left,
            width: area.width.saturating_sub(left).min(PAGE_WIDTH),
            ..area
        };
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.mvprint(0, 0, self.title, TITLE_STYLE);
        canvas.mvprint(1, 0, HEADER, WEEKDAY_STYLE);
        canvas.mvprint(2, 0, String::from(ACS_HLINE).repeat(PAGE_WIDTH.into()), BASE_STYLE);
        for (item, cell) in std::iter::zip(0u8.., self.cells) {
            let style = if self.cursor == Some(item) {
                CURSOR_STYLE
            } else if cell.is_selected {
                SELECTED_STYLE
            } else if cell.is_today {
                TODAY_STYLE
            } else {
                BASE_STYLE
            };
            let row = u16::from(item) / DAYS_IN_WEEK;
            let col = u16::from(item) % DAYS_IN_WEEK;
            canvas.mvprint(HEADER_LINES + row, col * DAY_WIDTH, show(*cell), style);
        }
    }
}

fn show(cell: CellInfo) -> String {
    let Some(day) = cell.day_number else {
        return " ".repeat(DAY_WIDTH.into());
    };
    let marker = if cell.event_count > 0 { EVENT_MARKER } else { ' ' };
    if cell.is_today {
        format!("[{day:2}]{marker}")
    } else {
        format!(" {day:2} {marker}")
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Style) {
        if y < self.area.height && x < self.area.width {
            self.buf.set_stringn(
                x + self.area.x,
                y + self.area.y,
                s,
                usize::from(self.area.width - x),
                style,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monthgrid::{CalendarEvent, CalendarGrid, DateRange};
    use time::macros::datetime;

    #[test]
    fn test_render_february() {
        let mut grid = CalendarGrid::new(
            DateRange::new(
                datetime!(2024 - 01 - 01 0:00 UTC),
                datetime!(2024 - 03 - 01 0:00 UTC),
            ),
            (),
        )
        .with_now(datetime!(2024 - 02 - 10 12:00 UTC));
        grid.set_events(vec![CalendarEvent::new(
            "Groundhog",
            datetime!(2024 - 02 - 02 8:00 UTC),
            datetime!(2024 - 02 - 02 9:00 UTC),
        )]);
        assert!(grid.select_date(datetime!(2024 - 02 - 14 0:00 UTC)));
        let title = grid.month_title(1).unwrap();
        let cells = grid.cells(1);
        let area = Rect::new(0, 0, PAGE_WIDTH, PAGE_HEIGHT);
        let mut buffer = Buffer::empty(area);
        buffer.set_style(area, BASE_STYLE);
        MonthPage::new(&title, &cells).render(area, &mut buffer);
        let mut expected = Buffer::with_lines([
            "February 2024                      ",
            " Mo   Tu   We   Th   Fr   Sa   Su  ",
            "───────────────────────────────────",
            "                 1    2 *  3    4  ",
            "  5    6    7    8    9  [10]  11  ",
            " 12   13   14   15   16   17   18  ",
            " 19   20   21   22   23   24   25  ",
            " 26   27   28   29                 ",
            "                                   ",
        ]);
        expected.set_style(*expected.area(), BASE_STYLE);
        expected.set_style(Rect::new(0, 0, 13, 1), TITLE_STYLE);
        expected.set_style(Rect::new(0, 1, 35, 1), WEEKDAY_STYLE);
        expected.set_style(Rect::new(25, 4, 5, 1), TODAY_STYLE);
        expected.set_style(Rect::new(10, 5, 5, 1), SELECTED_STYLE);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_cursor_wins_over_selection() {
        let cells = [CellInfo {
            day_number: Some(1),
            is_blank: false,
            is_today: false,
            is_selected: true,
            event_count: 0,
        }];
        let area = Rect::new(0, 0, PAGE_WIDTH, PAGE_HEIGHT);
        let mut buffer = Buffer::empty(area);
        buffer.set_style(area, BASE_STYLE);
        MonthPage::new("January 2024", &cells)
            .cursor(0)
            .render(area, &mut buffer);
        let mut expected = Buffer::with_lines([
            "January 2024                       ",
            " Mo   Tu   We   Th   Fr   Sa   Su  ",
            "───────────────────────────────────",
            "  1                                ",
            "                                   ",
            "                                   ",
            "                                   ",
            "                                   ",
            "                                   ",
        ]);
        expected.set_style(*expected.area(), BASE_STYLE);
        expected.set_style(Rect::new(0, 0, 12, 1), TITLE_STYLE);
        expected.set_style(Rect::new(0, 1, 35, 1), WEEKDAY_STYLE);
        expected.set_style(Rect::new(0, 3, 5, 1), CURSOR_STYLE);
        assert_eq!(buffer, expected);
    }
}
