use crate::theme::{
    jumpto::{READY_ENTER_STYLE, UNFILLED_CELL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use time::{format_description::FormatItem, macros::format_description, Date};

pub(crate) static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

const OUTER_WIDTH: u16 = 16;
const OUTER_HEIGHT: u16 = 8;

/// Number of digits in a YYYY-MM-DD date; once this many have been typed,
/// the cursor is on "[ENTER]"
const ENTER_POS: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct JumpTo;

impl StatefulWidget for JumpTo {
    type State = JumpToState;

    /*
     * ................
     * .┌─ Jump To… ─┐.
     * .│            │.
     * .│ YYYY-MM-DD │.
     * .│            │.
     * .│  [ENTER]   │.
     * .└────────────┘.
     * ................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Jump To… ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text().render(text_area, buf);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct JumpToState {
    digits: [Option<u8>; ENTER_POS],
    pos: usize,
}

impl JumpToState {
    pub(crate) fn new() -> JumpToState {
        JumpToState::default()
    }

    fn to_text(self) -> Text<'static> {
        Text::from(vec![
            Line::styled("", BASE_STYLE),
            self.to_line(),
            Line::styled("", BASE_STYLE),
            // Style a span and convert it to a line rather than creating a
            // styled line directly so that only the "[ENTER]" text and not any
            // of its centering padding will be underlined:
            Line::from(Span::styled(
                "[ENTER]",
                if self.pos == ENTER_POS {
                    READY_ENTER_STYLE
                } else {
                    BASE_STYLE
                },
            )),
        ])
        .centered()
    }

    fn to_line(self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, (dg, fallback)) in std::iter::zip(self.digits, "YYYYMMDD".chars()).enumerate() {
            if i == 4 || i == 6 {
                spans.push(Span::styled("-", BASE_STYLE));
            }
            spans.push(match dg {
                Some(d) => Span::styled(d.to_string(), BASE_STYLE),
                None => Span::styled(fallback.to_string(), UNFILLED_CELL_STYLE),
            });
        }
        Line::from(spans)
    }

    fn to_date(self) -> Option<Date> {
        let mut s = String::with_capacity(ENTER_POS + 2);
        for (i, dg) in self.digits.into_iter().enumerate() {
            if i == 4 || i == 6 {
                s.push('-');
            }
            s.push(char::from(b'0' + dg?));
        }
        Date::parse(&s, &YMD_FMT).ok()
    }

    pub(crate) fn handle_input(&mut self, input: JumpToInput) -> JumpToOutput {
        match (input, self.pos) {
            (JumpToInput::Digit(d @ 0..=9), 0..ENTER_POS) => {
                self.digits[self.pos] = Some(d);
                self.pos += 1;
                JumpToOutput::Ok
            }
            (JumpToInput::Backspace, 1..) => {
                self.pos -= 1;
                self.digits[self.pos] = None;
                JumpToOutput::Ok
            }
            (JumpToInput::Enter, ENTER_POS) => match self.to_date() {
                Some(date) => JumpToOutput::Jump(date),
                None => JumpToOutput::Invalid,
            },
            _ => JumpToOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToInput {
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToOutput {
    Ok,
    Invalid,
    Jump(Date),
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn type_digits(state: &mut JumpToState, digits: &str) {
        for c in digits.chars() {
            let d = c.to_digit(10).and_then(|d| u8::try_from(d).ok()).unwrap();
            assert_eq!(state.handle_input(JumpToInput::Digit(d)), JumpToOutput::Ok);
        }
    }

    #[test]
    fn test_jump() {
        let mut state = JumpToState::new();
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
        type_digits(&mut state, "20240214");
        assert_eq!(
            state.handle_input(JumpToInput::Digit(1)),
            JumpToOutput::Invalid
        );
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(date!(2024 - 02 - 14))
        );
    }

    #[test]
    fn test_backspace() {
        let mut state = JumpToState::new();
        assert_eq!(
            state.handle_input(JumpToInput::Backspace),
            JumpToOutput::Invalid
        );
        type_digits(&mut state, "20240231");
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
        assert_eq!(state.handle_input(JumpToInput::Backspace), JumpToOutput::Ok);
        assert_eq!(state.handle_input(JumpToInput::Backspace), JumpToOutput::Ok);
        type_digits(&mut state, "29");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(date!(2024 - 02 - 29))
        );
    }

    #[test]
    fn test_line() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "202");
        assert_eq!(state.to_line().to_string(), "202Y-MM-DD");
    }
}
