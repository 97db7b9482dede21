use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const TODAY_STYLE: Style = Style::new()
    .fg(Color::LightYellow)
    .bg(Color::Black)
    .add_modifier(Modifier::BOLD);

pub(crate) const SELECTED_STYLE: Style = Style::new().fg(Color::Black).bg(Color::LightBlue);

pub(crate) const CURSOR_STYLE: Style = BASE_STYLE.add_modifier(Modifier::REVERSED);

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}
