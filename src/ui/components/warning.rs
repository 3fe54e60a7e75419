// Warning screen component - 터미널이 너무 작을 때

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::layout::{MIN_HEIGHT, MIN_WIDTH};
use crate::ui::Theme;

pub struct WarningScreen {
    current_size: (u16, u16),
    warning_color: Color,
    bg_color: Color,
    fg_color: Color,
    error_color: Color,
    success_color: Color,
}

impl Default for WarningScreen {
    fn default() -> Self {
        Self {
            current_size: (0, 0),
            warning_color: Color::Yellow,
            bg_color: Color::Rgb(30, 30, 30),
            fg_color: Color::Rgb(212, 212, 212),
            error_color: Color::Red,
            success_color: Color::Green,
        }
    }
}

impl WarningScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_size(mut self, width: u16, height: u16) -> Self {
        self.current_size = (width, height);
        self
    }

    pub fn theme(mut self, theme: &Theme) -> Self {
        self.warning_color = theme.warning.to_color();
        self.bg_color = theme.bg_primary.to_color();
        self.fg_color = theme.fg_primary.to_color();
        self.error_color = theme.error.to_color();
        self.success_color = theme.success.to_color();
        self
    }

    fn size_line(&self, label: &'static str, size: (u16, u16), color: Color) -> Line<'static> {
        Line::from(vec![
            Span::styled(label, Style::default().fg(self.fg_color)),
            Span::styled(
                format!("{}x{}", size.0, size.1),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ])
    }
}

impl Widget for WarningScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.bg_color));

        let bold_warning = Style::default()
            .fg(self.warning_color)
            .add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(Span::styled("⚠ Terminal Too Small", bold_warning)),
            Line::from(""),
            self.size_line("Current: ", self.current_size, self.error_color),
            self.size_line("Required: ", (MIN_WIDTH, MIN_HEIGHT), self.success_color),
            Line::from(""),
            Line::from(Span::styled(
                "Resize the terminal or press q to quit",
                Style::default()
                    .fg(self.fg_color)
                    .add_modifier(Modifier::DIM),
            )),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.warning_color))
            .style(Style::default().bg(self.bg_color));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(block)
            .render(area, buf);
    }
}
