// Command bar component - 하단 단축키 안내
//
// 항목은 액션 레지스트리(generate_command_bar_items)에서 생성된다

use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// 커맨드 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandItem {
    /// 단축키 표시 (o, x, Enter, ...)
    pub key: String,
    pub label: String,
    pub enabled: bool,
}

impl CommandItem {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn width(&self) -> usize {
        self.key.width() + 1 + self.label.width()
    }
}

pub struct CommandBar {
    commands: Vec<CommandItem>,
    bg_color: Color,
    key_fg_color: Color,
    label_fg_color: Color,
    disabled_color: Color,
}

impl Default for CommandBar {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            bg_color: Color::Rgb(30, 30, 30),
            key_fg_color: Color::Rgb(0, 120, 212),
            label_fg_color: Color::Rgb(212, 212, 212),
            disabled_color: Color::Rgb(100, 100, 100),
        }
    }
}

impl CommandBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(mut self, commands: Vec<CommandItem>) -> Self {
        self.commands = commands;
        self
    }

    pub fn theme(mut self, theme: &Theme) -> Self {
        self.bg_color = theme.command_bar_bg.to_color();
        self.key_fg_color = theme.accent.to_color();
        self.label_fg_color = theme.command_bar_fg.to_color();
        self.disabled_color = theme.muted.to_color();
        self
    }

    /// 너비 안에 들어가는 항목 수 (우선순위 순으로 정렬되어 있다고 가정)
    fn fitting(&self, width: usize) -> usize {
        let mut used = 1;
        self.commands
            .iter()
            .take_while(|cmd| {
                used += cmd.width() + 1;
                used <= width + 1
            })
            .count()
    }
}

impl Widget for CommandBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.bg_color));

        let visible = self.fitting(area.width as usize);
        let mut spans = vec![Span::raw(" ")];
        for (i, cmd) in self.commands.iter().take(visible).enumerate() {
            let (key_style, label_style) = if cmd.enabled {
                (
                    Style::default()
                        .fg(self.key_fg_color)
                        .add_modifier(Modifier::BOLD),
                    Style::default().fg(self.label_fg_color),
                )
            } else {
                (
                    Style::default().fg(self.disabled_color),
                    Style::default().fg(self.disabled_color),
                )
            };

            spans.push(Span::styled(cmd.key.clone(), key_style));
            spans.push(Span::styled(":", label_style));
            spans.push(Span::styled(cmd.label.clone(), label_style));
            if i + 1 < visible {
                spans.push(Span::raw(" "));
            }
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
