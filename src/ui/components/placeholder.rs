// Placeholder component - 아카이브가 없거나 목록을 읽는 중일 때

use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderState {
    /// 로드된 아카이브 없음
    Empty,
    /// 목록 요청 진행 중
    Loading,
    /// 비밀번호 입력 대기
    Locked,
}

pub struct Placeholder<'a> {
    state: PlaceholderState,
    /// 현재 경로 (Loading/Locked)
    path: Option<&'a str>,
    border_color: Color,
    bg_color: Color,
    fg_color: Color,
    accent_color: Color,
    muted_color: Color,
}

impl Default for Placeholder<'_> {
    fn default() -> Self {
        Self {
            state: PlaceholderState::Empty,
            path: None,
            border_color: Color::Rgb(60, 60, 60),
            bg_color: Color::Rgb(30, 30, 30),
            fg_color: Color::Rgb(212, 212, 212),
            accent_color: Color::Rgb(0, 120, 212),
            muted_color: Color::Rgb(128, 128, 128),
        }
    }
}

impl<'a> Placeholder<'a> {
    pub fn new(state: PlaceholderState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn path(mut self, path: Option<&'a str>) -> Self {
        self.path = path;
        self
    }

    pub fn theme(mut self, theme: &Theme) -> Self {
        self.border_color = theme.panel_border.to_color();
        self.bg_color = theme.panel_bg.to_color();
        self.fg_color = theme.fg_primary.to_color();
        self.accent_color = theme.accent.to_color();
        self.muted_color = theme.muted.to_color();
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let heading = |text: &'static str| {
            Line::from(Span::styled(
                text,
                Style::default()
                    .fg(self.accent_color)
                    .add_modifier(Modifier::BOLD),
            ))
        };
        let muted = |text: String| Line::from(Span::styled(text, Style::default().fg(self.muted_color)));
        let path = self.path.unwrap_or_default().to_string();

        match self.state {
            PlaceholderState::Empty => vec![
                heading("No archive loaded"),
                Line::from(""),
                Line::from(Span::styled(
                    "Press o to open an archive, or drop one onto this window",
                    Style::default().fg(self.fg_color),
                )),
                muted("zip, tar, tar.gz, tar.bz2, tar.xz, tar.zst, 7z".to_string()),
            ],
            PlaceholderState::Loading => vec![heading("Loading..."), Line::from(""), muted(path)],
            PlaceholderState::Locked => vec![
                heading("Password required"),
                Line::from(""),
                muted(path),
            ],
        }
    }
}

impl Widget for Placeholder<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .title(" arcpeek ")
            .style(Style::default().bg(self.bg_color));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.lines();
        let top = inner.height.saturating_sub(lines.len() as u16) / 2;
        let body = Rect {
            y: inner.y + top,
            height: inner.height.saturating_sub(top),
            ..inner
        };
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(body, buf);
    }
}
