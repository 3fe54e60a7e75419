// Status bar component - 상태바
//
// 평소에는 개수/총 크기와 토스트, 압축 해제 중에는 스피너와 마지막 기록 경로

use crate::ui::Theme;
use crate::utils::formatter::count_noun;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

pub struct StatusBar<'a> {
    file_count: usize,
    dir_count: usize,
    /// 총 크기 (포맷된 문자열)
    total_size: &'a str,
    /// 압축 해제 진행 중이면 Some(최근 경로)
    busy: Option<&'a str>,
    spinner_tick: usize,
    toast: Option<&'a str>,
    theme_name: &'a str,
    bg_color: Color,
    fg_color: Color,
    accent_color: Color,
    toast_color: Color,
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self {
            file_count: 0,
            dir_count: 0,
            total_size: "0 B",
            busy: None,
            spinner_tick: 0,
            toast: None,
            theme_name: "",
            bg_color: Color::Rgb(0, 122, 204),
            fg_color: Color::Rgb(255, 255, 255),
            accent_color: Color::Rgb(255, 255, 255),
            toast_color: Color::Yellow,
        }
    }
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(mut self, dirs: usize, files: usize) -> Self {
        self.dir_count = dirs;
        self.file_count = files;
        self
    }

    pub fn total_size(mut self, size: &'a str) -> Self {
        self.total_size = size;
        self
    }

    /// 진행 표시 (`busy` 가 참인 동안만 호출)
    pub fn busy(mut self, last_path: &'a str, tick: usize) -> Self {
        self.busy = Some(last_path);
        self.spinner_tick = tick;
        self
    }

    pub fn toast(mut self, toast: Option<&'a str>) -> Self {
        self.toast = toast;
        self
    }

    pub fn theme_name(mut self, name: &'a str) -> Self {
        self.theme_name = name;
        self
    }

    pub fn theme(mut self, theme: &Theme) -> Self {
        self.bg_color = theme.status_bar_bg.to_color();
        self.fg_color = theme.status_bar_fg.to_color();
        self.accent_color = theme.accent.to_color();
        self.toast_color = theme.warning.to_color();
        self
    }

    fn left_text(&self) -> String {
        match self.busy {
            Some(path) => format!(
                " {} Extracting {}",
                spinner_frame(self.spinner_tick),
                path
            ),
            None => format!(
                " {}, {} | {}",
                count_noun(self.dir_count, "dir", "dirs"),
                count_noun(self.file_count, "file", "files"),
                self.total_size
            ),
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.bg_color));

        let left = self.left_text();
        let toast = match (self.busy, self.toast) {
            (None, Some(msg)) => format!(" | {}", msg),
            _ => String::new(),
        };
        let right = format!("[{}] ", self.theme_name);

        let used = left.width() + toast.width() + right.width();
        let padding = " ".repeat((area.width as usize).saturating_sub(used));

        let left_style = if self.busy.is_some() {
            Style::default()
                .fg(self.fg_color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.fg_color)
        };

        let line = Line::from(vec![
            Span::styled(left, left_style),
            Span::styled(toast, Style::default().fg(self.toast_color)),
            Span::raw(padding),
            Span::styled(right, Style::default().fg(self.accent_color)),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}
