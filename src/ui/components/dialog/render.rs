use super::{DialogKind, TextField};
use crate::core::actions::generate_help_entries;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// 다이얼로그 내부 좌우 패딩
const DIALOG_H_PADDING: u16 = 2;
/// 다이얼로그 내부 상단 패딩
const DIALOG_V_PADDING: u16 = 1;
const HELP_KEY_COLUMN: u16 = 16;

pub struct Dialog<'a> {
    kind: &'a DialogKind,
    bg_color: Color,
    fg_color: Color,
    border_color: Color,
    title_color: Color,
    button_bg: Color,
    button_fg: Color,
    button_selected_bg: Color,
    button_selected_fg: Color,
    input_bg: Color,
    warning_color: Color,
    error_color: Color,
    muted_color: Color,
}

impl<'a> Dialog<'a> {
    pub fn new(kind: &'a DialogKind) -> Self {
        Self {
            kind,
            bg_color: Color::Rgb(45, 45, 48),
            fg_color: Color::Rgb(212, 212, 212),
            border_color: Color::Rgb(0, 120, 212),
            title_color: Color::Rgb(0, 120, 212),
            button_bg: Color::Rgb(60, 60, 60),
            button_fg: Color::Rgb(212, 212, 212),
            button_selected_bg: Color::Rgb(0, 120, 212),
            button_selected_fg: Color::White,
            input_bg: Color::Rgb(30, 30, 30),
            warning_color: Color::Rgb(255, 165, 0),
            error_color: Color::Rgb(244, 71, 71),
            muted_color: Color::Rgb(128, 128, 128),
        }
    }

    pub fn theme(mut self, theme: &Theme) -> Self {
        self.bg_color = theme.dialog_bg.to_color();
        self.fg_color = theme.fg_primary.to_color();
        self.border_color = theme.dialog_border.to_color();
        self.title_color = theme.accent.to_color();
        self.button_bg = theme.command_bar_bg.to_color();
        self.button_fg = theme.fg_primary.to_color();
        self.button_selected_bg = theme.row_selected_bg.to_color();
        self.button_selected_fg = theme.row_selected_fg.to_color();
        self.input_bg = theme.bg_primary.to_color();
        self.warning_color = theme.warning.to_color();
        self.error_color = theme.error.to_color();
        self.muted_color = theme.muted.to_color();
        self
    }

    /// 화면 중앙 영역 (반응형)
    pub fn calculate_area(&self, screen: Rect) -> Rect {
        let sw = screen.width;
        let sh = screen.height;

        let (width, height) = match self.kind {
            DialogKind::Input { .. } => (((sw as f32 * 0.7) as u16).clamp(44, 100), 8u16),
            DialogKind::Error { message, .. } | DialogKind::Message { message, .. } => {
                let w = 60u16.min(sw.saturating_sub(4)).max(30);
                let text_width = w.saturating_sub(DIALOG_H_PADDING * 2).max(1) as usize;
                let lines: usize = message
                    .lines()
                    .map(|l| l.width().div_ceil(text_width).max(1))
                    .sum::<usize>()
                    .max(1);
                (w, (5 + lines as u16).max(6))
            }
            DialogKind::Help { .. } => (60u16, sh.saturating_sub(4).max(12)),
        };

        let width = width.min(sw.saturating_sub(2));
        let height = height.min(sh.saturating_sub(2));

        Rect {
            x: screen.x + sw.saturating_sub(width) / 2,
            y: screen.y + sh.saturating_sub(height) / 2,
            width,
            height,
        }
    }

    fn frame(&self, area: Rect, buf: &mut Buffer, title: &str, accent: Color) {
        Block::default()
            .title(format!(" {} ", title))
            .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(self.bg_color))
            .render(area, buf);
    }

    fn inner(area: Rect) -> Rect {
        Rect {
            x: area.x + DIALOG_H_PADDING,
            y: area.y + DIALOG_V_PADDING,
            width: area.width.saturating_sub(DIALOG_H_PADDING * 2),
            height: area.height.saturating_sub(DIALOG_V_PADDING * 2),
        }
    }

    fn render_button(&self, buf: &mut Buffer, x: u16, y: u16, label: &str, is_selected: bool) -> u16 {
        let (bg, fg) = if is_selected {
            (self.button_selected_bg, self.button_selected_fg)
        } else {
            (self.button_bg, self.button_fg)
        };
        let padded = format!(" {} ", label);
        let width = padded.width() as u16;
        buf.set_string(x, y, &padded, Style::default().fg(fg).bg(bg));
        width
    }

    #[allow(clippy::too_many_arguments)]
    fn render_input(
        &self,
        buf: &mut Buffer,
        area: Rect,
        title: &str,
        prompt: &str,
        field: &TextField,
        notice: Option<&str>,
        selected_button: usize,
        mask_input: bool,
    ) {
        self.frame(area, buf, title, self.title_color);
        let inner = Self::inner(area);
        if inner.height < 3 || inner.width < 4 {
            return;
        }

        buf.set_string(inner.x, inner.y, prompt, Style::default().fg(self.fg_color));

        let input_y = inner.y + 1;
        buf.set_style(
            Rect::new(inner.x, input_y, inner.width, 1),
            Style::default().bg(self.input_bg),
        );

        // 마스킹 시 문자 수만큼 '*'
        let (visible, cursor_col) = if mask_input {
            let count = field.value()[..field.cursor()].chars().count();
            ("*".repeat(field.value().chars().count()), count)
        } else {
            let before = &field.value()[..field.cursor()];
            (field.value().to_string(), before.width())
        };

        let max_display = inner.width.saturating_sub(2) as usize;
        let (shown, cursor_x) = scroll_to_cursor(&visible, cursor_col, max_display);
        buf.set_string(
            inner.x + 1,
            input_y,
            shown,
            Style::default().fg(self.fg_color).bg(self.input_bg),
        );

        let cursor_x = inner.x + 1 + cursor_x as u16;
        if cursor_x < inner.x + inner.width {
            if let Some(cell) = buf.cell_mut((cursor_x, input_y)) {
                if field.cursor() < field.value().len() {
                    cell.set_style(Style::default().fg(self.input_bg).bg(self.fg_color));
                } else {
                    cell.set_char('▏');
                    cell.set_style(Style::default().fg(self.fg_color).bg(self.input_bg));
                }
            }
        }

        if let Some(text) = notice {
            buf.set_string(
                inner.x,
                input_y + 1,
                text,
                Style::default().fg(self.warning_color),
            );
        }

        let button_y = area.y + area.height.saturating_sub(2);
        let ok_width = self.render_button(buf, inner.x, button_y, "OK", selected_button == 0);
        self.render_button(
            buf,
            inner.x + ok_width + 2,
            button_y,
            "Cancel",
            selected_button == 1,
        );
    }

    fn render_message(&self, buf: &mut Buffer, area: Rect, title: &str, message: &str, is_error: bool) {
        let accent = if is_error {
            self.error_color
        } else {
            self.title_color
        };
        self.frame(area, buf, title, accent);

        let inner = Self::inner(area);
        let text_area = Rect {
            height: inner.height.saturating_sub(2),
            ..inner
        };
        Paragraph::new(message)
            .style(Style::default().fg(self.fg_color))
            .wrap(Wrap { trim: true })
            .render(text_area, buf);

        let button_y = area.y + area.height.saturating_sub(2);
        let button_x = area.x + area.width.saturating_sub(" OK ".width() as u16) / 2;
        self.render_button(buf, button_x, button_y, "OK", true);
    }

    fn render_help(&self, buf: &mut Buffer, area: Rect, scroll_offset: usize) {
        self.frame(area, buf, "Keyboard Shortcuts", self.title_color);
        let inner = Self::inner(area);
        let body_height = inner.height.saturating_sub(2) as usize;

        // (헤더 여부, 키, 설명)
        let mut rows: Vec<(bool, &str, &str)> = Vec::new();
        for (category, items) in generate_help_entries() {
            if !rows.is_empty() {
                rows.push((false, "", ""));
            }
            rows.push((true, category, ""));
            rows.extend(items.into_iter().map(|(key, label)| (false, key, label)));
        }

        let max_scroll = rows.len().saturating_sub(body_height);
        let header_style = Style::default()
            .fg(self.title_color)
            .add_modifier(Modifier::BOLD);
        for (i, (is_header, key, label)) in rows
            .iter()
            .skip(scroll_offset.min(max_scroll))
            .take(body_height)
            .enumerate()
        {
            let y = inner.y + i as u16;
            if *is_header {
                buf.set_string(inner.x, y, *key, header_style);
            } else if !key.is_empty() {
                buf.set_string(inner.x + 2, y, *key, Style::default().fg(self.title_color));
                buf.set_string(
                    inner.x + HELP_KEY_COLUMN,
                    y,
                    *label,
                    Style::default().fg(self.fg_color),
                );
            }
        }

        let hint = "j/k: scroll  Esc: close";
        buf.set_string(
            area.x + area.width.saturating_sub(hint.width() as u16) / 2,
            area.y + area.height.saturating_sub(2),
            hint,
            Style::default().fg(self.muted_color),
        );
    }
}

/// 커서가 보이도록 앞부분을 잘라낸 문자열과 커서 열
fn scroll_to_cursor(text: &str, cursor_col: usize, max_display: usize) -> (&str, usize) {
    if max_display == 0 || cursor_col < max_display {
        return (text, cursor_col);
    }
    let skip_width = cursor_col + 1 - max_display;
    let mut skipped = 0;
    for (i, c) in text.char_indices() {
        if skipped >= skip_width {
            return (&text[i..], cursor_col - skipped);
        }
        skipped += c.width().unwrap_or(0);
    }
    ("", 0)
}

impl Widget for Dialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dialog_area = self.calculate_area(area);
        Clear.render(dialog_area, buf);

        match self.kind {
            DialogKind::Input {
                title,
                prompt,
                field,
                notice,
                selected_button,
                mask_input,
                ..
            } => self.render_input(
                buf,
                dialog_area,
                title,
                prompt,
                field,
                notice.as_deref(),
                *selected_button,
                *mask_input,
            ),
            DialogKind::Error { title, message } => {
                self.render_message(buf, dialog_area, title, message, true)
            }
            DialogKind::Message { title, message } => {
                self.render_message(buf, dialog_area, title, message, false)
            }
            DialogKind::Help { scroll_offset } => self.render_help(buf, dialog_area, *scroll_offset),
        }
    }
}
