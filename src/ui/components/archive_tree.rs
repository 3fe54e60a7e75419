// Archive tree component - 아카이브 내용 트리
//
// 들여쓰기, ▸/▾ 펼침 표시, 크기/수정 시각 컬럼, 스크롤바

use crate::models::tree_view::VisibleRow;
use crate::ui::Theme;
use crate::utils::formatter::{format_file_size, format_modified};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const INDENT: usize = 2;
const SIZE_WIDTH: usize = 10;
const DATE_WIDTH: usize = 16;

pub struct ArchiveTree<'a> {
    /// 패널 제목 (아카이브 경로)
    title: &'a str,
    rows: &'a [VisibleRow],
    selected_index: usize,
    scroll_offset: usize,
    show_modified: bool,
    border_color: Color,
    bg_color: Color,
    header_color: Color,
    file_color: Color,
    directory_color: Color,
    muted_color: Color,
    selected_fg_color: Color,
    selected_bg_color: Color,
}

impl Default for ArchiveTree<'_> {
    fn default() -> Self {
        Self {
            title: "",
            rows: &[],
            selected_index: 0,
            scroll_offset: 0,
            show_modified: true,
            border_color: Color::Rgb(0, 120, 212),
            bg_color: Color::Rgb(30, 30, 30),
            header_color: Color::Rgb(150, 150, 150),
            file_color: Color::Rgb(212, 212, 212),
            directory_color: Color::Rgb(86, 156, 214),
            muted_color: Color::Rgb(128, 128, 128),
            selected_fg_color: Color::Rgb(255, 255, 255),
            selected_bg_color: Color::Rgb(0, 120, 212),
        }
    }
}

impl<'a> ArchiveTree<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn rows(mut self, rows: &'a [VisibleRow]) -> Self {
        self.rows = rows;
        self
    }

    pub fn selected_index(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn scroll_offset(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// 좁은 화면에서는 수정 시각 컬럼을 숨긴다
    pub fn show_modified(mut self, show: bool) -> Self {
        self.show_modified = show;
        self
    }

    pub fn theme(mut self, theme: &Theme) -> Self {
        self.border_color = theme.panel_border.to_color();
        self.bg_color = theme.panel_bg.to_color();
        self.header_color = theme.column_header.to_color();
        self.file_color = theme.file.to_color();
        self.directory_color = theme.directory.to_color();
        self.muted_color = theme.muted.to_color();
        self.selected_fg_color = theme.row_selected_fg.to_color();
        self.selected_bg_color = theme.row_selected_bg.to_color();
        self
    }

    fn name_width(&self, inner_width: usize, has_scrollbar: bool) -> usize {
        let date = if self.show_modified { DATE_WIDTH + 1 } else { 0 };
        inner_width
            .saturating_sub(SIZE_WIDTH + 1)
            .saturating_sub(date)
            .saturating_sub(1)
            .saturating_sub(usize::from(has_scrollbar))
    }

    fn render_header(&self, inner: Rect, buf: &mut Buffer, name_width: usize) {
        let style = Style::default()
            .fg(self.header_color)
            .add_modifier(Modifier::BOLD);
        let mut spans = vec![
            Span::raw(" "),
            Span::styled(format!("{:<width$}", "Name", width = name_width), style),
            Span::raw(" "),
            Span::styled(format!("{:>width$}", "Size", width = SIZE_WIDTH), style),
        ];
        if self.show_modified {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("{:<width$}", "Modified", width = DATE_WIDTH),
                style,
            ));
        }
        buf.set_line(inner.x, inner.y, &Line::from(spans), inner.width);
        buf.set_string(
            inner.x,
            inner.y + 1,
            "─".repeat(inner.width as usize),
            Style::default().fg(self.muted_color),
        );
    }

    fn render_row(&self, row: &VisibleRow, selected: bool, name_width: usize, y: u16, inner: Rect, buf: &mut Buffer) {
        let base = if row.is_dir {
            Style::default().fg(self.directory_color)
        } else {
            Style::default().fg(self.file_color)
        };
        let (style, detail_style) = if selected {
            let s = Style::default()
                .fg(self.selected_fg_color)
                .bg(self.selected_bg_color);
            (s.add_modifier(Modifier::BOLD), s)
        } else {
            (base, Style::default().fg(self.muted_color))
        };

        let marker = match (row.expandable, row.expanded) {
            (true, true) => "▾ ",
            (true, false) => "▸ ",
            (false, _) => "  ",
        };
        let prefix = format!("{}{}", " ".repeat(row.depth * INDENT), marker);
        let label = if row.is_dir {
            format!("{}/", row.name)
        } else {
            row.name.clone()
        };
        let label = truncate_to_width(&label, name_width.saturating_sub(prefix.width()));
        let used = prefix.width() + label.width();

        let size = if row.is_dir {
            "-".to_string()
        } else {
            format_file_size(row.size)
        };

        let mut spans = vec![
            Span::styled(" ", detail_style),
            Span::styled(prefix, style),
            Span::styled(label, style),
            Span::styled(" ".repeat(name_width.saturating_sub(used)), detail_style),
            Span::styled(" ", detail_style),
            Span::styled(format!("{:>width$}", size, width = SIZE_WIDTH), detail_style),
        ];
        if self.show_modified {
            spans.push(Span::styled(" ", detail_style));
            spans.push(Span::styled(
                format!(
                    "{:<width$}",
                    format_modified(row.modified.as_ref()),
                    width = DATE_WIDTH
                ),
                detail_style,
            ));
        }
        if selected {
            let filled: usize = spans.iter().map(|s| s.content.width()).sum();
            let rest = (inner.width as usize).saturating_sub(filled);
            spans.push(Span::styled(" ".repeat(rest), detail_style));
        }
        buf.set_line(inner.x, y, &Line::from(spans), inner.width);
    }

    fn render_scrollbar(&self, inner: Rect, buf: &mut Buffer, body_top: u16, track_height: usize) {
        let total = self.rows.len();
        if track_height == 0 || total == 0 {
            return;
        }
        let thumb_height = (track_height * track_height / total).max(1);
        let max_scroll = total.saturating_sub(track_height);
        let thumb_pos = if max_scroll == 0 {
            0
        } else {
            self.scroll_offset.min(max_scroll) * track_height.saturating_sub(thumb_height) / max_scroll
        };

        let x = inner.x + inner.width - 1;
        for i in 0..track_height {
            let (symbol, color) = if i >= thumb_pos && i < thumb_pos + thumb_height {
                ("┃", self.header_color)
            } else {
                ("│", self.muted_color)
            };
            buf.set_string(x, body_top + i as u16, symbol, Style::default().fg(color));
        }
    }
}

impl Widget for ArchiveTree<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let title = truncate_to_width(self.title, (area.width as usize).saturating_sub(4));
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .title(Span::styled(
                format!(" {} ", title),
                Style::default()
                    .fg(self.file_color)
                    .add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(self.bg_color));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 {
            return;
        }

        let body_height = (inner.height - 2) as usize;
        let has_scrollbar = self.rows.len() > body_height;
        let name_width = self.name_width(inner.width as usize, has_scrollbar);

        self.render_header(inner, buf, name_width);

        let body_top = inner.y + 2;
        let start = self.scroll_offset.min(self.rows.len());
        let end = (start + body_height).min(self.rows.len());
        for (offset, row) in self.rows[start..end].iter().enumerate() {
            let selected = start + offset == self.selected_index;
            self.render_row(row, selected, name_width, body_top + offset as u16, inner, buf);
        }

        if self.rows.is_empty() {
            buf.set_string(
                inner.x + 1,
                body_top,
                "(Empty archive)",
                Style::default().fg(self.muted_color),
            );
        }

        if has_scrollbar {
            self.render_scrollbar(inner, buf, body_top, body_height);
        }
    }
}

/// 표시 너비 기준으로 자르고 "..." 를 붙인다
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let ellipsis = "...";
    if max_width <= ellipsis.len() {
        return ".".repeat(max_width);
    }

    let budget = max_width - ellipsis.len();
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(1);
        if width + w > budget {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push_str(ellipsis);
    out
}
