// Layout system - 반응형 레이아웃
//
// - 60+ cols: 이름/크기/수정 시각 컬럼 모두 표시
// - 40-59 cols: 수정 시각 컬럼 생략
// - <40 cols 또는 <10 rows: 경고 화면

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 10;
pub const FULL_COLUMNS_MIN_WIDTH: u16 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// 모든 컬럼
    Full,
    /// 수정 시각 컬럼 생략
    Compact,
    /// 터미널이 너무 작음
    TooSmall,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutAreas {
    pub tree: Rect,
    pub status_bar: Rect,
    pub command_bar: Rect,
    pub warning: Rect,
}

#[derive(Debug)]
pub struct LayoutManager {
    mode: LayoutMode,
    terminal_size: (u16, u16),
    areas: LayoutAreas,
}

impl Default for LayoutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutManager {
    pub fn new() -> Self {
        Self {
            mode: LayoutMode::Full,
            terminal_size: (80, 24),
            areas: LayoutAreas::default(),
        }
    }

    fn determine_mode(width: u16, height: u16) -> LayoutMode {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            LayoutMode::TooSmall
        } else if width < FULL_COLUMNS_MIN_WIDTH {
            LayoutMode::Compact
        } else {
            LayoutMode::Full
        }
    }

    /// 터미널 크기 업데이트 및 영역 재계산
    pub fn update(&mut self, area: Rect) {
        self.terminal_size = (area.width, area.height);
        self.mode = Self::determine_mode(area.width, area.height);
        self.areas = match self.mode {
            LayoutMode::TooSmall => LayoutAreas {
                warning: area,
                ..Default::default()
            },
            LayoutMode::Full | LayoutMode::Compact => Self::split_main(area),
        };
    }

    // 트리 | 상태바 | 커맨드바
    fn split_main(area: Rect) -> LayoutAreas {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        LayoutAreas {
            tree: chunks[0],
            status_bar: chunks[1],
            command_bar: chunks[2],
            warning: Rect::default(),
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn areas(&self) -> &LayoutAreas {
        &self.areas
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    pub fn show_modified_column(&self) -> bool {
        self.mode == LayoutMode::Full
    }

    /// 테두리, 헤더, 구분선을 뺀 트리 본문 높이
    pub fn tree_body_height(&self) -> usize {
        self.areas.tree.height.saturating_sub(4) as usize
    }
}
