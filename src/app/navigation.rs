use super::*;

impl App {
    /// 액션 실행 (단일 진실 원천)
    pub fn execute_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.quit(),
            Action::MoveUp => self.tree_view.move_up(1),
            Action::MoveDown => self.tree_view.move_down(1),
            Action::PageUp => self.tree_view.move_up(self.page_size()),
            Action::PageDown => self.tree_view.move_down(self.page_size()),
            Action::GoToTop => self.tree_view.go_to_top(),
            Action::GoToBottom => self.tree_view.go_to_bottom(),
            Action::ToggleNode => self.tree_view.toggle_selected(),
            Action::ExpandNode => self.tree_view.expand_selected(),
            Action::CollapseNode => self.tree_view.collapse_selected(),
            Action::ExpandAll => self.tree_view.expand_all(),
            Action::CollapseAll => self.tree_view.collapse_all(),
            Action::OpenArchive => self.show_open_dialog(),
            Action::Extract => self.start_extract(),
            Action::Reload => self.reload_archive(),
            Action::CycleTheme => self.cycle_theme(),
            Action::ShowHelp => self.show_help_dialog(),
        }
        self.adjust_scroll_offset();
    }

    /// 커맨드바 표시용: 지금 눌러도 거절되지 않는 액션인지
    pub fn action_available(&self, action: Action) -> bool {
        match action {
            Action::Extract => self.session.phase() == Phase::Listed,
            Action::Reload => {
                self.current_archive().is_some()
                    && matches!(self.session.phase(), Phase::Idle | Phase::Listed)
            }
            Action::MoveUp
            | Action::MoveDown
            | Action::PageUp
            | Action::PageDown
            | Action::GoToTop
            | Action::GoToBottom
            | Action::ToggleNode
            | Action::ExpandNode
            | Action::CollapseNode
            | Action::ExpandAll
            | Action::CollapseAll => self.has_tree(),
            Action::OpenArchive | Action::CycleTheme | Action::ShowHelp | Action::Quit => true,
        }
    }

    /// 한 페이지 이동량 (트리 본문 높이)
    fn page_size(&self) -> usize {
        self.layout.tree_body_height().max(1)
    }

    /// 선택 행이 보이도록 스크롤 조정
    pub fn adjust_scroll_offset(&mut self) {
        let height = self.layout.tree_body_height();
        self.tree_view.adjust_scroll(height);
    }

    /// 다음 테마로 전환 (종료 시 저장)
    pub fn cycle_theme(&mut self) {
        self.theme_manager.cycle_theme();
        let name = self.theme_manager.current_name().to_string();
        self.set_toast(&format!("Theme: {}", name));
        self.settings.theme = name;
    }

    // === 토스트 ===

    /// 토스트 메시지 설정
    pub fn set_toast(&mut self, message: &str) {
        self.toast_message = Some((message.to_string(), Instant::now()));
    }

    /// 만료된 토스트 제거
    pub fn clear_expired_toast(&mut self) {
        if let Some((_, time)) = &self.toast_message {
            if time.elapsed().as_secs() >= 3 {
                self.toast_message = None;
            }
        }
    }

    /// 토스트 메시지 가져오기 (만료 안 된 경우만)
    pub fn toast_display(&self) -> Option<&str> {
        self.toast_message.as_ref().and_then(|(msg, time)| {
            if time.elapsed().as_secs() < 3 {
                Some(msg.as_str())
            } else {
                None
            }
        })
    }
}
