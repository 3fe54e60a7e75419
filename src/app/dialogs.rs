use super::*;
use crate::core::actions::generate_help_entries;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

impl App {
    // === 다이얼로그 입력 처리 메서드 ===

    /// 다이얼로그 종류별 키 처리
    pub fn handle_dialog_key(&mut self, key: KeyEvent) {
        match &self.dialog {
            Some(DialogKind::Input { .. }) => self.handle_input_dialog_key(key),
            Some(DialogKind::Error { .. } | DialogKind::Message { .. }) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.close_dialog();
                }
            }
            Some(DialogKind::Help { .. }) => match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => self.close_dialog(),
                KeyCode::Char('j') | KeyCode::Down => self.dialog_help_scroll_down(),
                KeyCode::Char('k') | KeyCode::Up => self.dialog_help_scroll_up(),
                _ => {}
            },
            None => {}
        }
    }

    fn handle_input_dialog_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Enter) => {
                if self.get_dialog_input_selected_button() == Some(0) {
                    self.confirm_input_dialog();
                } else {
                    self.cancel_input_dialog();
                }
            }
            (_, KeyCode::Esc) => self.cancel_input_dialog(),
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => self.cancel_input_dialog(),
            (KeyModifiers::NONE, KeyCode::Tab) | (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                self.dialog_input_toggle_button();
            }
            _ => {
                if let Some(DialogKind::Input { field, .. }) = &mut self.dialog {
                    field.handle_key(key);
                }
            }
        }
    }

    /// 입력 다이얼로그: 버튼 전환
    pub fn dialog_input_toggle_button(&mut self) {
        if let Some(DialogKind::Input {
            selected_button, ..
        }) = &mut self.dialog
        {
            *selected_button = 1 - (*selected_button).min(1);
        }
    }

    pub fn get_dialog_input_selected_button(&self) -> Option<usize> {
        match &self.dialog {
            Some(DialogKind::Input {
                selected_button, ..
            }) => Some(*selected_button),
            _ => None,
        }
    }

    pub fn get_dialog_input_value(&self) -> Option<String> {
        match &self.dialog {
            Some(DialogKind::Input { field, .. }) => Some(field.value().to_string()),
            _ => None,
        }
    }

    /// OK: 목적에 따라 분기
    pub fn confirm_input_dialog(&mut self) {
        let Some(purpose) = self.dialog.as_ref().and_then(DialogKind::input_purpose) else {
            return;
        };
        match purpose {
            InputPurpose::ArchivePassword => self.confirm_password(),
            InputPurpose::ExtractDestination => {
                if let Some(value) = self.get_dialog_input_value() {
                    self.confirm_extract_destination(&value);
                }
            }
            InputPurpose::OpenArchive => {
                if let Some(value) = self.get_dialog_input_value() {
                    self.confirm_open_archive(&value);
                }
            }
        }
    }

    /// Cancel/Esc: 비밀번호 다이얼로그는 세션에도 취소를 알린다
    pub fn cancel_input_dialog(&mut self) {
        match self.dialog.as_ref().and_then(DialogKind::input_purpose) {
            Some(InputPurpose::ArchivePassword) => self.cancel_password(),
            _ => self.close_dialog(),
        }
    }

    /// 열기 프롬프트 (현재 아카이브 디렉토리로 미리 채움)
    pub fn show_open_dialog(&mut self) {
        let initial = self
            .current_archive()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| format!("{}/", p.display()))
            .unwrap_or_default();
        self.dialog = Some(DialogKind::open_archive(initial));
    }

    pub fn show_help_dialog(&mut self) {
        self.dialog = Some(DialogKind::help());
    }

    pub fn dialog_help_scroll_down(&mut self) {
        // 카테고리 헤더 + 항목 + 카테고리 사이 빈 줄
        let entries = generate_help_entries();
        let total_rows: usize = entries.iter().map(|(_, items)| items.len() + 2).sum();
        if let Some(DialogKind::Help { scroll_offset }) = &mut self.dialog {
            if *scroll_offset + 1 < total_rows {
                *scroll_offset += 1;
            }
        }
    }

    pub fn dialog_help_scroll_up(&mut self) {
        if let Some(DialogKind::Help { scroll_offset }) = &mut self.dialog {
            *scroll_offset = scroll_offset.saturating_sub(1);
        }
    }

    /// 다이얼로그 닫기
    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }
}
