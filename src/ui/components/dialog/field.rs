// 한 줄 입력 필드 - 커서는 항상 UTF-8 문자 경계의 바이트 인덱스

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn new(initial: impl Into<String>) -> Self {
        let value: String = initial.into();
        let cursor = value.len();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// 입력값을 꺼내고 필드를 비운다
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        let clean: String = s.chars().filter(|c| !c.is_control()).collect();
        self.value.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.prev_char_start(self.cursor);
        self.value.remove(prev);
        self.cursor = prev;
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.prev_char_start(self.cursor);
    }

    pub fn right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Ctrl+W: 커서 왼쪽 단어 삭제 (앞쪽 구분자 포함)
    pub fn delete_prev_word(&mut self) {
        let end = self.cursor;
        let mut pos = end;

        while pos > 0 {
            let prev = self.prev_char_start(pos);
            if !self.value[prev..pos].chars().all(is_word_delimiter) {
                break;
            }
            pos = prev;
        }
        while pos > 0 {
            let prev = self.prev_char_start(pos);
            if self.value[prev..pos].chars().all(is_word_delimiter) {
                break;
            }
            pos = prev;
        }

        self.value.replace_range(pos..end, "");
        self.cursor = pos;
    }

    /// 편집 키를 처리했으면 true
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('w') if ctrl => self.delete_prev_word(),
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char('a') if ctrl => self.home(),
            KeyCode::Char('e') if ctrl => self.end(),
            KeyCode::Char(c) if !ctrl => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => return false,
        }
        true
    }

    fn prev_char_start(&self, pos: usize) -> usize {
        self.value[..pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

fn is_word_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '/' | '\\' | '.' | '-' | '_' | ':' | ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_insert_and_backspace_on_utf8_boundaries() {
        let mut field = TextField::new("가나");
        field.left();
        field.insert_char('다');
        assert_eq!(field.value(), "가다나");
        assert_eq!(field.cursor(), "가다".len());

        field.backspace();
        assert_eq!(field.value(), "가나");
        field.home();
        field.delete();
        assert_eq!(field.value(), "나");
        assert_eq!(field.cursor(), 0);
    }

    #[test]
    fn test_left_right_stop_at_edges() {
        let mut field = TextField::new("a가");
        field.right();
        assert_eq!(field.cursor(), "a가".len());
        field.left();
        field.left();
        field.left();
        assert_eq!(field.cursor(), 0);
    }

    #[test]
    fn test_delete_prev_word() {
        let mut field = TextField::new("/tmp/out dir/");
        field.delete_prev_word();
        assert_eq!(field.value(), "/tmp/out ");
        field.delete_prev_word();
        assert_eq!(field.value(), "/tmp/");
    }

    #[test]
    fn test_handle_key_and_take() {
        let mut field = TextField::default();
        assert!(field.handle_key(key(KeyCode::Char('p'))));
        assert!(field.handle_key(key(KeyCode::Char('w'))));
        assert!(!field.handle_key(key(KeyCode::Enter)));
        assert!(field.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert!(field.value().is_empty());

        field.insert_str("secret\n");
        assert_eq!(field.take(), "secret");
        assert!(field.value().is_empty());
        assert_eq!(field.cursor(), 0);
    }
}
