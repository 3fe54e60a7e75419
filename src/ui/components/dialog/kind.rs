use super::TextField;

/// 입력 다이얼로그 목적
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    /// 압축 비밀번호 (목록 또는 해제 재시도)
    ArchivePassword,
    /// 압축 해제 대상 디렉토리
    ExtractDestination,
    /// 열 아카이브 경로
    OpenArchive,
}

/// 다이얼로그 종류
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    Input {
        purpose: InputPurpose,
        title: String,
        prompt: String,
        field: TextField,
        /// 비밀번호 재시도 등 입력 위 안내문
        notice: Option<String>,
        selected_button: usize, // 0: OK, 1: Cancel
        mask_input: bool,
    },
    Error {
        title: String,
        message: String,
    },
    Message {
        title: String,
        message: String,
    },
    /// 단축키 도움말
    Help { scroll_offset: usize },
}

impl DialogKind {
    pub fn input(
        purpose: InputPurpose,
        title: impl Into<String>,
        prompt: impl Into<String>,
        initial: impl Into<String>,
    ) -> Self {
        DialogKind::Input {
            purpose,
            title: title.into(),
            prompt: prompt.into(),
            field: TextField::new(initial),
            notice: None,
            selected_button: 0,
            mask_input: false,
        }
    }

    /// 마스킹된 비밀번호 입력. `retry` 면 틀렸다는 안내를 붙인다.
    pub fn password(archive_name: &str, retry: bool) -> Self {
        DialogKind::Input {
            purpose: InputPurpose::ArchivePassword,
            title: "Password Required".to_string(),
            prompt: format!("Password for {}:", archive_name),
            field: TextField::default(),
            notice: retry.then(|| "Incorrect password. Try again.".to_string()),
            selected_button: 0,
            mask_input: true,
        }
    }

    pub fn extract_destination(initial: impl Into<String>) -> Self {
        Self::input(
            InputPurpose::ExtractDestination,
            "Extract Archive",
            "Extract to directory:",
            initial,
        )
    }

    pub fn open_archive(initial: impl Into<String>) -> Self {
        Self::input(
            InputPurpose::OpenArchive,
            "Open Archive",
            "Archive path:",
            initial,
        )
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        DialogKind::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn message(title: impl Into<String>, message: impl Into<String>) -> Self {
        DialogKind::Message {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn help() -> Self {
        DialogKind::Help { scroll_offset: 0 }
    }

    pub fn input_purpose(&self) -> Option<InputPurpose> {
        match self {
            DialogKind::Input { purpose, .. } => Some(*purpose),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_dialog_is_masked_and_empty() {
        let DialogKind::Input {
            purpose,
            field,
            mask_input,
            notice,
            ..
        } = DialogKind::password("a.zip", false)
        else {
            panic!("expected input dialog");
        };
        assert_eq!(purpose, InputPurpose::ArchivePassword);
        assert!(mask_input);
        assert!(field.is_empty());
        assert!(notice.is_none());
    }

    #[test]
    fn test_password_retry_has_notice() {
        let DialogKind::Input { notice, .. } = DialogKind::password("a.zip", true) else {
            panic!("expected input dialog");
        };
        assert!(notice.is_some());
    }

    #[test]
    fn test_extract_destination_prefilled() {
        let kind = DialogKind::extract_destination("/tmp/out");
        assert_eq!(kind.input_purpose(), Some(InputPurpose::ExtractDestination));
        let DialogKind::Input { field, .. } = kind else {
            panic!("expected input dialog");
        };
        assert_eq!(field.value(), "/tmp/out");
        assert_eq!(field.cursor(), "/tmp/out".len());
    }
}
