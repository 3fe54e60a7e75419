use thiserror::Error;

/// 사용자에게 노출되는 오류 분류
///
/// 백엔드 오류는 이 세 가지 중 하나로 정규화된 뒤 오케스트레이터로 전달된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 비밀번호가 없거나 틀림 (재시도 가능)
    PasswordRequired,
    /// 그 외 백엔드 실패 (재시도 없음)
    OperationFailed,
    /// 부모 경로를 해석할 수 없는 엔트리
    AmbiguousHierarchy,
}

#[derive(Error, Debug)]
pub enum ArcpeekError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported archive format: {path}")]
    ArchiveUnsupportedFormat { path: String },

    #[error("Password required: {path}")]
    ArchivePasswordRequired { path: String },

    #[error("Invalid password: {path} ({reason})")]
    ArchiveInvalidPassword { path: String, reason: String },

    #[error("Failed to read archive {path}: {reason}")]
    ArchiveListFailed { path: String, reason: String },

    #[error("Failed to extract archive {path}: {reason}")]
    ArchiveExtractFailed { path: String, reason: String },

    #[error("Unresolvable parent '{parent}' for entry {path}")]
    AmbiguousHierarchy {
        path: String,
        parent: String,
        attached_to: Option<String>,
    },

    #[error("Background worker stopped: {0}")]
    WorkerPanicked(String),
}

impl ArcpeekError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArcpeekError::ArchivePasswordRequired { .. }
            | ArcpeekError::ArchiveInvalidPassword { .. } => ErrorKind::PasswordRequired,
            ArcpeekError::AmbiguousHierarchy { .. } => ErrorKind::AmbiguousHierarchy,
            ArcpeekError::Io(_)
            | ArcpeekError::Config(_)
            | ArcpeekError::ArchiveUnsupportedFormat { .. }
            | ArcpeekError::ArchiveListFailed { .. }
            | ArcpeekError::ArchiveExtractFailed { .. }
            | ArcpeekError::WorkerPanicked(_) => ErrorKind::OperationFailed,
        }
    }
}

/// 워커 채널을 건너는 오류 (복제 가능)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl OperationError {
    #[cfg(test)]
    pub fn password_required(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::PasswordRequired,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::OperationFailed,
            message: message.into(),
        }
    }

    pub fn is_password_required(&self) -> bool {
        self.kind == ErrorKind::PasswordRequired
    }
}

impl From<ArcpeekError> for OperationError {
    fn from(err: ArcpeekError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArcpeekError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_variants_map_to_password_required() {
        let missing = ArcpeekError::ArchivePasswordRequired {
            path: "a.zip".to_string(),
        };
        let wrong = ArcpeekError::ArchiveInvalidPassword {
            path: "a.zip".to_string(),
            reason: "bad".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::PasswordRequired);
        assert_eq!(wrong.kind(), ErrorKind::PasswordRequired);
    }

    #[test]
    fn test_other_variants_map_to_operation_failed() {
        let io = ArcpeekError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let unsupported = ArcpeekError::ArchiveUnsupportedFormat {
            path: "a.cab".to_string(),
        };
        assert_eq!(io.kind(), ErrorKind::OperationFailed);
        assert_eq!(unsupported.kind(), ErrorKind::OperationFailed);
    }

    #[test]
    fn test_operation_error_keeps_kind_and_message() {
        let err: OperationError = ArcpeekError::ArchiveListFailed {
            path: "a.zip".to_string(),
            reason: "corrupt".to_string(),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::OperationFailed);
        assert!(err.message.contains("corrupt"));
        assert!(!err.is_password_required());
    }
}
