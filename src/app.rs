use crate::core::actions::Action;
use crate::core::backend::ArchiveBackend;
use crate::core::session::{ArchiveSession, Operation, Phase, Rejection, SessionEvent};
use crate::models::{Settings, TreeViewState};
use crate::system::HostShell;
use crate::ui::{DialogKind, InputPurpose, LayoutManager, ThemeManager};
use crate::utils::error::ErrorKind;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

mod dialogs;
mod ingest;
mod navigation;
mod operations;

pub use ingest::{
    cli_adapter, deep_link_adapter, drag_drop_adapter, normalize_source_path,
    parse_dropped_paste, IngestSource,
};

/// 앱 상태
pub struct App {
    /// 종료 플래그
    pub should_quit: bool,
    /// 레이아웃 매니저
    pub layout: LayoutManager,
    /// 목록/압축 해제 상태 머신
    pub session: ArchiveSession,
    /// 트리 펼침/선택 (화면 전용 상태)
    pub tree_view: TreeViewState,
    /// 테마 관리자
    pub theme_manager: ThemeManager,
    /// 현재 표시 중인 다이얼로그
    pub dialog: Option<DialogKind>,
    /// 토스트 메시지 (3초 후 자동 소멸)
    pub toast_message: Option<(String, Instant)>,
    pub host: HostShell,
    pub settings: Settings,
    settings_path: Option<PathBuf>,
    /// 가장 최근 압축 해제 진행 경로
    pub last_progress: Option<String>,
    pub spinner_tick: usize,
}

impl App {
    pub fn new(
        settings: Settings,
        settings_path: Option<PathBuf>,
        host: HostShell,
        backend: Box<dyn ArchiveBackend>,
    ) -> Self {
        let mut theme_manager = ThemeManager::new();
        match theme_manager.load_themes_from_config_dir() {
            Ok(0) => {}
            Ok(count) => info!(count, "custom themes loaded"),
            Err(err) => warn!(error = %err, "failed to load custom themes"),
        }
        if let Err(err) = theme_manager.switch_theme(&settings.theme) {
            warn!(theme = %settings.theme, error = %err, "saved theme not available");
        }

        Self {
            should_quit: false,
            layout: LayoutManager::new(),
            session: ArchiveSession::new(backend),
            tree_view: TreeViewState::new(),
            theme_manager,
            dialog: None,
            toast_message: None,
            host,
            settings,
            settings_path,
            last_progress: None,
            spinner_tick: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn new_for_test() -> (Self, crate::core::backend::testing::ScriptedBackend) {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static TEST_APP_COUNTER: AtomicUsize = AtomicUsize::new(0);
        let suffix = TEST_APP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let settings_path = std::env::temp_dir().join(format!(
            "arcpeek-test-settings-{}-{}.toml",
            std::process::id(),
            suffix
        ));

        let backend = crate::core::backend::testing::ScriptedBackend::new();
        let app = Self {
            should_quit: false,
            layout: LayoutManager::new(),
            session: ArchiveSession::new(Box::new(backend.clone())),
            tree_view: TreeViewState::new(),
            theme_manager: ThemeManager::new(),
            dialog: None,
            toast_message: None,
            host: HostShell::default(),
            settings: Settings::default(),
            settings_path: Some(settings_path),
            last_progress: None,
            spinner_tick: 0,
        };
        (app, backend)
    }

    /// 종료 (설정 저장)
    pub fn quit(&mut self) {
        if let Err(err) = self.save_settings() {
            warn!(error = %err, "failed to save settings");
        }
        self.should_quit = true;
    }

    fn save_settings(&self) -> std::io::Result<()> {
        match &self.settings_path {
            Some(path) => self.settings.save_to(path),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }

    /// 종료 상태 확인
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// 트리를 그릴 수 있는 상태인지 (목록 완료 이후)
    pub fn has_tree(&self) -> bool {
        matches!(
            self.session.phase(),
            Phase::Listed | Phase::Extracting | Phase::AwaitingPassword(Operation::Extract)
        )
    }

    /// 바쁨 표시 여부 (압축 해제 중일 때만)
    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    pub fn current_archive(&self) -> Option<&Path> {
        self.session.current_path()
    }

    pub fn is_dialog_active(&self) -> bool {
        self.dialog.is_some()
    }

    /// 세션 이벤트를 화면 상태로 반영
    pub fn process_session_events<W: Write>(&mut self, out: &mut W) {
        for event in self.session.drain_events() {
            self.apply_session_event(out, event);
        }
    }

    fn apply_session_event<W: Write>(&mut self, out: &mut W, event: SessionEvent) {
        match event {
            SessionEvent::Acknowledged(path) => {
                if let Err(err) = self.host.acknowledge(out, &path) {
                    warn!(error = %err, "failed to update terminal title");
                }
            }
            SessionEvent::TreeCleared => {
                self.tree_view.clear();
                self.last_progress = None;
                // 이전 아카이브의 비밀번호/대상 입력은 더 이상 의미가 없다
                if self.dialog.as_ref().is_some_and(|d| {
                    matches!(
                        d.input_purpose(),
                        Some(InputPurpose::ArchivePassword | InputPurpose::ExtractDestination)
                    )
                }) {
                    self.dialog = None;
                }
            }
            SessionEvent::TreePublished(nodes) => self.tree_view.set_tree(nodes),
            SessionEvent::PasswordRequested { retry, .. } => {
                let name = self.archive_display_name();
                self.dialog = Some(DialogKind::password(&name, retry));
            }
            SessionEvent::ExtractionStarted { target } => {
                self.last_progress = None;
                self.set_toast(&format!("Extracting to {}", target.display()));
            }
            SessionEvent::ExtractionProgress(paths) => {
                if let Some(last) = paths.into_iter().last() {
                    self.last_progress = Some(last);
                }
            }
            SessionEvent::ExtractionFinished { target } => {
                self.last_progress = None;
                self.dialog = Some(DialogKind::message(
                    "Extraction Complete",
                    format!("Extracted to {}", target.display()),
                ));
            }
            SessionEvent::Notice { kind, message } => {
                self.last_progress = None;
                let title = match kind {
                    ErrorKind::PasswordRequired => "Password Required",
                    ErrorKind::AmbiguousHierarchy => "Archive Structure",
                    ErrorKind::OperationFailed => "Error",
                };
                self.dialog = Some(DialogKind::error(title, message));
            }
        }
    }

    /// 오케스트레이터 거부를 토스트로 표시
    pub(crate) fn show_rejection(&mut self, rejection: Rejection) {
        self.set_toast(&rejection.to_string());
    }

    pub(crate) fn archive_display_name(&self) -> String {
        self.current_archive()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "archive".to_string())
    }
}
