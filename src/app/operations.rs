use super::*;

impl App {
    // === 경로 수신 ===

    /// 모든 수집 경로의 단일 진입점
    pub fn ingest(&mut self, source: IngestSource, path: Option<PathBuf>) {
        let Some(path) = path else {
            return;
        };
        info!(source = %source, path = %path.display(), "archive path received");
        self.session.ingest_path(path);
    }

    /// 시작 시 CLI 인자와 딥링크를 한 번씩 수집 (준비 신호 이후에만)
    pub fn ingest_startup_sources(&mut self) {
        if !self.host.is_ready() {
            warn!("startup sources requested before host ready, ignored");
            return;
        }
        let from_cli = cli_adapter(self.host.startup_args());
        self.ingest(IngestSource::CommandLine, from_cli);

        let from_link = deep_link_adapter(self.host.deep_link_paths());
        self.ingest(IngestSource::DeepLink, from_link);
    }

    /// 브래킷 붙여넣기: 입력 다이얼로그가 열려 있으면 텍스트 입력, 아니면 드롭.
    /// 알림/도움말 다이얼로그는 유효한 드롭이 오면 닫는다
    pub fn handle_paste(&mut self, text: &str) {
        if let Some(DialogKind::Input { field, .. }) = &mut self.dialog {
            field.insert_str(text);
            return;
        }
        let items = parse_dropped_paste(text);
        let path = drag_drop_adapter(&items);
        if path.is_some() && self.dialog.take().is_some() {
            debug!("dialog dismissed by dropped archive");
        }
        self.ingest(IngestSource::DragDrop, path);
    }

    // === 목록/압축 해제 ===

    /// 현재 아카이브 다시 읽기
    pub fn reload_archive(&mut self) {
        match self.session.reload() {
            Ok(()) => self.set_toast("Reloading archive"),
            Err(rejection) => self.show_rejection(rejection),
        }
    }

    /// 압축 해제 대상 입력 다이얼로그 열기
    pub fn start_extract(&mut self) {
        if let Err(rejection) = self.extract_precondition() {
            self.show_rejection(rejection);
            return;
        }
        let initial = self
            .default_extract_destination()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        self.dialog = Some(DialogKind::extract_destination(initial));
    }

    fn extract_precondition(&self) -> Result<(), Rejection> {
        if self.session.current_path().is_none() {
            return Err(Rejection::NothingLoaded);
        }
        if self.session.is_busy() {
            return Err(Rejection::ExtractInFlight);
        }
        if self.session.phase() != Phase::Listed {
            return Err(Rejection::NotListed);
        }
        Ok(())
    }

    /// 기본 대상: 설정값 또는 아카이브 옆의 `<stem>` 디렉토리
    pub(crate) fn default_extract_destination(&self) -> Option<PathBuf> {
        let archive = self.session.current_path()?;
        let stem = archive_stem(archive)?;
        match &self.settings.default_destination {
            Some(base) => Some(base.join(stem)),
            None => Some(archive.parent().unwrap_or(Path::new(".")).join(stem)),
        }
    }

    /// 다이얼로그에서 입력된 대상 디렉토리로 압축 해제 요청
    pub(crate) fn confirm_extract_destination(&mut self, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.set_toast("Destination is empty");
            return;
        }
        self.dialog = None;
        if let Err(rejection) = self.session.request_extract(PathBuf::from(trimmed)) {
            self.show_rejection(rejection);
        }
    }

    /// 열기 프롬프트 확인
    pub(crate) fn confirm_open_archive(&mut self, value: &str) {
        let Some(path) = normalize_source_path(value) else {
            self.set_toast("Archive path is empty");
            return;
        };
        self.dialog = None;
        self.ingest(IngestSource::OpenPrompt, Some(path));
    }

    /// 비밀번호 확인: 입력값은 꺼내는 즉시 필드에서 지운다
    pub(crate) fn confirm_password(&mut self) {
        let password = match &mut self.dialog {
            Some(DialogKind::Input { field, .. }) => field.take(),
            _ => return,
        };
        self.dialog = None;
        if let Err(rejection) = self.session.submit_password(&password) {
            self.show_rejection(rejection);
        }
    }

    /// 비밀번호 취소: 목록이면 Idle, 압축 해제면 Listed 로 남는다
    pub(crate) fn cancel_password(&mut self) {
        if let Some(DialogKind::Input { field, .. }) = &mut self.dialog {
            field.clear();
        }
        self.dialog = None;
        if let Err(rejection) = self.session.cancel_password() {
            self.show_rejection(rejection);
        }
    }

    // === 메인 루프 ===

    /// 백엔드 결과 반영, 스피너/토스트 갱신
    pub fn tick<W: Write>(&mut self, out: &mut W) {
        self.session.pump();
        self.process_session_events(out);
        if self.session.is_busy() {
            self.spinner_tick = self.spinner_tick.wrapping_add(1);
        }
        self.clear_expired_toast();
    }
}

/// `a.tar.gz` -> `a`, `b.zip` -> `b`
fn archive_stem(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy().to_string();
    let lower = name.to_ascii_lowercase();
    for suffix in [".tar.gz", ".tar.bz2", ".tar.xz", ".tar.zst"] {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            return Some(name[..name.len() - suffix.len()].to_string());
        }
    }
    match name.rfind('.') {
        Some(idx) if idx > 0 => Some(name[..idx].to_string()),
        _ => Some(name),
    }
}

#[cfg(test)]
mod stem_tests {
    use super::archive_stem;
    use std::path::Path;

    #[test]
    fn test_archive_stem() {
        assert_eq!(archive_stem(Path::new("/x/a.tar.gz")).as_deref(), Some("a"));
        assert_eq!(archive_stem(Path::new("b.zip")).as_deref(), Some("b"));
        assert_eq!(archive_stem(Path::new(".hidden")).as_deref(), Some(".hidden"));
        assert_eq!(archive_stem(Path::new("noext")).as_deref(), Some("noext"));
    }
}
