// Host shell - 프로세스 인자, 딥링크, 준비 신호, 수신 확인

use std::io::Write;
use std::path::{Path, PathBuf};

use crossterm::{execute, terminal::SetTitle};
use tracing::info;

use crate::utils::error::Result;

const TITLE_PREFIX: &str = "arcpeek";

#[derive(Debug, Default)]
pub struct HostShell {
    args: Vec<String>,
    urls: Vec<String>,
    ready: bool,
    last_ack: Option<PathBuf>,
}

impl HostShell {
    pub fn new(args: Vec<String>, urls: Vec<String>) -> Self {
        Self {
            args,
            urls,
            ready: false,
            last_ack: None,
        }
    }

    /// 위치 인자 (시작 시 한 번만 조회)
    pub fn startup_args(&self) -> &[String] {
        &self.args
    }

    /// `--url` 로 전달된 URI 목록
    pub fn deep_link_paths(&self) -> Option<&[String]> {
        if self.urls.is_empty() {
            None
        } else {
            Some(&self.urls)
        }
    }

    /// 입력 구독 연결 후 한 번만 발생. 이후 호출은 무시된다.
    pub fn signal_ready(&mut self) -> bool {
        if self.ready {
            return false;
        }
        self.ready = true;
        info!("host ready");
        true
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[cfg(test)]
    pub fn last_acknowledged(&self) -> Option<&Path> {
        self.last_ack.as_deref()
    }

    /// 수신 확인: 로그 + 터미널 제목
    pub fn acknowledge<W: Write>(&mut self, out: &mut W, path: &Path) -> Result<()> {
        self.record(path);
        execute!(out, SetTitle(title_for(path)))?;
        Ok(())
    }

    /// 터미널 없이 기록만 (테스트 및 비대화형 경로)
    pub fn record(&mut self, path: &Path) {
        info!(archive = %path.display(), "archive acknowledged");
        self.last_ack = Some(path.to_path_buf());
    }
}

pub fn title_for(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    format!("{} - {}", TITLE_PREFIX, name)
}
