// Logging - 파일 기반 tracing 초기화
//
// TUI가 터미널을 점유하므로 로그는 캐시 디렉토리의 일자별 파일에만 기록한다.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;

use super::error::{ArcpeekError, Result};

/// 로그 디렉토리: <cache_dir>/arcpeek/logs
pub fn log_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join("arcpeek").join("logs"))
        .ok_or_else(|| ArcpeekError::Config("cache directory is unavailable".to_string()))
}

/// 설정 문자열을 레벨 필터로 변환 (잘못된 값은 info)
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::INFO)
}

/// 전역 subscriber 설치
pub fn init(level: &str) -> Result<()> {
    let logfile = tracing_appender::rolling::daily(log_dir()?, "log");
    tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_max_level(parse_level(level))
        .with_writer(logfile)
        .try_init()
        .map_err(|e| ArcpeekError::Config(format!("failed to install logger: {}", e)))
}
