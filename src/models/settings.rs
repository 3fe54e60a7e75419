// Settings - ~/.arcpeek/settings.toml 영속 설정

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_VERSION: u32 = 1;
pub const SETTINGS_ENV: &str = "ARCPEEK_SETTINGS_FILE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub version: u32,
    /// dark | light | high_contrast | 사용자 테마 이름
    pub theme: String,
    /// 압축 해제 디스패치 전 지연 (바쁨 표시가 먼저 그려지도록)
    pub extract_delay_ms: u64,
    /// 압축 해제 대상 기본값 (없으면 아카이브 옆 디렉토리)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_destination: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            theme: "dark".to_string(),
            extract_delay_ms: 10,
            default_destination: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// 설정 파일 위치: 환경변수 override 우선, 없으면 ~/.arcpeek/settings.toml
    pub fn store_path() -> Option<PathBuf> {
        if let Ok(custom) = env::var(SETTINGS_ENV) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        dirs::home_dir().map(|home| home.join(".arcpeek").join("settings.toml"))
    }

    pub fn encode(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// 버전이 다르거나 테마가 비어 있으면 무시
    pub fn decode(data: &str) -> Option<Self> {
        let parsed: Settings = toml::from_str(data).ok()?;
        if parsed.version != SETTINGS_VERSION {
            return None;
        }
        if parsed.theme.trim().is_empty() {
            return None;
        }
        Some(parsed)
    }

    /// 파일에서 로드, 실패 시 기본값
    pub fn load_from(path: Option<&Path>) -> Self {
        path.and_then(|p| fs::read_to_string(p).ok())
            .and_then(|data| Self::decode(&data))
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = self
            .encode()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, data)
    }
}
