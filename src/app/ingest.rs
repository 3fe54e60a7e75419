// 경로 수집 어댑터 - CLI, 딥링크, 드래그 앤 드롭, 열기 프롬프트
//
// 모든 어댑터는 normalize_source_path 를 거쳐 하나의 경로만 내보낸다.

use std::fmt;
use std::path::PathBuf;

use tracing::warn;

const FILE_SCHEME: &str = "file://";
const LOCALHOST: &str = "localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestSource {
    CommandLine,
    DeepLink,
    DragDrop,
    OpenPrompt,
}

impl fmt::Display for IngestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IngestSource::CommandLine => "cli",
            IngestSource::DeepLink => "deep-link",
            IngestSource::DragDrop => "drop",
            IngestSource::OpenPrompt => "open-prompt",
        };
        f.write_str(label)
    }
}

/// `file://` (와 뒤따르는 localhost) 제거 후 UTF-8 바이트 단위 퍼센트 디코딩
pub fn normalize_source_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    let stripped = match strip_prefix_ignore_case(trimmed, FILE_SCHEME) {
        Some(rest) => strip_prefix_ignore_case(rest, LOCALHOST)
            .filter(|r| r.starts_with('/'))
            .unwrap_or(rest),
        None => trimmed,
    };
    let decoded = percent_decode(stripped);
    if decoded.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(decoded))
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(byte) = hex {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// 첫 번째 위치 인자
pub fn cli_adapter(args: &[String]) -> Option<PathBuf> {
    args.first().and_then(|arg| normalize_source_path(arg))
}

/// OS 가 넘긴 첫 번째 URI
pub fn deep_link_adapter(urls: Option<&[String]>) -> Option<PathBuf> {
    urls?.first().and_then(|url| normalize_source_path(url))
}

/// 정확히 하나가 떨어졌을 때만 경로를 낸다
pub fn drag_drop_adapter(items: &[String]) -> Option<PathBuf> {
    match items {
        [single] => normalize_source_path(single),
        [] => None,
        many => {
            warn!(count = many.len(), "ignoring drop of multiple items");
            None
        }
    }
}

/// 붙여넣기 텍스트를 드롭 항목으로 분리 (따옴표가 깨지면 줄 단위)
pub fn parse_dropped_paste(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    match shlex::split(text) {
        Some(items) => items.into_iter().filter(|s| !s.is_empty()).collect(),
        None => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
    }
}
