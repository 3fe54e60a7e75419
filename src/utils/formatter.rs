// 표시용 문자열 변환: 바이트 크기, 엔트리 시각, 개수 라벨

use chrono::NaiveDateTime;

const SIZE_UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// 바이트 수를 1024 단위로 줄여 표시 ("0 B", "1.5 KB", "2.0 GB")
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < SIZE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, SIZE_UNITS[unit])
}

/// 엔트리 수정 시각. 형식은 "YYYY-MM-DD HH:MM" 고정, 없으면 "-"
pub fn format_modified(modified: Option<&NaiveDateTime>) -> String {
    modified.map_or_else(
        || String::from("-"),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// "1 file", "3 files"
pub fn count_noun(count: usize, one: &str, many: &str) -> String {
    let noun = if count == 1 { one } else { many };
    format!("{count} {noun}")
}
