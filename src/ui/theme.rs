use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 색상 테마
///
/// 미리 정의된 테마(dark, light, high_contrast) 외에
/// `<config_dir>/arcpeek/themes/*.toml` 의 사용자 테마를 불러올 수 있습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    // 배경/전경
    pub bg_primary: ColorDef,
    pub fg_primary: ColorDef,

    // 트리 패널
    pub panel_border: ColorDef,
    pub panel_bg: ColorDef,
    pub column_header: ColorDef,
    pub row_selected_fg: ColorDef,
    pub row_selected_bg: ColorDef,
    pub directory: ColorDef,
    pub file: ColorDef,
    pub muted: ColorDef,

    // 하단 바
    pub status_bar_bg: ColorDef,
    pub status_bar_fg: ColorDef,
    pub command_bar_bg: ColorDef,
    pub command_bar_fg: ColorDef,

    // 대화상자
    pub dialog_bg: ColorDef,
    pub dialog_border: ColorDef,

    // 강조
    pub accent: ColorDef,
    pub warning: ColorDef,
    pub error: ColorDef,
    pub success: ColorDef,
}

/// Hex 문자열("#1e1e1e") 또는 색상 이름("Red")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorDef {
    Hex(String),
    Named(String),
}

impl ColorDef {
    pub fn to_color(&self) -> Color {
        match self {
            ColorDef::Hex(hex) => parse_hex_color(hex),
            ColorDef::Named(name) => parse_named_color(name),
        }
    }
}

impl From<&str> for ColorDef {
    fn from(s: &str) -> Self {
        if s.starts_with('#') {
            ColorDef::Hex(s.to_string())
        } else {
            ColorDef::Named(s.to_string())
        }
    }
}

fn parse_hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .unwrap_or(0)
    };

    if hex.len() == 6 {
        Color::Rgb(channel(0..2), channel(2..4), channel(4..6))
    } else {
        Color::Reset
    }
}

fn parse_named_color(name: &str) -> Color {
    match name.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        _ => Color::Reset,
    }
}

impl Theme {
    /// Dark 테마 (기본)
    pub fn dark() -> Self {
        Theme {
            bg_primary: "#1e1e1e".into(),
            fg_primary: "#d4d4d4".into(),

            panel_border: "#0078d4".into(),
            panel_bg: "#1e1e1e".into(),
            column_header: "#9cdcfe".into(),
            row_selected_fg: "#ffffff".into(),
            row_selected_bg: "#0078d4".into(),
            directory: "#569cd6".into(),
            file: "#d4d4d4".into(),
            muted: "#808080".into(),

            status_bar_bg: "#007acc".into(),
            status_bar_fg: "#ffffff".into(),
            command_bar_bg: "#2d2d30".into(),
            command_bar_fg: "#cccccc".into(),

            dialog_bg: "#252526".into(),
            dialog_border: "#0078d4".into(),

            accent: "#0078d4".into(),
            warning: "#ffa500".into(),
            error: "#f44747".into(),
            success: "#4ec9b0".into(),
        }
    }

    pub fn light() -> Self {
        Theme {
            bg_primary: "#ffffff".into(),
            fg_primary: "#1e1e1e".into(),

            panel_border: "#0078d4".into(),
            panel_bg: "#ffffff".into(),
            column_header: "#005a9e".into(),
            row_selected_fg: "#000000".into(),
            row_selected_bg: "#add6ff".into(),
            directory: "#0066cc".into(),
            file: "#1e1e1e".into(),
            muted: "#6e6e6e".into(),

            status_bar_bg: "#0078d4".into(),
            status_bar_fg: "#ffffff".into(),
            command_bar_bg: "#f3f3f3".into(),
            command_bar_fg: "#1e1e1e".into(),

            dialog_bg: "#f3f3f3".into(),
            dialog_border: "#0078d4".into(),

            accent: "#0078d4".into(),
            warning: "#ff8c00".into(),
            error: "#e51400".into(),
            success: "#107c10".into(),
        }
    }

    pub fn high_contrast() -> Self {
        Theme {
            bg_primary: "#000000".into(),
            fg_primary: "#ffffff".into(),

            panel_border: "#00ff00".into(),
            panel_bg: "#000000".into(),
            column_header: "#ffff00".into(),
            row_selected_fg: "#000000".into(),
            row_selected_bg: "#00ff00".into(),
            directory: "#00ffff".into(),
            file: "#ffffff".into(),
            muted: "#c0c0c0".into(),

            status_bar_bg: "#000000".into(),
            status_bar_fg: "#00ff00".into(),
            command_bar_bg: "#000000".into(),
            command_bar_fg: "#ffffff".into(),

            dialog_bg: "#000000".into(),
            dialog_border: "#ffffff".into(),

            accent: "#00ff00".into(),
            warning: "#ffff00".into(),
            error: "#ff0000".into(),
            success: "#00ff00".into(),
        }
    }

    /// TOML 파일에서 테마 로드
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let theme: Theme = toml::from_str(&content)?;
        Ok(theme)
    }
}

/// 현재 테마와 이름을 함께 관리
pub struct ThemeManager {
    current: usize,
    available_themes: Vec<(String, Theme)>,
}

impl ThemeManager {
    pub fn new() -> Self {
        Self {
            current: 0,
            available_themes: vec![
                ("dark".to_string(), Theme::dark()),
                ("light".to_string(), Theme::light()),
                ("high_contrast".to_string(), Theme::high_contrast()),
            ],
        }
    }

    pub fn current(&self) -> &Theme {
        &self.available_themes[self.current].1
    }

    pub fn current_name(&self) -> &str {
        &self.available_themes[self.current].0
    }

    pub fn switch_theme(&mut self, name: &str) -> Result<(), String> {
        match self.available_themes.iter().position(|(n, _)| n == name) {
            Some(index) => {
                self.current = index;
                Ok(())
            }
            None => Err(format!("Unknown theme: {}", name)),
        }
    }

    /// 다음 테마로 순환
    pub fn cycle_theme(&mut self) {
        self.current = (self.current + 1) % self.available_themes.len();
    }

    pub fn available_themes(&self) -> Vec<String> {
        self.available_themes
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// 같은 이름이 있으면 교체
    pub fn add_theme(&mut self, name: String, theme: Theme) {
        match self.available_themes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = theme,
            None => self.available_themes.push((name, theme)),
        }
    }

    pub fn themes_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("arcpeek").join("themes"))
    }

    /// 디렉토리의 *.toml 테마를 모두 추가하고 추가된 개수를 반환
    pub fn load_themes_from_dir(&mut self, themes_dir: &Path) -> Result<usize, anyhow::Error> {
        if !themes_dir.exists() {
            return Ok(0);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(themes_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("toml"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let theme = match Theme::from_file(&path) {
                Ok(theme) => theme,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping invalid theme");
                    continue;
                }
            };
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("custom")
                .to_string();
            self.add_theme(name, theme);
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn load_themes_from_config_dir(&mut self) -> Result<usize, anyhow::Error> {
        match Self::themes_dir() {
            Some(dir) => self.load_themes_from_dir(&dir),
            None => Ok(0),
        }
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}
