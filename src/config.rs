use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Write the default configuration template to config.toml
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");
        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }
        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub chart: ChartConfig,
    pub report: ReportConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileLoadingConfig {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Rows considered when preparing a chart.
    pub row_limit: usize,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// "dark" or "light"; pick the base palette. Colors below override it.
    pub color_mode: String,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_inverse: String,
    pub table_header: String,
    pub table_border: String,
    pub table_selected: String,
    pub modal_border: String,
    pub modal_border_error: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.3".to_string(),
            file_loading: FileLoadingConfig::default(),
            chart: ChartConfig::default(),
            report: ReportConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            row_limit: 10_000,
            width: 640,
            height: 480,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Data Report".to_string(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "dark".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self::dark()
    }
}

impl ColorConfig {
    pub fn dark() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_inverse: "black".to_string(),
            table_header: "white".to_string(),
            table_border: "cyan".to_string(),
            table_selected: "reversed".to_string(),
            modal_border: "cyan".to_string(),
            modal_border_error: "red".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            primary: "blue".to_string(),
            secondary: "magenta".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            warning: "indexed(130)".to_string(),
            dimmed: "gray".to_string(),
            controls_bg: "indexed(253)".to_string(),
            text_primary: "black".to_string(),
            text_inverse: "white".to_string(),
            table_header: "black".to_string(),
            table_border: "blue".to_string(),
            table_selected: "reversed".to_string(),
            modal_border: "blue".to_string(),
            modal_border_error: "red".to_string(),
        }
    }

    /// Role name / color string pairs, in a stable order.
    fn entries(&self) -> [(&'static str, &str); 14] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("success", &self.success),
            ("error", &self.error),
            ("warning", &self.warning),
            ("dimmed", &self.dimmed),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_inverse", &self.text_inverse),
            ("table_header", &self.table_header),
            ("table_border", &self.table_border),
            ("table_selected", &self.table_selected),
            ("modal_border", &self.modal_border),
            ("modal_border_error", &self.modal_border_error),
        ]
    }

    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        let pairs = [
            (&mut self.primary, other.primary, default.primary),
            (&mut self.secondary, other.secondary, default.secondary),
            (&mut self.success, other.success, default.success),
            (&mut self.error, other.error, default.error),
            (&mut self.warning, other.warning, default.warning),
            (&mut self.dimmed, other.dimmed, default.dimmed),
            (&mut self.controls_bg, other.controls_bg, default.controls_bg),
            (
                &mut self.text_primary,
                other.text_primary,
                default.text_primary,
            ),
            (
                &mut self.text_inverse,
                other.text_inverse,
                default.text_inverse,
            ),
            (
                &mut self.table_header,
                other.table_header,
                default.table_header,
            ),
            (
                &mut self.table_border,
                other.table_border,
                default.table_border,
            ),
            (
                &mut self.table_selected,
                other.table_selected,
                default.table_selected,
            ),
            (
                &mut self.modal_border,
                other.modal_border,
                default.modal_border,
            ),
            (
                &mut self.modal_border_error,
                other.modal_border_error,
                default.modal_border_error,
            ),
        ];
        for (slot, other_value, default_value) in pairs {
            if other_value != default_value {
                *slot = other_value;
            }
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let mut config = AppConfig::default();
        if let Ok(user_config) = Self::load_user_config(app_name) {
            config.merge(user_config);
        }
        config.validate()?;
        Ok(config)
    }

    fn load_user_config(app_name: &str) -> Result<AppConfig> {
        let config_manager = ConfigManager::new(app_name)?;
        let config_path = config_manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }
        self.file_loading.merge(other.file_loading);
        self.chart.merge(other.chart);
        self.report.merge(other.report);
        self.theme.merge(other.theme);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.3") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.3.x",
                self.version
            ));
        }
        if self.chart.row_limit == 0 {
            return Err(eyre!("chart.row_limit must be greater than 0"));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(eyre!("chart dimensions must be greater than 0"));
        }
        match self.theme.color_mode.as_str() {
            "light" | "dark" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light' or 'dark'",
                    self.theme.color_mode
                ))
            }
        }
        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;
        Ok(())
    }
}

impl FileLoadingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.has_header.is_some() {
            self.has_header = other.has_header;
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.row_limit != default.row_limit {
            self.row_limit = other.row_limit;
        }
        if other.width != default.width {
            self.width = other.width;
        }
        if other.height != default.height {
            self.height = other.height;
        }
    }
}

impl ReportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ReportConfig::default();
        if other.title != default.title {
            self.title = other.title;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);
        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Create a ColorParser with fixed capabilities (primarily for testing)
    pub fn with_capabilities(supports_true_color: bool, supports_256: bool) -> Self {
        Self {
            supports_true_color,
            supports_256,
            no_color: false,
        }
    }

    /// Parse a color string (hex, indexed, or named) to a terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        let trimmed = s.trim();

        // Hex format: "#rrggbb"
        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            if self.no_color {
                return Ok(Color::Reset);
            }
            return Ok(self.convert_rgb(r, g, b));
        }

        // Indexed colors: "indexed(236)" for the 256-color palette
        if trimmed.to_lowercase().starts_with("indexed(") && trimmed.ends_with(')') {
            let num_str = &trimmed[8..trimmed.len() - 1];
            let num = num_str.parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            if self.no_color {
                return Ok(Color::Reset);
            }
            return Ok(Color::Indexed(num));
        }

        let lower = trimmed.to_lowercase();
        let color = match lower.as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "bright_black" => Color::Indexed(8),
            "bright_red" => Color::Indexed(9),
            "bright_green" => Color::Indexed(10),
            "bright_yellow" => Color::Indexed(11),
            "bright_blue" => Color::Indexed(12),
            "bright_magenta" => Color::Indexed(13),
            "bright_cyan" => Color::Indexed(14),
            "bright_white" => Color::Indexed(15),
            "gray" | "grey" | "dark_gray" | "dark_grey" => Color::Indexed(8),
            "light_gray" | "light_grey" => Color::Indexed(7),
            // "reversed" is handled in rendering; both pass through as Reset
            "reset" | "reversed" => Color::Reset,
            _ => {
                return Err(eyre!(
                    "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                     bright variants (bright_red, etc.), indexed(n), or hex colors (#ff0000)",
                    trimmed
                ))
            }
        };
        if self.no_color {
            return Ok(Color::Reset);
        }
        Ok(color)
    }

    fn convert_rgb(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }
    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;
    Ok((r, g, b))
}

/// Nearest xterm 256-color palette index for an RGB value.
fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // grayscale ramp (232-255)
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        }
        return 232 + ((gray - 8) * 24 / 240) as u8;
    }
    // 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;
    16 + 36 * r_idx + 6 * g_idx + b_idx
}

fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }
    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Build a theme for `mode`: the matching base palette with any user
    /// overrides from `config` applied on top.
    pub fn from_config(config: &ThemeConfig, mode: &str) -> Result<Self> {
        let parser = ColorParser::new();
        let mut base = match mode {
            "light" => ColorConfig::light(),
            _ => ColorConfig::dark(),
        };
        base.merge(config.colors.clone());

        let mut colors = HashMap::new();
        for (name, value) in base.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn merge_prefers_user_values() {
        let mut config = AppConfig::default();
        let mut user = AppConfig::default();
        user.chart.row_limit = 500;
        user.theme.color_mode = "light".to_string();
        user.theme.colors.primary = "#336699".to_string();
        config.merge(user);
        assert_eq!(config.chart.row_limit, 500);
        assert_eq!(config.theme.color_mode, "light");
        assert_eq!(config.theme.colors.primary, "#336699");
        // untouched fields keep their defaults
        assert_eq!(config.chart.width, 640);
    }

    #[test]
    fn invalid_color_mode_rejected() {
        let mut config = AppConfig::default();
        config.theme.color_mode = "solarized".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_hex_components() {
        assert_eq!(parse_hex("#336699").unwrap(), (0x33, 0x66, 0x99));
        assert!(parse_hex("#33669").is_err());
        assert!(parse_hex("336699").is_err());
    }

    #[test]
    fn parser_handles_hex_indexed_and_named() {
        let parser = ColorParser::with_capabilities(true, true);
        assert_eq!(parser.parse("#ff0000").unwrap(), Color::Rgb(255, 0, 0));
        assert_eq!(parser.parse("indexed(236)").unwrap(), Color::Indexed(236));
        assert_eq!(parser.parse("CYAN").unwrap(), Color::Cyan);
        assert!(parser.parse("mauve-ish").is_err());
    }

    #[test]
    fn hex_downgrades_without_true_color() {
        let parser = ColorParser::with_capabilities(false, true);
        assert!(matches!(
            parser.parse("#ff0000").unwrap(),
            Color::Indexed(_)
        ));
        let parser = ColorParser::with_capabilities(false, false);
        assert_eq!(parser.parse("#ff0000").unwrap(), Color::Red);
    }

    #[test]
    fn light_theme_swaps_base_palette() {
        let config = ThemeConfig::default();
        let dark = Theme::from_config(&config, "dark").unwrap();
        let light = Theme::from_config(&config, "light").unwrap();
        // same role resolves differently per mode unless NO_COLOR is set
        if std::env::var("NO_COLOR").is_err() {
            assert_ne!(dark.get("primary"), light.get("primary"));
        }
        assert_eq!(dark.get("unknown_role"), Color::Reset);
    }

    #[test]
    fn write_default_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        let path = manager.write_default_config(false).unwrap();
        assert!(path.exists());
        assert!(manager.write_default_config(false).is_err());
        manager.write_default_config(true).unwrap();
    }

    #[test]
    fn default_template_parses_and_validates() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        let mut merged = AppConfig::default();
        merged.merge(config);
        merged.validate().unwrap();
    }
}
