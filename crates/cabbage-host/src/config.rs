//! Host configuration loaded from `cabbage.toml`.

use std::path::{Path, PathBuf};

use cabbage_sync::{JsonFormat, SyncOptions};
use serde::Deserialize;
use tracing::warn;

pub const CONFIG_FILES: &[&str] = &["cabbage.toml", ".cabbage.toml"];

/// Workspace configuration for the host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Root directory for the workspace.
    pub root: PathBuf,
    /// Config file path (if found).
    pub config_path: Option<PathBuf>,
    /// Region formatting and highlight settings.
    pub editor: EditorConfig,
    /// Linked external file settings.
    pub external: ExternalConfig,
    /// Edit-mode layout settings.
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    pub json_format: JsonFormat,
    pub highlight: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            json_format: JsonFormat::Compact,
            highlight: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalConfig {
    pub indent: usize,
    pub fallback_extension: String,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            fallback_extension: "json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Grid size for edit-mode moves; 0 disables snapping.
    pub snap_size: f64,
    /// Pixel distance within which two widgets share a row when reordering.
    pub row_tolerance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            snap_size: 2.0,
            row_tolerance: cabbage_sync::layout::ROW_TOLERANCE,
        }
    }
}

impl HostConfig {
    /// Load configuration for a workspace root.
    pub fn load(root: &Path) -> Self {
        let config_path = find_config_file(root);
        let Some(path) = config_path.clone() else {
            return HostConfig::base(root, None);
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            warn!("Failed to read cabbage config at {}", path.display());
            return HostConfig::base(root, config_path);
        };
        HostConfig::from_contents(root, config_path, &contents)
    }

    pub fn from_contents(root: &Path, config_path: Option<PathBuf>, contents: &str) -> Self {
        let mut config = HostConfig::base(root, config_path);
        let parsed: ConfigFile = match toml::from_str(contents) {
            Ok(parsed) => parsed,
            Err(err) => {
                if let Some(path) = &config.config_path {
                    warn!("Failed to parse cabbage config at {}: {err}", path.display());
                } else {
                    warn!("Failed to parse cabbage config: {err}");
                }
                return config;
            }
        };
        config.editor = parsed.editor.into();
        config.external = parsed.external.into();
        config.layout = parsed.layout.into();
        config
    }

    fn base(root: &Path, config_path: Option<PathBuf>) -> Self {
        HostConfig {
            root: root.to_path_buf(),
            config_path,
            editor: EditorConfig::default(),
            external: ExternalConfig::default(),
            layout: LayoutConfig::default(),
        }
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            format: self.editor.json_format,
            highlight: self.editor.highlight,
            external_indent: self.external.indent,
            fallback_extension: self.external.fallback_extension.clone(),
            row_tolerance: self.layout.row_tolerance,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    editor: EditorSection,
    #[serde(default)]
    external: ExternalSection,
    #[serde(default)]
    layout: LayoutSection,
}

#[derive(Debug, Default, Deserialize)]
struct EditorSection {
    json_format: Option<JsonFormat>,
    highlight: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalSection {
    indent: Option<usize>,
    fallback_extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutSection {
    snap_size: Option<f64>,
    row_tolerance: Option<f64>,
}

impl From<EditorSection> for EditorConfig {
    fn from(section: EditorSection) -> Self {
        let defaults = EditorConfig::default();
        EditorConfig {
            json_format: section.json_format.unwrap_or(defaults.json_format),
            highlight: section.highlight.unwrap_or(defaults.highlight),
        }
    }
}

impl From<ExternalSection> for ExternalConfig {
    fn from(section: ExternalSection) -> Self {
        let defaults = ExternalConfig::default();
        ExternalConfig {
            indent: section.indent.unwrap_or(defaults.indent),
            fallback_extension: section
                .fallback_extension
                .map(|extension| extension.trim_start_matches('.').to_string())
                .unwrap_or(defaults.fallback_extension),
        }
    }
}

impl From<LayoutSection> for LayoutConfig {
    fn from(section: LayoutSection) -> Self {
        let defaults = LayoutConfig::default();
        LayoutConfig {
            snap_size: section.snap_size.unwrap_or(defaults.snap_size).max(0.0),
            row_tolerance: section.row_tolerance.unwrap_or(defaults.row_tolerance),
        }
    }
}

pub(crate) fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}
