use serde::{Deserialize, Serialize};

/// Configuration from restack.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    /// Horizontal distance (in host units, usually pixels) per depth level.
    /// Must match the indentation used by the row renderer.
    #[serde(default = "default_indent_width")]
    pub indent_width: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        DragConfig {
            indent_width: default_indent_width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Honor `collapsed` flags when building the visible view.
    /// When false every node is shown (the dragged item's subtree is still hidden).
    #[serde(default = "default_true")]
    pub collapsible: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig { collapsible: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive, overridden by `RESTACK_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_indent_width() -> f64 {
    20.0
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}
