use anyhow::Context;
use kgraph_canvas::{ForceParams, PanZoomController};
use kgraph_canvas::pan_zoom::ZOOM_STEP;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub theme: ThemeMode,
    pub ui_scale: f32,
    pub canvas: CanvasSettings,
    pub explorer: ForceParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeMode {
    #[serde(alias = "Light")]
    Latte,
    Frappe,
    Macchiato,
    #[default]
    #[serde(alias = "Dark")]
    Mocha,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 4] = [
        ThemeMode::Latte,
        ThemeMode::Frappe,
        ThemeMode::Macchiato,
        ThemeMode::Mocha,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ThemeMode::Latte => "Latte",
            ThemeMode::Frappe => "Frappé",
            ThemeMode::Macchiato => "Macchiato",
            ThemeMode::Mocha => "Mocha",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub show_grid: bool,
    pub zoom_step: f32,
    pub edge_hit_tolerance: f32,
    pub show_edge_labels: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            zoom_step: ZOOM_STEP,
            edge_hit_tolerance: 8.0,
            show_edge_labels: true,
        }
    }
}

impl CanvasSettings {
    pub fn pan_zoom(&self) -> PanZoomController {
        PanZoomController {
            zoom_step: self.zoom_step,
            ..PanZoomController::editor()
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Mocha,
            ui_scale: 1.0,
            canvas: CanvasSettings::default(),
            explorer: ForceParams::default(),
        }
    }
}

impl AppSettings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kgraph").join("settings.json"))
    }

    /// Load from the user config directory; any failure falls back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        tracing::info!("Loading settings from {:?}", path);
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => {
                tracing::info!("Settings loaded successfully");
                settings
            }
            Err(e) => {
                tracing::error!("Failed to load settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            tracing::error!("Failed to save settings: {:#}", e);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Settings saved to {:?}", path);
        Ok(())
    }
}
