use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::apps::pipeline::AppFilterMode;
use crate::common::collections::{HashMap, HashSet};

/// Commands a key chord can be bound to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShellCommand {
    ToggleOrientationLock,
    ToggleFilterAdaptive,
    ClearSearch,
    ResetCarousel,
}

pub fn data_dir() -> PathBuf { dirs::home_dir().unwrap().join(".slate") }
pub fn settings_file() -> PathBuf { dirs::home_dir().unwrap().join(".slate.toml") }

/// The persisted shell settings.
///
/// This is both the on-disk TOML shape and the in-memory form; the watcher
/// actor reloads it on external edits and the shell writes it back when a
/// setting is changed from inside (the orientation-lock toggle).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub shell: ShellSettings,
    #[serde(default)]
    pub apps: AppSettings,
    /// Key chords mapped to shell commands,
    /// e.g. `"Super + O" = "toggle_orientation_lock"`.
    #[serde(default)]
    pub keys: HashMap<String, ShellCommand>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ShellSettings {
    /// Pin the screen to its current transform regardless of sensor input.
    #[serde(default)]
    pub orientation_lock: bool,
    /// How long a burst of search input may idle before the filter runs.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AppSettings {
    /// Items per carousel page.
    #[serde(default = "default_apps_per_page")]
    pub apps_per_page: usize,
    /// Launcher ids shown on the favorites pages, in display order.
    #[serde(default)]
    pub favorites: Vec<String>,
    /// Apps treated as adaptive regardless of their own hint.
    #[serde(default)]
    pub force_adaptive: Vec<String>,
    /// Filters the shell may offer. Currently only "adaptive".
    #[serde(default)]
    pub app_filter_mode: Vec<FilterModeFlag>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterModeFlag {
    Adaptive,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            orientation_lock: false,
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            apps_per_page: default_apps_per_page(),
            favorites: Vec::new(),
            force_adaptive: Vec::new(),
            app_filter_mode: Vec::new(),
        }
    }
}

impl AppSettings {
    pub fn filter_mode(&self) -> AppFilterMode {
        let mut mode = AppFilterMode::empty();
        for flag in &self.app_filter_mode {
            match flag {
                FilterModeFlag::Adaptive => mode |= AppFilterMode::ADAPTIVE,
            }
        }
        mode
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.apps_per_page == 0 {
            issues.push("apps_per_page must be at least 1".to_string());
        }

        let mut seen = HashSet::default();
        for (index, id) in self.favorites.iter().enumerate() {
            if id.is_empty() {
                issues.push(format!("favorites entry {} is empty", index));
            } else if !seen.insert(id) {
                issues.push(format!("duplicate favorite '{}' at entry {}", id, index));
            }
        }

        for (index, id) in self.force_adaptive.iter().enumerate() {
            if id.is_empty() {
                issues.push(format!("force_adaptive entry {} is empty", index));
            }
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.apps_per_page == 0 {
            self.apps_per_page = default_apps_per_page();
            fixes += 1;
        }

        let before = self.favorites.len();
        let mut seen = HashSet::default();
        self.favorites.retain(|id| !id.is_empty() && seen.insert(id.clone()));
        fixes += before - self.favorites.len();

        let before = self.force_adaptive.len();
        self.force_adaptive.retain(|id| !id.is_empty());
        fixes += before - self.force_adaptive.len();

        fixes
    }
}

impl ShellSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.search_debounce_ms == 0 {
            issues.push("search_debounce_ms must be positive".to_string());
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.search_debounce_ms == 0 {
            self.search_debounce_ms = default_search_debounce_ms();
            fixes += 1;
        }

        fixes
    }
}

fn default_apps_per_page() -> usize { 24 }

fn default_search_debounce_ms() -> u64 { 350 }

impl Settings {
    pub fn read(path: &Path) -> anyhow::Result<Settings> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn default() -> Settings { Self::parse(include_str!("../../slate.default.toml")).unwrap() }

    pub fn parse(buf: &str) -> anyhow::Result<Settings> {
        let settings: Settings = toml::from_str(buf)?;
        Ok(settings)
    }

    /// Save the current settings to a file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the settings and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.shell.validate());
        issues.extend(self.apps.validate());

        for chord in self.keys.keys() {
            if chord.trim().is_empty() {
                issues.push("empty key chord in [keys]".to_string());
            }
        }

        issues
    }

    /// Attempts to fix settings values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        fixes += self.shell.auto_fix_values();
        fixes += self.apps.auto_fix_values();

        let before = self.keys.len();
        self.keys.retain(|chord, _| !chord.trim().is_empty());
        fixes += before - self.keys.len();

        fixes
    }
}
