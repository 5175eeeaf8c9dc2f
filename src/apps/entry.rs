use serde::{Deserialize, Serialize};

/// Descriptor for a launchable application as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    /// Stable identifier, e.g. "org.gnome.Calls".
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub categories: Option<String>,
    /// Whether the app is known to fit a phone-sized screen.
    #[serde(default)]
    pub adaptive: bool,
}

impl AppEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            keywords: Vec::new(),
            categories: None,
            adaptive: false,
        }
    }

    /// Adaptivity hint with the user's `force-adaptive` override applied.
    pub fn is_adaptive(&self, force_adaptive: &[String]) -> bool {
        self.adaptive || force_adaptive.iter().any(|id| id == &self.id)
    }
}
