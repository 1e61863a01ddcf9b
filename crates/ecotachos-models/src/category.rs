//! Waste categories and their display metadata.

use serde::{Deserialize, Serialize};

/// Fixed three-way waste classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    /// Food scraps, peels
    Organico,
    /// Plastic, cardboard, glass
    Reciclable,
    /// Everything else. Also the fallback for unknown keys.
    #[default]
    Inorganico,
}

impl WasteCategory {
    /// All categories in display order.
    pub const ALL: [WasteCategory; 3] = [
        WasteCategory::Organico,
        WasteCategory::Reciclable,
        WasteCategory::Inorganico,
    ];

    /// Wire key used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Organico => "organico",
            WasteCategory::Reciclable => "reciclable",
            WasteCategory::Inorganico => "inorganico",
        }
    }

    /// Parse a wire key, case-insensitively.
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "organico" | "orgánico" => Some(WasteCategory::Organico),
            "reciclable" => Some(WasteCategory::Reciclable),
            "inorganico" | "inorgánico" => Some(WasteCategory::Inorganico),
            _ => None,
        }
    }

    /// Lookup with fallback: unknown keys map to [`WasteCategory::Inorganico`].
    pub fn from_key(key: &str) -> Self {
        Self::parse(key).unwrap_or_default()
    }

    /// Static display metadata for this category.
    pub fn info(&self) -> &'static CategoryInfo {
        match self {
            WasteCategory::Organico => &ORGANICO,
            WasteCategory::Reciclable => &RECICLABLE,
            WasteCategory::Inorganico => &INORGANICO,
        }
    }
}

impl std::fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WasteCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown waste category: {}", s))
    }
}

/// Display metadata for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub bg_color: &'static str,
    pub description: &'static str,
    pub examples: &'static str,
}

static ORGANICO: CategoryInfo = CategoryInfo {
    label: "ORGÁNICO",
    icon: "O",
    color: "#10b981",
    bg_color: "#d1fae5",
    description: "Residuo orgánico",
    examples: "Restos de comida, cáscaras",
};

static RECICLABLE: CategoryInfo = CategoryInfo {
    label: "RECICLABLE",
    icon: "R",
    color: "#3b82f6",
    bg_color: "#dbeafe",
    description: "Residuo reciclable",
    examples: "Plástico, cartón, vidrio",
};

static INORGANICO: CategoryInfo = CategoryInfo {
    label: "INORGÁNICO",
    icon: "I",
    color: "#6b7280",
    bg_color: "#f3f4f6",
    description: "Residuo no reciclable",
    examples: "Desechos varios",
};

/// Category metadata as sent by the inference service.
///
/// Every field is optional; the service may use either the English or the
/// Spanish key names for description and examples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteCategoryInfo {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "bgColor", alias = "bg_color")]
    pub bg_color: Option<String>,
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(default, alias = "ejemplos")]
    pub examples: Option<String>,
}

/// Resolved display metadata, owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDisplay {
    pub label: String,
    pub icon: String,
    pub color: String,
    pub bg_color: String,
    pub description: String,
    pub examples: String,
}

impl From<&CategoryInfo> for CategoryDisplay {
    fn from(info: &CategoryInfo) -> Self {
        Self {
            label: info.label.to_string(),
            icon: info.icon.to_string(),
            color: info.color.to_string(),
            bg_color: info.bg_color.to_string(),
            description: info.description.to_string(),
            examples: info.examples.to_string(),
        }
    }
}

impl CategoryDisplay {
    /// Overlay remote metadata on top of the static table entry.
    pub fn resolve(category: WasteCategory, remote: Option<&RemoteCategoryInfo>) -> Self {
        let base = category.info();
        let Some(remote) = remote else {
            return base.into();
        };

        Self {
            label: remote.label.clone().unwrap_or_else(|| base.label.to_string()),
            icon: remote.icon.clone().unwrap_or_else(|| base.icon.to_string()),
            color: remote.color.clone().unwrap_or_else(|| base.color.to_string()),
            bg_color: remote.bg_color.clone().unwrap_or_else(|| base.bg_color.to_string()),
            description: remote
                .description
                .clone()
                .unwrap_or_else(|| base.description.to_string()),
            examples: remote.examples.clone().unwrap_or_else(|| base.examples.to_string()),
        }
    }
}
