use serde::{Deserialize, Serialize};

/// Registry entry for a display theme. The visuals live in the frontend;
/// the backend only needs to know which ids exist.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Theme {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: ThemeCategory,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeCategory {
    #[default]
    Light,
    Dark,
    Colorful,
}

impl Theme {
    pub fn new(id: &str, name: &str, category: ThemeCategory) -> Self {
        Self { id: id.to_string(), name: name.to_string(), category }
    }
}
