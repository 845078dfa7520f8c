use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Language -- localization reference data shipped as a JSON document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    /// Platform language code, e.g. `"en"`, `"es"`.
    pub code: String,
    /// ISO 639-1 code the translations map to.
    pub iso: String,
    pub name: String,
    /// Whether this is the platform default language.
    #[serde(default)]
    pub default: bool,
}
