//! Language queries backed by the `languages.json` document loaded via the
//! store manager.
//!
//! Localization reference data ships as a JSON document with the exports and
//! does not require DuckDB at all.

use crate::connection::Connection;
use crate::error::Result;
use crate::models::Language;

// ---------------------------------------------------------------------------
// LanguageQuery
// ---------------------------------------------------------------------------

/// Query interface for platform languages backed by the cached JSON document.
pub struct LanguageQuery<'a> {
    conn: &'a Connection,
}

impl<'a> LanguageQuery<'a> {
    /// Create a new `LanguageQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// All platform languages.
    ///
    /// Loads `languages.json` and returns its `data` payload as typed models.
    pub fn all(&self) -> Result<Vec<Language>> {
        let value = self.conn.store.borrow_mut().load_json("languages")?;
        let languages: Vec<Language> = serde_json::from_value(extract_data(value))?;
        Ok(languages)
    }

    /// Look up one language by its platform code (e.g. `"en"`).
    pub fn get_by_code(&self, code: &str) -> Result<Option<Language>> {
        let languages = self.all()?;
        Ok(languages.into_iter().find(|l| l.code == code))
    }

    /// The platform default language, when the document marks one.
    pub fn default_language(&self) -> Result<Option<Language>> {
        let languages = self.all()?;
        Ok(languages.into_iter().find(|l| l.default))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extract the `"data"` field from a JSON wrapper, or return the value as-is
/// if there is no wrapper.
fn extract_data(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(ref map) => {
            if let Some(data) = map.get("data") {
                data.clone()
            } else {
                value
            }
        }
        _ => value,
    }
}
