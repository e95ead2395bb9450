//! # Application Settings
//!
//! A single settings object per repository. The four known keys are typed;
//! anything else the dashboard stored is kept verbatim in `extra` so a
//! snapshot round-trips without losing keys this crate does not know about.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Company-wide display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub company_name: String,
    /// ISO 4217 code used when rendering `Money`.
    pub currency: String,
    pub language: String,
    pub theme: String,
    /// Keys not covered by the typed fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            company_name: "Al Nady Pharmacies".to_string(),
            currency: "EGP".to_string(),
            language: "ar".to_string(),
            theme: "light".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

/// Partial settings update.
///
/// Entries in `extra` are merged key by key; a JSON `null` value removes
/// the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub company_name: Option<String>,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub theme: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl SettingsPatch {
    pub fn apply_to(self, settings: &mut Settings) {
        if let Some(company_name) = self.company_name {
            settings.company_name = company_name;
        }
        if let Some(currency) = self.currency {
            settings.currency = currency;
        }
        if let Some(language) = self.language {
            settings.language = language;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }

        for (key, value) in self.extra {
            if value.is_null() {
                settings.extra.remove(&key);
            } else {
                settings.extra.insert(key, value);
            }
        }
    }
}
