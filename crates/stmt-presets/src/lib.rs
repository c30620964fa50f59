//! Built-in parser settings for known bank statement layouts.
//!
//! Each preset is a TOML document compiled into the binary, validated once
//! on first access, and exposed read-only. Callers typically try every
//! preset (plus any per-account settings) through the multi-format parse.

use std::sync::LazyLock;

use thiserror::Error;

use stmt_model::{AccountSettings, ModelError};

#[derive(Debug, Error)]
pub enum PresetError {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A named, ready-to-use settings document for one bank layout.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Preset {
    pub label: String,
    #[serde(flatten)]
    pub settings: AccountSettings,
}

const PRESET_DOCUMENTS: &[&str] = &[
    include_str!("../presets/aval_online.toml"),
    include_str!("../presets/aval_business.toml"),
    include_str!("../presets/privat24.toml"),
];

static PRESETS: LazyLock<Vec<Preset>> = LazyLock::new(|| {
    PRESET_DOCUMENTS
        .iter()
        .map(|document| load_preset(document).expect("invalid built-in preset"))
        .collect()
});

fn load_preset(document: &str) -> Result<Preset, PresetError> {
    let mut preset: Preset = toml::from_str(document)?;
    if let Some(settings) = preset.settings.parser_settings.take() {
        preset.settings.parser_settings = Some(settings.validated()?);
    }
    Ok(preset)
}

/// All built-in presets, validated.
pub fn presets() -> &'static [Preset] {
    &PRESETS
}

/// Look up a preset by its label.
pub fn preset(label: &str) -> Option<&'static Preset> {
    presets().iter().find(|preset| preset.label == label)
}
