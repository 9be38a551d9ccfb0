//! Setup configuration produced by the interactive prompt flow.
//!
//! The prompt flow (a separate tool) validates the user's answers and writes
//! them as JSON; this module deserializes that file and derives the effective
//! auth method set after the email cascade.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One selectable sign-in method. Password is canonical and always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    Password,
    MagicLink,
    Otp,
    Google,
    Github,
    Apple,
}

impl AuthMethod {
    /// Identifier as it appears in the generated sources and config JSON.
    pub fn id(self) -> &'static str {
        match self {
            AuthMethod::Password => "password",
            AuthMethod::MagicLink => "magic-link",
            AuthMethod::Otp => "otp",
            AuthMethod::Google => "google",
            AuthMethod::Github => "github",
            AuthMethod::Apple => "apple",
        }
    }

    /// Methods that deliver their challenge over email and cannot survive
    /// without the email module.
    pub fn requires_email(self) -> bool {
        matches!(self, AuthMethod::MagicLink | AuthMethod::Otp)
    }

    pub fn is_social(self) -> bool {
        matches!(self, AuthMethod::Google | AuthMethod::Github | AuthMethod::Apple)
    }

    /// Environment variable prefix owned by a social provider.
    pub fn env_prefix(self) -> Option<&'static str> {
        match self {
            AuthMethod::Google => Some("GOOGLE_"),
            AuthMethod::Github => Some("GITHUB_"),
            AuthMethod::Apple => Some("APPLE_"),
            _ => None,
        }
    }
}

/// Which locales the generated project keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleMode {
    En,
    De,
    Both,
}

impl LocaleMode {
    /// The locale kept in single-locale mode.
    pub fn kept(self) -> &'static str {
        match self {
            LocaleMode::En | LocaleMode::Both => "en",
            LocaleMode::De => "de",
        }
    }

    /// The locale dropped in single-locale mode.
    pub fn dropped(self) -> Option<&'static str> {
        match self {
            LocaleMode::En => Some("de"),
            LocaleMode::De => Some("en"),
            LocaleMode::Both => None,
        }
    }
}

/// The user's feature selections for one scaffolding run.
///
/// Immutable once loaded; every derived value is recomputed per run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupConfig {
    pub project_name: String,
    pub auth_methods: Vec<AuthMethod>,
    pub payments: bool,
    pub locale: LocaleMode,
    pub dark_mode: bool,
    pub email: bool,
    pub blog: bool,
}

impl SetupConfig {
    /// Load and normalize a configuration file written by the prompt flow.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: SetupConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.normalize();
        Ok(config)
    }

    /// Deduplicate the auth method list and guarantee the canonical password
    /// method is present.
    fn normalize(&mut self) {
        let mut seen = Vec::new();
        for method in self.auth_methods.drain(..) {
            if !seen.contains(&method) {
                seen.push(method);
            }
        }
        if !seen.contains(&AuthMethod::Password) {
            seen.insert(0, AuthMethod::Password);
        }
        self.auth_methods = seen;
    }

    /// The selected auth methods after the email cascade: with email disabled,
    /// the email-delivered methods are forced out even if selected.
    pub fn effective_auth_methods(&self) -> Vec<AuthMethod> {
        self.auth_methods
            .iter()
            .copied()
            .filter(|m| self.email || !m.requires_email())
            .collect()
    }

    /// Social providers among the selected auth methods, in selection order.
    pub fn selected_providers(&self) -> Vec<AuthMethod> {
        self.auth_methods
            .iter()
            .copied()
            .filter(|m| m.is_social())
            .collect()
    }
}
