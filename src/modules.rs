//! Module map loading and resolution from modules.toml.
//!
//! The map is the single source of truth for what belongs to each feature:
//! every removal routine works from the same descriptor, so a feature's
//! filesystem footprint is defined exactly once.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One user-togglable capability of the generated starter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Blog,
    Payments,
    Theme,
    Locale,
    Email,
    MagicLink,
    Otp,
    Social,
}

impl Feature {
    /// All features, in the order the orchestrator considers them.
    pub fn all() -> [Feature; 8] {
        [
            Feature::Blog,
            Feature::Payments,
            Feature::Theme,
            Feature::Locale,
            Feature::Email,
            Feature::MagicLink,
            Feature::Otp,
            Feature::Social,
        ]
    }

    /// Key as it appears in modules.toml and in the event log.
    pub fn key(self) -> &'static str {
        match self {
            Feature::Blog => "blog",
            Feature::Payments => "payments",
            Feature::Theme => "theme",
            Feature::Locale => "locale",
            Feature::Email => "email",
            Feature::MagicLink => "magic-link",
            Feature::Otp => "otp",
            Feature::Social => "social",
        }
    }

    fn from_key(key: &str) -> Option<Feature> {
        Feature::all().into_iter().find(|f| f.key() == key)
    }
}

/// Everything one feature owns inside a generated project.
///
/// Statically defined in modules.toml; `resolve` rewrites the relative paths
/// against a concrete project root per invocation.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    pub name: String,
    pub requires: Vec<Feature>,
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub packages: Vec<String>,
    pub env_prefixes: Vec<String>,
    pub env_section: Option<String>,
    pub scripts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    name: String,
    #[serde(default)]
    requires: Vec<String>,
    directories: Vec<PathBuf>,
    files: Vec<PathBuf>,
    packages: Vec<String>,
    env_prefixes: Vec<String>,
    #[serde(default)]
    env_section: Option<String>,
    scripts: Vec<String>,
}

// Embed the module map directly in the binary at compile time
const MODULES_TOML: &str = include_str!("../modules.toml");

/// The full feature-to-filesystem map.
pub struct ModuleMap {
    modules: HashMap<Feature, ModuleDescriptor>,
}

impl ModuleMap {
    pub fn get(&self, feature: Feature) -> &ModuleDescriptor {
        // Every Feature variant has an entry; load() verifies this.
        &self.modules[&feature]
    }
}

/// Parse the embedded module map.
pub fn load_module_map() -> Result<ModuleMap> {
    let raw: HashMap<String, RawModule> =
        toml::from_str(MODULES_TOML).context("Failed to parse embedded modules.toml")?;

    let mut modules = HashMap::new();
    for (key, raw_module) in raw {
        let Some(feature) = Feature::from_key(&key) else {
            bail!("modules.toml names unknown feature '{}'", key);
        };

        let mut requires = Vec::new();
        for dep_key in &raw_module.requires {
            let Some(dep) = Feature::from_key(dep_key) else {
                bail!("feature '{}' requires unknown feature '{}'", key, dep_key);
            };
            requires.push(dep);
        }

        modules.insert(
            feature,
            ModuleDescriptor {
                name: raw_module.name,
                requires,
                directories: raw_module.directories,
                files: raw_module.files,
                packages: raw_module.packages,
                env_prefixes: raw_module.env_prefixes,
                env_section: raw_module.env_section,
                scripts: raw_module.scripts,
            },
        );
    }

    for feature in Feature::all() {
        if !modules.contains_key(&feature) {
            bail!("modules.toml is missing an entry for '{}'", feature.key());
        }
    }

    Ok(ModuleMap { modules })
}

/// Rewrite a descriptor's relative paths to absolute paths under
/// `project_root`. Package, env, and script name lists pass through
/// untouched. Pure; no filesystem access.
pub fn resolve(descriptor: &ModuleDescriptor, project_root: &Path) -> ModuleDescriptor {
    ModuleDescriptor {
        name: descriptor.name.clone(),
        requires: descriptor.requires.clone(),
        directories: descriptor
            .directories
            .iter()
            .map(|d| project_root.join(d))
            .collect(),
        files: descriptor.files.iter().map(|f| project_root.join(f)).collect(),
        packages: descriptor.packages.clone(),
        env_prefixes: descriptor.env_prefixes.clone(),
        env_section: descriptor.env_section.clone(),
        scripts: descriptor.scripts.clone(),
    }
}

/// Compute the transitive set of features forced out because a prerequisite
/// is disabled. `disabled` holds the features the user deselected; the result
/// adds every feature whose `requires` chain touches one of them.
pub fn forced_removals(map: &ModuleMap, disabled: &[Feature]) -> Vec<Feature> {
    let mut out: Vec<Feature> = Vec::new();

    // Fixpoint over the requires edges; the table is tiny, so a simple
    // repeat-until-stable pass beats a real topological sort.
    loop {
        let mut changed = false;
        for feature in Feature::all() {
            if out.contains(&feature) || disabled.contains(&feature) {
                continue;
            }
            let unavailable = |dep: &Feature| disabled.contains(dep) || out.contains(dep);
            if map.get(feature).requires.iter().any(unavailable) {
                out.push(feature);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    out
}
