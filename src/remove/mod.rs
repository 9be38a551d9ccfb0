//! Per-feature removal routines.
//!
//! Each routine is a fixed, linear list of steps executed top to bottom:
//! map-driven deletion first, then manifest and env pruning, then the
//! source rewrites that strip the feature out of files that stay behind.
//! Later steps never depend on earlier ones succeeding: a failed rewrite is
//! logged and the rest of the routine still runs.

pub mod auth;
pub mod blog;
pub mod email;
pub mod locale;
pub mod payments;
pub mod theme;

use crate::events::EventLog;
use crate::fsops::{self, MutationOptions};
use crate::modules::ModuleDescriptor;

use std::path::{Path, PathBuf};

/// Retained-source locations the routines rewrite in place. Everything a
/// routine deletes outright comes from modules.toml instead.
pub(crate) mod paths {
    use std::path::{Path, PathBuf};

    pub const MANIFEST: &str = "package.json";
    pub const ENV_EXAMPLE: &str = ".env.example";
    pub const NAVBAR: &str = "src/components/navbar.tsx";
    pub const APP_PROVIDERS: &str = "src/app/providers.tsx";
    pub const LANDING_PAGE: &str = "src/app/[locale]/page.tsx";
    pub const LEGAL_PAGES: &str = "src/app/[locale]/legal";
    pub const FEATURES_BARREL: &str = "src/features/index.ts";
    pub const AUTH_BARREL: &str = "src/features/auth/index.ts";
    pub const SIGN_IN_FORM: &str = "src/features/auth/sign-in-form.tsx";
    pub const AUTH_CONFIG: &str = "src/lib/auth.ts";
    pub const PROVIDER_CONFIGS: &str = "src/features/auth/social/providers.ts";
    pub const ROUTING: &str = "src/i18n/routing.ts";
    pub const EMAILS_DIR: &str = "emails";

    pub fn messages(root: &Path, locale: &str) -> PathBuf {
        root.join("messages").join(format!("{}.json", locale))
    }
}

/// Step 1 of every routine: delete everything the resolved descriptor names.
pub(crate) fn delete_mapped(
    module: &ModuleDescriptor,
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) {
    for dir in &module.directories {
        fsops::remove_dir(dir, step, opts, log);
    }
    for file in &module.files {
        fsops::remove_file(file, step, opts, log);
    }
}

pub(crate) fn manifest_path(root: &Path) -> PathBuf {
    root.join(paths::MANIFEST)
}

pub(crate) fn env_path(root: &Path) -> PathBuf {
    root.join(paths::ENV_EXAMPLE)
}
