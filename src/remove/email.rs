//! Transactional-email removal.
//!
//! The magic-link and one-time-code flows cannot survive without this
//! module; the orchestrator resolves that cascade before calling in here.

use crate::envfile;
use crate::events::EventLog;
use crate::fsops::{self, MutationOptions};
use crate::manifest;
use crate::modules::{self, Feature, ModuleMap};

use super::paths;
use std::path::Path;

const STEP: &str = "email";

pub fn remove_email(root: &Path, map: &ModuleMap, opts: MutationOptions, log: &mut EventLog) {
    let module = modules::resolve(map.get(Feature::Email), root);

    super::delete_mapped(&module, STEP, opts, log);

    manifest::prune_manifest(
        &super::manifest_path(root),
        &module.packages,
        &module.scripts,
        STEP,
        opts,
        log,
    );

    if let Some(section) = &module.env_section {
        envfile::remove_section(
            &super::env_path(root),
            section,
            &module.env_prefixes,
            STEP,
            opts,
            log,
        );
    }

    fsops::filter_lines(
        &root.join(paths::FEATURES_BARREL),
        |line| line.contains("./email"),
        false,
        "email barrel export",
        STEP,
        opts,
        log,
    );
}
