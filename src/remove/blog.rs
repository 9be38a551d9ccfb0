//! Blog removal.

use crate::events::EventLog;
use crate::fsops::{self, MutationOptions};
use crate::manifest;
use crate::modules::{self, Feature, ModuleMap};
use crate::transforms;

use super::paths;
use std::path::Path;

const STEP: &str = "blog";

pub fn remove_blog(root: &Path, map: &ModuleMap, opts: MutationOptions, log: &mut EventLog) {
    let module = modules::resolve(map.get(Feature::Blog), root);

    super::delete_mapped(&module, STEP, opts, log);

    manifest::prune_manifest(
        &super::manifest_path(root),
        &module.packages,
        &module.scripts,
        STEP,
        opts,
        log,
    );

    // Nav entry plus the one-line comment documenting it
    fsops::filter_lines(
        &root.join(paths::NAVBAR),
        |line| line.contains("/blog"),
        true,
        "blog nav entry",
        STEP,
        opts,
        log,
    );

    fsops::filter_lines(
        &root.join(paths::FEATURES_BARREL),
        |line| line.contains("./blog"),
        false,
        "blog barrel export",
        STEP,
        opts,
        log,
    );

    for locale in ["en", "de"] {
        transforms::delete_json_keys(&paths::messages(root, locale), &["blog"], STEP, opts, log);
    }

    // gray-matter also renders the legal-content pages; it only goes when
    // that other consumer is gone too
    if !root.join(paths::LEGAL_PAGES).exists() {
        manifest::prune_manifest(
            &super::manifest_path(root),
            &["gray-matter".to_string()],
            &[],
            STEP,
            opts,
            log,
        );
    }
}
