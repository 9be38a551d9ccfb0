//! Payments removal.

use crate::envfile;
use crate::events::EventLog;
use crate::fsops::{self, MutationOptions};
use crate::manifest;
use crate::modules::{self, Feature, ModuleMap};
use crate::transforms;

use super::paths;
use std::path::Path;

const STEP: &str = "payments";

pub fn remove_payments(root: &Path, map: &ModuleMap, opts: MutationOptions, log: &mut EventLog) {
    let module = modules::resolve(map.get(Feature::Payments), root);

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
        &root.join(paths::NAVBAR),
        |line| line.contains("/pricing"),
        true,
        "pricing nav entry",
        STEP,
        opts,
        log,
    );

    // The landing page embeds the pricing section; strip the usage and the
    // import that brought it in
    fsops::filter_lines(
        &root.join(paths::LANDING_PAGE),
        |line| line.contains("PricingSection") || line.contains("features/payments"),
        false,
        "pricing section",
        STEP,
        opts,
        log,
    );

    fsops::filter_lines(
        &root.join(paths::FEATURES_BARREL),
        |line| line.contains("./payments"),
        false,
        "payments barrel export",
        STEP,
        opts,
        log,
    );

    for locale in ["en", "de"] {
        transforms::delete_json_keys(
            &paths::messages(root, locale),
            &["pricing", "billing"],
            STEP,
            opts,
            log,
        );
    }
}
