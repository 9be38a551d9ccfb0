//! Dark-mode removal.

use crate::events::EventLog;
use crate::fsops::{self, MutationOptions};
use crate::manifest;
use crate::modules::{self, Feature, ModuleMap};
use crate::transforms;

use super::paths;
use std::path::Path;

const STEP: &str = "theme";

pub fn remove_theme(root: &Path, map: &ModuleMap, opts: MutationOptions, log: &mut EventLog) {
    let module = modules::resolve(map.get(Feature::Theme), root);

    super::delete_mapped(&module, STEP, opts, log);

    manifest::prune_manifest(
        &super::manifest_path(root),
        &module.packages,
        &module.scripts,
        STEP,
        opts,
        log,
    );

    fsops::filter_lines(
        &root.join(paths::NAVBAR),
        |line| line.contains("ThemeToggle"),
        false,
        "theme toggle",
        STEP,
        opts,
        log,
    );

    // The provider wrapper opens and closes on its own lines; dropping both
    // leaves the children in place
    fsops::filter_lines(
        &root.join(paths::APP_PROVIDERS),
        |line| line.contains("ThemeProvider") || line.contains("next-themes"),
        false,
        "theme provider wrapper",
        STEP,
        opts,
        log,
    );

    for locale in ["en", "de"] {
        transforms::delete_json_keys(&paths::messages(root, locale), &["theme"], STEP, opts, log);
    }
}
