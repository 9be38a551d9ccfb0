//! Single-locale reconfiguration.
//!
//! Nothing runs here when both locales are kept; the orchestrator only calls
//! in for a single-locale selection.

use crate::config::LocaleMode;
use crate::events::EventLog;
use crate::fsops::{self, MutationOptions};
use crate::modules::{self, Feature, ModuleMap};
use crate::transforms;

use super::paths;
use regex::Regex;
use std::path::Path;

const STEP: &str = "locale";

pub fn reconfigure_locale(
    root: &Path,
    map: &ModuleMap,
    mode: LocaleMode,
    opts: MutationOptions,
    log: &mut EventLog,
) {
    let Some(dropped) = mode.dropped() else {
        return;
    };
    let kept = mode.kept();

    let module = modules::resolve(map.get(Feature::Locale), root);
    super::delete_mapped(&module, STEP, opts, log);

    fsops::remove_file(&paths::messages(root, dropped), STEP, opts, log);

    let routing = root.join(paths::ROUTING);
    transforms::rewrite_const_array(
        &routing,
        "locales",
        &[format!("\"{}\"", kept)],
        STEP,
        opts,
        log,
    );

    let default_locale = Regex::new(r#"export const defaultLocale = "[a-z-]+";"#)
        .expect("static pattern is valid");
    fsops::replace_in_file(
        &routing,
        &default_locale,
        &format!("export const defaultLocale = \"{}\";", kept),
        "defaultLocale",
        STEP,
        opts,
        log,
    );

    // With one locale there is nothing to switch between
    fsops::filter_lines(
        &root.join(paths::NAVBAR),
        |line| line.contains("LocaleSwitcher"),
        false,
        "locale switcher",
        STEP,
        opts,
        log,
    );

    transforms::delete_json_keys(
        &paths::messages(root, kept),
        &["localeSwitcher"],
        STEP,
        opts,
        log,
    );
}
