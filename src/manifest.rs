//! package.json pruning.
//!
//! The manifest is edited structurally (parse, mutate, serialize) rather than
//! textually, so an entry removal can never corrupt unrelated content. The
//! file is written back only if at least one removal actually occurred.

use crate::events::{Action, EventLog, Outcome};
use crate::fsops::{self, MutationOptions};

use serde_json::Value;
use std::fs;
use std::path::Path;

const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "devDependencies", "peerDependencies"];

/// Remove named packages and scripts from a package.json.
pub fn prune_manifest(
    manifest: &Path,
    packages: &[String],
    scripts: &[String],
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    if packages.is_empty() && scripts.is_empty() {
        return Outcome::NoMatch;
    }

    if !manifest.exists() {
        log.record(step, Action::EditManifest, manifest, Outcome::NotFound, None);
        return Outcome::NotFound;
    }

    let text = match fs::read_to_string(manifest) {
        Ok(text) => text,
        Err(err) => {
            log.record(
                step,
                Action::EditManifest,
                manifest,
                Outcome::Failed,
                Some(err.to_string()),
            );
            return Outcome::Failed;
        }
    };

    let mut root: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            log.record(
                step,
                Action::EditManifest,
                manifest,
                Outcome::ParseFailure,
                Some(err.to_string()),
            );
            return Outcome::ParseFailure;
        }
    };

    let mut removed_packages = 0usize;
    let mut removed_scripts = 0usize;

    for section in DEPENDENCY_SECTIONS {
        if let Some(entries) = root.get_mut(section).and_then(Value::as_object_mut) {
            for package in packages {
                if entries.shift_remove(package).is_some() {
                    removed_packages += 1;
                }
            }
        }
    }

    if let Some(entries) = root.get_mut("scripts").and_then(Value::as_object_mut) {
        for script in scripts {
            if entries.shift_remove(script).is_some() {
                removed_scripts += 1;
            }
        }
    }

    if removed_packages == 0 && removed_scripts == 0 {
        log.record(
            step,
            Action::EditManifest,
            manifest,
            Outcome::NoMatch,
            Some("no matching packages or scripts".to_string()),
        );
        return Outcome::NoMatch;
    }

    let mut rendered = match serde_json::to_string_pretty(&root) {
        Ok(rendered) => rendered,
        Err(err) => {
            log.record(
                step,
                Action::EditManifest,
                manifest,
                Outcome::Failed,
                Some(err.to_string()),
            );
            return Outcome::Failed;
        }
    };
    rendered.push('\n');

    match fsops::write_file(manifest, &rendered, opts) {
        Ok(_) => {
            let detail = format!(
                "removed {} package(s), {} script(s)",
                removed_packages, removed_scripts
            );
            log.record(
                step,
                Action::EditManifest,
                manifest,
                Outcome::Applied,
                Some(detail),
            );
            Outcome::Applied
        }
        Err(err) => {
            log.record(
                step,
                Action::EditManifest,
                manifest,
                Outcome::Failed,
                Some(err.to_string()),
            );
            Outcome::Failed
        }
    }
}
