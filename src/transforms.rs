//! Structural rewrites of retained source files.
//!
//! Two edit shapes cover everything the removal routines need beyond plain
//! line filtering: deleting keys from a JSON document (locale message files)
//! and swapping a whole `export const X = [...]` declaration for a freshly
//! rendered one (provider lists, locale lists, auth method lists). JSON goes
//! through parse/mutate/serialize so unrelated content cannot be corrupted;
//! declarations are captured with a bounding pattern and replaced wholesale.

use crate::events::{Action, EventLog, Outcome};
use crate::fsops::{self, MutationOptions};

use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Delete keys from a JSON file. A key of the form `"a.b"` names a child one
/// level down. Re-serialized pretty-printed with a trailing newline.
pub fn delete_json_keys(
    path: &Path,
    keys: &[&str],
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    if !path.exists() {
        log.record(step, Action::EditJson, path, Outcome::NotFound, None);
        return Outcome::NotFound;
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log.record(
                step,
                Action::EditJson,
                path,
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
                Action::EditJson,
                path,
                Outcome::ParseFailure,
                Some(err.to_string()),
            );
            return Outcome::ParseFailure;
        }
    };

    let mut removed = 0usize;
    for key in keys {
        if delete_key(&mut root, key) {
            removed += 1;
        }
    }

    if removed == 0 {
        log.record(
            step,
            Action::EditJson,
            path,
            Outcome::NoMatch,
            Some(keys.join(", ")),
        );
        return Outcome::NoMatch;
    }

    let mut rendered = match serde_json::to_string_pretty(&root) {
        Ok(rendered) => rendered,
        Err(err) => {
            log.record(
                step,
                Action::EditJson,
                path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            return Outcome::Failed;
        }
    };
    rendered.push('\n');

    match fsops::write_file(path, &rendered, opts) {
        Ok(_) => {
            log.record(
                step,
                Action::EditJson,
                path,
                Outcome::Applied,
                Some(format!("removed {} key(s)", removed)),
            );
            Outcome::Applied
        }
        Err(err) => {
            log.record(
                step,
                Action::EditJson,
                path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            Outcome::Failed
        }
    }
}

fn delete_key(root: &mut Value, key: &str) -> bool {
    let Some(object) = root.as_object_mut() else {
        return false;
    };

    match key.split_once('.') {
        None => object.shift_remove(key).is_some(),
        Some((parent, child)) => object
            .get_mut(parent)
            .and_then(Value::as_object_mut)
            .map(|nested| nested.shift_remove(child).is_some())
            .unwrap_or(false),
    }
}

/// Replace an `export const <name> = [...]` declaration with one containing
/// only `items` (already rendered, e.g. quoted strings or object literals).
///
/// When the bounding pattern does not match (the template's formatting has
/// drifted) the file is left unchanged and the outcome is a `NoMatch`
/// warning; one drifted template must not abort the whole run.
pub fn rewrite_const_array(
    path: &Path,
    const_name: &str,
    items: &[String],
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    let pattern = declaration_pattern(const_name);

    let rendered = if items.is_empty() {
        format!("export const {} = [];", const_name)
    } else if items.iter().any(|i| i.contains('{')) {
        // Object entries: one per line, matching the generated formatting
        format!(
            "export const {} = [\n{}\n];",
            const_name,
            items
                .iter()
                .map(|i| format!("  {},", i))
                .collect::<Vec<_>>()
                .join("\n")
        )
    } else {
        format!("export const {} = [{}];", const_name, items.join(", "))
    };

    fsops::replace_in_file(
        path,
        &pattern,
        &rendered,
        &format!("{} array", const_name),
        step,
        opts,
        log,
    )
}

/// Bounding pattern for a full `export const <name> = [...];` declaration,
/// tolerating a type annotation and multi-line array bodies without nested
/// brackets.
fn declaration_pattern(const_name: &str) -> Regex {
    let pattern = format!(
        r"export const {}(?:\s*:[^=\n]+)?\s*=\s*\[[^\]]*\];",
        regex::escape(const_name)
    );
    Regex::new(&pattern).expect("escaped declaration pattern is always valid")
}
