//! File mutation primitives.
//!
//! Every primitive observes the same contract: an absent target is a no-op
//! notice, dry-run logs without touching the filesystem, and unexpected I/O
//! failures are absorbed into a `Failed` outcome rather than propagated. That
//! contract is what makes a whole run safely re-runnable against a tree that
//! already reflects a prior, possibly partial, run.

use crate::events::{Action, EventLog, Outcome};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Runtime flags threaded through every mutation.
///
/// Set once at the top of a run; every descendant call observes the same
/// values, so a dry run is never partial.
#[derive(Debug, Clone, Copy)]
pub struct MutationOptions {
    pub dry_run: bool,
    pub verbose: bool,
}

/// Remove a directory tree if it exists.
pub fn remove_dir(
    path: &Path,
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    if !path.exists() {
        log.record(step, Action::RemoveDir, path, Outcome::NotFound, None);
        return Outcome::NotFound;
    }

    if opts.dry_run {
        log.record(step, Action::RemoveDir, path, Outcome::Applied, None);
        return Outcome::Applied;
    }

    match fs::remove_dir_all(path) {
        Ok(_) => {
            log.record(step, Action::RemoveDir, path, Outcome::Applied, None);
            Outcome::Applied
        }
        Err(err) => {
            log.record(
                step,
                Action::RemoveDir,
                path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            Outcome::Failed
        }
    }
}

/// Remove a single file if it exists.
pub fn remove_file(
    path: &Path,
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    if !path.exists() {
        log.record(step, Action::RemoveFile, path, Outcome::NotFound, None);
        return Outcome::NotFound;
    }

    if opts.dry_run {
        log.record(step, Action::RemoveFile, path, Outcome::Applied, None);
        return Outcome::Applied;
    }

    match fs::remove_file(path) {
        Ok(_) => {
            log.record(step, Action::RemoveFile, path, Outcome::Applied, None);
            Outcome::Applied
        }
        Err(err) => {
            log.record(
                step,
                Action::RemoveFile,
                path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            Outcome::Failed
        }
    }
}

/// Remove every file directly under `dir` whose name matches `pattern`.
///
/// Supports `*` as prefix, suffix, or single infix wildcard against the file
/// name only. An absent directory is a no-op notice like any other primitive.
pub fn remove_glob(
    dir: &Path,
    pattern: &str,
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    if !dir.exists() {
        log.record(
            step,
            Action::RemoveFile,
            dir,
            Outcome::NotFound,
            Some(pattern.to_string()),
        );
        return Outcome::NotFound;
    }

    let mut matched = false;
    for entry in WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy();
        if matches_component(&name, pattern) {
            matched = true;
            remove_file(entry.path(), step, opts, log);
        }
    }

    if matched {
        Outcome::Applied
    } else {
        log.record(
            step,
            Action::RemoveFile,
            dir,
            Outcome::NoMatch,
            Some(pattern.to_string()),
        );
        Outcome::NoMatch
    }
}

/// Match a single path component against a pattern with at most one `*`.
pub fn matches_component(component: &str, pattern: &str) -> bool {
    if pattern == component {
        return true;
    }

    if !pattern.contains('*') {
        return false;
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        return component.ends_with(suffix);
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return component.starts_with(prefix);
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 2 {
        return component.starts_with(parts[0]) && component.ends_with(parts[1]);
    }

    false
}

/// Dry-run-aware write. Creates parent directories as needed.
///
/// This is the single filesystem sink for every structural rewrite, so the
/// dry-run guard lives in exactly one place.
pub fn write_file(path: &Path, contents: &str, opts: MutationOptions) -> Result<()> {
    if opts.dry_run {
        if opts.verbose {
            println!("  · Would write {} bytes to {}", contents.len(), path.display());
        }
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Replace the first match of `pattern` in a text file.
///
/// Reports `NoMatch` without touching the file when the pattern finds
/// nothing; many rewrites are legitimately conditional on content that may
/// already be absent.
pub fn replace_in_file(
    path: &Path,
    pattern: &regex::Regex,
    replacement: &str,
    detail: &str,
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    if !path.exists() {
        log.record(
            step,
            Action::RewriteFile,
            path,
            Outcome::NotFound,
            Some(detail.to_string()),
        );
        return Outcome::NotFound;
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log.record(
                step,
                Action::RewriteFile,
                path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            return Outcome::Failed;
        }
    };

    if !pattern.is_match(&text) {
        log.record(
            step,
            Action::RewriteFile,
            path,
            Outcome::NoMatch,
            Some(detail.to_string()),
        );
        return Outcome::NoMatch;
    }

    // NoExpand: rendered source is literal text, never a capture template
    let rewritten = pattern
        .replace(&text, regex::NoExpand(replacement))
        .into_owned();
    match write_file(path, &rewritten, opts) {
        Ok(_) => {
            log.record(
                step,
                Action::RewriteFile,
                path,
                Outcome::Applied,
                Some(detail.to_string()),
            );
            Outcome::Applied
        }
        Err(err) => {
            log.record(
                step,
                Action::RewriteFile,
                path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            Outcome::Failed
        }
    }
}

/// Drop every line for which `drop` returns true.
///
/// With `drop_preceding_comment` set, the single comment line directly above
/// each dropped line goes with it; generated templates document list entries
/// with a one-line comment immediately above.
pub fn filter_lines(
    path: &Path,
    drop: impl Fn(&str) -> bool,
    drop_preceding_comment: bool,
    detail: &str,
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    if !path.exists() {
        log.record(
            step,
            Action::FilterLines,
            path,
            Outcome::NotFound,
            Some(detail.to_string()),
        );
        return Outcome::NotFound;
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log.record(
                step,
                Action::FilterLines,
                path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            return Outcome::Failed;
        }
    };

    let had_trailing_newline = text.ends_with('\n');
    let mut kept: Vec<&str> = Vec::new();
    let mut dropped = 0usize;

    for line in text.lines() {
        if drop(line) {
            dropped += 1;
            if drop_preceding_comment {
                if let Some(last) = kept.last() {
                    if is_comment_line(last) {
                        kept.pop();
                    }
                }
            }
        } else {
            kept.push(line);
        }
    }

    if dropped == 0 {
        log.record(
            step,
            Action::FilterLines,
            path,
            Outcome::NoMatch,
            Some(detail.to_string()),
        );
        return Outcome::NoMatch;
    }

    let mut rewritten = kept.join("\n");
    if had_trailing_newline {
        rewritten.push('\n');
    }

    match write_file(path, &rewritten, opts) {
        Ok(_) => {
            log.record(
                step,
                Action::FilterLines,
                path,
                Outcome::Applied,
                Some(format!("{}, {} line(s)", detail, dropped)),
            );
            Outcome::Applied
        }
        Err(err) => {
            log.record(
                step,
                Action::FilterLines,
                path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            Outcome::Failed
        }
    }
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with("{/*") || trimmed.starts_with("#")
}
