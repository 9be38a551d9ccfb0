//! .env.example mutation.
//!
//! The example environment file groups variables into titled sections bounded
//! by dashed comment rules:
//!
//! ```text
//! # ------------------------------------------------------------------
//! # Email
//! # ------------------------------------------------------------------
//! RESEND_API_KEY=
//! EMAIL_FROM=noreply@example.com
//! ```
//!
//! Section-level removal is preferred; when the header shape has drifted, the
//! fallback filters individual lines by variable-name prefix. Both paths end
//! by collapsing runs of three or more blank lines down to one.

use crate::events::{Action, EventLog, Outcome};
use crate::fsops::{self, MutationOptions};

use std::fs;
use std::path::Path;

/// Remove a whole titled section; fall back to prefix filtering when the
/// three-line header is not found.
pub fn remove_section(
    env_path: &Path,
    title: &str,
    fallback_prefixes: &[String],
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    if !env_path.exists() {
        log.record(
            step,
            Action::EditEnv,
            env_path,
            Outcome::NotFound,
            Some(title.to_string()),
        );
        return Outcome::NotFound;
    }

    let text = match fs::read_to_string(env_path) {
        Ok(text) => text,
        Err(err) => {
            log.record(
                step,
                Action::EditEnv,
                env_path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            return Outcome::Failed;
        }
    };

    let lines: Vec<&str> = text.lines().collect();

    let Some(start) = find_section_header(&lines, title) else {
        // Header shape not found; fall back to prefix-based line removal so a
        // hand-edited env file still gets its variables pruned.
        return remove_vars_by_prefix(env_path, fallback_prefixes, step, opts, log);
    };

    // Skip the three header lines, then consume the body until the next
    // section header or EOF.
    let mut end = start + 3;
    while end < lines.len() && !is_header_start(&lines, end) {
        end += 1;
    }

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    kept.extend(&lines[..start]);
    kept.extend(&lines[end..]);

    let rewritten = collapse_blank_runs(&kept);
    match fsops::write_file(env_path, &rewritten, opts) {
        Ok(_) => {
            log.record(
                step,
                Action::EditEnv,
                env_path,
                Outcome::Applied,
                Some(format!("removed section \"{}\"", title)),
            );
            Outcome::Applied
        }
        Err(err) => {
            log.record(
                step,
                Action::EditEnv,
                env_path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            Outcome::Failed
        }
    }
}

/// Remove every variable line whose name starts with one of `prefixes`.
pub fn remove_vars_by_prefix(
    env_path: &Path,
    prefixes: &[String],
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) -> Outcome {
    if prefixes.is_empty() {
        return Outcome::NoMatch;
    }

    if !env_path.exists() {
        log.record(
            step,
            Action::EditEnv,
            env_path,
            Outcome::NotFound,
            Some(prefixes.join(", ")),
        );
        return Outcome::NotFound;
    }

    let text = match fs::read_to_string(env_path) {
        Ok(text) => text,
        Err(err) => {
            log.record(
                step,
                Action::EditEnv,
                env_path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            return Outcome::Failed;
        }
    };

    let mut dropped = 0usize;
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let name = line.trim_start();
            let matches = prefixes.iter().any(|p| name.starts_with(p.as_str()));
            if matches {
                dropped += 1;
            }
            !matches
        })
        .collect();

    if dropped == 0 {
        log.record(
            step,
            Action::EditEnv,
            env_path,
            Outcome::NoMatch,
            Some(prefixes.join(", ")),
        );
        return Outcome::NoMatch;
    }

    let rewritten = collapse_blank_runs(&kept);
    match fsops::write_file(env_path, &rewritten, opts) {
        Ok(_) => {
            log.record(
                step,
                Action::EditEnv,
                env_path,
                Outcome::Applied,
                Some(format!("removed {} variable(s)", dropped)),
            );
            Outcome::Applied
        }
        Err(err) => {
            log.record(
                step,
                Action::EditEnv,
                env_path,
                Outcome::Failed,
                Some(err.to_string()),
            );
            Outcome::Failed
        }
    }
}

/// Find the index of the dashed rule opening the titled section.
fn find_section_header(lines: &[&str], title: &str) -> Option<usize> {
    (0..lines.len()).find(|&i| {
        is_header_start(lines, i)
            && lines
                .get(i + 1)
                .map(|l| header_title(l) == Some(title))
                .unwrap_or(false)
    })
}

/// True when a three-line header (rule / title / rule) starts at `i`.
fn is_header_start(lines: &[&str], i: usize) -> bool {
    is_rule_line(lines.get(i).copied().unwrap_or(""))
        && lines
            .get(i + 1)
            .map(|l| header_title(l).is_some())
            .unwrap_or(false)
        && is_rule_line(lines.get(i + 2).copied().unwrap_or(""))
}

fn is_rule_line(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('#') else {
        return false;
    };
    let dashes = rest.trim();
    dashes.len() >= 4 && dashes.chars().all(|c| c == '-')
}

fn header_title(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix('#')?.trim();
    if rest.is_empty() || rest.chars().all(|c| c == '-') {
        None
    } else {
        Some(rest)
    }
}

/// Collapse runs of three or more blank lines to a single blank line and
/// restore the trailing newline. Shorter runs pass through untouched.
fn collapse_blank_runs(lines: &[&str]) -> String {
    fn flush<'a>(out: &mut Vec<&'a str>, blanks: usize) {
        let kept = if blanks >= 3 { 1 } else { blanks };
        for _ in 0..kept {
            out.push("");
        }
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut blanks = 0usize;

    for line in lines {
        if line.trim().is_empty() {
            blanks += 1;
        } else {
            flush(&mut out, blanks);
            blanks = 0;
            out.push(line);
        }
    }
    flush(&mut out, blanks);

    let mut text = out.join("\n");
    text.push('\n');
    text
}
