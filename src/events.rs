//! Structured run events and console reporting.
//!
//! Every mutation attempt is recorded as an [`Event`] so tests can assert on
//! what a run did (or would do) without scraping console output. The recorder
//! prints the human-readable line at the moment the event is recorded, so the
//! console stream and the event stream never disagree.

use colored::Colorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What a mutation attempted to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RemoveDir,
    RemoveFile,
    WriteFile,
    RewriteFile,
    FilterLines,
    EditManifest,
    EditJson,
    EditEnv,
    RunInstaller,
}

/// How a mutation attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The mutation was applied (or would be, under dry-run).
    Applied,
    /// The target path does not exist; nothing to do.
    NotFound,
    /// The pattern matched nothing; file left untouched.
    NoMatch,
    /// The file could not be parsed; file left untouched.
    ParseFailure,
    /// An I/O or subprocess failure was absorbed.
    Failed,
    /// The step did not run (dry-run installer, --skip-install).
    Skipped,
}

impl Outcome {
    /// Outcomes surfaced in the end-of-run warning count.
    pub fn is_warning(self) -> bool {
        matches!(self, Outcome::NoMatch | Outcome::ParseFailure | Outcome::Failed)
    }
}

/// One recorded mutation attempt.
#[derive(Debug, Clone)]
pub struct Event {
    /// The pipeline step this happened under (e.g. "blog", "auth").
    pub step: &'static str,
    pub action: Action,
    pub target: PathBuf,
    pub outcome: Outcome,
    /// Human-readable qualifier ("removed 2 packages", "locales array").
    pub detail: Option<String>,
}

/// Append-only log of everything one run did.
///
/// Dry-run and real runs produce the same step/action/target stream; only the
/// console phrasing differs.
pub struct EventLog {
    events: Vec<Event>,
    dry_run: bool,
    verbose: bool,
}

impl EventLog {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        EventLog {
            events: Vec::new(),
            dry_run,
            verbose,
        }
    }

    pub fn record(
        &mut self,
        step: &'static str,
        action: Action,
        target: &Path,
        outcome: Outcome,
        detail: Option<String>,
    ) {
        let event = Event {
            step,
            action,
            target: target.to_path_buf(),
            outcome,
            detail,
        };
        self.print(&event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Distinct steps in first-recorded order.
    pub fn steps_run(&self) -> Vec<&'static str> {
        let mut seen = Vec::new();
        for event in &self.events {
            if !seen.contains(&event.step) {
                seen.push(event.step);
            }
        }
        seen
    }

    /// Index of the first event recorded under `step`, if any.
    pub fn first_index_of(&self, step: &str) -> Option<usize> {
        self.events.iter().position(|e| e.step == step)
    }

    pub fn warning_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.outcome.is_warning())
            .count()
    }

    pub fn counts_by_outcome(&self) -> HashMap<Outcome, usize> {
        let mut counts = HashMap::new();
        for event in &self.events {
            *counts.entry(event.outcome).or_insert(0) += 1;
        }
        counts
    }

    fn print(&self, event: &Event) {
        let target = event.target.display();
        let detail = event
            .detail
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();

        match event.outcome {
            Outcome::Applied => {
                let verb = match (event.action, self.dry_run) {
                    (Action::RemoveDir, false) => "Removed directory",
                    (Action::RemoveDir, true) => "Would remove directory",
                    (Action::RemoveFile, false) => "Removed",
                    (Action::RemoveFile, true) => "Would remove",
                    (Action::WriteFile, false) => "Wrote",
                    (Action::WriteFile, true) => "Would write",
                    (Action::RewriteFile | Action::FilterLines, false) => "Rewrote",
                    (Action::RewriteFile | Action::FilterLines, true) => "Would rewrite",
                    (Action::EditManifest | Action::EditJson | Action::EditEnv, false) => "Updated",
                    (Action::EditManifest | Action::EditJson | Action::EditEnv, true) => {
                        "Would update"
                    }
                    (Action::RunInstaller, _) => "Installed dependencies with",
                };
                println!("  {} {}: {}{}", "✓".green(), verb, target, detail);
            }
            Outcome::NotFound => {
                if self.verbose {
                    println!("  {} Not found, skipping: {}", "·".dimmed(), target);
                }
            }
            Outcome::NoMatch => {
                println!(
                    "  {} No match in {}{}; file left unchanged",
                    "!".yellow(),
                    target,
                    detail
                );
            }
            Outcome::ParseFailure => {
                eprintln!(
                    "  {} Could not parse {}{}; file left unchanged",
                    "!".yellow(),
                    target,
                    detail
                );
            }
            Outcome::Failed => {
                eprintln!("  {} Failed: {}{}", "✗".red(), target, detail);
            }
            Outcome::Skipped => {
                if self.verbose {
                    println!("  {} Skipped: {}{}", "·".dimmed(), target, detail);
                }
            }
        }
    }
}
