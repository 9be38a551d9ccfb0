//! Run orchestration.
//!
//! A fixed eight-step sequence over the configuration. Two orderings are
//! load-bearing and must never change: email is evaluated before the flows
//! that depend on it, and auth configuration runs after every other step so
//! it sees the final, already-cascaded method set. Everything else is just
//! the order the steps are written in.

use crate::config::{AuthMethod, LocaleMode, SetupConfig};
use crate::events::{Action, EventLog, Outcome};
use crate::fsops::MutationOptions;
use crate::modules::{self, Feature};
use crate::remove;

use anyhow::Result;
use colored::Colorize;
use crossbeam_channel::bounded;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Bounded wait for the package-manager install; exceeding it is treated
/// like any other installer failure.
const INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

const INSTALL_STEP: &str = "install";

/// Runtime flags for one scaffolding run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub dry_run: bool,
    pub verbose: bool,
    pub skip_install: bool,
}

/// Execute the full removal pipeline against a generated project tree.
///
/// Anticipated per-file conditions are absorbed into the returned event log;
/// only an unexpected internal error propagates, and the caller should treat
/// it as fatal.
pub fn run(project_root: &Path, config: &SetupConfig, run_opts: RunOptions) -> Result<EventLog> {
    let map = modules::load_module_map()?;
    let opts = MutationOptions {
        dry_run: run_opts.dry_run,
        verbose: run_opts.verbose,
    };
    let mut log = EventLog::new(run_opts.dry_run, run_opts.verbose);

    // 1. Blog
    if !config.blog {
        announce("Removing blog module");
        remove::blog::remove_blog(project_root, &map, opts, &mut log);
    }

    // 2. Payments
    if !config.payments {
        announce("Removing payments module");
        remove::payments::remove_payments(project_root, &map, opts, &mut log);
    }

    // 3. Theme
    if !config.dark_mode {
        announce("Removing dark mode");
        remove::theme::remove_theme(project_root, &map, opts, &mut log);
    }

    // 4. Locale: reconfigure to a single locale; nothing to do when both stay
    if config.locale != LocaleMode::Both {
        announce(&format!("Configuring single locale ({})", config.locale.kept()));
        remove::locale::reconfigure_locale(project_root, &map, config.locale, opts, &mut log);
    }

    // 5. Email, and the flows that cannot outlive it. The cascade comes from
    // the module map's requires edges, resolved before any dependent runs.
    let disabled = if config.email {
        Vec::new()
    } else {
        vec![Feature::Email]
    };
    let forced = modules::forced_removals(&map, &disabled);

    if !config.email {
        announce("Removing email module");
        remove::email::remove_email(project_root, &map, opts, &mut log);
    }

    // 6. Email-dependent auth flows. A cascade-forced removal is a pipeline
    // step in its own right; with email kept, pruning a merely deselected
    // flow belongs to the auth-configuration phase and is recorded there.
    if forced.contains(&Feature::MagicLink) {
        announce("Removing magic-link sign-in");
        remove::auth::remove_magic_link(project_root, &map, Feature::MagicLink.key(), opts, &mut log);
    } else if !config.auth_methods.contains(&AuthMethod::MagicLink) {
        announce("Removing magic-link sign-in");
        remove::auth::remove_magic_link(project_root, &map, "auth", opts, &mut log);
    }
    if forced.contains(&Feature::Otp) {
        announce("Removing one-time code sign-in");
        remove::auth::remove_otp(project_root, &map, Feature::Otp.key(), opts, &mut log);
    } else if !config.auth_methods.contains(&AuthMethod::Otp) {
        announce("Removing one-time code sign-in");
        remove::auth::remove_otp(project_root, &map, "auth", opts, &mut log);
    }

    // 7. Auth configuration, always last before install: reconcile social
    // login with the retained providers, then write the effective method set
    announce("Configuring auth");
    remove::auth::apply_social(project_root, &map, &config.selected_providers(), opts, &mut log);
    remove::auth::configure_auth(project_root, &config.effective_auth_methods(), opts, &mut log);

    // 8. Dependency installation: best-effort, never fails the run
    if run_opts.dry_run || run_opts.skip_install {
        log.record(
            INSTALL_STEP,
            Action::RunInstaller,
            project_root,
            Outcome::Skipped,
            Some("install skipped".to_string()),
        );
    } else {
        install_dependencies(project_root, &mut log);
    }

    Ok(log)
}

fn announce(message: &str) {
    println!("{}", format!("• {}...", message).bold());
}

/// Pick the package manager the generated lockfile asks for.
fn detect_package_manager(project_root: &Path) -> &'static str {
    if project_root.join("pnpm-lock.yaml").exists() {
        "pnpm"
    } else if project_root.join("yarn.lock").exists() {
        "yarn"
    } else {
        "npm"
    }
}

/// Run the installer under a bounded wait. Any failure (spawn error,
/// non-zero exit, timeout) is logged as a warning and absorbed.
fn install_dependencies(project_root: &Path, log: &mut EventLog) {
    let package_manager = detect_package_manager(project_root);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Installing dependencies with {}...", package_manager));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let (sender, receiver) = bounded(1);
    let install_dir = project_root.to_path_buf();
    thread::spawn(move || {
        let result = Command::new(package_manager)
            .arg("install")
            .current_dir(install_dir)
            .output();
        sender.send(result).ok();
    });

    let (outcome, detail) = match receiver.recv_timeout(INSTALL_TIMEOUT) {
        Ok(Ok(output)) if output.status.success() => {
            (Outcome::Applied, package_manager.to_string())
        }
        Ok(Ok(output)) => {
            eprintln!(
                "Warning: {} install exited with {}; run it manually",
                package_manager, output.status
            );
            (Outcome::Failed, format!("{} install: {}", package_manager, output.status))
        }
        Ok(Err(err)) => {
            eprintln!(
                "Warning: could not run {} install: {}; run it manually",
                package_manager, err
            );
            (Outcome::Failed, format!("{} install: {}", package_manager, err))
        }
        Err(_) => {
            // The worker thread is left to finish on its own; there is no
            // portable way to kill the child through Output-based capture
            eprintln!(
                "Warning: {} install did not finish within {}s; run it manually",
                package_manager,
                INSTALL_TIMEOUT.as_secs()
            );
            (
                Outcome::Failed,
                format!("{} install timed out", package_manager),
            )
        }
    };

    spinner.finish_and_clear();
    log.record(
        INSTALL_STEP,
        Action::RunInstaller,
        project_root,
        outcome,
        Some(detail),
    );
}
