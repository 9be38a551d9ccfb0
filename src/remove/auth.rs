//! Auth-flow removal and final auth configuration.
//!
//! Magic-link and one-time-code are ordinary routines. Social login is the
//! one true branch point in the engine: with at least one external provider
//! retained it reconfigures in place (partial removal); with none it tears
//! the whole subsystem out. The branch is a pure function of the retained
//! provider count.

use crate::config::AuthMethod;
use crate::envfile;
use crate::events::EventLog;
use crate::fsops::{self, MutationOptions};
use crate::manifest;
use crate::modules::{self, Feature, ModuleMap};
use crate::transforms;

use super::paths;
use std::path::Path;

const AUTH_STEP: &str = "auth";

const ALL_PROVIDERS: [AuthMethod; 3] = [AuthMethod::Google, AuthMethod::Github, AuthMethod::Apple];

/// Remove the magic-link flow. `step` distinguishes a cascade-forced removal
/// (its own pipeline step) from ordinary deselection handled during auth
/// configuration.
pub fn remove_magic_link(
    root: &Path,
    map: &ModuleMap,
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) {
    let module = modules::resolve(map.get(Feature::MagicLink), root);

    super::delete_mapped(&module, step, opts, log);

    fsops::filter_lines(
        &root.join(paths::AUTH_BARREL),
        |line| line.contains("./magic-link"),
        false,
        "magic-link barrel export",
        step,
        opts,
        log,
    );

    // Tab entry plus the comment above it
    fsops::filter_lines(
        &root.join(paths::SIGN_IN_FORM),
        |line| line.contains("MagicLink"),
        true,
        "magic-link form",
        step,
        opts,
        log,
    );

    for locale in ["en", "de"] {
        transforms::delete_json_keys(
            &paths::messages(root, locale),
            &["auth.magicLink"],
            step,
            opts,
            log,
        );
    }

    // The email template survives only while email itself is kept; when the
    // whole emails directory is already gone this is a quiet no-op
    fsops::remove_glob(&root.join(paths::EMAILS_DIR), "magic-link*", step, opts, log);
}

/// Remove the one-time-code flow. Same step semantics as
/// [`remove_magic_link`].
pub fn remove_otp(
    root: &Path,
    map: &ModuleMap,
    step: &'static str,
    opts: MutationOptions,
    log: &mut EventLog,
) {
    let module = modules::resolve(map.get(Feature::Otp), root);

    super::delete_mapped(&module, step, opts, log);

    fsops::filter_lines(
        &root.join(paths::AUTH_BARREL),
        |line| line.contains("./otp"),
        false,
        "otp barrel export",
        step,
        opts,
        log,
    );

    fsops::filter_lines(
        &root.join(paths::SIGN_IN_FORM),
        |line| line.contains("OtpForm"),
        true,
        "otp form",
        step,
        opts,
        log,
    );

    for locale in ["en", "de"] {
        transforms::delete_json_keys(
            &paths::messages(root, locale),
            &["auth.otp"],
            step,
            opts,
            log,
        );
    }

    fsops::remove_glob(&root.join(paths::EMAILS_DIR), "otp*", step, opts, log);
}

/// Reconcile the social-login subsystem with the retained provider set.
pub fn apply_social(
    root: &Path,
    map: &ModuleMap,
    retained: &[AuthMethod],
    opts: MutationOptions,
    log: &mut EventLog,
) {
    if retained.is_empty() {
        remove_social_fully(root, map, opts, log);
    } else {
        reconfigure_social(root, retained, opts, log);
    }
}

/// Partial removal: the feature stays, trimmed to the retained providers.
fn reconfigure_social(
    root: &Path,
    retained: &[AuthMethod],
    opts: MutationOptions,
    log: &mut EventLog,
) {
    let ids: Vec<String> = retained.iter().map(|p| format!("\"{}\"", p.id())).collect();
    transforms::rewrite_const_array(
        &root.join(paths::AUTH_CONFIG),
        "socialProviders",
        &ids,
        AUTH_STEP,
        opts,
        log,
    );

    let configs: Vec<String> = retained.iter().map(|p| render_provider_config(*p)).collect();
    transforms::rewrite_const_array(
        &root.join(paths::PROVIDER_CONFIGS),
        "providerConfigs",
        &configs,
        AUTH_STEP,
        opts,
        log,
    );

    let deselected: Vec<String> = ALL_PROVIDERS
        .iter()
        .copied()
        .filter(|p| !retained.contains(p))
        .filter_map(|p| p.env_prefix())
        .map(str::to_string)
        .collect();
    if !deselected.is_empty() {
        envfile::remove_vars_by_prefix(&super::env_path(root), &deselected, AUTH_STEP, opts, log);
    }
}

/// Full removal: no external provider survives.
fn remove_social_fully(root: &Path, map: &ModuleMap, opts: MutationOptions, log: &mut EventLog) {
    let module = modules::resolve(map.get(Feature::Social), root);

    super::delete_mapped(&module, AUTH_STEP, opts, log);

    manifest::prune_manifest(
        &super::manifest_path(root),
        &module.packages,
        &module.scripts,
        AUTH_STEP,
        opts,
        log,
    );

    if let Some(section) = &module.env_section {
        envfile::remove_section(
            &super::env_path(root),
            section,
            &module.env_prefixes,
            AUTH_STEP,
            opts,
            log,
        );
    }

    fsops::filter_lines(
        &root.join(paths::AUTH_CONFIG),
        |line| {
            line.contains("socialProviders")
                || line.contains("providerConfigs")
                || line.contains("auth/social")
        },
        false,
        "social provider declarations",
        AUTH_STEP,
        opts,
        log,
    );

    fsops::filter_lines(
        &root.join(paths::AUTH_BARREL),
        |line| line.contains("./social"),
        false,
        "social barrel export",
        AUTH_STEP,
        opts,
        log,
    );

    fsops::filter_lines(
        &root.join(paths::SIGN_IN_FORM),
        |line| line.contains("SocialButtons"),
        true,
        "social sign-in buttons",
        AUTH_STEP,
        opts,
        log,
    );

    for locale in ["en", "de"] {
        transforms::delete_json_keys(
            &paths::messages(root, locale),
            &["auth.social"],
            AUTH_STEP,
            opts,
            log,
        );
    }
}

/// Rewrite the starter's method list to the final, already-cascaded set.
/// Always runs, and always after every removal routine.
pub fn configure_auth(
    root: &Path,
    effective: &[AuthMethod],
    opts: MutationOptions,
    log: &mut EventLog,
) {
    let ids: Vec<String> = effective.iter().map(|m| format!("\"{}\"", m.id())).collect();
    transforms::rewrite_const_array(
        &root.join(paths::AUTH_CONFIG),
        "authMethods",
        &ids,
        AUTH_STEP,
        opts,
        log,
    );
}

fn render_provider_config(provider: AuthMethod) -> String {
    let prefix = provider.env_prefix().unwrap_or_default();
    format!(
        "{{ id: \"{}\", clientId: env.{}CLIENT_ID, clientSecret: env.{}CLIENT_SECRET }}",
        provider.id(),
        prefix,
        prefix
    )
}
