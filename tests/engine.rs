//! Engine-level tests against a generated-project fixture tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

use tailorkit::{
    pipeline, AuthMethod, EventLog, LocaleMode, Outcome, RunOptions, SetupConfig,
};

const PACKAGE_JSON: &str = r#"{
  "name": "learnhub",
  "dependencies": {
    "next": "^14.2.0",
    "react": "^18.3.0",
    "gray-matter": "^4.0.3",
    "next-mdx-remote": "^4.4.1",
    "reading-time": "^1.5.0",
    "stripe": "^15.0.0",
    "@stripe/stripe-js": "^3.3.0",
    "next-themes": "^0.3.0",
    "resend": "^3.2.0",
    "react-email": "^2.1.0",
    "@react-email/components": "^0.0.17",
    "arctic": "^1.8.0"
  },
  "scripts": {
    "dev": "next dev",
    "build": "next build",
    "stripe:listen": "stripe listen --forward-to localhost:3000/api/stripe/webhook",
    "email:dev": "email dev --dir emails"
  }
}
"#;

const ENV_EXAMPLE: &str = "\
# ------------------------------------------------------------------
# Database
# ------------------------------------------------------------------
DATABASE_URL=postgres://localhost/learnhub

# ------------------------------------------------------------------
# Payments
# ------------------------------------------------------------------
STRIPE_SECRET_KEY=
STRIPE_WEBHOOK_SECRET=

# ------------------------------------------------------------------
# Email
# ------------------------------------------------------------------
RESEND_API_KEY=
EMAIL_FROM=noreply@example.com

# ------------------------------------------------------------------
# Social login providers
# ------------------------------------------------------------------
GOOGLE_CLIENT_ID=
GOOGLE_CLIENT_SECRET=
GITHUB_CLIENT_ID=
GITHUB_CLIENT_SECRET=
APPLE_CLIENT_ID=
APPLE_CLIENT_SECRET=
";

const MESSAGES: &str = r#"{
  "nav": {
    "home": "Home",
    "courses": "Courses"
  },
  "blog": {
    "title": "Blog"
  },
  "pricing": {
    "title": "Pricing"
  },
  "billing": {
    "invoices": "Invoices"
  },
  "theme": {
    "toggle": "Toggle theme"
  },
  "localeSwitcher": {
    "label": "Language"
  },
  "auth": {
    "signIn": "Sign in",
    "magicLink": "Email me a sign-in link",
    "otp": "Email me a one-time code",
    "social": "Continue with"
  }
}
"#;

const NAVBAR: &str = r#"import Link from "next/link";
import { LocaleSwitcher } from "@/components/locale-switcher";
import { ThemeToggle } from "@/components/theme-toggle";

export function Navbar() {
  return (
    <nav>
      <Link href="/courses">Courses</Link>
      {/* Blog index */}
      <Link href="/blog">Blog</Link>
      {/* Plans and checkout */}
      <Link href="/pricing">Pricing</Link>
      <LocaleSwitcher />
      <ThemeToggle />
    </nav>
  );
}
"#;

const APP_PROVIDERS: &str = r#"import { ThemeProvider } from "next-themes";

export function Providers({ children }: { children: React.ReactNode }) {
  return (
    <ThemeProvider attribute="class" defaultTheme="system" enableSystem>
      {children}
    </ThemeProvider>
  );
}
"#;

const LANDING_PAGE: &str = r#"import { Hero } from "@/components/hero";
import { PricingSection } from "@/features/payments";

export default function LandingPage() {
  return (
    <main>
      <Hero />
      <PricingSection />
    </main>
  );
}
"#;

const ROUTING: &str = r#"export const locales = ["en", "de"];
export const defaultLocale = "en";
"#;

const AUTH_CONFIG: &str = r#"import { providerConfigs } from "@/features/auth/social/providers";

export const authMethods = ["password", "magic-link", "otp", "google", "github", "apple"];
export const socialProviders = ["google", "github", "apple"];
"#;

const PROVIDER_CONFIGS: &str = r#"import { env } from "@/lib/env";

export const providerConfigs = [
  { id: "google", clientId: env.GOOGLE_CLIENT_ID, clientSecret: env.GOOGLE_CLIENT_SECRET },
  { id: "github", clientId: env.GITHUB_CLIENT_ID, clientSecret: env.GITHUB_CLIENT_SECRET },
  { id: "apple", clientId: env.APPLE_CLIENT_ID, clientSecret: env.APPLE_CLIENT_SECRET },
];
"#;

const SIGN_IN_FORM: &str = r#"import { PasswordForm } from "./password/form";
// Email me a sign-in link
import { MagicLinkForm } from "./magic-link/form";
// Email me a one-time code
import { OtpForm } from "./otp/form";
// Continue with an external identity provider
import { SocialButtons } from "./social/buttons";

export function SignInForm() {
  return (
    <div>
      <PasswordForm />
      <MagicLinkForm />
      <OtpForm />
      <SocialButtons />
    </div>
  );
}
"#;

const AUTH_BARREL: &str = r#"export * from "./password";
export * from "./magic-link";
export * from "./otp";
export * from "./social";
export { SignInForm } from "./sign-in-form";
"#;

const FEATURES_BARREL: &str = r#"export * from "./blog";
export * from "./payments";
export * from "./email";
export * from "./auth";
"#;

/// Lay down a fresh Learnhub tree the way the template generator leaves it.
fn fixture_project() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();

    let write = |rel: &str, contents: &str| {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    };

    write("package.json", PACKAGE_JSON);
    write(".env.example", ENV_EXAMPLE);
    write("messages/en.json", MESSAGES);
    write("messages/de.json", MESSAGES);
    write("src/i18n/routing.ts", ROUTING);
    write("src/components/navbar.tsx", NAVBAR);
    write("src/components/theme-toggle.tsx", "export function ThemeToggle() {}\n");
    write(
        "src/components/locale-switcher.tsx",
        "export function LocaleSwitcher() {}\n",
    );
    write("src/app/providers.tsx", APP_PROVIDERS);
    write("src/app/[locale]/page.tsx", LANDING_PAGE);
    write("src/app/[locale]/blog/page.tsx", "export default function BlogIndex() {}\n");
    write(
        "src/app/[locale]/pricing/page.tsx",
        "export default function PricingPage() {}\n",
    );
    write("src/app/[locale]/legal/privacy.mdx", "# Privacy\n");
    write("src/app/api/stripe/webhook/route.ts", "export async function POST() {}\n");
    write(
        "src/app/api/auth/magic-link/route.ts",
        "export async function POST() {}\n",
    );
    write("src/app/api/auth/otp/route.ts", "export async function POST() {}\n");
    write(
        "src/app/api/auth/callback/google/route.ts",
        "export async function GET() {}\n",
    );
    write("src/features/index.ts", FEATURES_BARREL);
    write("src/features/blog/index.ts", "export function BlogList() {}\n");
    write(
        "src/features/payments/index.ts",
        "export function PricingSection() {}\n",
    );
    write("src/features/email/send.ts", "export async function sendEmail() {}\n");
    write("src/features/auth/index.ts", AUTH_BARREL);
    write("src/features/auth/sign-in-form.tsx", SIGN_IN_FORM);
    write("src/features/auth/password/form.tsx", "export function PasswordForm() {}\n");
    write(
        "src/features/auth/magic-link/form.tsx",
        "export function MagicLinkForm() {}\n",
    );
    write("src/features/auth/otp/form.tsx", "export function OtpForm() {}\n");
    write("src/features/auth/social/providers.ts", PROVIDER_CONFIGS);
    write(
        "src/features/auth/social/buttons.tsx",
        "export function SocialButtons() {}\n",
    );
    write("src/lib/auth.ts", AUTH_CONFIG);
    write("emails/magic-link.tsx", "export default function MagicLinkEmail() {}\n");
    write("emails/otp.tsx", "export default function OtpEmail() {}\n");
    write("emails/welcome.tsx", "export default function WelcomeEmail() {}\n");
    write("content/blog/hello.mdx", "# Hello\n");

    dir
}

fn config(
    blog: bool,
    payments: bool,
    dark_mode: bool,
    locale: LocaleMode,
    email: bool,
    auth_methods: Vec<AuthMethod>,
) -> SetupConfig {
    let json = serde_json::json!({
        "projectName": "demo-academy",
        "authMethods": auth_methods.iter().map(|m| m.id()).collect::<Vec<_>>(),
        "payments": payments,
        "locale": match locale {
            LocaleMode::En => "en",
            LocaleMode::De => "de",
            LocaleMode::Both => "both",
        },
        "darkMode": dark_mode,
        "email": email,
        "blog": blog,
    });
    serde_json::from_value(json).unwrap()
}

fn run(root: &Path, config: &SetupConfig, dry_run: bool) -> EventLog {
    pipeline::run(
        root,
        config,
        RunOptions {
            dry_run,
            verbose: false,
            skip_install: true,
        },
    )
    .unwrap()
}

/// Steps in invocation order, without the always-recorded install step.
fn module_steps(log: &EventLog) -> Vec<&'static str> {
    log.steps_run()
        .into_iter()
        .filter(|s| *s != "install")
        .collect()
}

/// Snapshot every file in the tree for byte-level comparison.
fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap()
            .to_string_lossy()
            .into_owned();
        files.insert(rel, fs::read(entry.path()).unwrap());
    }
    files
}

#[test]
fn test_blog_only_scenario_runs_blog_and_auth() {
    let dir = fixture_project();
    let cfg = config(
        false,
        true,
        true,
        LocaleMode::Both,
        true,
        vec![AuthMethod::Password],
    );

    let log = run(dir.path(), &cfg, false);

    // The deselected auth flows are pruned as part of auth configuration,
    // not as pipeline steps of their own
    assert_eq!(module_steps(&log), vec!["blog", "auth"]);
    assert!(!dir.path().join("src/features/blog").exists());
    assert!(!dir.path().join("content/blog").exists());
    assert!(!dir.path().join("src/features/auth/magic-link").exists());
    assert!(!dir.path().join("src/features/auth/otp").exists());
    assert!(!dir.path().join("src/features/auth/social").exists());

    let navbar = fs::read_to_string(dir.path().join("src/components/navbar.tsx")).unwrap();
    assert!(!navbar.contains("/blog"));
    assert!(!navbar.contains("Blog index"));
    assert!(navbar.contains("/pricing"));

    // Legal pages still consume gray-matter, so it must survive
    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("gray-matter"));
    assert!(!manifest.contains("next-mdx-remote"));
}

#[test]
fn test_blog_removal_drops_shared_package_when_legal_absent() {
    let dir = fixture_project();
    fs::remove_dir_all(dir.path().join("src/app/[locale]/legal")).unwrap();

    let cfg = config(
        false,
        true,
        true,
        LocaleMode::Both,
        true,
        vec![AuthMethod::Password, AuthMethod::Google],
    );
    run(dir.path(), &cfg, false);

    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(!manifest.contains("gray-matter"));
}

#[test]
fn test_email_cascade_forces_dependent_flows_out() {
    let dir = fixture_project();
    // Magic-link and otp explicitly selected, but email is off
    let cfg = config(
        true,
        true,
        true,
        LocaleMode::Both,
        false,
        vec![
            AuthMethod::Password,
            AuthMethod::MagicLink,
            AuthMethod::Otp,
            AuthMethod::Google,
        ],
    );

    let log = run(dir.path(), &cfg, false);

    assert_eq!(module_steps(&log), vec!["email", "magic-link", "otp", "auth"]);

    // Email precedes both dependents in the event stream
    let email_index = log.first_index_of("email").unwrap();
    assert!(email_index < log.first_index_of("magic-link").unwrap());
    assert!(email_index < log.first_index_of("otp").unwrap());

    assert!(!dir.path().join("src/features/email").exists());
    assert!(!dir.path().join("emails").exists());
    assert!(!dir.path().join("src/features/auth/magic-link").exists());
    assert!(!dir.path().join("src/features/auth/otp").exists());

    // The effective method set excludes the email-delivered flows
    let auth_config = fs::read_to_string(dir.path().join("src/lib/auth.ts")).unwrap();
    assert!(auth_config.contains(r#"export const authMethods = ["password", "google"];"#));

    // Partial social removal: google stays, github and apple go
    let env = fs::read_to_string(dir.path().join(".env.example")).unwrap();
    assert!(env.contains("GOOGLE_CLIENT_ID"));
    assert!(!env.contains("GITHUB_CLIENT_ID"));
    assert!(!env.contains("APPLE_CLIENT_ID"));
}

#[test]
fn test_auth_configuration_is_always_last() {
    let dir = fixture_project();
    let cfg = config(
        false,
        false,
        false,
        LocaleMode::En,
        false,
        vec![AuthMethod::Password],
    );

    let log = run(dir.path(), &cfg, false);

    let steps = module_steps(&log);
    assert_eq!(steps.last(), Some(&"auth"));
    assert_eq!(
        steps,
        vec!["blog", "payments", "theme", "locale", "email", "magic-link", "otp", "auth"]
    );
}

#[test]
fn test_all_features_kept_only_configures_auth() {
    let dir = fixture_project();
    let cfg = config(
        true,
        true,
        true,
        LocaleMode::Both,
        true,
        vec![
            AuthMethod::Password,
            AuthMethod::MagicLink,
            AuthMethod::Otp,
            AuthMethod::Google,
            AuthMethod::Github,
            AuthMethod::Apple,
        ],
    );

    let log = run(dir.path(), &cfg, false);

    assert_eq!(module_steps(&log), vec!["auth"]);
    assert!(dir.path().join("src/features/blog").exists());
    assert!(dir.path().join("src/features/payments").exists());
    assert!(dir.path().join("messages/de.json").exists());

    let env = fs::read_to_string(dir.path().join(".env.example")).unwrap();
    assert!(env.contains("STRIPE_SECRET_KEY"));
    assert!(env.contains("APPLE_CLIENT_SECRET"));
}

#[test]
fn test_single_locale_reconfiguration() {
    let dir = fixture_project();
    let cfg = config(
        true,
        true,
        true,
        LocaleMode::En,
        true,
        vec![AuthMethod::Password, AuthMethod::Google],
    );

    run(dir.path(), &cfg, false);

    assert!(!dir.path().join("messages/de.json").exists());
    assert!(dir.path().join("messages/en.json").exists());

    let routing = fs::read_to_string(dir.path().join("src/i18n/routing.ts")).unwrap();
    assert!(routing.contains(r#"export const locales = ["en"];"#));
    assert!(routing.contains(r#"export const defaultLocale = "en";"#));

    let navbar = fs::read_to_string(dir.path().join("src/components/navbar.tsx")).unwrap();
    assert!(!navbar.contains("LocaleSwitcher"));

    let messages = fs::read_to_string(dir.path().join("messages/en.json")).unwrap();
    assert!(!messages.contains("localeSwitcher"));
}

#[test]
fn test_locale_both_never_reconfigures() {
    let dir = fixture_project();
    let cfg = config(
        true,
        true,
        true,
        LocaleMode::Both,
        true,
        vec![AuthMethod::Password, AuthMethod::Google],
    );

    let log = run(dir.path(), &cfg, false);

    assert!(!module_steps(&log).contains(&"locale"));
    assert!(dir.path().join("messages/de.json").exists());
}

#[test]
fn test_full_social_removal_strips_oauth_section() {
    let dir = fixture_project();
    let cfg = config(
        true,
        true,
        true,
        LocaleMode::Both,
        true,
        vec![AuthMethod::Password, AuthMethod::MagicLink, AuthMethod::Otp],
    );

    run(dir.path(), &cfg, false);

    assert!(!dir.path().join("src/features/auth/social").exists());
    assert!(!dir.path().join("src/app/api/auth/callback").exists());

    let env = fs::read_to_string(dir.path().join(".env.example")).unwrap();
    assert!(!env.contains("Social login providers"));
    assert!(!env.contains("GOOGLE_"));
    assert!(!env.contains("\n\n\n"));

    let auth_config = fs::read_to_string(dir.path().join("src/lib/auth.ts")).unwrap();
    assert!(!auth_config.contains("socialProviders"));
    assert!(!auth_config.contains("providerConfigs"));
    assert!(auth_config
        .contains(r#"export const authMethods = ["password", "magic-link", "otp"];"#));

    let form = fs::read_to_string(dir.path().join("src/features/auth/sign-in-form.tsx")).unwrap();
    assert!(!form.contains("SocialButtons"));
    assert!(!form.contains("external identity provider"));

    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(!manifest.contains("arctic"));
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = fixture_project();
    let cfg = config(
        true,
        true,
        true,
        LocaleMode::Both,
        false,
        vec![
            AuthMethod::Password,
            AuthMethod::MagicLink,
            AuthMethod::Otp,
            AuthMethod::Google,
        ],
    );

    let first = run(dir.path(), &cfg, false);
    let after_first = snapshot(dir.path());

    let second = run(dir.path(), &cfg, false);
    let after_second = snapshot(dir.path());

    // Same routines, exactly once each; same final tree
    assert_eq!(module_steps(&first), module_steps(&second));
    assert_eq!(after_first, after_second);

    // Nothing on the second pass found anything left to delete
    let removed_twice = second
        .events()
        .iter()
        .filter(|e| {
            matches!(
                e.action,
                tailorkit::Action::RemoveDir | tailorkit::Action::RemoveFile
            ) && e.outcome == Outcome::Applied
        })
        .count();
    assert_eq!(removed_twice, 0);
}

#[test]
fn test_dry_run_is_pure_and_names_the_same_targets() {
    let dry_dir = fixture_project();
    let real_dir = fixture_project();
    // Email stays so the magic-link/otp sweeps see the same emails/ directory
    // in both runs; a real run would otherwise delete it first
    let cfg = config(
        false,
        false,
        true,
        LocaleMode::Both,
        true,
        vec![AuthMethod::Password, AuthMethod::Github],
    );

    let before = snapshot(dry_dir.path());
    let dry_log = run(dry_dir.path(), &cfg, true);
    assert_eq!(before, snapshot(dry_dir.path()), "dry run touched the tree");

    let real_log = run(real_dir.path(), &cfg, false);

    // Same call graph: identical (step, action, relative-target) streams
    let strip = |log: &EventLog, root: &Path| -> Vec<(String, String)> {
        log.events()
            .iter()
            .filter(|e| e.step != "install")
            .map(|e| {
                let rel = e
                    .target
                    .strip_prefix(root)
                    .unwrap_or(&e.target)
                    .to_string_lossy()
                    .into_owned();
                (e.step.to_string(), rel)
            })
            .collect()
    };
    assert_eq!(strip(&dry_log, dry_dir.path()), strip(&real_log, real_dir.path()));
}
