//! Tailorkit - module removal engine for the Learnhub starter.
//!
//! The Learnhub template generates a fully-featured course-platform project;
//! tailorkit prunes the modules the user did not select and reconfigures the
//! retained sources. The engine is deterministic, idempotent, and dry-run
//! aware: every mutation treats an absent target as "nothing to do", a dry
//! run produces the same event stream as a real run without touching the
//! filesystem, and per-file failures are absorbed so one bad rewrite never
//! aborts a whole scaffolding run.
//!
//! ## Architecture
//!
//! - `fsops` - dry-run-aware mutation primitives
//! - `modules` - the embedded feature-to-filesystem map and its resolver
//! - `manifest` / `envfile` / `transforms` - structural rewrites of
//!   package.json, .env.example, locale files, and code-like declarations
//! - `remove` - one fixed routine per feature
//! - `pipeline` - the eight-step orchestrator and the dependency cascade
//! - `events` - the structured log every run returns

pub mod config;
pub mod envfile;
pub mod events;
pub mod fsops;
pub mod manifest;
pub mod modules;
pub mod pipeline;
pub mod remove;
pub mod transforms;

// Re-export commonly used items
pub use config::{AuthMethod, LocaleMode, SetupConfig};
pub use events::{Action, Event, EventLog, Outcome};
pub use fsops::MutationOptions;
pub use modules::{load_module_map, resolve, Feature, ModuleDescriptor, ModuleMap};
pub use pipeline::{run, RunOptions};
