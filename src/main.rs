use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;
use tailorkit::{load_module_map, pipeline, Feature, Outcome, RunOptions, SetupConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Tailor a freshly generated Learnhub starter to the selected feature set",
    long_about = None
)]
struct Args {
    /// Project root produced by the template generator (defaults to current directory)
    #[arg(default_value = ".")]
    project_dir: PathBuf,

    /// Setup configuration JSON written by the prompt flow
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log every mutation without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Show detailed information, including targets that were already absent
    #[arg(long, short)]
    verbose: bool,

    /// Skip the package-manager install at the end
    #[arg(long)]
    skip_install: bool,

    /// Print the module map and exit
    #[arg(long)]
    list_modules: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_modules {
        return list_modules();
    }

    let Some(config_path) = args.config else {
        bail!("--config is required; pass the selections file written by the prompt flow");
    };
    let config = SetupConfig::load(&config_path)?;

    if !args.project_dir.is_dir() {
        bail!(
            "project directory {} does not exist",
            args.project_dir.display()
        );
    }

    println!(
        "{}",
        format!("Tailoring '{}'...", config.project_name).bold()
    );
    if args.dry_run {
        println!("{}", "Dry run: no files will be modified.".yellow());
    }

    let started = Instant::now();
    let log = pipeline::run(
        &args.project_dir,
        &config,
        RunOptions {
            dry_run: args.dry_run,
            verbose: args.verbose,
            skip_install: args.skip_install,
        },
    )?;

    let counts = log.counts_by_outcome();
    let applied = counts.get(&Outcome::Applied).copied().unwrap_or(0);
    let absent = counts.get(&Outcome::NotFound).copied().unwrap_or(0);
    let warnings = log.warning_count();

    println!("========================================");
    if args.dry_run {
        println!("Mutations that would be applied: {}", applied);
    } else {
        println!("Mutations applied: {}", applied);
    }
    if absent > 0 {
        println!("Targets already absent: {}", absent);
    }
    if warnings > 0 {
        println!("{}", format!("Warnings: {}", warnings).yellow().bold());
    }
    println!("Completed in {:.1}s", started.elapsed().as_secs_f64());

    Ok(())
}

fn list_modules() -> Result<()> {
    let map = load_module_map()?;

    for feature in Feature::all() {
        let module = map.get(feature);
        println!("{} ({})", module.name.bold(), feature.key());
        for dir in &module.directories {
            println!("  dir     {}", dir.display());
        }
        for file in &module.files {
            println!("  file    {}", file.display());
        }
        for package in &module.packages {
            println!("  pkg     {}", package);
        }
        for prefix in &module.env_prefixes {
            println!("  env     {}*", prefix);
        }
        if let Some(section) = &module.env_section {
            println!("  section {}", section);
        }
        for script in &module.scripts {
            println!("  script  {}", script);
        }
        if !module.requires.is_empty() {
            let deps: Vec<&str> = module.requires.iter().map(|f| f.key()).collect();
            println!("  needs   {}", deps.join(", "));
        }
        println!();
    }

    Ok(())
}
