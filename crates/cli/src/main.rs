mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use svds_core::{load_dotenv, SvdsConfig};
use svds_rules::loader::read_export;
use svds_rules::{Diagnostics, LoadStatus, Loaded, RuleSet, SvdsLoader};

use crate::cli::{CliArgs, Command, RulesArg};

fn main() -> Result<ExitCode> {
    load_dotenv();
    let args = CliArgs::parse();

    let config = match args.profile.as_deref() {
        Some(profile) => SvdsConfig::for_profile(profile),
        None => SvdsConfig::from_env(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    config.log_summary();

    match args.command {
        Command::Load {
            path,
            rules,
            diagnostics,
        } => {
            let path = path.unwrap_or_else(|| config.storage.data_dir.clone());
            run_load(&path, &rules_dir(&rules, &config), diagnostics)
        }
        Command::Validate { file, rules } => run_validate(&file, &rules_dir(&rules, &config)),
        Command::Rules { rules } => run_rules(&rules_dir(&rules, &config)),
        Command::Export { file } => run_export(&file),
    }
}

fn rules_dir(arg: &RulesArg, config: &SvdsConfig) -> PathBuf {
    arg.dir
        .clone()
        .unwrap_or_else(|| config.rules.rules_dir.clone())
}

fn open_loader(rules_dir: &Path) -> Result<SvdsLoader> {
    SvdsLoader::from_rules_dir(rules_dir)
        .with_context(|| format!("failed to load rules from {}", rules_dir.display()))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_load(path: &Path, rules_dir: &Path, show_diagnostics: bool) -> Result<ExitCode> {
    let loader = open_loader(rules_dir)?;
    let mut diags = Diagnostics::new();
    let loaded = loader
        .load(path, &mut diags)
        .with_context(|| format!("failed to load {}", path.display()))?;

    match loaded {
        Loaded::Tree(outcome) => {
            for result in &outcome.results {
                match &result.status {
                    LoadStatus::Loaded { family, class } => {
                        eprintln!("  ok        {} -> {family}.{class}", result.path.display())
                    }
                    LoadStatus::Rejected { reasons } => {
                        eprintln!("  rejected  {}", result.path.display());
                        for reason in reasons {
                            eprintln!("              {reason}");
                        }
                    }
                    LoadStatus::Unreadable { error } => {
                        eprintln!("  unreadable {}: {error}", result.path.display())
                    }
                }
            }
            info!(
                loaded = outcome.loaded().count(),
                dropped = outcome.dropped().count(),
                "load complete"
            );
            print_json(&outcome.tree.to_value())?;
        }
        Loaded::Content(value) => print_json(&value)?,
    }

    if show_diagnostics {
        eprintln!("{}", serde_json::to_string_pretty(diags.entries())?);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(file: &Path, rules_dir: &Path) -> Result<ExitCode> {
    let loader = open_loader(rules_dir)?;
    let mut diags = Diagnostics::new();
    let valid = loader
        .validate_file(file, &mut diags)
        .with_context(|| format!("failed to read {}", file.display()))?;

    for d in diags.entries() {
        let level = serde_json::to_value(d.level)?;
        eprintln!("  [{}] {}", level.as_str().unwrap_or("?"), d.message);
    }
    if valid {
        println!("{} is a valid SVDS file", file.display());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} is NOT a valid SVDS file", file.display());
        Ok(ExitCode::FAILURE)
    }
}

fn run_rules(rules_dir: &Path) -> Result<ExitCode> {
    let rules = RuleSet::load(rules_dir)
        .with_context(|| format!("failed to load rules from {}", rules_dir.display()))?;

    println!("files:");
    for name in rules.file_names() {
        println!("  {name}");
    }
    println!("origin fields: {:?}", rules.origin_fields());
    println!("classes:");
    for class in rules.class_names() {
        match rules.class_rule(class) {
            Some(rule) => println!(
                "  {class}\n    required: {:?}\n    optional: {:?}",
                rule.required, rule.optional
            ),
            None => println!("  {class} (no class rule)"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_export(file: &Path) -> Result<ExitCode> {
    let export =
        read_export(file).with_context(|| format!("failed to read {}", file.display()))?;
    println!("software: {}", export.software);
    print_json(&export.content)?;
    Ok(ExitCode::SUCCESS)
}
