//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands.

use crate::cli::output::{
    describe_color, format_activation, format_overrides, format_scenario_result, format_summary,
};
use crate::cli::{Args, Commands};
use crate::color::{darken, lighten};
use crate::core::config::{get_config_path, Config, SessionConfig};
use crate::core::scanner::ScanStats;
use crate::core::session::{ActivationReport, DarkModeSession};
use crate::page::{Declaration, DocumentTree, PageSnapshot};
use crate::testdb::{self, MockPage, ScenarioLibrary, ScenarioRunner};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything `apply` reports about a page
#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub activation: ActivationReport,
    /// Passes run for the snapshot's insertions
    pub incremental: ScanStats,
    pub overrides: Vec<Declaration>,
    pub variables: BTreeMap<String, String>,
}

/// Run the appropriate command based on CLI arguments
pub fn run_command(args: &Args, config: &Config) -> Result<()> {
    match &args.command {
        Commands::Darken { color } => println!("{}", darken(color)),
        Commands::Lighten { color } => println!("{}", lighten(color)),
        Commands::Inspect { color } => {
            for line in describe_color(color) {
                println!("{}", line);
            }
        }
        Commands::Apply {
            page,
            json,
            incremental_borders,
        } => {
            let mut session = config.session.clone();
            if let Some(borders) = incremental_borders {
                session.incremental_borders = *borders;
            }
            apply_page(page, session, *json)?;
        }
        Commands::Scenario { name, json } => {
            run_scenario(name, &config.session, *json)?;
        }
        Commands::ListScenarios { tag } => list_scenarios(tag.as_deref()),
        Commands::ShowConfig => show_config(config),
        Commands::GenerateConfig { output } => {
            generate_config_file(output.clone())?;
        }
    }
    Ok(())
}

/// Activate a session on a snapshot, replay its insertions and collect what it did
pub fn apply_snapshot(snapshot: &PageSnapshot, config: SessionConfig) -> Result<(MockPage, ApplyReport)> {
    let mut page = MockPage::from_snapshot(snapshot);
    let mut session = DarkModeSession::new(config);
    let activation = session
        .activate(&mut page)
        .context("Failed to activate dark mode on page")?;

    let body = page.body().context("Page has no body")?;
    for subtree in &snapshot.insertions {
        page.insert_subtree(body, subtree)?;
    }
    let incremental = session.flush(&mut page)?;
    session.stop(&mut page)?;

    let variables = snapshot
        .root_properties
        .keys()
        .filter_map(|name| {
            let now = page.root_property(name)?;
            (snapshot.root_properties.get(name).map(String::as_str) != Some(now))
                .then(|| (name.clone(), now.to_string()))
        })
        .collect();

    let report = ApplyReport {
        activation,
        incremental,
        overrides: page.overrides(),
        variables,
    };
    Ok((page, report))
}

fn apply_page(path: &Path, config: SessionConfig, json: bool) -> Result<()> {
    let snapshot = PageSnapshot::load(path)
        .with_context(|| format!("Failed to load page snapshot '{}'", path.display()))?;
    debug!(
        "Loaded {} elements from {}",
        snapshot.root.element_count(),
        path.display()
    );

    let (page, report) = apply_snapshot(&snapshot, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for line in format_activation(&report.activation) {
        println!("{}", line);
    }
    if !snapshot.insertions.is_empty() {
        println!(
            "Inserted:    {} elements, {} overrides",
            report.incremental.elements_visited, report.incremental.overrides_written
        );
    }
    if !report.variables.is_empty() {
        println!();
        println!("Variables:");
        for (name, value) in &report.variables {
            println!("  {}: {}", name, value);
        }
    }
    if !report.overrides.is_empty() {
        println!();
        println!("Overrides:");
        for line in format_overrides(&report.overrides, |d| page.tag_of(d.node)) {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn run_scenario(name: &str, config: &SessionConfig, json: bool) -> Result<()> {
    let runner = ScenarioRunner::new(config.clone());
    let scenarios = if name == "all" {
        ScenarioLibrary::all_scenarios()
    } else {
        match ScenarioLibrary::by_name(name) {
            Some(scenario) => vec![scenario],
            None => bail!(
                "Unknown scenario '{}'. Available: {}",
                name,
                testdb::list_scenario_names().join(", ")
            ),
        }
    };

    let summary = runner.run_scenarios(scenarios);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for result in &summary.results {
            for line in format_scenario_result(result) {
                println!("{}", line);
            }
        }
        println!();
        println!("{}", format_summary(&summary));
    }

    if summary.failed > 0 {
        bail!("{} scenario(s) failed", summary.failed);
    }
    Ok(())
}

fn list_scenarios(tag: Option<&str>) {
    let scenarios = match tag {
        Some(tag) => ScenarioLibrary::by_tag(tag),
        None => ScenarioLibrary::all_scenarios(),
    };
    for scenario in &scenarios {
        println!(
            "  • {:<20} {} [{}]",
            scenario.name,
            scenario.description,
            scenario.tags.join(", ")
        );
    }
    println!();
    println!("Total: {} scenarios", scenarios.len());
}

/// Write the commented default config to `output` or the standard location
pub fn generate_config_file(output: Option<PathBuf>) -> Result<()> {
    let output_path = match output {
        Some(path) => path,
        None => get_config_path().context("Could not determine config directory")?,
    };

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&output_path, Config::generate_default_config())
        .with_context(|| format!("Failed to write '{}'", output_path.display()))?;

    info!("Configuration file: {}", output_path.display());
    info!("Edit this file to customize the session settings.");
    Ok(())
}

/// Show the current configuration settings
pub fn show_config(config: &Config) {
    let config_path = Config::get_active_config_path();
    info!("Configuration file: {}", config_path.display());
    if !config_path.exists() {
        info!("(Using default settings - no config file found)");
    }
    info!("");
    info!("Current Configuration:");
    info!("----------------------");
    info!("[session]");
    info!("  style_id = {:?}", config.session.style_id);
    info!(
        "  baseline_background = {:?}",
        config.session.baseline_background
    );
    info!("  mutation_delay_ms = {}", config.session.mutation_delay_ms);
    info!(
        "  incremental_borders = {}",
        config.session.incremental_borders
    );
    info!("  skip_processed = {}", config.session.skip_processed);
    info!("  rewrite_variables = {}", config.session.rewrite_variables);
    info!("");
    info!("[logging]");
    info!("  level = {:?}", config.logging.level);
    info!("  log_to_file = {}", config.logging.log_to_file);
    info!("  log_file = \"{}\"", config.logging.log_file.display());
}
