//! Stylescope CLI - static CSS analysis for a single element
//!
//! Usage: stylescope [OPTIONS] [CSS_FILES]...
//!
//! Describes the element with `--class`, `--id`, `--tag`, `--data` and
//! `--part` (or a JSON identity file), then prints the rules that target it,
//! the properties those rules fight over, and the classes no rule styles.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use stylescope_css::{
    AnalysisReport, Analyzer, AnalyzerOptions, CascadeDecision, Candidate, FileMatches, LinkOrder,
    MatchCache, RuleMatch, StyleSheet, TargetIdentity,
};
use stylescope_common::warning::clear_warnings;

/// Stylescope - find the CSS rules that target an element
#[derive(Parser, Debug)]
#[command(name = "stylescope")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Which rules style <button class="btn btn-primary" id="save">?
    stylescope styles/*.css --tag button --class btn --class btn-primary --id save

    # Resolve conflicts in the order the page links its stylesheets
    stylescope base.css theme.css --class card --link theme.css --link base.css

    # Read the element from a JSON identity file and print JSON
    stylescope app.scss --identity element.json --json

    # Shadow DOM parts and data attributes
    stylescope components.css --class fancy --part label --data state
"#)]
struct Cli {
    /// Stylesheets to analyze (CSS, SCSS or Less)
    #[arg(value_name = "CSS_FILES")]
    files: Vec<PathBuf>,

    /// Class on the element (repeatable, or space separated)
    #[arg(long = "class", value_name = "CLASS")]
    classes: Vec<String>,

    /// Id of the element (repeatable)
    #[arg(long = "id", value_name = "ID")]
    ids: Vec<String>,

    /// Tag name of the element
    #[arg(long, value_name = "TAG")]
    tag: Option<String>,

    /// Data attribute on the element, with or without the `data-` prefix
    #[arg(long = "data", value_name = "ATTR")]
    data_attributes: Vec<String>,

    /// Shadow part name exposed by the element
    #[arg(long = "part", value_name = "PART")]
    parts: Vec<String>,

    /// JSON file describing the element; flags add to it
    #[arg(long, value_name = "FILE")]
    identity: Option<PathBuf>,

    /// Stylesheet link order of the page, first linked first
    #[arg(long = "link", value_name = "FILE")]
    links: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Match files one at a time instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Warn when one nested rule expands into more selectors than this
    #[arg(long, default_value = "16", value_name = "N")]
    fan_out_warning: usize,

    /// Number of per-file match results kept in the cache (0 disables it)
    #[arg(long, default_value = "256", value_name = "N")]
    cache_capacity: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    clear_warnings();

    let identity = build_identity(&cli)?;
    let sheets = cli
        .files
        .iter()
        .map(|path| StyleSheet::load(path).with_context(|| format!("loading {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let cache = MatchCache::new(cli.cache_capacity);
    let analyzer = Analyzer::new(AnalyzerOptions {
        parallel: !cli.sequential,
        fan_out_warning: cli.fan_out_warning,
    })
    .with_cache(&cache);
    let report = analyzer.analyze(&identity, &sheets, &LinkOrder::new(&cli.links));

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&identity, &report);
    }
    Ok(())
}

/// Start from the `--identity` file, if any, then apply the flags on top.
fn build_identity(cli: &Cli) -> Result<TargetIdentity> {
    let mut identity = match cli.identity {
        Some(ref path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading identity {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing identity {}", path.display()))?
        }
        None => TargetIdentity::new(),
    };

    for class in &cli.classes {
        identity = identity.with_class_attribute(class);
    }
    for id in &cli.ids {
        identity = identity.with_id(id.as_str());
    }
    if let Some(ref tag) = cli.tag {
        identity = identity.with_tag(tag.as_str());
    }
    for name in &cli.data_attributes {
        identity = identity.with_data_attribute(name);
    }
    for part in &cli.parts {
        identity = identity.with_part(part.as_str());
    }
    Ok(identity.normalized())
}

fn print_report(identity: &TargetIdentity, report: &AnalysisReport) {
    println!("=== Target ===");
    println!("{}", describe(identity).bold());
    println!();

    println!("=== Matched Rules ===");
    let mut any = false;
    for file in report.files.iter().filter(|file| !file.matches.is_empty()) {
        any = true;
        print_file(file, &file.matches);
    }
    if !any {
        println!("{}", "(no rules target this element)".dimmed());
    }
    println!();

    if report.shadow_matches().next().is_some() {
        println!("=== Shadow DOM Rules ===");
        for file in report.files.iter().filter(|file| !file.shadow_matches.is_empty()) {
            print_file(file, &file.shadow_matches);
        }
        println!();
    }

    println!("=== Conflicts ===");
    if report.conflicts.is_empty() {
        println!("{}", "(no property is set more than once)".dimmed());
    }
    for (property, decision) in &report.conflicts {
        print_conflict(property, decision);
    }
    println!();

    println!("=== Ghost Classes ===");
    let ghosts = &report.ghosts;
    println!(
        "{} of {} classes styled by these stylesheets",
        ghosts.defined_classes.len(),
        ghosts.total_classes
    );
    for class in &ghosts.ghost_classes {
        println!("  {} .{class}", "ghost".red());
    }
}

fn print_file(file: &FileMatches, matches: &[RuleMatch]) {
    println!("{}", file.file.cyan().bold());
    for rule in matches {
        let lines = if rule.start_line == rule.end_line {
            rule.start_line.to_string()
        } else {
            format!("{}-{}", rule.start_line, rule.end_line)
        };
        println!("  {}  {}", format!("{}:{lines}", file.file).dimmed(), rule.selector.green());
        if rule.original_selector != rule.selector {
            println!("      written as {}", rule.original_selector);
        }
        if !rule.context.is_empty() {
            println!("      inside {}", rule.context.yellow());
        }
        let reasons: Vec<String> = rule.reasons.iter().map(ToString::to_string).collect();
        println!("      specificity {}  [{}]", rule.specificity, reasons.join(", "));
    }
}

fn print_conflict(property: &str, decision: &CascadeDecision) {
    println!("{}", property.bold());
    println!("  {} {}", "wins ".green(), describe_candidate(&decision.winner));
    for loser in &decision.losers {
        println!("  {} {}", "loses".red(), describe_candidate(loser).dimmed());
    }
}

fn describe_candidate(candidate: &Candidate) -> String {
    let important = if candidate.important { " !important" } else { "" };
    let context = if candidate.context.is_empty() {
        String::new()
    } else {
        format!(" in {}", candidate.context)
    };
    format!(
        "{}{important}  {} {}  ({}:{}){context}",
        candidate.value, candidate.selector, candidate.specificity, candidate.file, candidate.line
    )
}

fn describe(identity: &TargetIdentity) -> String {
    let mut text = identity.tag.clone().unwrap_or_else(|| "*".to_string());
    for id in &identity.ids {
        text.push('#');
        text.push_str(id);
    }
    for class in &identity.classes {
        text.push('.');
        text.push_str(class);
    }
    for name in &identity.data_attributes {
        text.push('[');
        text.push_str(name);
        text.push(']');
    }
    for part in &identity.shadow_parts {
        text.push_str(" part=");
        text.push_str(part);
    }
    text
}
