//! Contract document linter CLI.
//!
//! Usage:
//!   accord-lint <directory_or_file> [OPTIONS]

use accord_contract::LoaderConfig;
use accord_lint::{lint_path, LintIssue, LintOptions, LintReport, LintResult, Severity};
use anyhow::Context;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Contract document linter
#[derive(Parser, Debug)]
#[command(name = "accord-lint")]
#[command(
    author,
    version,
    about = "Validate Rhai and YAML contract documents"
)]
struct Args {
    /// Contract document, or directory searched recursively for documents
    #[arg(required = true)]
    path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    output: String,

    /// Only show errors (hide warnings)
    #[arg(short = 'e', long)]
    errors_only: bool,

    /// Strict mode - treat warnings as errors
    #[arg(short, long)]
    strict: bool,

    /// Verbose output and debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the resolved contracts as JSON
    #[arg(short, long)]
    dump: bool,

    /// Loader configuration file (YAML)
    #[arg(short, long, env = "ACCORD_LINT_CONFIG")]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(passed) => std::process::exit(if passed { 0 } else { 1 }),
        Err(e) => {
            eprintln!("{RED}{BOLD}error:{RESET} {e:#}");
            std::process::exit(2);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let loader = match &args.config {
        Some(path) => LoaderConfig::from_file(path)
            .with_context(|| format!("Invalid loader configuration {}", path.display()))?,
        None => LoaderConfig::default(),
    };
    let options = LintOptions {
        loader,
        verbose: args.verbose,
    };

    if args.output == "json" {
        let report = lint_path(&args.path, &options);
        print_report_json(&report, args.dump)?;
        return Ok(report.result.passes(args.strict));
    }

    println!("{BOLD}{CYAN}Accord Contract Linter{RESET}");
    println!("{DIM}{RULE}{RESET}");
    println!("{DIM}Scanning:{RESET} {CYAN}{}{RESET}", args.path.display());

    let report = lint_path(&args.path, &options);
    if report.result.files_checked == 0 {
        println!(
            "{YELLOW}Warning:{RESET} No contract documents found in {}",
            args.path.display()
        );
        return Ok(true);
    }
    println!(
        "{DIM}Found:{RESET}    {BOLD}{}{RESET} document(s)\n",
        report.result.files_checked
    );

    print_results(&report.result, args);

    if args.dump {
        println!();
        println!("{BOLD}{CYAN}Contracts{RESET}");
        println!("{DIM}{RULE}{RESET}");
        println!("{}", serde_json::to_string_pretty(&report.files)?);
    }

    Ok(report.result.passes(args.strict))
}

fn print_report_json(report: &LintReport, dump: bool) -> anyhow::Result<()> {
    let output = if dump {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string_pretty(&report.result)?
    };
    println!("{output}");
    Ok(())
}

fn print_results(result: &LintResult, args: &Args) {
    let mut issues_by_file: BTreeMap<&Path, Vec<&LintIssue>> = BTreeMap::new();
    for issue in &result.issues {
        if args.errors_only && issue.severity != Severity::Error {
            continue;
        }
        issues_by_file.entry(issue.file.as_path()).or_default().push(issue);
    }

    if issues_by_file.is_empty() {
        println!("{GREEN}{BOLD}No issues found!{RESET}");
    }

    for (file, issues) in &issues_by_file {
        let file_errors = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        let file_warnings = issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count();

        let status_indicator = if file_errors > 0 {
            format!("{RED}FAIL{RESET}")
        } else if file_warnings > 0 {
            format!("{YELLOW}WARN{RESET}")
        } else {
            format!("{CYAN}INFO{RESET}")
        };

        let counts = match (file_errors, file_warnings) {
            (0, 0) => String::new(),
            (e, 0) => format!(" {DIM}({RED}{e} error(s){RESET}{DIM}){RESET}"),
            (0, w) => format!(" {DIM}({YELLOW}{w} warning(s){RESET}{DIM}){RESET}"),
            (e, w) => format!(
                " {DIM}({RED}{e} error(s){RESET}{DIM}, {YELLOW}{w} warning(s){RESET}{DIM}){RESET}"
            ),
        };

        println!("{status_indicator} {BOLD}{CYAN}{}{RESET}{counts}", file.display());

        for issue in issues {
            let color = severity_color(&issue.severity);
            let marker = format!("{color}|{RESET}");
            let location = issue
                .location
                .as_ref()
                .map(|l| format!("{DIM}[{RESET}{CYAN}{l}{RESET}{DIM}]{RESET} "))
                .unwrap_or_default();
            let contract = issue
                .contract
                .as_ref()
                .map(|c| format!("{BOLD}{c}{RESET}: "))
                .unwrap_or_default();

            println!(
                "  {marker} {location}{BOLD}{color}{}{RESET}: {contract}{} {DIM}({color}{}{DIM}){RESET}",
                issue.severity.label(),
                issue.message,
                issue.code
            );
            if let Some(suggestion) = &issue.suggestion {
                println!("  {marker}   {GREEN}-> {suggestion}{RESET}");
            }
        }
        println!();
    }

    println!("{DIM}{RULE}{RESET}");
    println!("{BOLD}{CYAN}Summary{RESET}");
    println!("{DIM}{RULE}{RESET}");
    println!(
        "  {DIM}Documents:{RESET} {BOLD}{}{RESET}",
        result.files_checked
    );
    println!(
        "  {DIM}Contracts:{RESET} {BOLD}{}{RESET}",
        result.contracts_checked
    );
    if result.errors > 0 {
        println!("  {RED}Errors:{RESET}    {BOLD}{RED}{}{RESET}", result.errors);
    } else {
        println!("  {GREEN}Errors:{RESET}    {BOLD}{GREEN}0{RESET}");
    }
    if result.warnings > 0 {
        println!(
            "  {YELLOW}Warnings:{RESET}  {BOLD}{YELLOW}{}{RESET}",
            result.warnings
        );
    } else {
        println!("  {DIM}Warnings:{RESET}  {BOLD}0{RESET}");
    }
    println!();

    if result.passes(args.strict) && !result.has_warnings() {
        println!("{GREEN}{BOLD}All checks passed!{RESET}");
    } else if result.passes(args.strict) {
        println!("{YELLOW}{BOLD}Passed with warnings{RESET}");
    } else if result.has_errors() {
        println!("{RED}{BOLD}Linting failed with errors{RESET}");
    } else {
        println!("{RED}{BOLD}Linting failed: warnings are errors in strict mode{RESET}");
    }
}

fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
        Severity::Info => CYAN,
    }
}
