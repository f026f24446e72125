//! Contract document linter.
//!
//! Loads Rhai and YAML contract documents through `accord-contract`, then
//! reports evaluation failures, invariant violations, suspicious settings and
//! contract names that clash across documents. Usable as a library or through
//! the `accord-lint` binary.
//!
//! # Example
//!
//! ```no_run
//! use accord_lint::{lint_directory, lint_file, LintOptions};
//! use std::path::Path;
//!
//! let options = LintOptions::default();
//! let result = lint_file(Path::new("contracts/shouldMarkClientAsFraud.rhai"), &options);
//! let result = lint_directory(Path::new("contracts"), &options);
//!
//! if result.has_errors() {
//!     eprintln!("Found {} errors", result.errors);
//! }
//! ```

mod checks;
mod types;

use std::path::{Path, PathBuf};

use accord_contract::{
    assign_default_names, Contract, ContractConverter, ContractError, ContractFile,
    ContractLoader, ContractScanner, RhaiContractConverter, YamlContractConverter,
};

pub use checks::{check_contract, check_duplicate_names};
pub use types::{LintIssue, LintOptions, LintReport, LintResult, Severity};

/// Lint a single contract document.
pub fn lint_file(path: &Path, options: &LintOptions) -> LintResult {
    lint_documents(&[path.to_path_buf()], options).result
}

/// Lint every accepted document below `path`, recursively.
pub fn lint_directory(path: &Path, options: &LintOptions) -> LintResult {
    lint_path(path, options).result
}

/// Lint a file or a directory and keep the contracts that loaded.
///
/// An explicit file argument is always checked and reported when no
/// converter accepts it. Inside a directory such files are skipped.
pub fn lint_path(path: &Path, options: &LintOptions) -> LintReport {
    if path.is_file() {
        return lint_documents(&[path.to_path_buf()], options);
    }

    let documents = ContractScanner::new(path, &options.loader)
        .map_err(|e| e.to_string())
        .and_then(|scanner| scanner.documents().map_err(|e| e.to_string()));
    match documents {
        Ok(documents) => lint_documents(&documents, options),
        Err(message) => {
            let mut report = LintReport::default();
            report.result.add_issue(LintIssue::error(
                "E001",
                format!("Failed to read directory: {message}"),
                path,
            ));
            report
        }
    }
}

/// Lint the given documents, then check names across all of them.
pub fn lint_documents(paths: &[PathBuf], options: &LintOptions) -> LintReport {
    let loader = ContractLoader::new(&options.loader);
    let mut report = LintReport::default();

    for path in paths {
        report.result.files_checked += 1;
        match loader.load(path) {
            Ok(contracts) => {
                check_document(path, &contracts, &mut report.result, options);
                report.files.push(ContractFile {
                    path: path.clone(),
                    contracts,
                });
            }
            Err(err) => report.result.add_issue(load_issue(path, &err)),
        }
    }

    check_duplicate_names(&report.files, &mut report.result);
    tracing::debug!(
        "Linted {} document(s): {} error(s), {} warning(s)",
        report.result.files_checked,
        report.result.errors,
        report.result.warnings
    );
    report
}

/// Lint an in-memory document. `source_name` picks the format by extension
/// (Rhai unless it names a YAML file) and seeds default contract names.
pub fn lint_source(source: &str, source_name: &str, options: &LintOptions) -> LintResult {
    let path = Path::new(source_name);
    let mut result = LintResult::new();
    result.files_checked = 1;

    let yaml = YamlContractConverter::new(options.loader.clone());
    let converted = if yaml.is_accepted(path) {
        yaml.convert_source(path, source)
    } else {
        RhaiContractConverter::new(options.loader.clone()).convert_source(path, source)
    };

    match converted {
        Ok(mut contracts) => {
            assign_default_names(path, &mut contracts);
            check_document(path, &contracts, &mut result, options);
            check_duplicate_names(
                &[ContractFile {
                    path: path.to_path_buf(),
                    contracts,
                }],
                &mut result,
            );
        }
        Err(err) => result.add_issue(load_issue(path, &err)),
    }
    result
}

fn check_document(path: &Path, contracts: &[Contract], result: &mut LintResult, options: &LintOptions) {
    if contracts.is_empty() {
        result.add_issue(
            LintIssue::warning("W001", "Document produced no contracts", path).with_suggestion(
                "Make the last expression a contract() or an array of contracts",
            ),
        );
    }
    for (index, contract) in contracts.iter().enumerate() {
        result.contracts_checked += 1;
        check_contract(path, index, contract, result, options);
    }
}

fn load_issue(path: &Path, err: &ContractError) -> LintIssue {
    match err {
        ContractError::Io { source, .. } => {
            LintIssue::error("E001", format!("Failed to read file: {source}"), path)
        }
        ContractError::DocumentRejected { .. } => LintIssue::error(
            "E003",
            "No converter accepts this document",
            path,
        )
        .with_suggestion("Use a .rhai, .yml or .yaml extension"),
        ContractError::ScriptEvaluation { message, .. } => {
            LintIssue::error("E002", format!("Evaluation failed: {message}"), path)
        }
        other => LintIssue::error("E002", other.to_string(), path),
    }
}
