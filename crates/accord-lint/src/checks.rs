//! Per-contract and cross-document checks.

use std::collections::BTreeMap;
use std::path::Path;

use accord_contract::{violations, Contract, ContractFile, ValidationError};

use crate::types::{LintIssue, LintOptions, LintResult};

/// Report every invariant violation and suspicious setting of `contract`.
pub fn check_contract(
    file: &Path,
    index: usize,
    contract: &Contract,
    result: &mut LintResult,
    options: &LintOptions,
) {
    let at = |suffix: &str| format!("contracts[{index}]{suffix}");
    let name = contract.name();

    for violation in violations(contract) {
        let (code, location, suggestion) = describe(&violation);
        result.add_issue(
            LintIssue::error(code, violation.to_string(), file)
                .for_contract(name)
                .with_location(at(&location))
                .with_suggestion(suggestion),
        );
    }

    if contract.ignored {
        result.add_issue(
            LintIssue::warning("W002", "Contract is ignored", file)
                .for_contract(name)
                .with_location(at("")),
        );
    }
    if contract.in_progress {
        result.add_issue(
            LintIssue::warning("W003", "Contract is marked as in progress", file)
                .for_contract(name)
                .with_location(at(""))
                .with_suggestion("Finish the contract or remove the in-progress flag"),
        );
    }

    if let Some(output) = contract.output_message() {
        if !output.sent_to.is_set() {
            result.add_issue(
                LintIssue::warning("W004", "Output message has no destination", file)
                    .for_contract(name)
                    .with_location(at(".outputMessage"))
                    .with_suggestion("Set sent_to on the output message"),
            );
        }
    }
    if let Some(input) = contract.input() {
        if !input.message_from.is_set() && input.triggered_by.is_none() {
            result.add_issue(
                LintIssue::warning("W004", "Input has neither a source channel nor a trigger", file)
                    .for_contract(name)
                    .with_location(at(".input"))
                    .with_suggestion("Set message_from or triggered_by on the input"),
            );
        }
    }

    if contract.priority == Some(0) {
        result.add_issue(
            LintIssue::warning("W005", "Priority 0 outranks every other contract", file)
                .for_contract(name)
                .with_location(at(".priority"))
                .with_suggestion("Use 1 for the highest regular priority"),
        );
    }

    if options.verbose {
        let kind = if contract.is_http() {
            "HTTP"
        } else if contract.is_messaging() {
            "messaging"
        } else {
            "empty"
        };
        result.add_issue(
            LintIssue::info("I001", format!("Loaded {kind} contract '{name}'"), file)
                .for_contract(name)
                .with_location(at("")),
        );
    }
}

/// Code, location suffix and suggestion for a validation failure.
fn describe(violation: &ValidationError) -> (&'static str, String, String) {
    match violation {
        ValidationError::MissingUrl => (
            "E010",
            ".request.url".to_string(),
            "Call url(...) or url_path(...) on the request".to_string(),
        ),
        ValidationError::MissingMethod => (
            "E011",
            ".request.method".to_string(),
            "Call method(...) on the request".to_string(),
        ),
        ValidationError::MissingStatus => (
            "E012",
            ".response.status".to_string(),
            "Call status(...) on the response".to_string(),
        ),
        ValidationError::IncompleteHeader { section, name } => (
            "E013",
            format!(".{}.headers", location_key(section)),
            format!("Give header '{name}' both a name and a value"),
        ),
        ValidationError::IncompleteCookie { section, name } => (
            "E014",
            format!(".{}.cookies", location_key(section)),
            format!("Give cookie '{name}' both a name and a value"),
        ),
        ValidationError::IncompleteBodyMatcher { section, path } => (
            "E015",
            format!(".{}.bodyMatchers", location_key(section)),
            if path.trim().is_empty() {
                "Give the body matcher a path".to_string()
            } else {
                format!("Give the body matcher for '{path}' a matching type")
            },
        ),
    }
}

fn location_key(section: &str) -> &str {
    match section {
        "output message" => "outputMessage",
        other => other,
    }
}

/// Report every contract name that is used more than once.
pub fn check_duplicate_names(files: &[ContractFile], result: &mut LintResult) {
    let mut by_name: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
    for file in files {
        for contract in &file.contracts {
            by_name
                .entry(contract.name())
                .or_default()
                .push(file.path.as_path());
        }
    }

    for (name, paths) in by_name {
        if paths.len() < 2 {
            continue;
        }
        let file_names: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        result.add_issue(
            LintIssue::error(
                "E020",
                format!(
                    "Contract name '{name}' is used {} times: {}",
                    paths.len(),
                    file_names.join(", ")
                ),
                paths[0],
            )
            .for_contract(name)
            .with_suggestion("Give each contract a unique name(...)"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_contract::model::{BodyMatchers, Input, OutputMessage, PathType, Request, Response};
    use std::path::PathBuf;

    fn check(contract: &Contract) -> LintResult {
        let mut result = LintResult::new();
        check_contract(
            Path::new("a.rhai"),
            0,
            contract,
            &mut result,
            &LintOptions::default(),
        );
        result
    }

    fn http() -> accord_contract::ContractBuilder {
        Contract::builder()
            .name("a")
            .request(Request::builder().method("GET").url("/").build().unwrap())
            .response(Response::builder().status(200u16).build())
    }

    #[test]
    fn test_valid_contract_has_no_issues() {
        assert!(check(&http().build().unwrap()).issues.is_empty());
    }

    #[test]
    fn test_violations_map_to_codes() {
        let contract = Contract::builder()
            .request(
                Request::builder()
                    .header_name("Content-Type")
                    .cookie("session", "abc")
                    .body_matchers(
                        BodyMatchers::builder()
                            .entry(PathType::JsonPath, "$.id", None)
                            .build(),
                    )
                    .build()
                    .unwrap(),
            )
            .response(Response::builder().build())
            .build()
            .unwrap();
        let result = check(&contract);
        assert_eq!(result.codes(), vec!["E010", "E011", "E012", "E013", "E015"]);
        assert_eq!(
            result.issues[3].location.as_deref(),
            Some("contracts[0].request.headers")
        );
    }

    #[test]
    fn test_flags_and_priority_warn() {
        let contract = http().ignored().in_progress().priority(0).build().unwrap();
        let result = check(&contract);
        assert_eq!(result.codes(), vec!["W002", "W003", "W005"]);
        assert!(result.passes(false));
    }

    #[test]
    fn test_messaging_without_channels_warns() {
        let contract = Contract::builder()
            .input(Input::builder().build())
            .output_message(OutputMessage::builder().build())
            .build()
            .unwrap();
        let result = check(&contract);
        assert_eq!(result.codes(), vec!["W004", "W004"]);
        assert_eq!(result.errors, 0);
    }

    #[test]
    fn test_triggered_input_needs_no_channel() {
        let contract = Contract::builder()
            .input(Input::builder().triggered_by("bookReturned()").build())
            .output_message(OutputMessage::builder().sent_to("books").build())
            .build()
            .unwrap();
        assert!(check(&contract).issues.is_empty());
    }

    #[test]
    fn test_verbose_reports_loaded_contracts() {
        let mut result = LintResult::new();
        let options = LintOptions {
            verbose: true,
            ..Default::default()
        };
        check_contract(Path::new("a.rhai"), 0, &http().build().unwrap(), &mut result, &options);
        assert_eq!(result.codes(), vec!["I001"]);
        assert!(result.issues[0].message.contains("HTTP"));
    }

    #[test]
    fn test_duplicate_names_across_files() {
        let named = |name: &str| Contract::builder().name(name).build().unwrap();
        let files = vec![
            ContractFile {
                path: PathBuf::from("v1/frauds.rhai"),
                contracts: vec![named("frauds"), named("drunks")],
            },
            ContractFile {
                path: PathBuf::from("v2/frauds.rhai"),
                contracts: vec![named("frauds")],
            },
        ];
        let mut result = LintResult::new();
        check_duplicate_names(&files, &mut result);
        assert_eq!(result.codes(), vec!["E020"]);
        assert!(result.issues[0].message.contains("v1/frauds.rhai, v2/frauds.rhai"));
        assert_eq!(result.issues[0].contract.as_deref(), Some("frauds"));
    }
}
