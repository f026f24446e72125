//! Report types shared by the library and the CLI.

use accord_contract::{ContractFile, LoaderConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Severity level of a lint issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document or contract cannot be used.
    Error,
    /// Usable, but probably not what the author meant.
    Warning,
    Info,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    /// Stable code, `E0xx` for errors and `W0xx` for warnings.
    pub code: &'static str,
    pub message: String,
    /// Document the issue was found in.
    #[serde(serialize_with = "serialize_path")]
    pub file: PathBuf,
    /// Name of the offending contract, once it is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    /// Position inside the document, e.g. `contracts[1].request.headers`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

impl LintIssue {
    fn new(severity: Severity, code: &'static str, message: String, file: &Path) -> Self {
        Self {
            severity,
            code,
            message,
            file: file.to_path_buf(),
            contract: None,
            location: None,
            suggestion: None,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>, file: &Path) -> Self {
        Self::new(Severity::Error, code, message.into(), file)
    }

    pub fn warning(code: &'static str, message: impl Into<String>, file: &Path) -> Self {
        Self::new(Severity::Warning, code, message.into(), file)
    }

    pub fn info(code: &'static str, message: impl Into<String>, file: &Path) -> Self {
        Self::new(Severity::Info, code, message.into(), file)
    }

    pub fn for_contract(mut self, name: impl Into<String>) -> Self {
        self.contract = Some(name.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Findings for one or more documents.
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub files_checked: usize,
    pub contracts_checked: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: LintIssue) {
        match issue.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }

    /// No errors. Warnings do not count unless `strict` is set.
    pub fn passes(&self, strict: bool) -> bool {
        !self.has_errors() && !(strict && self.has_warnings())
    }

    /// Issue codes in report order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.issues.iter().map(|i| i.code).collect()
    }

    pub fn merge(&mut self, other: LintResult) {
        self.issues.extend(other.issues);
        self.files_checked += other.files_checked;
        self.contracts_checked += other.contracts_checked;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

/// Findings plus the contracts that loaded successfully.
#[derive(Debug, Default, Serialize)]
pub struct LintReport {
    pub result: LintResult,
    pub files: Vec<ContractFile>,
}

#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    /// Loader limits, extensions and exclusions.
    pub loader: LoaderConfig,
    /// Also report `info` findings.
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_follow_severity() {
        let file = Path::new("a.rhai");
        let mut result = LintResult::new();
        result.add_issue(LintIssue::error("E011", "method is missing", file));
        result.add_issue(LintIssue::warning("W002", "ignored", file));
        result.add_issue(LintIssue::info("I001", "loaded", file));

        assert_eq!(result.errors, 1);
        assert_eq!(result.warnings, 1);
        assert_eq!(result.codes(), vec!["E011", "W002", "I001"]);
        assert!(!result.passes(false));
    }

    #[test]
    fn test_strict_mode_fails_on_warnings() {
        let mut result = LintResult::new();
        result.add_issue(LintIssue::warning("W001", "no contracts", Path::new("a.rhai")));
        assert!(result.passes(false));
        assert!(!result.passes(true));
    }

    #[test]
    fn test_merge_sums_counters() {
        let mut left = LintResult::new();
        left.files_checked = 1;
        left.contracts_checked = 2;
        let mut right = LintResult::new();
        right.files_checked = 1;
        right.add_issue(LintIssue::error("E002", "boom", Path::new("b.yml")));

        left.merge(right);
        assert_eq!(left.files_checked, 2);
        assert_eq!(left.contracts_checked, 2);
        assert_eq!(left.errors, 1);
    }

    #[test]
    fn test_issue_serializes_path_as_string() {
        let issue = LintIssue::error("E013", "header", Path::new("dir/a.rhai"))
            .for_contract("a")
            .with_location("contracts[0].request.headers");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["file"], "dir/a.rhai");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["contract"], "a");
        assert!(json.get("suggestion").is_none());
    }
}
