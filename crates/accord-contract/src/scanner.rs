//! Recursive discovery of contract documents.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::config::LoaderConfig;
use crate::converter::ContractLoader;
use crate::error::ContractError;
use crate::model::Contract;
use crate::naming::ensure_unique_names_in;
use crate::validation::validate;

/// Contracts loaded from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractFile {
    #[serde(serialize_with = "serialize_path")]
    pub path: PathBuf,
    pub contracts: Vec<Contract>,
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

/// Walks a directory tree and loads every accepted document.
#[derive(Debug)]
pub struct ContractScanner {
    root: PathBuf,
    loader: ContractLoader,
    exclude: Vec<Regex>,
}

impl ContractScanner {
    pub fn new(root: impl Into<PathBuf>, config: &LoaderConfig) -> Result<Self, anyhow::Error> {
        Ok(Self {
            root: root.into(),
            loader: ContractLoader::new(config),
            exclude: config.exclude_patterns()?,
        })
    }

    /// Every accepted, non-excluded document path under the root, sorted.
    pub fn documents(&self) -> Result<Vec<PathBuf>, ContractError> {
        let mut files = Vec::new();
        if self.root.is_file() {
            if self.loader.is_accepted(&self.root) {
                files.push(self.root.clone());
            }
        } else {
            self.walk(&self.root, &mut files)?;
        }
        Ok(files)
    }

    /// Load every document. The first failing document aborts the scan.
    pub fn scan(&self) -> Result<Vec<ContractFile>, ContractError> {
        let documents = self.documents()?;
        let mut files = Vec::with_capacity(documents.len());
        for path in documents {
            let contracts = self.loader.load(&path)?;
            files.push(ContractFile { path, contracts });
        }
        tracing::info!(
            "Scanned {}: {} document(s), {} contract(s)",
            self.root.display(),
            files.len(),
            files.iter().map(|f| f.contracts.len()).sum::<usize>()
        );
        Ok(files)
    }

    /// [`scan`](Self::scan), then validate every contract and require
    /// contract names to be unique across documents.
    pub fn scan_validated(&self) -> Result<Vec<ContractFile>, ContractError> {
        let files = self.scan()?;
        for file in &files {
            for contract in &file.contracts {
                validate(contract)?;
            }
        }
        ensure_unique_names_in(
            files
                .iter()
                .flat_map(|f| f.contracts.iter().map(move |c| (f.path.as_path(), c))),
        )?;
        Ok(files)
    }

    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ContractError> {
        let entries = std::fs::read_dir(dir).map_err(|source| ContractError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
        paths.sort();

        for path in paths {
            if self.is_excluded(&path) {
                tracing::debug!("Excluding {}", path.display());
                continue;
            }
            if path.is_dir() {
                self.walk(&path, files)?;
            } else if self.loader.is_accepted(&path) {
                files.push(path);
            } else {
                tracing::debug!("Skipping {}: no converter accepts it", path.display());
            }
        }
        Ok(())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let text = path.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|pattern| pattern.is_match(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FRAUDS: &str = r#"contract().request(request().method("GET").url("/frauds")).response(response().status(200))"#;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("fraud/nested")).unwrap();
        fs::create_dir_all(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("fraud/b.rhai"), FRAUDS).unwrap();
        fs::write(
            dir.path().join("fraud/a.yml"),
            "request: { method: GET, url: /drunks }\nresponse: { status: 200 }\n",
        )
        .unwrap();
        fs::write(dir.path().join("fraud/nested/c.rhai"), FRAUDS).unwrap();
        fs::write(dir.path().join("fraud/README.md"), "not a contract").unwrap();
        fs::write(dir.path().join("drafts/wip.rhai"), "contract(").unwrap();
        dir
    }

    #[test]
    fn test_documents_are_sorted_and_filtered() {
        let dir = tree();
        let config = LoaderConfig {
            exclude: vec!["/drafts/".to_string()],
            ..Default::default()
        };
        let scanner = ContractScanner::new(dir.path(), &config).unwrap();
        let names: Vec<String> = scanner
            .documents()
            .unwrap()
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["fraud/a.yml", "fraud/b.rhai", "fraud/nested/c.rhai"]);
    }

    #[test]
    fn test_scan_stops_at_first_broken_document() {
        let dir = tree();
        let scanner = ContractScanner::new(dir.path(), &LoaderConfig::default()).unwrap();
        let err = scanner.scan().unwrap_err();
        assert!(matches!(err, ContractError::ScriptEvaluation { .. }));
    }

    #[test]
    fn test_scan_validated_detects_duplicate_names() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("v1")).unwrap();
        fs::create_dir_all(dir.path().join("v2")).unwrap();
        fs::write(dir.path().join("v1/frauds.rhai"), FRAUDS).unwrap();
        fs::write(dir.path().join("v2/frauds.rhai"), FRAUDS).unwrap();

        let scanner = ContractScanner::new(dir.path(), &LoaderConfig::default()).unwrap();
        assert_eq!(scanner.scan().unwrap().len(), 2);
        let err = scanner.scan_validated().unwrap_err();
        assert!(matches!(err, ContractError::DuplicateName { ref name, .. } if name == "frauds"));
    }

    #[test]
    fn test_scan_validated_reports_invalid_contract() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("no_method.rhai"),
            r#"contract().request(request().url("/frauds")).response(response().status(200))"#,
        )
        .unwrap();
        let scanner = ContractScanner::new(dir.path(), &LoaderConfig::default()).unwrap();
        let err = scanner.scan_validated().unwrap_err();
        assert!(err.to_string().contains("method"));
    }

    #[test]
    fn test_single_file_root() {
        let dir = tree();
        let root = dir.path().join("fraud/b.rhai");
        let scanner = ContractScanner::new(&root, &LoaderConfig::default()).unwrap();
        let files = scanner.scan().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].contracts[0].name(), "b");
    }
}
