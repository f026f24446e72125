//! Turning contract documents into contracts.
//!
//! Each supported document format has a [`ContractConverter`]. The
//! [`ContractLoader`] picks the first converter that accepts a file, converts
//! it and assigns default names.

mod dsl;
mod script;
mod values;
mod yaml;

use std::path::{Component, Path, PathBuf};

pub use script::RhaiContractConverter;
pub use yaml::YamlContractConverter;

use crate::config::LoaderConfig;
use crate::error::ContractError;
use crate::model::Contract;
use crate::naming::assign_default_names;

/// A contract document format.
pub trait ContractConverter: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Whether this converter handles `path`. Decided from the file name
    /// alone; the file is never opened.
    fn is_accepted(&self, path: &Path) -> bool;

    /// Read and convert the document. Contracts come back in document order
    /// and without default names.
    fn convert_from(&self, path: &Path) -> Result<Vec<Contract>, ContractError>;
}

/// Dispatches documents to converters by extension.
pub struct ContractLoader {
    converters: Vec<Box<dyn ContractConverter>>,
}

impl ContractLoader {
    pub fn new(config: &LoaderConfig) -> Self {
        Self::with_converters(vec![
            Box::new(RhaiContractConverter::new(config.clone())),
            Box::new(YamlContractConverter::new(config.clone())),
        ])
    }

    /// Use a custom converter chain. The first accepting converter wins.
    pub fn with_converters(converters: Vec<Box<dyn ContractConverter>>) -> Self {
        Self { converters }
    }

    pub fn is_accepted(&self, path: &Path) -> bool {
        self.converter_for(path).is_some()
    }

    /// Load every contract defined in `path`, with default names filled in.
    pub fn load(&self, path: &Path) -> Result<Vec<Contract>, ContractError> {
        let converter = self
            .converter_for(path)
            .ok_or_else(|| ContractError::DocumentRejected {
                path: path.to_path_buf(),
            })?;

        tracing::debug!(
            "Converting {} with the {} converter",
            path.display(),
            converter.name()
        );
        let mut contracts = converter.convert_from(path)?;
        assign_default_names(path, &mut contracts);
        tracing::debug!("Loaded {} contract(s) from {}", contracts.len(), path.display());
        Ok(contracts)
    }

    fn converter_for(&self, path: &Path) -> Option<&dyn ContractConverter> {
        self.converters
            .iter()
            .find(|c| c.is_accepted(path))
            .map(|c| c.as_ref())
    }
}

impl Default for ContractLoader {
    fn default() -> Self {
        Self::new(&LoaderConfig::default())
    }
}

impl std::fmt::Debug for ContractLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractLoader")
            .field(
                "converters",
                &self.converters.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Case-insensitive extension check.
pub(crate) fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

pub(crate) fn read_document(path: &Path) -> Result<String, ContractError> {
    std::fs::read_to_string(path).map_err(|source| ContractError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve a file referenced by a document against the document directory.
///
/// Absolute paths and paths climbing above `base_dir` are rejected.
pub(crate) fn sibling_path(base_dir: &Path, relative: &str) -> Result<PathBuf, String> {
    let mut depth = 0_usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => depth -= 1,
            Component::ParentDir => {
                return Err(format!("file '{relative}' is outside the document directory"))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("file '{relative}' must be relative to the document"))
            }
        }
    }
    if depth == 0 {
        return Err(format!("file '{relative}' does not name a file"));
    }
    Ok(base_dir.join(relative))
}
