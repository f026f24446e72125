//! Rhai contract documents.

use std::path::Path;

use rhai::{Array, Dynamic, Scope};

use super::{dsl, has_extension, read_document, ContractConverter};
use crate::config::LoaderConfig;
use crate::error::ContractError;
use crate::model::{Contract, ContractBuilder};

/// Evaluates `*.rhai` documents in an isolated engine per file.
#[derive(Debug, Clone, Default)]
pub struct RhaiContractConverter {
    config: LoaderConfig,
}

impl RhaiContractConverter {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Evaluate `source` as if it were read from `path`.
    pub fn convert_source(&self, path: &Path, source: &str) -> Result<Vec<Contract>, ContractError> {
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let engine = dsl::create_engine(&self.config, base_dir);

        let evaluation_error = |message: String| ContractError::ScriptEvaluation {
            path: path.to_path_buf(),
            message,
        };

        let mut ast = engine
            .compile(source)
            .map_err(|e| evaluation_error(e.to_string()))?;
        ast.set_source(path.to_string_lossy().as_ref());

        let mut scope = Scope::new();
        let result: Dynamic = engine
            .eval_ast_with_scope(&mut scope, &ast)
            .map_err(|e| evaluation_error(e.to_string()))?;

        collect_contracts(result)
            .into_iter()
            .map(|builder| builder.build().map_err(|e| evaluation_error(e.to_string())))
            .collect()
    }
}

impl ContractConverter for RhaiContractConverter {
    fn name(&self) -> &str {
        "rhai"
    }

    fn is_accepted(&self, path: &Path) -> bool {
        has_extension(path, std::slice::from_ref(&self.config.rhai_extension))
    }

    fn convert_from(&self, path: &Path) -> Result<Vec<Contract>, ContractError> {
        let source = read_document(path)?;
        self.convert_source(path, &source)
    }
}

/// A contract yields itself, an array yields its contract elements in order,
/// anything else yields nothing.
fn collect_contracts(result: Dynamic) -> Vec<ContractBuilder> {
    if let Some(contract) = result.clone().try_cast::<ContractBuilder>() {
        return vec![contract];
    }
    if let Some(items) = result.clone().try_cast::<Array>() {
        let total = items.len();
        let contracts: Vec<ContractBuilder> = items
            .into_iter()
            .filter_map(|item| item.try_cast::<ContractBuilder>())
            .collect();
        if contracts.len() < total {
            tracing::debug!(
                "Ignoring {} non-contract element(s) of the document result",
                total - contracts.len()
            );
        }
        return contracts;
    }
    tracing::debug!(
        "Document evaluated to {}, no contracts produced",
        result.type_name()
    );
    Vec::new()
}
