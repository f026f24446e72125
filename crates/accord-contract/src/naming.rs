//! Default contract names derived from the defining file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ContractError;
use crate::model::Contract;

/// Name given to the contract at `index` of the `count` contracts read from
/// `path`: the file stem alone for a single contract, `<stem>_<index>` when
/// the file defines several.
pub fn default_contract_name(path: &Path, count: usize, index: usize) -> String {
    let base = base_name(path);
    if count > 1 {
        format!("{base}_{index}")
    } else {
        base
    }
}

/// Fill in missing or empty names. Named contracts are left untouched, and the
/// index counts every contract in the file, named or not.
pub fn assign_default_names(path: &Path, contracts: &mut [Contract]) {
    let count = contracts.len();
    for (index, contract) in contracts.iter_mut().enumerate() {
        if !contract.has_name() {
            let name = default_contract_name(path, count, index);
            tracing::debug!("Assigning default name '{}' to contract {}", name, index);
            contract.name = Some(name);
        }
    }
}

/// Fail when two contracts share a name. The error names the file of the
/// first definition and the file of the clash.
pub fn ensure_unique_names(pairs: &[(PathBuf, Contract)]) -> Result<(), ContractError> {
    ensure_unique_names_in(pairs.iter().map(|(p, c)| (p.as_path(), c)))
}

/// Borrowing variant of [`ensure_unique_names`].
pub fn ensure_unique_names_in<'a, I>(contracts: I) -> Result<(), ContractError>
where
    I: IntoIterator<Item = (&'a Path, &'a Contract)>,
{
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for (path, contract) in contracts {
        if let Some(first) = seen.insert(contract.name(), path) {
            return Err(ContractError::DuplicateName {
                name: contract.name().to_string(),
                first: first.to_path_buf(),
                second: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn base_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name[..dot].to_string(),
        _ => file_name,
    }
}
