//! Consumer-driven contract definitions.
//!
//! Contract documents describe HTTP or messaging interactions between a
//! consumer and a producer. This crate loads them into a typed model, names
//! them and validates them before they are handed to stub and test
//! generators.
//!
//! Two document formats are understood: Rhai scripts (`*.rhai`) evaluated
//! against a builder vocabulary, and declarative YAML (`*.yml`, `*.yaml`).
//!
//! # Example
//!
//! ```no_run
//! use accord_contract::{validate, ContractLoader, LoaderConfig};
//! use std::path::Path;
//!
//! let loader = ContractLoader::new(&LoaderConfig::default());
//! let contracts = loader.load(Path::new("contracts/shouldMarkClientAsFraud.rhai"))?;
//! for contract in &contracts {
//!     validate(contract)?;
//!     println!("{}", contract.name());
//! }
//! # Ok::<(), accord_contract::ContractError>(())
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod model;
pub mod naming;
pub mod scanner;
pub mod validation;

pub use config::LoaderConfig;
pub use converter::{ContractConverter, ContractLoader, RhaiContractConverter, YamlContractConverter};
pub use error::{ContractError, ValidationError};
pub use model::{Contract, ContractBuilder, DualValue, Interaction, RegexPattern, Side};
pub use naming::{assign_default_names, default_contract_name, ensure_unique_names};
pub use scanner::{ContractFile, ContractScanner};
pub use validation::{validate, violations};
