// # panos-core
//
// Core library for the PAN-OS configuration modules.
//
// ## Architecture Overview
//
// - **XmlApi**: Trait for reading, writing and committing device configuration
// - **engine**: The idempotent operations and the two module procedures
// - **config**: Parsing and validation of module parameters
// - **xml** / **xpath**: Response documents, fragments and fixed paths
// - **ModuleOutcome**: The result reported back to the orchestration host
//
// ## Design Principles
//
// 1. **Read before write**: Every write is preceded by a read of the same path
// 2. **Single pass**: No retries, no background work, first error aborts
// 3. **Library-first**: Binaries only parse input and print the outcome
// 4. **Create-only groups**: Existing address groups are never modified

pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod traits;
pub mod xml;
pub mod xpath;

// Re-export core types for convenience
pub use config::{ConnectionConfig, DagParams, MgtConfigParams};
pub use engine::{ManagementSetting, run_dag, run_mgtconfig};
pub use error::{Error, Result};
pub use outcome::ModuleOutcome;
pub use traits::{CommitResult, XmlApi, XmlApiFactory};
pub use xml::ConfigDocument;
