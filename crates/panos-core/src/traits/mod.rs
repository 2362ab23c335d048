//! Core traits for the PAN-OS modules
//!
//! - [`XmlApi`]: read, write and commit device configuration
//! - [`XmlApiFactory`]: open an [`XmlApi`] session from connection parameters

pub mod xml_api;

pub use xml_api::{CommitResult, XmlApi, XmlApiFactory};
