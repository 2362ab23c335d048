// # XML API Trait
//
// Defines the session interface the modules use to talk to a PAN-OS device.
//
// ## Implementations
//
// - HTTPS XML API: `panos-xapi` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Usage
//
// ```rust,ignore
// use panos_core::{xpath, XmlApi};
//
// async fn primary_dns(api: &dyn XmlApi) -> panos_core::Result<Option<String>> {
//     let doc = api.get(&format!("{}/primary", xpath::dns_servers())).await?;
//     Ok(doc.element_text("primary"))
// }
// ```

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ConnectionConfig;
use crate::xml::ConfigDocument;

/// Result of a commit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// The commit job ran to completion with result `OK`
    Completed {
        /// Device job id
        job_id: u64,
        /// Detail lines reported by the job
        details: Vec<String>,
    },
    /// The device had no pending changes and enqueued no job
    NoChanges,
    /// The session is in check mode; nothing was sent
    Skipped,
}

/// Trait for XML API session implementations
///
/// A session is opened once per module invocation and passed by reference
/// to each operation. Every call is a single request (plus job polling for
/// [`XmlApi::commit`]) and is awaited before the next one starts.
///
/// Implementations must not retry failed requests; a failure is returned to
/// the caller, which aborts the invocation.
#[async_trait]
pub trait XmlApi: Send + Sync {
    /// Read the configuration node at `xpath`
    ///
    /// A path that matches nothing is not an error: the returned document
    /// simply contains no matching element.
    async fn get(&self, xpath: &str) -> Result<ConfigDocument, crate::Error>;

    /// Create or merge `element` at `xpath` (`action=set`)
    async fn set(&self, xpath: &str, element: &str) -> Result<(), crate::Error>;

    /// Replace the node at `xpath` with `element` (`action=edit`)
    async fn edit(&self, xpath: &str, element: &str) -> Result<(), crate::Error>;

    /// Commit the candidate configuration and wait for the job to finish
    ///
    /// # Parameters
    ///
    /// - `poll_interval`: delay between job status queries
    async fn commit(&self, poll_interval: Duration) -> Result<CommitResult, crate::Error>;

    /// Device address this session talks to (for logging)
    fn hostname(&self) -> &str;
}

/// Helper trait for opening sessions from connection parameters
pub trait XmlApiFactory: Send + Sync {
    /// Open a session
    ///
    /// # Parameters
    ///
    /// - `connection`: device address and credentials
    /// - `check_mode`: if true, the session performs reads but skips writes
    fn create(
        &self,
        connection: &ConnectionConfig,
        check_mode: bool,
    ) -> Result<Box<dyn XmlApi>, crate::Error>;
}
