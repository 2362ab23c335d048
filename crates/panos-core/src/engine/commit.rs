//! Commit step

use std::time::Duration;
use tracing::{debug, info};

use crate::error::Result;
use crate::traits::{CommitResult, XmlApi};

/// Delay between commit job status queries
pub const COMMIT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Commit when something changed and the caller asked for it
///
/// # Returns
///
/// - `Ok(true)`: a commit was issued and finished successfully
/// - `Ok(false)`: nothing to do
/// - `Err(Error)`: the commit failed; earlier writes stay in the candidate
///   configuration
pub async fn commit_if_changed(
    api: &dyn XmlApi,
    any_changed: bool,
    commit_requested: bool,
) -> Result<bool> {
    if !any_changed {
        debug!("No changes on {}, not committing", api.hostname());
        return Ok(false);
    }
    if !commit_requested {
        debug!("Changes on {} left uncommitted (commit=false)", api.hostname());
        return Ok(false);
    }

    match api.commit(COMMIT_POLL_INTERVAL).await? {
        CommitResult::Completed { job_id, details } => {
            info!("Commit job {} on {} finished", job_id, api.hostname());
            for line in details {
                debug!("commit: {}", line);
            }
        }
        CommitResult::NoChanges => {
            info!("Device {} reported no changes to commit", api.hostname());
        }
        CommitResult::Skipped => {
            debug!("Commit skipped by session");
        }
    }

    Ok(true)
}
