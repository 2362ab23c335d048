//! Module procedures
//!
//! Each module is one linear pass over a single [`XmlApi`] session:
//!
//! ```text
//! params ──► idempotence check(s) ──► write(s) if different ──► commit if changed ──► outcome
//! ```
//!
//! - [`run_dag`]: create a dynamic address group if it is absent
//! - [`run_mgtconfig`]: set the DNS and Panorama servers that differ
//!
//! The first error aborts the pass. Writes already applied to the candidate
//! configuration are not undone.

pub mod commit;
pub mod dag;
pub mod leaf;

pub use commit::{COMMIT_POLL_INTERVAL, commit_if_changed};
pub use dag::ensure_dynamic_group_exists;
pub use leaf::{ManagementSetting, ensure_leaf_value, ensure_setting};

use tracing::info;

use crate::config::{DagParams, MgtConfigParams};
use crate::error::Result;
use crate::outcome::ModuleOutcome;
use crate::traits::XmlApi;

/// Run the dynamic address group module
pub async fn run_dag(api: &dyn XmlApi, params: &DagParams) -> Result<ModuleOutcome> {
    let changed = ensure_dynamic_group_exists(api, &params.dag_name, &params.dag_filter).await?;
    commit_if_changed(api, changed, params.commit).await?;

    info!(
        "panos_dag finished on {}: changed={}",
        api.hostname(),
        changed
    );
    Ok(ModuleOutcome::success(changed))
}

/// Run the management configuration module
///
/// Settings without a desired value are skipped entirely. The changed flag
/// is the OR of every applied setting's result.
pub async fn run_mgtconfig(api: &dyn XmlApi, params: &MgtConfigParams) -> Result<ModuleOutcome> {
    let mut changed = false;
    for (setting, desired) in params.requested_settings() {
        changed |= ensure_setting(api, setting, desired).await?;
    }

    commit_if_changed(api, changed, params.commit).await?;

    info!(
        "panos_mgtconfig finished on {}: changed={}",
        api.hostname(),
        changed
    );
    Ok(ModuleOutcome::success(changed))
}
