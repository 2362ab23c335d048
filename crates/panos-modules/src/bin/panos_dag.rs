//! panos_dag: create a dynamic address group when it does not exist yet

use panos_core::{DagParams, ModuleOutcome, Result, run_dag};
use serde_json::Value;
use std::process::ExitCode;

const MODULE_NAME: &str = "panos_dag";

fn main() -> ExitCode {
    panos_modules::execute(MODULE_NAME, run)
}

async fn run(args: Value) -> Result<ModuleOutcome> {
    let params = DagParams::from_args(MODULE_NAME, args)?;
    let api = panos_modules::open_session(&params.connection, params.check_mode)?;

    run_dag(api.as_ref(), &params).await
}
