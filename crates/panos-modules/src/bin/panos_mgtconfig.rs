//! panos_mgtconfig: set the DNS and Panorama servers of the device

use panos_core::{MgtConfigParams, ModuleOutcome, Result, run_mgtconfig};
use serde_json::Value;
use std::process::ExitCode;

const MODULE_NAME: &str = "panos_mgtconfig";

fn main() -> ExitCode {
    panos_modules::execute(MODULE_NAME, run)
}

async fn run(args: Value) -> Result<ModuleOutcome> {
    let params = MgtConfigParams::from_args(MODULE_NAME, args)?;
    let api = panos_modules::open_session(&params.connection, params.check_mode)?;

    run_mgtconfig(api.as_ref(), &params).await
}
