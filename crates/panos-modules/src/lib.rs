// # panos-modules
//
// Runner shared by the `panos_dag` and `panos_mgtconfig` binaries.
//
// This is a THIN integration layer: it reads the parameter file, opens a
// session, hands both to a procedure from `panos-core` and prints the
// outcome. No configuration logic lives here.
//
// ## Protocol
//
// ```bash
// panos_dag /tmp/args.json
// ```
//
// - argv[1]: path of a file holding the JSON parameter object
// - stdout: exactly one JSON object, `{"changed": .., "msg": ..}` or
//   `{"changed": false, "msg": .., "failed": true}`
// - exit status: 0 on success, 1 on failure
// - stderr: logs
//
// ## Environment
//
// - `PANOS_LOG_LEVEL`: trace, debug, info, warn or error (default: info)

use anyhow::Context;
use panos_core::config::ConnectionConfig;
use panos_core::traits::XmlApi;
use panos_core::{ModuleOutcome, Result};
use serde_json::Value;
use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, warn};
use tracing_subscriber::FmtSubscriber;

/// Environment variable selecting the log level
pub const LOG_LEVEL_ENV: &str = "PANOS_LOG_LEVEL";

/// Exit codes reported to the orchestration host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleExitCode {
    /// The module ran; `changed` tells whether anything was modified
    Success = 0,
    /// The module failed; nothing more can be assumed about the device
    Failed = 1,
}

impl From<ModuleExitCode> for ExitCode {
    fn from(code: ModuleExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&ModuleOutcome> for ModuleExitCode {
    fn from(outcome: &ModuleOutcome) -> Self {
        if outcome.failed {
            ModuleExitCode::Failed
        } else {
            ModuleExitCode::Success
        }
    }
}

/// Run a module procedure and report its outcome
///
/// # Parameters
///
/// - `module`: module name, for logs
/// - `run`: the procedure; receives the parsed parameter object
pub fn execute<F, Fut>(module: &str, run: F) -> ExitCode
where
    F: FnOnce(Value) -> Fut,
    Fut: Future<Output = Result<ModuleOutcome>>,
{
    init_tracing();

    let outcome = match invoke(module, run) {
        Ok(outcome) => outcome,
        Err(e) if e.is_parameter_error() => {
            warn!("{} rejected its parameters: {}", module, e);
            ModuleOutcome::from(e)
        }
        Err(e) => {
            error!("{} failed: {}", module, e);
            ModuleOutcome::from(e)
        }
    };

    println!("{}", outcome.to_json());
    ModuleExitCode::from(&outcome).into()
}

fn invoke<F, Fut>(module: &str, run: F) -> Result<ModuleOutcome>
where
    F: FnOnce(Value) -> Fut,
    Fut: Future<Output = Result<ModuleOutcome>>,
{
    let args = load_args(std::env::args_os().nth(1))?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .with_context(|| format!("Failed to create runtime for {}", module))?;

    rt.block_on(run(args))
}

/// Read the JSON parameter object from the file named on the command line
pub fn load_args(path: Option<OsString>) -> Result<Value> {
    let path = PathBuf::from(
        path.context("usage: <module> ARGS_FILE (no argument file given)")?,
    );

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read module arguments from {}", path.display()))?;

    let args = serde_json::from_str(&text)
        .with_context(|| format!("Module arguments in {} are not valid JSON", path.display()))?;

    Ok(args)
}

/// Open an XML API session for a module invocation
#[cfg(feature = "xapi")]
pub fn open_session(connection: &ConnectionConfig, check_mode: bool) -> Result<Box<dyn XmlApi>> {
    use panos_core::traits::XmlApiFactory;

    panos_xapi::PanXapiFactory.create(connection, check_mode)
}

/// Open an XML API session for a module invocation
///
/// This build carries no XML API client.
#[cfg(not(feature = "xapi"))]
pub fn open_session(_connection: &ConnectionConfig, _check_mode: bool) -> Result<Box<dyn XmlApi>> {
    Err(panos_core::Error::missing_client(
        "the XML API client is required for this module (build with feature \"xapi\")",
    ))
}

/// Install the stderr log subscriber
///
/// stdout is reserved for the module result.
pub fn init_tracing() {
    let requested = std::env::var(LOG_LEVEL_ENV).ok();
    let level = requested
        .as_deref()
        .and_then(parse_level)
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    if let Some(requested) = requested.filter(|r| parse_level(r).is_none()) {
        warn!(
            "{} '{}' is not valid (expected trace, debug, info, warn or error), using info",
            LOG_LEVEL_ENV, requested
        );
    }
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_args_reads_object() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"ip_address": "192.168.1.1", "commit": false}}"#).unwrap();

        let args = load_args(Some(file.path().as_os_str().to_owned())).unwrap();
        assert_eq!(args["ip_address"], "192.168.1.1");
        assert_eq!(args["commit"], false);
    }

    #[test]
    fn test_load_args_without_path() {
        let err = load_args(None).unwrap_err();
        assert!(err.to_string().contains("ARGS_FILE"));
    }

    #[test]
    fn test_load_args_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = load_args(Some(path.into_os_string())).unwrap_err();
        assert!(err.to_string().contains("Failed to read module arguments"));
    }

    #[test]
    fn test_load_args_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "ip_address=192.168.1.1 password=admin").unwrap();

        let err = load_args(Some(file.path().as_os_str().to_owned())).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_exit_code_follows_outcome() {
        assert_eq!(
            ModuleExitCode::from(&ModuleOutcome::success(true)),
            ModuleExitCode::Success
        );
        assert_eq!(
            ModuleExitCode::from(&ModuleOutcome::failure("boom")),
            ModuleExitCode::Failed
        );
    }

    #[cfg(feature = "xapi")]
    #[test]
    fn test_open_session_uses_device_address() {
        let connection = ConnectionConfig::new("fw.example.net", "pw");
        let api = open_session(&connection, true).unwrap();
        assert_eq!(api.hostname(), "fw.example.net");
    }
}
