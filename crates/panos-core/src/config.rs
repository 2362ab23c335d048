//! Module parameters
//!
//! This module turns the JSON parameter object handed to a module into typed,
//! validated structures. Validation runs once, before any session is opened.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::engine::ManagementSetting;
use crate::error::{Error, Result};

/// Parameters accepted by both modules
pub const CONNECTION_PARAMETERS: &[&str] =
    &["ip_address", "password", "username", "commit", "validate_certs"];

/// Parameters specific to the dynamic address group module
pub const DAG_PARAMETERS: &[&str] = &["dag_name", "dag_filter"];

/// Parameters specific to the management configuration module
pub const MGTCONFIG_PARAMETERS: &[&str] = &[
    "dns_server_primary",
    "dns_server_secondary",
    "panorama_primary",
    "panorama_secondary",
];

/// Prefix of keys reserved for the orchestration host
const HOST_PARAMETER_PREFIX: &str = "_ansible_";

/// Device address and credentials
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Hostname or IP address, optionally with `:port`
    pub ip_address: String,

    /// API user
    pub username: String,

    /// API password
    /// ⚠️ NEVER log this value
    pub password: String,

    /// Verify the device's TLS certificate
    pub validate_certs: bool,
}

impl ConnectionConfig {
    /// Create a connection configuration with the default user and
    /// certificate validation enabled
    pub fn new(ip_address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            username: default_username(),
            password: password.into(),
            validate_certs: true,
        }
    }

    /// Validate the connection parameters
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.ip_address.is_empty() {
            missing.push("ip_address");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(Error::missing(missing));
        }

        if self.username.is_empty() {
            return Err(Error::invalid_input("username cannot be empty"));
        }
        if self.ip_address.contains(['/', '?', '#', '@'])
            || self.ip_address.contains(char::is_whitespace)
        {
            return Err(Error::invalid_input(format!(
                "ip_address must be a hostname or address, got '{}'",
                self.ip_address
            )));
        }

        Ok(())
    }
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("ip_address", &self.ip_address)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("validate_certs", &self.validate_certs)
            .finish()
    }
}

/// Validated parameters of the dynamic address group module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagParams {
    /// Device connection
    pub connection: ConnectionConfig,

    /// Name of the dynamic address group
    pub dag_name: String,

    /// Filter expression used when the group is created
    pub dag_filter: String,

    /// Commit if anything changed
    pub commit: bool,

    /// Dry run: read but do not write
    pub check_mode: bool,
}

impl DagParams {
    /// Parse and validate the module's parameter object
    pub fn from_args(module: &str, args: Value) -> Result<Self> {
        let args = ModuleArgs::new(module, args, DAG_PARAMETERS)?;
        let raw: RawDagArgs = args.deserialize()?;

        let mut missing = raw.connection.missing();
        if is_blank(&raw.dag_name) {
            missing.push("dag_name");
        }
        if is_blank(&raw.dag_filter) {
            missing.push("dag_filter");
        }
        if !missing.is_empty() {
            return Err(Error::missing(missing));
        }

        let params = Self {
            commit: raw.connection.commit.unwrap_or(true),
            check_mode: raw.connection.check_mode.unwrap_or(false),
            connection: raw.connection.into_config(),
            dag_name: raw.dag_name.unwrap_or_default(),
            dag_filter: raw.dag_filter.unwrap_or_default(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        self.connection.validate()?;

        let mut missing = Vec::new();
        if self.dag_name.is_empty() {
            missing.push("dag_name");
        }
        if self.dag_filter.is_empty() {
            missing.push("dag_filter");
        }
        if !missing.is_empty() {
            return Err(Error::missing(missing));
        }

        // The name is embedded in an XPath predicate delimited by single quotes.
        if self.dag_name.contains('\'') {
            return Err(Error::invalid_input(format!(
                "dag_name cannot contain a single quote: {}",
                self.dag_name
            )));
        }

        Ok(())
    }
}

/// Validated parameters of the management configuration module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MgtConfigParams {
    /// Device connection
    pub connection: ConnectionConfig,

    /// Desired primary DNS server
    pub dns_server_primary: Option<String>,

    /// Desired secondary DNS server
    pub dns_server_secondary: Option<String>,

    /// Desired primary Panorama server
    pub panorama_primary: Option<String>,

    /// Desired secondary Panorama server
    pub panorama_secondary: Option<String>,

    /// Commit if anything changed
    pub commit: bool,

    /// Dry run: read but do not write
    pub check_mode: bool,
}

impl MgtConfigParams {
    /// Parse and validate the module's parameter object
    pub fn from_args(module: &str, args: Value) -> Result<Self> {
        let args = ModuleArgs::new(module, args, MGTCONFIG_PARAMETERS)?;
        let raw: RawMgtConfigArgs = args.deserialize()?;

        let missing = raw.connection.missing();
        if !missing.is_empty() {
            return Err(Error::missing(missing));
        }

        let params = Self {
            commit: raw.connection.commit.unwrap_or(true),
            check_mode: raw.connection.check_mode.unwrap_or(false),
            connection: raw.connection.into_config(),
            dns_server_primary: raw.dns_server_primary,
            dns_server_secondary: raw.dns_server_secondary,
            panorama_primary: raw.panorama_primary,
            panorama_secondary: raw.panorama_secondary,
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        self.connection.validate()
    }

    /// Settings the caller supplied a value for, in application order
    pub fn requested_settings(&self) -> Vec<(ManagementSetting, &str)> {
        [
            (ManagementSetting::DnsPrimary, &self.dns_server_primary),
            (ManagementSetting::DnsSecondary, &self.dns_server_secondary),
            (ManagementSetting::PanoramaPrimary, &self.panorama_primary),
            (ManagementSetting::PanoramaSecondary, &self.panorama_secondary),
        ]
        .into_iter()
        .filter_map(|(setting, value)| value.as_deref().map(|value| (setting, value)))
        .collect()
    }
}

/// Parameter object of one module invocation, checked for unknown keys
#[derive(Debug, Clone)]
pub struct ModuleArgs {
    values: Map<String, Value>,
}

impl ModuleArgs {
    /// Wrap a parameter object
    ///
    /// # Parameters
    ///
    /// - `module`: module name, used in error messages
    /// - `args`: the JSON object passed by the host
    /// - `module_parameters`: parameters accepted in addition to
    ///   [`CONNECTION_PARAMETERS`]
    pub fn new(module: &str, args: Value, module_parameters: &[&str]) -> Result<Self> {
        let Value::Object(values) = args else {
            return Err(Error::invalid_input(
                "module arguments must be a JSON object",
            ));
        };

        let supported = CONNECTION_PARAMETERS
            .iter()
            .chain(module_parameters)
            .copied()
            .collect::<Vec<_>>();

        let unsupported = values
            .keys()
            .filter(|key| !key.starts_with(HOST_PARAMETER_PREFIX))
            .filter(|key| !supported.contains(&key.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        if !unsupported.is_empty() {
            let mut supported = supported.iter().map(|s| s.to_string()).collect::<Vec<_>>();
            supported.sort();
            return Err(Error::UnsupportedParameters {
                module: module.to_string(),
                names: unsupported,
                supported,
            });
        }

        Ok(Self { values })
    }

    fn deserialize<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| Error::invalid_input(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct RawConnection {
    #[serde(default, deserialize_with = "lenient_string")]
    ip_address: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    password: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    username: Option<String>,

    #[serde(default, deserialize_with = "lenient_bool")]
    commit: Option<bool>,

    #[serde(default, deserialize_with = "lenient_bool")]
    validate_certs: Option<bool>,

    #[serde(rename = "_ansible_check_mode", default, deserialize_with = "lenient_bool")]
    check_mode: Option<bool>,
}

impl RawConnection {
    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.ip_address) {
            missing.push("ip_address");
        }
        if is_blank(&self.password) {
            missing.push("password");
        }
        missing
    }

    fn into_config(self) -> ConnectionConfig {
        ConnectionConfig {
            ip_address: self.ip_address.unwrap_or_default(),
            username: self.username.unwrap_or_else(default_username),
            password: self.password.unwrap_or_default(),
            validate_certs: self.validate_certs.unwrap_or(true),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDagArgs {
    #[serde(flatten)]
    connection: RawConnection,

    #[serde(default, deserialize_with = "lenient_string")]
    dag_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    dag_filter: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMgtConfigArgs {
    #[serde(flatten)]
    connection: RawConnection,

    #[serde(default, deserialize_with = "lenient_string")]
    dns_server_primary: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    dns_server_secondary: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    panorama_primary: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    panorama_secondary: Option<String>,
}

fn default_username() -> String {
    "admin".to_string()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// Accept strings, numbers and booleans as string parameters; `null` is absent
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, got {other}"
        ))),
    }
}

/// Accept JSON booleans and the host's boolean spellings; `null` is absent
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Null => return Ok(None),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.to_lowercase().as_str() {
            "yes" | "y" | "true" | "t" | "on" | "1" => Some(true),
            "no" | "n" | "false" | "f" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };

    parsed
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("{value} is not a valid boolean")))
}
