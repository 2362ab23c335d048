//! Idempotent updates of single configuration leaves

use tracing::{debug, info};

use crate::error::Result;
use crate::traits::XmlApi;
use crate::{xml, xpath};

/// Management settings the configuration module can set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagementSetting {
    /// Primary DNS server
    DnsPrimary,
    /// Secondary DNS server
    DnsSecondary,
    /// Primary Panorama server
    PanoramaPrimary,
    /// Secondary Panorama server
    PanoramaSecondary,
}

impl ManagementSetting {
    /// Every setting, in the order the module applies them
    pub const ALL: [ManagementSetting; 4] = [
        ManagementSetting::DnsPrimary,
        ManagementSetting::DnsSecondary,
        ManagementSetting::PanoramaPrimary,
        ManagementSetting::PanoramaSecondary,
    ];

    /// Element name of the leaf
    pub fn tag(self) -> &'static str {
        match self {
            ManagementSetting::DnsPrimary => "primary",
            ManagementSetting::DnsSecondary => "secondary",
            ManagementSetting::PanoramaPrimary => "panorama-server",
            ManagementSetting::PanoramaSecondary => "panorama-server-2",
        }
    }

    /// Full path of the leaf
    pub fn xpath(self) -> String {
        match self {
            ManagementSetting::DnsPrimary | ManagementSetting::DnsSecondary => {
                format!("{}/{}", xpath::dns_servers(), self.tag())
            }
            ManagementSetting::PanoramaPrimary | ManagementSetting::PanoramaSecondary => {
                format!("{}/{}", xpath::system(), self.tag())
            }
        }
    }

    /// Module parameter carrying the desired value
    pub fn parameter(self) -> &'static str {
        match self {
            ManagementSetting::DnsPrimary => "dns_server_primary",
            ManagementSetting::DnsSecondary => "dns_server_secondary",
            ManagementSetting::PanoramaPrimary => "panorama_primary",
            ManagementSetting::PanoramaSecondary => "panorama_secondary",
        }
    }
}

impl std::fmt::Display for ManagementSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.parameter())
    }
}

/// Set the leaf `tag` at `path` to `desired` unless it already holds it
///
/// The comparison is exact string equality. A missing leaf, or one without
/// text, never matches.
///
/// # Returns
///
/// - `Ok(true)`: the leaf was written
/// - `Ok(false)`: the leaf already held `desired`
/// - `Err(Error)`: the read or the write failed
pub async fn ensure_leaf_value(
    api: &dyn XmlApi,
    path: &str,
    tag: &str,
    desired: &str,
) -> Result<bool> {
    let current = api.get(path).await?.element_text(tag);

    if current.as_deref() == Some(desired) {
        debug!("{} already set to {} on {}", tag, desired, api.hostname());
        return Ok(false);
    }

    info!(
        "Setting {} on {}: {} -> {}",
        tag,
        api.hostname(),
        current.as_deref().unwrap_or("<unset>"),
        desired
    );
    api.edit(path, &xml::element(tag, desired)).await?;

    Ok(true)
}

/// [`ensure_leaf_value`] for one of the fixed management settings
pub async fn ensure_setting(
    api: &dyn XmlApi,
    setting: ManagementSetting,
    desired: &str,
) -> Result<bool> {
    ensure_leaf_value(api, &setting.xpath(), setting.tag(), desired).await
}
