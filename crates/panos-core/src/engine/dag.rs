//! Dynamic address group creation

use tracing::{debug, info};

use crate::error::Result;
use crate::traits::XmlApi;
use crate::{xml, xpath};

/// Make sure a dynamic address group called `name` exists
///
/// The group is created with `filter` only when no entry exists at its path.
/// An existing group is left alone; its filter is neither compared nor
/// replaced.
///
/// # Returns
///
/// - `Ok(true)`: the group was created
/// - `Ok(false)`: the group already existed
/// - `Err(Error)`: the read or the write failed
pub async fn ensure_dynamic_group_exists(
    api: &dyn XmlApi,
    name: &str,
    filter: &str,
) -> Result<bool> {
    let path = xpath::address_group(name);

    let current = api.get(&path).await?;
    if current.contains_element("entry") {
        debug!("Address group {} already exists on {}", name, api.hostname());
        return Ok(false);
    }

    let fragment = dynamic_filter(filter);
    info!("Creating dynamic address group {} on {}", name, api.hostname());
    api.set(&path, &fragment).await?;

    Ok(true)
}

fn dynamic_filter(filter: &str) -> String {
    format!("<dynamic>{}</dynamic>", xml::element("filter", filter))
}
