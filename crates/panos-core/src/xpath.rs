//! Fixed configuration paths on the device
//!
//! All paths are rooted at the local device entry of the candidate
//! configuration tree.

/// Local device root
pub const DEVICE_ROOT: &str = "/config/devices/entry[@name='localhost.localdomain']";

/// Virtual system holding the address groups
pub const VSYS: &str = "vsys1";

/// `deviceconfig/system` node holding the Panorama server leaves
pub fn system() -> String {
    format!("{DEVICE_ROOT}/deviceconfig/system")
}

/// `dns-setting/servers` node holding the DNS server leaves
pub fn dns_servers() -> String {
    format!("{}/dns-setting/servers", system())
}

/// Address group entry with the given name
pub fn address_group(name: &str) -> String {
    format!("{DEVICE_ROOT}/vsys/entry[@name='{VSYS}']/address-group/entry[@name='{name}']")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_group_path() {
        assert_eq!(
            address_group("dag-1"),
            "/config/devices/entry[@name='localhost.localdomain']\
             /vsys/entry[@name='vsys1']/address-group/entry[@name='dag-1']"
        );
    }

    #[test]
    fn test_dns_servers_path() {
        assert_eq!(
            dns_servers(),
            "/config/devices/entry[@name='localhost.localdomain']\
             /deviceconfig/system/dns-setting/servers"
        );
    }
}
