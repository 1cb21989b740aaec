use std::net::Ipv4Addr;

use tracing::debug;

/// Shown when the host has no usable LAN address.
pub const FALLBACK_HOST: &str = "localhost";

/// First non-loopback IPv4 address of this host, or [`FALLBACK_HOST`].
///
/// Interfaces are queried on every call.
pub fn local_ipv4() -> String {
    first_lan_ipv4(interface_ipv4s())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| FALLBACK_HOST.to_string())
}

/// Picks the first address a phone on the same network could reach.
pub fn first_lan_ipv4(addrs: impl IntoIterator<Item = Ipv4Addr>) -> Option<Ipv4Addr> {
    addrs
        .into_iter()
        .find(|ip| !ip.is_loopback() && !ip.is_unspecified())
}

#[cfg(unix)]
fn interface_ipv4s() -> Vec<Ipv4Addr> {
    use nix::ifaddrs::getifaddrs;
    use std::net::SocketAddrV4;

    match getifaddrs() {
        Ok(ifaddrs) => ifaddrs
            .filter_map(|ifaddr| {
                let sin = *ifaddr.address?.as_sockaddr_in()?;
                let ip = *SocketAddrV4::from(sin).ip();
                debug!("Interface {} has {}", ifaddr.interface_name, ip);
                Some(ip)
            })
            .collect(),
        Err(e) => {
            debug!("getifaddrs failed: {}", e);
            Vec::new()
        }
    }
}

#[cfg(not(unix))]
fn interface_ipv4s() -> Vec<Ipv4Addr> {
    debug!("Interface enumeration is not supported on this platform");
    Vec::new()
}
