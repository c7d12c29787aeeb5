use std::net::Ipv4Addr;

/// Non-loopback IPv4 addresses of this host, one per interface address.
#[cfg(unix)]
pub fn ipv4_addresses() -> Vec<Ipv4Addr> {
    match nix::ifaddrs::getifaddrs() {
        Ok(interfaces) => interfaces
            .filter_map(|ifaddr| {
                ifaddr
                    .address
                    .as_ref()
                    .and_then(|address| address.as_sockaddr_in())
                    .map(|sin| sin.ip())
            })
            .filter(|ip| !ip.is_loopback())
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate network interfaces: {}", e);
            Vec::new()
        }
    }
}

#[cfg(not(unix))]
pub fn ipv4_addresses() -> Vec<Ipv4Addr> {
    Vec::new()
}
