use std::net::IpAddr;

/// Whether `ip` must never be sent to the external geolocation service.
///
/// Covers the `"unknown"` sentinel and other placeholder strings the HTTP
/// layer can produce, loopback, RFC1918 private ranges, and link-local
/// addresses. Anything that does not parse as an IP address is also treated
/// as local — better to record `"Unknown"` than to leak a garbage header
/// value to a third party.
pub fn is_private_or_local(ip: &str) -> bool {
    let ip = ip.trim();
    if ip.is_empty()
        || ip.eq_ignore_ascii_case("unknown")
        || ip.eq_ignore_ascii_case("null")
        || ip.to_ascii_lowercase().starts_with("localhost")
    {
        return true;
    }
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        Ok(IpAddr::V6(v6)) => v6.is_loopback(),
        Err(_) => true,
    }
}
