//! Same-origin checks for state-changing requests and relay handshakes.
//!
//! The lab page is served from `http://<host>:<port>`. Anything that can
//! change the lab (PUT/POST routes, relayed channel frames) must come from
//! that page. Requests without an `Origin` header come from non-browser
//! clients (`curl`, tests) and are let through: browsers always send one
//! on cross-origin POSTs and WebSocket handshakes.

use std::net::IpAddr;

use url::{Host, Url};

/// Origins allowed to drive the lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginPolicy {
    interface: IpAddr,
    port: u16,
}

impl OriginPolicy {
    /// Accept pages served by the lab on `interface:port`.
    pub const fn new(interface: IpAddr, port: u16) -> Self {
        Self { interface, port }
    }

    /// Check an `Origin` header value.
    ///
    /// Loopback hosts and `localhost` are always accepted. When bound to all
    /// interfaces any IP literal is, since the page may be opened through a
    /// LAN address. Domain names other than `localhost` never are.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        let Some(origin) = origin else {
            return true;
        };
        let Ok(url) = Url::parse(origin) else {
            return false;
        };
        if url.scheme() != "http" || url.port_or_known_default() != Some(self.port) {
            return false;
        }
        match url.host() {
            Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            Some(Host::Ipv4(ip)) => self.allows_ip(IpAddr::V4(ip)),
            Some(Host::Ipv6(ip)) => self.allows_ip(IpAddr::V6(ip)),
            None => false,
        }
    }

    /// Check a browser request by its `Origin` and `Sec-Fetch-Site` headers.
    pub fn allows_request(&self, origin: Option<&str>, fetch_site: Option<&str>) -> bool {
        if fetch_site.is_some_and(|site| site.eq_ignore_ascii_case("cross-site")) {
            return false;
        }
        self.allows(origin)
    }

    fn allows_ip(&self, ip: IpAddr) -> bool {
        ip.is_loopback() || ip == self.interface || self.interface.is_unspecified()
    }
}
