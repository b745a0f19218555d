use http::{HeaderMap, HeaderName};
use std::fmt::Display;
use std::net::IpAddr;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// The key a client's rate limit bucket is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Identity used when neither headers nor the peer address name the client.
    pub const UNKNOWN: &'static str = "unknown";

    /// Resolves the identity of a request.
    ///
    /// Precedence: the first entry of `X-Forwarded-For`, then `X-Real-IP`,
    /// then the peer address. Values are trimmed and the first non-empty one
    /// wins; headers that are not valid visible ASCII are skipped.
    pub fn resolve(headers: &HeaderMap, peer: Option<IpAddr>) -> Self {
        let forwarded = header_str(headers, &X_FORWARDED_FOR)
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let real_ip = || {
            header_str(headers, &X_REAL_IP)
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        match forwarded.or_else(real_ip) {
            Some(value) => Self(value.to_owned()),
            None => Self(
                peer.map(|ip| ip.to_string())
                    .unwrap_or_else(|| Self::UNKNOWN.to_owned()),
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
