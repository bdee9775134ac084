//! Remote transport layer: wire format, outbound sender, inbound receiver
//! (`spec.md` §4.4, §4.6, §4.7).

pub mod inbound;
pub mod outbound;
pub mod wire;

/// Endpoints are opaque strings the runtime never parses beyond equality
/// comparison (`spec.md` §6) — except here, at the one seam where a string
/// actually has to become a dialable/bindable address. Strips an optional
/// `tcp://` scheme so both `"tcp://host:port"` and bare `"host:port"`
/// endpoints work against `tokio::net`.
pub(crate) fn strip_scheme(endpoint: &str) -> &str {
    endpoint.strip_prefix("tcp://").unwrap_or(endpoint)
}

/// As [`strip_scheme`], plus rewriting a leading wildcard host (`*`) to
/// `0.0.0.0` for `TcpListener::bind` — `spec.md`'s E2E scenarios use
/// endpoints like `tcp://*:5001` to mean "bind every interface".
pub(crate) fn bind_addr(endpoint: &str) -> String {
    let stripped = strip_scheme(endpoint);
    match stripped.split_once(':') {
        Some(("*", port)) => format!("0.0.0.0:{port}"),
        _ => stripped.to_string(),
    }
}
