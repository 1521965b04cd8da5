// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Base-URL construction
//!
//! Two paths: an explicit public address is used verbatim (a scheme is
//! prefixed only when missing), otherwise the URL is synthesized from the
//! requested host, the reported port, and the TLS flag.

fn scheme(tls: bool) -> &'static str {
    if tls {
        "https"
    } else {
        "http"
    }
}

/// Normalize an explicit public-facing address: keep it verbatim, prefixing
/// a scheme only when none is present (`https` only when TLS is on).
pub fn normalize_public_address(address: &str, tls: bool) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("{}://{}", scheme(tls), address)
    }
}

/// Synthesize a base URL from host, port, and TLS flag
pub fn synthesize_base_url(host: &str, port: u16, tls: bool) -> String {
    format!("{}://{}:{}", scheme(tls), host, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_address_gets_scheme_prefixed_when_missing() {
        assert_eq!(normalize_public_address("example.com", false), "http://example.com");
        assert_eq!(normalize_public_address("example.com", true), "https://example.com");
    }

    #[test]
    fn public_address_with_scheme_is_verbatim() {
        assert_eq!(
            normalize_public_address("https://example.com", false),
            "https://example.com"
        );
        assert_eq!(
            normalize_public_address("http://example.com:8080", true),
            "http://example.com:8080"
        );
    }

    #[test]
    fn synthesized_url_combines_host_port_scheme() {
        assert_eq!(synthesize_base_url("localhost", 4200, false), "http://localhost:4200");
        assert_eq!(synthesize_base_url("0.0.0.0", 443, true), "https://0.0.0.0:443");
    }
}
