use std::convert::Infallible;
use std::net::IpAddr;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::domain::auth::models::Provenance;

/// Client IP and user agent as reported by the proxy chain.
#[derive(Debug, Clone, Default)]
pub struct ClientProvenance(pub Provenance);

impl ClientProvenance {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_value = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        // First hop of X-Forwarded-For is the original client. Anything
        // that is not an IP address is dropped rather than stored.
        let ip_address = header_value("x-forwarded-for")
            .and_then(|value| value.split(',').next())
            .and_then(parse_ip)
            .or_else(|| header_value("x-real-ip").and_then(parse_ip))
            .map(|ip| ip.to_string());

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Self(Provenance {
            ip_address,
            user_agent,
        })
    }
}

fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientProvenance
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let ClientProvenance(provenance) = ClientProvenance::from_headers(&headers);

        assert_eq!(provenance.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(provenance.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn test_garbage_forwarded_for_falls_back_to_real_ip() {
        let oversized = "a".repeat(65);
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_str(&format!("{}, 10.0.0.1", oversized)).unwrap(),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        let ClientProvenance(provenance) = ClientProvenance::from_headers(&headers);

        assert_eq!(provenance.ip_address.as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn test_no_valid_address_stores_none() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("unknown"));
        headers.insert("x-real-ip", HeaderValue::from_static("<script>"));

        let ClientProvenance(provenance) = ClientProvenance::from_headers(&headers);

        assert_eq!(provenance.ip_address, None);
    }

    #[test]
    fn test_ipv6_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("2001:db8::1"));

        let ClientProvenance(provenance) = ClientProvenance::from_headers(&headers);

        assert_eq!(provenance.ip_address.as_deref(), Some("2001:db8::1"));
    }

    #[test]
    fn test_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        let ClientProvenance(provenance) = ClientProvenance::from_headers(&headers);

        assert_eq!(provenance.ip_address.as_deref(), Some("10.0.0.2"));
        assert_eq!(provenance.user_agent, None);
    }
}
