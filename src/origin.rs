use axum::http::{HeaderMap, header};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OriginError {
    #[error("invalid origin url: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("unsupported origin scheme {0:?}; expected http or https")]
    UnsupportedScheme(String),
    #[error("origin url has no host")]
    MissingHost,
}

/// Scheme and host (with optional port) the embedded widget is served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
}

impl Origin {
    /// Parses an absolute `http`/`https` URL, keeping only its origin.
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let url = url::Url::parse(raw)?;
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(OriginError::UnsupportedScheme(scheme.to_string()));
        }
        let host = url.host_str().ok_or(OriginError::MissingHost)?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Self {
            scheme: scheme.to_string(),
            host,
        })
    }

    /// Derives the origin a request was made against.
    ///
    /// The host comes from `x-forwarded-host`, then `host`, then `default_host`.
    /// The scheme is `x-forwarded-proto` when present; otherwise `http` if the
    /// header-supplied host mentions `localhost`, else `https`. A missing host
    /// header therefore yields `https://<default_host>`.
    pub fn from_headers(headers: &HeaderMap, default_host: &str) -> Self {
        let header_host = header_value(headers, "x-forwarded-host")
            .or_else(|| header_value(headers, header::HOST.as_str()));
        let scheme = match header_value(headers, "x-forwarded-proto") {
            Some(proto) => proto.to_ascii_lowercase(),
            None if header_host.is_some_and(|h| h.contains("localhost")) => "http".to_string(),
            None => "https".to_string(),
        };
        Self {
            scheme,
            host: header_host.unwrap_or(default_host).to_string(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

/// First entry of a possibly comma-separated proxy header.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const DEFAULT_HOST: &str = "localhost:3000";

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn forwarded_proto_wins() {
        let origin = Origin::from_headers(
            &headers(&[("host", "example.com"), ("x-forwarded-proto", "https")]),
            DEFAULT_HOST,
        );
        assert_eq!(origin.to_string(), "https://example.com");
    }

    #[test]
    fn localhost_without_proto_is_http() {
        let origin = Origin::from_headers(&headers(&[("host", "localhost:3000")]), DEFAULT_HOST);
        assert_eq!(origin.to_string(), "http://localhost:3000");
    }

    #[test]
    fn missing_host_headers_fall_back_to_https_default() {
        let origin = Origin::from_headers(&HeaderMap::new(), DEFAULT_HOST);
        assert_eq!(origin.to_string(), "https://localhost:3000");
    }

    #[test]
    fn public_host_without_proto_is_https() {
        let origin = Origin::from_headers(&headers(&[("host", "trakoship.com")]), DEFAULT_HOST);
        assert_eq!(origin.to_string(), "https://trakoship.com");
    }

    #[test]
    fn forwarded_host_takes_precedence() {
        let origin = Origin::from_headers(
            &headers(&[
                ("host", "10.0.0.7:3000"),
                ("x-forwarded-host", "shop.example.com, proxy.internal"),
                ("x-forwarded-proto", "https, http"),
            ]),
            DEFAULT_HOST,
        );
        assert_eq!(origin.to_string(), "https://shop.example.com");
    }

    #[test]
    fn localhost_check_uses_the_forwarded_host() {
        let origin = Origin::from_headers(
            &headers(&[
                ("host", "localhost:3000"),
                ("x-forwarded-host", "shop.example.com"),
            ]),
            DEFAULT_HOST,
        );
        assert_eq!(origin.to_string(), "https://shop.example.com");
    }

    #[test]
    fn parses_configured_origin() {
        let origin = Origin::parse("http://127.0.0.1:8080/some/path").expect("origin");
        assert_eq!(origin.to_string(), "http://127.0.0.1:8080");
        let origin = Origin::parse("https://widgets.example.com:443").expect("origin");
        assert_eq!(origin.to_string(), "https://widgets.example.com");
    }

    #[test]
    fn rejects_non_http_origins() {
        assert!(matches!(
            Origin::parse("ftp://example.com"),
            Err(OriginError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            Origin::parse("example.com"),
            Err(OriginError::Invalid(_))
        ));
    }
}
