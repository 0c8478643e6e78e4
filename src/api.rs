use crate::origin::Origin;
use crate::server::AppState;
use crate::widget::{WidgetRequest, missing_code_script};
use axum::Json;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, warn};

pub async fn serve_widget_script(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> impl IntoResponse {
    let script = match query.as_deref().and_then(code_param) {
        Some(code) => {
            let origin = state.config.public_origin.clone().unwrap_or_else(|| {
                Origin::from_headers(&headers, &state.config.default_host)
            });
            debug!(%origin, code_len = code.len(), "serving widget script");
            WidgetRequest::new(code, origin).render()
        }
        None => {
            warn!("widget script requested without code parameter");
            missing_code_script()
        }
    };

    let mut resp = Response::new(script);
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/javascript"),
    );
    if let Ok(cache) = HeaderValue::from_str(&state.config.cache_control()) {
        resp.headers_mut().insert(header::CACHE_CONTROL, cache);
    }
    resp
}

/// First `code` query parameter; an empty value counts as missing.
fn code_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::code_param;

    #[test]
    fn reads_code_param() {
        assert_eq!(code_param("code=abc123").as_deref(), Some("abc123"));
        assert_eq!(code_param("theme=dark&code=a%27b").as_deref(), Some("a'b"));
        assert_eq!(code_param("code=hello+world").as_deref(), Some("hello world"));
    }

    #[test]
    fn first_code_param_wins() {
        assert_eq!(code_param("code=first&code=second").as_deref(), Some("first"));
        assert_eq!(code_param("code=&code=second"), None);
    }

    #[test]
    fn missing_or_empty_code_is_none() {
        assert_eq!(code_param(""), None);
        assert_eq!(code_param("codes=x"), None);
        assert_eq!(code_param("code="), None);
        assert_eq!(code_param("code"), None);
    }

    #[test]
    fn malformed_encoding_is_lenient() {
        assert_eq!(code_param("code=%zz").as_deref(), Some("%zz"));
    }
}
