//! Request extractors shared by every resource handler

use async_trait::async_trait;
use axum::{
    Form,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ValidationErrors},
    policy::Requester,
    serializers::type_name,
    state::AppState,
};

/// Authorization schemes carrying an API token
const TOKEN_SCHEMES: [&str; 2] = ["token", "bearer"];

fn invalid_credentials(message: &str) -> ApiError {
    ApiError::Unauthenticated(message.to_string())
}

/// Resolves the `Authorization` header to a [`Requester`].
///
/// No header, or a scheme other than `Token`/`Bearer`, yields an anonymous
/// requester. A token header that is malformed or names an unknown key is
/// rejected outright.
#[async_trait]
impl FromRequestParts<AppState> for Requester {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Requester::Anonymous);
        };

        let value = value.to_str().map_err(|_| {
            invalid_credentials(
                "Invalid token header. Token string should not contain invalid characters.",
            )
        })?;

        let words: Vec<&str> = value.split_whitespace().collect();
        let Some(scheme) = words.first() else {
            return Ok(Requester::Anonymous);
        };
        if !TOKEN_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
            return Ok(Requester::Anonymous);
        }

        let key = match words.as_slice() {
            [_, key] => *key,
            [_] => {
                return Err(invalid_credentials(
                    "Invalid token header. No credentials provided.",
                ));
            }
            _ => {
                return Err(invalid_credentials(
                    "Invalid token header. Token string should not contain spaces.",
                ));
            }
        };

        match state.credentials.authenticate(key).await? {
            Some(user) => {
                debug!("Authenticated request as {}", user.username);
                Ok(Requester::Authenticated(user))
            }
            None => {
                warn!("Rejected unknown API token");
                Err(invalid_credentials("Invalid token."))
            }
        }
    }
}

/// A request body as a JSON object, read but not yet judged.
///
/// JSON and urlencoded form bodies are accepted; a request without a
/// content type is read as JSON and an empty body is an empty object.
/// Extraction never fails: a malformed body or an unsupported content type
/// only surfaces from [`Payload::into_map`], which handlers call once the
/// requester has been authorized.
#[derive(Debug)]
pub struct Payload(Result<Map<String, Value>, ApiError>);

impl Payload {
    pub fn into_map(self) -> Result<Map<String, Value>, ApiError> {
        self.0
    }
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Payload(read_body(req, state).await))
    }
}

async fn read_body<S>(req: Request, state: &S) -> Result<Map<String, Value>, ApiError>
where
    S: Send + Sync,
{
    let media_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match media_type.as_deref() {
        None | Some("application/json") => {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            parse_json(&bytes)
        }
        Some("application/x-www-form-urlencoded") => {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok(pairs
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect())
        }
        Some(other) => {
            let other = other.to_string();
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            if bytes.is_empty() {
                Ok(Map::new())
            } else {
                Err(ApiError::UnsupportedMediaType(other))
            }
        }
    }
}

fn parse_json(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::BadRequest(format!("JSON parse error - {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ValidationErrors::non_field(format!(
            "Invalid data. Expected a dictionary, but got {}.",
            type_name(&other)
        ))
        .into()),
    }
}

/// Path identifiers, resolved on demand.
///
/// A malformed id must not pre-empt authentication, so the extraction never
/// fails; [`Ids::resolve`] turns a bad segment into 404.
#[derive(Debug)]
pub struct Ids<T>(Option<T>);

impl<T> Ids<T> {
    pub fn resolve(self) -> Result<T, ApiError> {
        self.0.ok_or(ApiError::NotFound)
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for Ids<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(ids)) => Ok(Ids(Some(ids))),
            Err(rejection) => {
                debug!("Unresolvable path ids: {}", rejection.body_text());
                Ok(Ids(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    #[test]
    fn test_parse_json_object() {
        let map = parse_json(br#"{"text": "hi", "group": 1}"#).unwrap();
        assert_eq!(map.get("text"), Some(&json!("hi")));
    }

    #[test]
    fn test_parse_json_empty_body_is_empty_object() {
        assert!(parse_json(b"").unwrap().is_empty());
        assert!(parse_json(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_json_rejects_non_objects() {
        match parse_json(b"[1, 2]") {
            Err(ApiError::Validation(errors)) => assert_eq!(
                errors.field(crate::error::NON_FIELD_ERRORS),
                Some(&["Invalid data. Expected a dictionary, but got list.".to_string()][..])
            ),
            other => panic!("unexpected: {:?}", other),
        }
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_payload_extraction_defers_body_errors() {
        for (content_type, body) in [
            ("application/json", "{bad"),
            ("application/json", "[1, 2]"),
            ("text/plain", "hello"),
        ] {
            let payload = Payload::from_request(request(content_type, body), &())
                .await
                .unwrap();
            assert!(payload.into_map().is_err(), "{} {:?}", content_type, body);
        }
    }

    #[tokio::test]
    async fn test_payload_reads_form_bodies() {
        let payload = Payload::from_request(
            request("application/x-www-form-urlencoded", "text=a+b&group=3"),
            &(),
        )
        .await
        .unwrap();

        let map = payload.into_map().unwrap();
        assert_eq!(map.get("text"), Some(&json!("a b")));
        assert_eq!(map.get("group"), Some(&json!("3")));
    }

    #[test]
    fn test_parse_json_syntax_error() {
        match parse_json(b"{not json") {
            Err(ApiError::BadRequest(msg)) => assert!(msg.starts_with("JSON parse error - ")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
