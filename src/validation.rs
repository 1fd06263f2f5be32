use axum::{
    async_trait,
    body::HttpBody,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use validator::Validate;

use crate::error::{ApiError, FieldError};

/// JSON body that has passed its `Validate` rules.
///
/// Malformed JSON is reported the same way as a failed rule so every
/// client-side input problem renders as `Validation Failed`. A request with
/// no body reads as `{}`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = if req.body().size_hint().exact() == Some(0) {
            serde_json::from_value(Value::Object(Default::default()))
                .map_err(|e| ApiError::Validation(vec![FieldError::new("body", e.to_string())]))?
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(body_rejection)?;
            value
        };
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

fn body_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(vec![FieldError::new("body", rejection.body_text())])
}

/// `deserialize_with` for string fields. Any non-string JSON value, `null`
/// included, reads as empty text and fails that field's own rule.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Like [`text`] for optional fields; pair with `#[serde(default)]` so an
/// absent key stays `None`.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    text(deserializer).map(Some)
}

/// Numeric `:id` path segment.
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid_id())?;
        parse_id(&raw).map(ResourceId)
    }
}

fn invalid_id() -> ApiError {
    ApiError::Validation(vec![FieldError::new("id", "must be a positive integer")])
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid_id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[serde(default, deserialize_with = "text")]
        #[validate(length(min = 1, message = "Name cannot be empty"))]
        name: String,
        #[serde(default, deserialize_with = "optional_text")]
        note: Option<String>,
    }

    async fn extract(req: Request) -> Result<Named, ApiError> {
        ValidatedJson::<Named>::from_request(req, &())
            .await
            .map(|ValidatedJson(v)| v)
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn missing_body_reads_as_empty_object() {
        let req = Request::builder().method("PATCH").body(Body::empty()).unwrap();
        match extract(req).await {
            Err(ApiError::Validation(fields)) => {
                assert_eq!(fields, vec![FieldError::new("name", "Name cannot be empty")]);
            }
            other => panic!("expected rule failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrong_types_fail_the_field_not_the_body() {
        for body in [r#"{"name":5}"#, r#"{"name":null}"#, r#"{"name":["a"]}"#] {
            match extract(json_request(body)).await {
                Err(ApiError::Validation(fields)) => assert_eq!(fields[0].field, "name", "{body}"),
                other => panic!("expected field error for {body}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn optional_fields_distinguish_null_from_absent() {
        let absent = extract(json_request(r#"{"name":"a"}"#)).await.unwrap();
        assert_eq!(absent.note, None);
        let null = extract(json_request(r#"{"name":"a","note":null}"#)).await.unwrap();
        assert_eq!(null.note.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn broken_json_is_a_body_error() {
        match extract(json_request(r#"{"name":"#)).await {
            Err(ApiError::Validation(fields)) => assert_eq!(fields[0].field, "body"),
            other => panic!("expected body error, got {other:?}"),
        }
    }

    #[test]
    fn parse_id_accepts_positive_integers() {
        assert_eq!(parse_id("42").ok(), Some(42));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        for raw in ["0", "-3", "abc", "1.5", ""] {
            match parse_id(raw) {
                Err(ApiError::Validation(fields)) => assert_eq!(fields[0].field, "id"),
                other => panic!("expected validation error for {raw:?}, got {other:?}"),
            }
        }
    }
}
