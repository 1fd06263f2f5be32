use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::validation::text;

/// Body of both register and login.
#[derive(Debug, Deserialize, Validate)]
pub struct AuthRequest {
    #[serde(default, deserialize_with = "normalize_email")]
    #[validate(email(message = "Invalid email address format"))]
    pub email: String,
    #[serde(default, deserialize_with = "text")]
    #[validate(length(min = 3, message = "Password must be at least 3 characters long"))]
    pub password: String,
}

fn normalize_email<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    text(deserializer).map(|raw| raw.trim().to_lowercase())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub message: &'static str,
    pub user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(email: &str, password: &str) -> AuthRequest {
        AuthRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_well_formed_credentials() {
        assert!(req("a@x.com", "abc").validate().is_ok());
    }

    #[test]
    fn flags_both_fields() {
        let errs = req("not-an-email", "ab").validate().unwrap_err();
        let fields = errs.field_errors();
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn empty_email_is_invalid() {
        assert!(req("", "abcdef").validate().is_err());
    }

    #[test]
    fn missing_fields_deserialize_empty() {
        let parsed: AuthRequest = serde_json::from_str("{}").expect("defaults");
        assert!(parsed.email.is_empty());
        assert!(parsed.password.is_empty());
    }

    #[test]
    fn non_string_fields_fail_their_own_rules() {
        let parsed: AuthRequest =
            serde_json::from_str(r#"{"email":null,"password":12345}"#).expect("lenient parse");
        let errs = parsed.validate().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn responses_use_camel_case_ids() {
        let json = serde_json::to_value(RegisterResponse {
            message: "User registered successfully",
            user_id: 3,
        })
        .unwrap();
        assert_eq!(json["userId"], 3);
    }

    #[test]
    fn email_is_trimmed_and_lowercased_on_parse() {
        let parsed: AuthRequest =
            serde_json::from_str(r#"{"email":"  A@X.com ","password":"abc"}"#).unwrap();
        assert_eq!(parsed.email, "a@x.com");
        assert!(parsed.validate().is_ok());
    }
}
