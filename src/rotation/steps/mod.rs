//! # Step Handlers
//!
//! One handler per protocol step. Handlers read everything they need from the
//! store on entry and never call each other.

mod create;
mod finish;
mod set;
mod validate;

pub use create::create_secret;
pub use finish::finish_secret;
pub use set::set_secret;
pub use validate::test_secret;

use super::strategy::Payload;
use serde_json::Value;

/// Parse a secret string into a JSON object payload
///
/// A version without a secret string (binary-only) is rejected like any other
/// malformed payload.
pub(crate) fn parse_payload(secret_string: Option<&str>) -> Result<Payload, String> {
    let Some(secret_string) = secret_string else {
        return Err("Secret data has no SecretString".to_string());
    };
    match serde_json::from_str::<Value>(secret_string) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("Secret data must be a JSON object".to_string()),
        Err(e) => Err(format!("Secret data is not valid JSON: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload() {
        assert!(parse_payload(Some(r#"{"apiVersion": 1}"#)).is_ok());
        assert_eq!(
            parse_payload(Some("[1, 2]")).unwrap_err(),
            "Secret data must be a JSON object"
        );
        assert_eq!(
            parse_payload(None).unwrap_err(),
            "Secret data has no SecretString"
        );
        assert!(parse_payload(Some("not json"))
            .unwrap_err()
            .starts_with("Secret data is not valid JSON"));
    }
}
