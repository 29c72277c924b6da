//! Converts serenity errors into the shared [`ApiError`] so that live
//! interactions classify failures (token expiry in particular) the same way
//! remote ones do.

use discord_interactions::{ApiError, InteractionError};
use serenity::http::HttpError;

/// Map a serenity error onto [`ApiError`].
pub fn to_api_error(err: &serenity::Error) -> ApiError {
    match err {
        serenity::Error::Http(http_err) => from_http(http_err),
        other => ApiError::Client(other.to_string()),
    }
}

/// Map a serenity error straight to an interaction error; expired-token codes
/// become [`InteractionError::TokenExpired`].
pub fn to_interaction_error(err: serenity::Error) -> InteractionError {
    to_api_error(&err).into()
}

fn from_http(err: &HttpError) -> ApiError {
    match err {
        HttpError::UnsuccessfulRequest(resp) => status_error(
            resp.status_code.as_u16(),
            resp.error.code as i64,
            &resp.error.message,
        ),
        other => ApiError::Client(other.to_string()),
    }
}

/// Discord reports `0` when the body carried no JSON error code.
fn status_error(status: u16, raw_code: i64, message: &str) -> ApiError {
    ApiError::Status {
        status,
        code: u32::try_from(raw_code).ok().filter(|c| *c != 0),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discord_types::DiscordErrorCode;

    // Serenity's HTTP error responses can't be built without a live request,
    // so the status mapping is tested through status_error().

    #[test]
    fn test_unknown_interaction_becomes_token_expired() {
        let err: InteractionError = status_error(404, 10062, "Unknown interaction").into();
        assert!(matches!(err, InteractionError::TokenExpired));
    }

    #[test]
    fn test_invalid_webhook_token_becomes_token_expired() {
        let err: InteractionError = status_error(401, 50027, "Invalid Webhook Token").into();
        assert!(matches!(err, InteractionError::TokenExpired));
    }

    #[test]
    fn test_permission_error_keeps_code() {
        let api = status_error(403, 50013, "Missing Permissions");
        assert_eq!(api.error_code(), Some(DiscordErrorCode::MissingPermissions));
        let err: InteractionError = api.into();
        assert!(matches!(err, InteractionError::Api(_)));
    }

    #[test]
    fn test_zero_code_is_dropped() {
        match status_error(500, 0, "Internal Server Error") {
            ApiError::Status { status, code, .. } => {
                assert_eq!(status, 500);
                assert!(code.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_http_error_is_client_error() {
        let err = to_api_error(&serenity::Error::Other("gateway closed"));
        assert!(matches!(err, ApiError::Client(ref m) if m.contains("gateway closed")));
        assert!(err.error_code().is_none());
    }
}
