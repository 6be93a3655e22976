//! `/noredir` and `/yesredir` - per-browser redirect opt-out.
//!
//! The cookie is read by the front proxy, which skips the resolver for
//! clients that carry it. Neither response gets a provenance marker.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::{ApiError, ApiResult};

/// Name of the opt-out cookie.
pub const OPT_OUT_COOKIE: &str = "noredir";

/// Opt-out lifetime: seven days.
pub const OPT_OUT_MAX_AGE_SECS: u64 = 86400 * 7;

/// `Set-Cookie` value enabling the opt-out.
pub fn opt_out_cookie() -> String {
    format!(
        "{}=1; HttpOnly; Max-Age={}; Path=/; SameSite=Strict",
        OPT_OUT_COOKIE, OPT_OUT_MAX_AGE_SECS
    )
}

/// `Set-Cookie` value expiring the opt-out.
pub fn opt_in_cookie() -> String {
    format!(
        "{}=\"\"; expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/",
        OPT_OUT_COOKIE
    )
}

fn redirect_home_with_cookie(cookie: String) -> ApiResult<Response> {
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::internal_error(format!("Invalid cookie header: {}", e)))?;
    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, HeaderValue::from_static("/")),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response())
}

/// GET /noredir
pub async fn noredir() -> ApiResult<Response> {
    tracing::debug!("Redirect opt-out requested");
    redirect_home_with_cookie(opt_out_cookie())
}

/// GET /yesredir
pub async fn yesredir() -> ApiResult<Response> {
    tracing::debug!("Redirect opt-in requested");
    redirect_home_with_cookie(opt_in_cookie())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opt_out_cookie_attributes() {
        let cookie = opt_out_cookie();
        assert!(cookie.starts_with("noredir=1;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn test_opt_in_cookie_expires() {
        let cookie = opt_in_cookie();
        assert!(cookie.starts_with("noredir="));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_noredir_response() -> ApiResult<()> {
        let response = noredir().await?;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert!(response.headers().contains_key(header::SET_COOKIE));
        Ok(())
    }
}
