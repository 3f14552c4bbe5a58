use crate::error::AuthError;

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is
/// ignored. The token itself is returned as-is; format checks are left to
/// [`crate::validate_account_hash`].
///
/// # Errors
///
/// [`AuthError::MissingCredentials`] for a missing or blank header,
/// [`AuthError::InvalidScheme`] for any scheme other than `Bearer`.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(AuthError::MissingCredentials)?;
    let (scheme, token) = header.split_once(' ').ok_or(AuthError::InvalidScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}
