//! Response status checks for the chat client.

use crate::error::LlmError;

/// Longest error body kept in [`LlmError::Api`].
const MAX_ERROR_BODY: usize = 500;

/// Return the response unchanged on success, otherwise [`LlmError::Api`]
/// with the status and a truncated body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let mut message = resp.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}
