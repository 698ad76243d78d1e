use chrono::Utc;

use crate::{types::Token, warning};

/// Holds the bearer token for the duration of one run.
///
/// Client-credentials tokens cannot be refreshed; a run that outlives the
/// token only gets a warning.
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now >= self.token.obtained_at + self.token.expires_in
    }

    pub fn warn_if_expired(&self) {
        if self.is_expired() {
            warning!(
                "Access token expired during the run (lifetime {}s); later requests may have failed.",
                self.token.expires_in
            );
        }
    }
}
