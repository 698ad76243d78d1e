use chrono::Utc;
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde_json::Value;

use crate::{config::SpotifyConfig, types::Token, utils};

/// Exchanges the app's client credentials for a bearer token.
///
/// Performs a single `client_credentials` grant against the configured token
/// endpoint, authenticating with `Basic base64(client_id:client_secret)`.
/// The token is not refreshed later; it is assumed to outlive the run.
///
/// # Returns
///
/// - `Ok(Token)` - the bearer token and its reported lifetime
/// - `Err(String)` - transport failure, non-200 status (with the response
///   body) or a response without `access_token`
///
/// A failure here aborts the whole ingestion run.
pub async fn request_token(config: &SpotifyConfig) -> Result<Token, String> {
    let client = Client::new();
    let res = client
        .post(&config.token_url)
        .header(
            AUTHORIZATION,
            utils::basic_credentials(&config.client_id, &config.client_secret),
        )
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(format!("{}\n{}", status.as_u16(), body));
    }

    let json: Value = res.json().await.map_err(|e| e.to_string())?;

    let access_token = json["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "response carried no access_token".to_string())?;

    Ok(Token {
        access_token: access_token.to_string(),
        token_type: json["token_type"]
            .as_str()
            .unwrap_or("Bearer")
            .to_string(),
        expires_in: json["expires_in"].as_u64().unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}
