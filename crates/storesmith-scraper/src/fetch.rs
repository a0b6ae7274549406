//! Low-level HTTP helpers shared by all extractors.
//!
//! Every fetch carries an explicit per-request timeout; exceeding it surfaces
//! as [`ScrapeError::Http`] and is handled like any other extractor failure.

use std::time::Duration;

use rand::Rng;

use crate::error::ScrapeError;

/// Browser UA tried when the configured user agent gets blocked or served a
/// challenge page.
pub(crate) const BROWSER_FALLBACK_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const HTML_FETCH_BACKOFF_MS: [u64; 3] = [0, 300, 900];
const BACKOFF_JITTER_MS: u64 = 100;

/// Builds the shared `reqwest::Client` used across a process's scrape
/// requests. Connection reuse is an optimization only; no correctness
/// depends on it.
///
/// # Errors
///
/// Returns [`ScrapeError::Http`] if the client cannot be constructed.
pub fn build_client(connect_timeout_secs: u64) -> Result<reqwest::Client, ScrapeError> {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

/// Fetch the HTML body of a URL, trying the supplied user agent first and
/// the browser fallback UA second, with bounded backoff between attempts.
///
/// A 404 is returned immediately without retrying — the page will not
/// appear on a second try. Challenge interstitials are treated as unusable
/// bodies and retried.
///
/// # Errors
///
/// - [`ScrapeError::NotFound`] — HTTP 404.
/// - [`ScrapeError::UnexpectedStatus`] — persistent non-2xx status.
/// - [`ScrapeError::Http`] — network failure or timeout on every attempt.
/// - [`ScrapeError::Unusable`] — only challenge pages or empty bodies came back.
pub async fn fetch_html(
    client: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
    user_agent: &str,
    attempts: usize,
) -> Result<String, ScrapeError> {
    let mut user_agents = vec![user_agent.to_string()];
    if user_agent != BROWSER_FALLBACK_UA {
        user_agents.push(BROWSER_FALLBACK_UA.to_string());
    }

    let mut last_status: Option<u16> = None;
    let mut last_error: Option<reqwest::Error> = None;

    for attempt in 0..attempts.max(1) {
        let delay_ms = backoff_delay_ms(attempt);
        if delay_ms > 0 {
            let jitter = rand::rng().random_range(0..BACKOFF_JITTER_MS);
            tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
        }

        for ua in &user_agents {
            let response = match client
                .get(url)
                .timeout(Duration::from_secs(timeout_secs))
                .header(reqwest::header::USER_AGENT, ua)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    tracing::debug!(url, attempt, error = %err, "page fetch failed");
                    last_error = Some(err);
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ScrapeError::NotFound {
                    url: url.to_owned(),
                });
            }
            if !status.is_success() {
                last_status = Some(status.as_u16());
                continue;
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::debug!(url, attempt, error = %err, "body read failed");
                    last_error = Some(err);
                    continue;
                }
            };
            if is_usable_html(&body) {
                return Ok(body);
            }
            tracing::debug!(url, attempt, ua, "body looks like a bot challenge; retrying");
        }
    }

    if let Some(status) = last_status {
        return Err(ScrapeError::UnexpectedStatus {
            status,
            url: url.to_owned(),
        });
    }
    if let Some(err) = last_error {
        return Err(ScrapeError::Http(err));
    }
    Err(ScrapeError::Unusable {
        url: url.to_owned(),
        reason: "every attempt returned an empty or challenge body".to_owned(),
    })
}

/// Fetch and parse a JSON endpoint. Single attempt — callers use this for
/// lightweight secondary APIs and fall back to markup parsing on failure.
///
/// # Errors
///
/// - [`ScrapeError::NotFound`] — HTTP 404.
/// - [`ScrapeError::UnexpectedStatus`] — any other non-2xx status.
/// - [`ScrapeError::Http`] — network failure or timeout.
/// - [`ScrapeError::Deserialize`] — body is not valid JSON.
pub async fn fetch_json(
    client: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
    user_agent: &str,
) -> Result<serde_json::Value, ScrapeError> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(timeout_secs))
        .header(reqwest::header::USER_AGENT, user_agent)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScrapeError::NotFound {
            url: url.to_owned(),
        });
    }
    if !status.is_success() {
        return Err(ScrapeError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ScrapeError::Deserialize {
        context: format!("JSON response from {url}"),
        source: e,
    })
}

/// Base delay before `attempt`. Attempts past the table's end reuse its
/// last (longest) entry rather than running back-to-back.
fn backoff_delay_ms(attempt: usize) -> u64 {
    HTML_FETCH_BACKOFF_MS[attempt.min(HTML_FETCH_BACKOFF_MS.len() - 1)]
}

fn is_usable_html(body: &str) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return false;
    }
    !looks_like_bot_challenge(trimmed)
}

fn looks_like_bot_challenge(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    lowered.contains("attention required! | cloudflare")
        || lowered.contains("/cdn-cgi/challenge-platform/")
        || lowered.contains("just a moment...")
        || lowered.contains("please enable cookies")
        || lowered.contains("cf-chl-")
}
