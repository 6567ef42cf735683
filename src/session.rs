//! Landing-page handshake that yields a session and the document title.
//!
//! The book host only serves the page viewer endpoints to clients that
//! present the cookies handed out by the landing page and a matching referer.
//! [`bootstrap`] performs that handshake and returns an explicit [`Session`]
//! that every later request takes as a parameter.

use reqwest::header::SET_COOKIE;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::download::{DownloadError, HttpClient, PolitenessGate};
use crate::progress::ProgressObserver;

/// CSS selector of the element holding the volume title on the landing page.
const TITLE_SELECTOR: &str = ".gb-volume-title";

/// Cookies and referer presented with every request after bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cookie_header: String,
    referer: String,
}

impl Session {
    /// Creates a session from a ready-made `Cookie` header value and referer URL.
    pub fn new(cookie_header: impl Into<String>, referer: impl Into<String>) -> Self {
        Self {
            cookie_header: cookie_header.into(),
            referer: referer.into(),
        }
    }

    /// Value of the `Cookie` header (`name=value` pairs joined by `"; "`).
    #[must_use]
    pub fn cookie_header(&self) -> &str {
        &self.cookie_header
    }

    /// Value of the `Referer` header.
    #[must_use]
    pub fn referer(&self) -> &str {
        &self.referer
    }
}

/// Result of a successful handshake.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    /// Volume title, or the document id when the page has none.
    pub title: String,
    /// Session to thread into discovery and fetch calls.
    pub session: Session,
}

/// Errors that abort processing of a single document.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The landing page could not be requested.
    #[error("landing page request failed for {document_id}: {source}")]
    Request {
        /// Document being bootstrapped.
        document_id: String,
        /// Underlying transport error.
        #[source]
        source: DownloadError,
    },

    /// The landing page answered with a non-success status.
    #[error("landing page for {document_id} returned HTTP {status}")]
    Status {
        /// Document being bootstrapped.
        document_id: String,
        /// HTTP status code.
        status: u16,
    },

    /// The landing page set no cookie while a fresh session was required.
    #[error("landing page for {document_id} did not set a session cookie")]
    MissingSessionCookie {
        /// Document being bootstrapped.
        document_id: String,
    },
}

/// Performs the landing-page handshake for `document_id`.
///
/// With `reuse` set, the cookies of that earlier session are presented on
/// the landing request and kept, and only the referer is refreshed;
/// otherwise the cookies set by this response become the session. A
/// politeness wait follows a successful handshake.
///
/// # Errors
///
/// Returns [`BootstrapError`] when the landing page is unreachable, answers
/// with a non-2xx status, or sets no cookie when one is required.
#[instrument(skip(client, gate, observer, reuse), fields(reuse = reuse.is_some()))]
pub async fn bootstrap(
    client: &HttpClient,
    gate: &PolitenessGate,
    observer: &dyn ProgressObserver,
    document_id: &str,
    reuse: Option<&Session>,
) -> Result<Bootstrap, BootstrapError> {
    let request_error = |source| BootstrapError::Request {
        document_id: document_id.to_string(),
        source,
    };

    let landing_url = client
        .endpoint(
            "/books",
            &[("id", document_id), ("printsec", "frontcover"), ("hl", "en")],
        )
        .map_err(request_error)?;

    let response = client
        .get(landing_url.as_str(), reuse)
        .await
        .map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(BootstrapError::Status {
            document_id: document_id.to_string(),
            status: status.as_u16(),
        });
    }

    let cookie_header = match reuse {
        Some(previous) => {
            debug!("reusing previously captured session cookies");
            previous.cookie_header().to_string()
        }
        None => {
            let captured = collect_session_cookies(response.headers());
            if captured.is_empty() {
                return Err(BootstrapError::MissingSessionCookie {
                    document_id: document_id.to_string(),
                });
            }
            captured
        }
    };

    let body = response
        .text()
        .await
        .map_err(|e| request_error(DownloadError::network(landing_url.as_str(), e)))?;
    let title = extract_title(&body).unwrap_or_else(|| document_id.to_string());

    info!(document_id, title = %title, "session bootstrapped");

    gate.wait(observer).await;

    Ok(Bootstrap {
        title,
        session: Session::new(cookie_header, landing_url.as_str()),
    })
}

/// Joins the `name=value` part of every `Set-Cookie` header with `"; "`.
fn collect_session_cookies(headers: &reqwest::header::HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Extracts the whitespace-normalized volume title, if present and non-blank.
fn extract_title(html: &str) -> Option<String> {
    let selector = Selector::parse(TITLE_SELECTOR).ok()?;
    let document = Html::parse_document(html);
    let element = document.select(&selector).next()?;
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue};

    use super::*;

    #[test]
    fn test_extract_title_reads_volume_title() {
        let html = r#"<html><body><h1 class="gb-volume-title">Svenska  folksagor
            och äfventyr</h1></body></html>"#;
        assert_eq!(
            extract_title(html).as_deref(),
            Some("Svenska folksagor och äfventyr")
        );
    }

    #[test]
    fn test_extract_title_missing_element_returns_none() {
        let html = "<html><body><h1>Other heading</h1></body></html>";
        assert_eq!(extract_title(html), None);
    }

    #[test]
    fn test_extract_title_blank_element_returns_none() {
        let html = r#"<div class="gb-volume-title">   </div>"#;
        assert_eq!(extract_title(html), None);
    }

    #[test]
    fn test_extract_title_uses_first_match() {
        let html = r#"<span class="gb-volume-title">First</span><span class="gb-volume-title">Second</span>"#;
        assert_eq!(extract_title(html).as_deref(), Some("First"));
    }

    #[test]
    fn test_collect_session_cookies_strips_attributes() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("NID=abc123; expires=Wed, 01-Jan-2031 00:00:00 GMT; path=/"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("1P_JAR=2024; Secure"));
        assert_eq!(collect_session_cookies(&headers), "NID=abc123; 1P_JAR=2024");
    }

    #[test]
    fn test_collect_session_cookies_without_header_is_empty() {
        assert_eq!(collect_session_cookies(&HeaderMap::new()), "");
    }

    #[test]
    fn test_session_accessors() {
        let session = Session::new("a=1", "https://books.example/books?id=x");
        assert_eq!(session.cookie_header(), "a=1");
        assert_eq!(session.referer(), "https://books.example/books?id=x");
    }

    #[test]
    fn test_bootstrap_error_display_names_document() {
        let error = BootstrapError::Status {
            document_id: "abc".to_string(),
            status: 503,
        };
        let msg = error.to_string();
        assert!(msg.contains("abc") && msg.contains("503"), "{msg}");
    }
}
