//! Browser identity sent with every request to the book host.
//!
//! The viewer endpoints only answer clients that look like an ordinary
//! browser session, so all traffic shares one desktop Firefox identity.

/// Desktop Firefox User-Agent used for all requests.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:90.0) Gecko/20100101 Firefox/90.0";

/// Accept-Language value matching the browser profile.
pub(crate) const BROWSER_ACCEPT_LANGUAGE: &str = "sv,en";
