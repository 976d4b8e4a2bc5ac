//! URL handling module for Wayback Archiver
//!
//! Candidate pages arrive as loose strings (command line, URL-list files).
//! This module turns them into validated [`CaptureUrl`] tokens and collapses
//! duplicates before anything reaches the workflow.

mod list;

pub use list::{collect_urls, read_url_file, UrlCollection};

use crate::{UrlError, UrlResult};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A page address accepted for capture
///
/// The original text is kept verbatim: the service archives exactly what was
/// submitted, and the playback URL is built from the same string. Parsing is
/// only used to validate the scheme and host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureUrl(String);

impl CaptureUrl {
    /// Validates a candidate URL
    ///
    /// # Arguments
    ///
    /// * `input` - The URL text; surrounding whitespace is ignored
    ///
    /// # Returns
    ///
    /// * `Ok(CaptureUrl)` - An http(s) URL with a non-empty host
    /// * `Err(UrlError)` - The text is not a URL we can submit
    ///
    /// # Examples
    ///
    /// ```
    /// use wayback_archiver::url::CaptureUrl;
    ///
    /// let url = CaptureUrl::parse("https://example.com/page").unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/page");
    /// assert!(CaptureUrl::parse("ftp://example.com").is_err());
    /// ```
    pub fn parse(input: &str) -> UrlResult<Self> {
        let trimmed = input.trim();
        let parsed =
            Url::parse(trimmed).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS URLs can be captured, got: {}",
                parsed.scheme()
            )));
        }

        match parsed.host_str() {
            Some(host) if !host.is_empty() => Ok(Self(trimmed.to_string())),
            _ => Err(UrlError::MissingHost),
        }
    }

    /// Returns the URL exactly as it was accepted
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaptureUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CaptureUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CaptureUrl {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
