use crate::url::CaptureUrl;
use crate::UrlError;
use std::collections::HashSet;
use std::path::Path;

/// Result of validating and de-duplicating a batch of candidate URLs
#[derive(Debug, Default)]
pub struct UrlCollection {
    /// Distinct valid URLs in first-seen order
    pub urls: Vec<CaptureUrl>,

    /// Candidates that failed validation, with the reason
    pub rejected: Vec<(String, UrlError)>,

    /// Number of valid candidates dropped as duplicates
    pub duplicates: usize,
}

/// Reads a URL-list file: one URL per line, blank lines ignored
pub fn read_url_file(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Validates candidates and removes duplicates, keeping first-seen order
pub fn collect_urls<I, S>(candidates: I) -> UrlCollection
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut collection = UrlCollection::default();
    let mut seen = HashSet::new();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        match CaptureUrl::parse(candidate) {
            Ok(url) => {
                if seen.insert(url.clone()) {
                    collection.urls.push(url);
                } else {
                    tracing::debug!("Dropping duplicate URL {}", url);
                    collection.duplicates += 1;
                }
            }
            Err(e) => {
                tracing::warn!("Skipping invalid URL '{}': {}", candidate, e);
                collection.rejected.push((candidate.to_string(), e));
            }
        }
    }

    collection
}
