//! Remote error classification
//!
//! Maps the `status_ext` detail code of a failed job to a retry decision and
//! a human-readable explanation. Classification is a pure lookup: codes
//! outside the transient set are permanent, and codes we have never seen get
//! a generic explanation instead of an error.

/// Whether a remote failure is worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Temporary overload, rate limiting, gateway/timeout or capacity trouble
    Transient,
    /// Anything structural: bad URL, blocked, not found, too large, ...
    Permanent,
}

/// Result of classifying one detail code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub class: ErrorClass,
    pub explanation: &'static str,
}

impl Classification {
    pub fn is_transient(&self) -> bool {
        self.class == ErrorClass::Transient
    }
}

/// Explanation used for codes missing from the table
pub const GENERIC_EXPLANATION: &str = "An unrecoverable error occurred during capture.";

/// Detail codes meaning the service is temporarily unable to capture
pub const TRANSIENT_ERROR_CODES: &[&str] = &[
    "error:bad-gateway",
    "error:bandwidth-limit-exceeded",
    "error:browsing-timeout",
    "error:cannot-fetch",
    "error:capture-location-error",
    "error:celery",
    "error:gateway-timeout",
    "error:internal-server-error",
    "error:invalid-server-response",
    "error:job-failed",
    "error:no-browsers-available",
    "error:protocol-error",
    "error:proxy-error",
    "error:read-timeout",
    "error:service-unavailable",
    "error:soft-time-limit-exceeded",
    "error:too-many-requests",
    "error:user-session-limit",
];

/// Classifies a remote detail code
///
/// # Examples
///
/// ```
/// use wayback_archiver::workflow::{classify_error, ErrorClass};
///
/// assert_eq!(classify_error(Some("error:service-unavailable")).class, ErrorClass::Transient);
/// assert_eq!(classify_error(Some("error:not-found")).class, ErrorClass::Permanent);
/// assert_eq!(classify_error(None).class, ErrorClass::Permanent);
/// ```
pub fn classify_error(code: Option<&str>) -> Classification {
    let class = match code {
        Some(code) if TRANSIENT_ERROR_CODES.contains(&code) => ErrorClass::Transient,
        _ => ErrorClass::Permanent,
    };

    Classification {
        class,
        explanation: code.map(explain).unwrap_or(GENERIC_EXPLANATION),
    }
}

/// Human-readable explanation of a detail code
pub fn explain(code: &str) -> &'static str {
    match code {
        // Transient
        "error:bad-gateway" => "Bad Gateway for the target server.",
        "error:bandwidth-limit-exceeded" => {
            "The target server has exceeded its bandwidth limit."
        }
        "error:browsing-timeout" => "The capture browser timed out while loading the page.",
        "error:cannot-fetch" => "The capture service could not fetch the page.",
        "error:capture-location-error" => "The capture service could not find a storage location.",
        "error:celery" => "The capture job queue failed to process the request.",
        "error:gateway-timeout" => "The target server did not respond in time (gateway timeout).",
        "error:internal-server-error" => "The capture service hit an internal server error.",
        "error:invalid-server-response" => "The target server sent an invalid response.",
        "error:job-failed" => "The capture job failed on the service side.",
        "error:no-browsers-available" => "The capture service has no free browsers right now.",
        "error:protocol-error" => "The HTTP connection to the target server broke.",
        "error:proxy-error" => "The capture service proxy failed.",
        "error:read-timeout" => "Reading from the target server timed out.",
        "error:service-unavailable" => "The capture service is temporarily unavailable.",
        "error:soft-time-limit-exceeded" => "The capture took too long and was stopped.",
        "error:too-many-requests" => "The target server or the capture service is rate limiting.",
        "error:user-session-limit" => "The account has reached its limit of concurrent captures.",

        // Permanent
        "error:bad-request" => "The capture request was malformed.",
        "error:blocked" => "The target site is blocking the capture service.",
        "error:blocked-client-ip" => "The client IP address is blocked by the capture service.",
        "error:blocked-url" => "The URL is on a block list and cannot be captured.",
        "error:filesize-limit" => "The target is larger than the capture size limit.",
        "error:ftp-access-denied" => "Access to the FTP resource was denied.",
        "error:http-version-not-supported" => {
            "The target server does not support the HTTP version used."
        }
        "error:invalid-host-resolution" => "The host name of the URL could not be resolved.",
        "error:invalid-url-syntax" => "The URL syntax is invalid.",
        "error:method-not-allowed" => "The target server does not allow the request method.",
        "error:network-authentication-required" => {
            "The target server requires network authentication."
        }
        "error:no-access" => "The target page is not accessible.",
        "error:not-found" => "The target server could not find the page (404).",
        "error:not-implemented" => "The target server does not implement the request.",
        "error:too-many-daily-captures" => {
            "This URL has reached its daily capture limit."
        }
        "error:too-many-redirects" => "The URL redirects too many times.",
        "error:unauthorized" => "The target server requires authorization (401).",

        _ => GENERIC_EXPLANATION,
    }
}
