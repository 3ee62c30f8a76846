use std::fmt;

/// Everything a pagination widget can fail with
#[derive(Debug)]
pub enum PagerError {
    /// Transport failure talking to a page endpoint
    Network(reqwest::Error),
    /// A response or options file that is not the expected JSON
    Json(serde_json::Error),
    /// The fetcher rejected the request (server error, bad payload, host failure)
    Fetch(String),
    /// Reading or writing remembered page sizes failed
    Storage(String),
    /// Requested size is not in `allowed_page_sizes`
    InvalidPageSize(u32),
    /// Options that cannot mount a widget, e.g. a default size outside the allowed set
    InvalidOptions(String),
    /// The widget was unmounted while a fetch was in flight, or before an operation began
    Unmounted,
    Io(std::io::Error),
}

impl fmt::Display for PagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagerError::Network(e) => write!(f, "Network error: {}", e),
            PagerError::Json(e) => write!(f, "JSON parsing error: {}", e),
            PagerError::Fetch(e) => write!(f, "Fetch failed: {}", e),
            PagerError::Storage(e) => write!(f, "Storage error: {}", e),
            PagerError::InvalidPageSize(size) => write!(f, "Page size {} is not allowed", size),
            PagerError::InvalidOptions(e) => write!(f, "Invalid pager options: {}", e),
            PagerError::Unmounted => write!(f, "Pagination widget has been unmounted"),
            PagerError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for PagerError {}

impl From<reqwest::Error> for PagerError {
    fn from(err: reqwest::Error) -> Self {
        PagerError::Network(err)
    }
}

impl From<serde_json::Error> for PagerError {
    fn from(err: serde_json::Error) -> Self {
        PagerError::Json(err)
    }
}

impl From<std::io::Error> for PagerError {
    fn from(err: std::io::Error) -> Self {
        PagerError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            PagerError::InvalidPageSize(7).to_string(),
            "Page size 7 is not allowed"
        );
        assert_eq!(
            PagerError::Fetch("boom".to_string()).to_string(),
            "Fetch failed: boom"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PagerError = io.into();
        assert!(matches!(err, PagerError::Io(_)));
    }
}
