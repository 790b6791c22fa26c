//! Repository endpoint URLs.
//!
//! The full request URL doubles as the response cache key, so every builder
//! here must be deterministic: same inputs, byte-identical URL.

/// Error type for base URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse and normalize the API base URL.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Drop query and fragment
/// 5. Drop a trailing slash from the path
pub fn parse_base(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.cannot_be_a_base() {
        return Err(UrlError::InvalidUrl(format!("{url_str} cannot be a base URL")));
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    if let Ok(mut segments) = parsed.path_segments_mut() {
        segments.pop_if_empty();
    }

    Ok(parsed)
}

/// Request URL builders for the BioModels REST API.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: url::Url,
    format: String,
}

impl Endpoints {
    pub fn new(base: &str, format: &str) -> Result<Self, UrlError> {
        Ok(Self { base: parse_base(base)?, format: format.to_string() })
    }

    pub fn base(&self) -> &url::Url {
        &self.base
    }

    /// `{base}/model/identifiers?format={format}`
    pub fn identifiers(&self) -> url::Url {
        let mut url = self.join(&["model", "identifiers"]);
        url.query_pairs_mut().append_pair("format", &self.format);
        url
    }

    /// `{base}/{model_id}?format={format}`
    pub fn model_info(&self, model_id: &str) -> url::Url {
        let mut url = self.join(&[model_id]);
        url.query_pairs_mut().append_pair("format", &self.format);
        url
    }

    /// `{base}/model/download/{model_id}?filename={filename}`, filename form-encoded.
    pub fn download(&self, model_id: &str, filename: &str) -> url::Url {
        let mut url = self.join(&["model", "download", model_id]);
        url.query_pairs_mut().append_pair("filename", filename);
        url
    }

    /// Human-facing model page, `{base}/{model_id}`.
    pub fn model_page(&self, model_id: &str) -> url::Url {
        self.join(&[model_id])
    }

    fn join(&self, segments: &[&str]) -> url::Url {
        let mut url = self.base.clone();
        // parse_base rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
