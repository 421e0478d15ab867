use url::Url;

use crate::error::FetchError;

/// Normalizes user input into an absolute http(s) URL. A bare host gets
/// `https://`; fragments are dropped since they never reach the server.
pub fn normalize_url(input: &str) -> Result<Url, FetchError> {
    let trimmed = input.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&candidate).map_err(|e| FetchError::InvalidUrl(trimmed.to_string(), e))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(FetchError::UnsupportedScheme(other.to_string())),
    }
    url.set_fragment(None);
    Ok(url)
}

pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|s| s.to_ascii_lowercase())
}
