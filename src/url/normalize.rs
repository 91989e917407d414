use crate::UrlError;
use url::Url;

/// Produces the canonical form of a vacancy link
///
/// # Canonicalization Steps
///
/// 1. Resolve the href against the page it was found on (relative links)
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Normalize path:
///    - Remove dot segments (. and ..)
///    - Collapse repeated slashes
///    - Remove trailing slash (except for root /)
/// 4. Drop the query string entirely
/// 5. Drop the fragment
///
/// Two links that differ only in their query string canonicalize to the
/// same URL, which is what makes them the same posting.
///
/// # Arguments
///
/// * `href` - The raw href attribute value
/// * `base_url` - The URL of the page the href was found on
///
/// # Returns
///
/// * `Ok(Url)` - Canonical URL
/// * `Err(UrlError)` - Failed to resolve or the scheme is unsupported
///
/// # Examples
///
/// ```
/// use url::Url;
/// use vacancy_watch::url::canonical_link;
///
/// let base = Url::parse("https://hh.kz/search/vacancy").unwrap();
/// let link = canonical_link("/vacancy/123?query=python&hhtmFrom=serp", &base).unwrap();
/// assert_eq!(link.as_str(), "https://hh.kz/vacancy/123");
/// ```
pub fn canonical_link(href: &str, base_url: &Url) -> Result<Url, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Parse("empty href".to_string()));
    }

    let mut url = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}
