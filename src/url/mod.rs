//! URL handling module for Vacancy Watch
//!
//! This module turns raw listing hrefs into canonical vacancy links and
//! derives the stable vacancy identifier from them.

mod normalize;

use crate::UrlError;
use url::Url;

pub use normalize::canonical_link;

/// Derives the vacancy identifier from a link
///
/// The identifier is the last non-empty path segment. Query string and
/// fragment are not part of the path, so `https://hh.kz/vacancy/123?query=abc`
/// and `https://hh.kz/vacancy/123?query=xyz` both yield `"123"`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use vacancy_watch::url::vacancy_id_from_link;
///
/// let link = Url::parse("https://hh.kz/vacancy/123?query=abc").unwrap();
/// assert_eq!(vacancy_id_from_link(&link).unwrap(), "123");
/// ```
pub fn vacancy_id_from_link(link: &Url) -> Result<String, UrlError> {
    link.path_segments()
        .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| UrlError::MissingIdentifier(link.to_string()))
}
