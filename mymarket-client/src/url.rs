//! Small helpers for building catalog URLs.

pub fn is_http(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Collapse any run of trailing slashes into a single one.
pub fn flatten_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.len() == url.len() {
        url.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Join a path onto a base URL with exactly one slash between them. Absolute
/// URLs are returned untouched.
pub fn join_url(base: &str, path: &str) -> String {
    if is_http(path) {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches("./").trim_start_matches('/')
    )
}

/// `{base}/extension?prerelease={flag}`
pub fn catalog_endpoint(base: &str, prerelease: bool) -> String {
    format!("{}extension?prerelease={prerelease}", flatten_url(&format!("{base}/")))
}

/// Final path segment of a URL or filesystem path, ignoring any query or
/// fragment.
pub fn file_name_of(location: &str) -> Option<String> {
    let without_query = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    without_query
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|segment| !segment.is_empty() && !segment.ends_with(':'))
        .map(str::to_string)
}
