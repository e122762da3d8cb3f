//! Deriving the host root that offline tile folders hang off.

use tile_common::{TileError, TileResult};

/// Scheme and authority of `source_url`, ending in `/`.
///
/// `http://gis.example.com/app/Viewer.xap` becomes `http://gis.example.com/`.
/// A URL without a path gets the trailing slash appended.
pub fn host_root(source_url: &str) -> TileResult<String> {
    let source_url = source_url.trim();
    let (scheme, rest) = source_url
        .split_once("://")
        .ok_or_else(|| TileError::InvalidHostUrl(source_url.to_string()))?;

    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
        return Err(TileError::InvalidHostUrl(source_url.to_string()));
    }

    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    if authority.is_empty() {
        return Err(TileError::InvalidHostUrl(source_url.to_string()));
    }

    Ok(format!("{}://{}/", scheme, authority))
}
