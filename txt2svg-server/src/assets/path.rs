//! Asset path validation.

use txt2svg_core::error::{Result, Txt2SvgError};

/// Validate a request path and return its store-relative form.
///
/// A single leading `/` is stripped. The remainder must be non-empty and
/// must not contain NUL, backslashes, empty segments, `.` or `..`
/// segments, or a drive prefix.
pub fn validate_asset_path(path: &str) -> Result<&str> {
    let relative = path.strip_prefix('/').unwrap_or(path);

    if relative.is_empty() {
        return Err(rejected(path, "empty path"));
    }
    if relative.contains('\0') {
        return Err(rejected(path, "contains NUL"));
    }
    if relative.contains('\\') {
        return Err(rejected(path, "contains a backslash"));
    }
    if relative.starts_with('/') {
        return Err(rejected(path, "absolute path"));
    }

    for segment in relative.split('/') {
        match segment {
            "" => return Err(rejected(path, "empty segment")),
            "." | ".." => return Err(rejected(path, "relative segment")),
            s if s.contains(':') => return Err(rejected(path, "drive or scheme prefix")),
            _ => {}
        }
    }

    Ok(relative)
}

fn rejected(path: &str, cause: &str) -> Txt2SvgError {
    Txt2SvgError::AssetPath {
        path: path.to_string(),
        cause: cause.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_paths() {
        assert_eq!(validate_asset_path("/index.html").unwrap(), "index.html");
        assert_eq!(
            validate_asset_path("fonts/Roboto.ttf").unwrap(),
            "fonts/Roboto.ttf"
        );
        assert_eq!(
            validate_asset_path("/css/site.v2.css").unwrap(),
            "css/site.v2.css"
        );
    }

    #[test]
    fn rejects_traversal() {
        for path in ["/../etc/passwd", "fonts/../../secret", "/./index.html", "a/.."] {
            let err = validate_asset_path(path).unwrap_err();
            assert_eq!(err.code(), "E203", "{path}");
        }
    }

    #[test]
    fn rejects_absolute_and_odd_paths() {
        for path in ["", "/", "//etc/passwd", "a//b", "a\\b", "a\0b", "/C:/x", "dir/"] {
            assert!(validate_asset_path(path).is_err(), "{path:?}");
        }
    }
}
