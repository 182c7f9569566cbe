//! Canonical web paths for files in the public asset tree.
//!
//! Uploads are written somewhere below the public root on disk, while the
//! database stores the path a browser would request, e.g.
//! `/uploads/colors/exteriorColorImage1-<uuid>.png`. [`normalize`] maps any
//! of the shapes seen in practice (absolute disk paths containing a `public`
//! directory, Windows separators, relative paths, already canonical paths)
//! onto that single form.

/// Name of the directory that is served as the web root.
pub const PUBLIC_SEGMENT: &str = "public";

/// Top-level directory of every upload inside the web root.
pub const UPLOADS_SEGMENT: &str = "uploads";

/// Normalize a stored path or an upload's disk path into a canonical web path.
///
/// The result uses forward slashes, starts with exactly one `/`, contains no
/// empty or `.` segments, and has any disk prefix stripped: everything up to
/// and including the last `public` directory that comes before the first
/// `uploads` directory. Returns `None` for empty input or input with no
/// remaining segments.
///
/// The function is idempotent: `normalize(&normalize(p)?) == normalize(p)`.
pub fn normalize(raw: &str) -> Option<String> {
    let unified = raw.trim().replace('\\', "/");
    if unified.is_empty() {
        return None;
    }

    let segments: Vec<&str> = unified
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    let uploads = segments
        .iter()
        .position(|s| *s == UPLOADS_SEGMENT)
        .unwrap_or(segments.len());
    let start = segments[..uploads]
        .iter()
        .rposition(|s| *s == PUBLIC_SEGMENT)
        .map_or(0, |pos| pos + 1);

    let tail = &segments[start..];
    if tail.is_empty() {
        return None;
    }

    Some(format!("/{}", tail.join("/")))
}

/// Normalize an optional path, treating `None` like empty input.
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    raw.and_then(normalize)
}

/// Returns true if the canonical path tries to escape the asset tree.
pub fn escapes_root(canonical: &str) -> bool {
    canonical.split('/').any(|s| s == "..")
}
