//! Artifact name derivation from relative file paths
//!
//! Canonical names are the key for cross-addon matching, so the rules here are
//! exact: a trailing `/<reserved><ext>` segment is dropped, otherwise only the
//! extension is.

use std::path::Path;

/// File stems that name their parent directory rather than themselves
pub const RESERVED_SEGMENTS: [&str; 5] = ["template", "component", "helper", "index", "styles"];

/// Stems that name the parent route in the alternate layout
pub const ROUTE_RESERVED_SEGMENTS: [&str; 3] = ["route", "template", "controller"];

/// Route template endings that never name a route of their own
const SKIPPED_TEMPLATE_ENDINGS: [&str; 4] = ["-loading", "-error", "/loading", "/error"];

/// Extension of the final segment including the dot, or `""`
pub fn extension(relative: &str) -> &str {
    let file_start = relative.rfind('/').map_or(0, |i| i + 1);
    match relative[file_start..].rfind('.') {
        // a leading dot is a hidden file, not an extension
        Some(0) | None => "",
        Some(dot) => &relative[file_start + dot..],
    }
}

pub fn strip_extension(relative: &str) -> &str {
    &relative[..relative.len() - extension(relative).len()]
}

fn strip_reserved<'a>(relative: &'a str, reserved: &[&str]) -> Option<&'a str> {
    let ext = extension(relative);
    reserved.iter().find_map(|segment| {
        let suffix = format!("/{segment}{ext}");
        relative.strip_suffix(suffix.as_str())
    })
}

/// `components/foo/component.js` -> `components/foo`, `y/z.js` -> `y/z`
pub fn canonical_name(relative: &str) -> String {
    let relative = relative.replace('\\', "/");
    strip_reserved(&relative, &RESERVED_SEGMENTS)
        .unwrap_or_else(|| strip_extension(&relative))
        .to_string()
}

/// `posts/show.hbs` -> `posts.show`
pub fn route_name(relative: &str) -> String {
    let relative = relative.replace('\\', "/");
    strip_extension(&relative).replace('/', ".")
}

/// Route name for alternate-layout route folders (`posts/show/route.js`)
pub fn nested_route_name(relative: &str) -> String {
    let relative = relative.replace('\\', "/");
    strip_reserved(&relative, &ROUTE_RESERVED_SEGMENTS)
        .unwrap_or_else(|| strip_extension(&relative))
        .replace('/', ".")
}

/// Whether a template under `app/templates` names a route.
///
/// Component templates and loading/error substates do not.
pub fn is_route_template(relative: &str) -> bool {
    let relative = relative.replace('\\', "/");
    if relative.starts_with("components/") {
        return false;
    }
    let stem = strip_extension(&relative);
    if stem == "loading" || stem == "error" {
        return false;
    }
    !SKIPPED_TEMPLATE_ENDINGS
        .iter()
        .any(|ending| stem.ends_with(ending))
}

/// Relative path of `path` under `base` with `/` separators
pub fn relative_path(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
