use std::path::{Path, PathBuf};

pub trait PathExt {
    /// Case-insensitive extension check against a list like `["json", "dcmjson"]`.
    fn has_extension_in(&self, extensions: &[String]) -> bool;
    fn to_string_lossy_owned(&self) -> String;
}

impl PathExt for Path {
    fn has_extension_in(&self, extensions: &[String]) -> bool {
        self.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }

    fn to_string_lossy_owned(&self) -> String {
        self.to_string_lossy().into_owned()
    }
}

/// Expand environment variables and `~` in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~`. Falls back to the input when a variable is unset.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Path of `path` relative to `base` for display, or `path` itself if none exists.
pub fn relative_to(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

// Helper function for cross-platform path comparison
pub fn normalize_path_separator(s: &str) -> String {
    s.replace('\\', "/")
}
