//! README marker-region patching

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use regex::{NoExpand, Regex};
use tracing::{debug, info};

use super::store::write_atomic;
use crate::types::{CodetallyError, Result};

pub const DEFAULT_START_MARKER: &str = "<!--START_SECTION:waka-->";
pub const DEFAULT_END_MARKER: &str = "<!--END_SECTION:waka-->";

/// Wrap a rendered block in a plain-text code fence
pub fn fenced(block: &str) -> String {
    format!("```text\n{}\n```", block)
}

/// The region between two literal markers that this tool owns
pub struct MarkerRegion {
    start: String,
    end: String,
    pattern: Regex,
}

impl MarkerRegion {
    pub fn new(start: &str, end: &str) -> Result<Self> {
        if start.is_empty() || end.is_empty() || start == end {
            return Err(CodetallyError::Config(
                "start and end markers must be distinct and non-empty".into(),
            ));
        }
        // First start marker, nearest end marker after it, across lines
        let pattern = Regex::new(&format!(
            "(?s){}.*?{}",
            regex::escape(start),
            regex::escape(end)
        ))
        .map_err(|e| CodetallyError::Config(format!("invalid marker pattern: {}", e)))?;

        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
            pattern,
        })
    }

    fn region(&self, block: &str) -> String {
        format!("{}\n\n{}\n{}", self.start, block, self.end)
    }

    /// Replace the region's contents with `block`, or append a fresh region
    /// when either marker is missing. Returns the new text and whether it
    /// differs from `document`.
    pub fn patch(&self, document: &str, block: &str) -> (String, bool) {
        let region = self.region(block);

        let patched = if self.pattern.is_match(document) {
            self.pattern
                .replacen(document, 1, NoExpand(region.as_str()))
                .into_owned()
        } else {
            let body = document.trim_end();
            if body.is_empty() {
                format!("{}\n", region)
            } else {
                format!("{}\n\n{}\n", body, region)
            }
        };

        let changed = patched != document;
        (patched, changed)
    }

    /// Patch the file at `path` in place, writing only when the text changed.
    /// A missing file is treated as empty.
    pub fn update_file(&self, path: &Path, block: &str) -> Result<bool> {
        let current = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "document missing, creating it");
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let (patched, changed) = self.patch(&current, block);
        if changed {
            write_atomic(path, patched.as_bytes())?;
            info!(path = %path.display(), "document updated");
        } else {
            info!(path = %path.display(), "document unchanged");
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn region() -> MarkerRegion {
        MarkerRegion::new("<!--S-->", "<!--E-->").unwrap()
    }

    #[test]
    fn test_patch_replaces_region_then_is_stable() {
        let (first, changed) = region().patch("<!--S-->old<!--E-->", "new");
        assert_eq!(first, "<!--S-->\n\nnew\n<!--E-->");
        assert!(changed);

        let (second, changed) = region().patch(&first, "new");
        assert_eq!(second, first);
        assert!(!changed);
    }

    #[test]
    fn test_patch_keeps_surrounding_text() {
        let doc = "# Hi\n\n<!--S-->\nold\nlines\n<!--E-->\n\nFooter\n";
        let (patched, changed) = region().patch(doc, "fresh");
        assert!(changed);
        assert_eq!(patched, "# Hi\n\n<!--S-->\n\nfresh\n<!--E-->\n\nFooter\n");
    }

    #[test]
    fn test_patch_uses_first_region_non_greedy() {
        let doc = "<!--S-->a<!--E--> middle <!--S-->b<!--E-->";
        let (patched, _) = region().patch(doc, "x");
        assert_eq!(patched, "<!--S-->\n\nx\n<!--E--> middle <!--S-->b<!--E-->");
    }

    #[test]
    fn test_patch_appends_when_markers_missing() {
        let (patched, changed) = region().patch("# Profile\n", "x");
        assert!(changed);
        assert_eq!(patched, "# Profile\n\n<!--S-->\n\nx\n<!--E-->\n");

        // Second pass finds the appended region
        let (again, changed) = region().patch(&patched, "x");
        assert!(!changed);
        assert_eq!(again, patched);
    }

    #[test]
    fn test_patch_appends_when_only_start_present() {
        let (patched, _) = region().patch("<!--S--> dangling", "x");
        assert!(patched.starts_with("<!--S--> dangling\n\n<!--S-->"));
    }

    #[test]
    fn test_patch_empty_document() {
        let (patched, changed) = region().patch("", "x");
        assert!(changed);
        assert_eq!(patched, "<!--S-->\n\nx\n<!--E-->\n");
    }

    #[test]
    fn test_patch_block_with_dollar_signs_is_literal() {
        let (patched, _) = region().patch("<!--S--><!--E-->", "cost $1 ${name}");
        assert!(patched.contains("cost $1 ${name}"));
    }

    #[test]
    fn test_markers_with_regex_metacharacters() {
        let region = MarkerRegion::new("[start](*)", "[end]+?").unwrap();
        let (patched, _) = region.patch("[start](*)old[end]+?", "new");
        assert_eq!(patched, "[start](*)\n\nnew\n[end]+?");
    }

    #[test]
    fn test_identical_markers_rejected() {
        assert!(matches!(
            MarkerRegion::new("<!--X-->", "<!--X-->"),
            Err(CodetallyError::Config(_))
        ));
    }

    #[test]
    fn test_fenced() {
        assert_eq!(fenced("a\nb"), "```text\na\nb\n```");
    }

    #[test]
    fn test_update_file_writes_only_on_change() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("README.md");
        fs::write(&path, "# Me\n\n<!--S-->\n<!--E-->\n").unwrap();

        assert!(region().update_file(&path, "stats").unwrap());
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "# Me\n\n<!--S-->\n\nstats\n<!--E-->\n");

        let modified = fs::metadata(&path).unwrap().modified().unwrap();
        assert!(!region().update_file(&path, "stats").unwrap());
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn test_update_file_creates_missing_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("README.md");

        assert!(region().update_file(&path, "stats").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "<!--S-->\n\nstats\n<!--E-->\n"
        );
    }
}
