//! Markdown document per feature, rendered from a template by literal
//! placeholder substitution.

use crate::error::Result;
use crate::feature::Feature;
use crate::io;
use crate::paths;
use crate::types::{title_case, Status};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const NAME_PLACEHOLDER: &str = "[Feature Name]";
pub const STATUS_PLACEHOLDER: &str =
    "[Backlog | Planning | In Progress | Review | Testing | Complete | Deprecated]";
pub const PRIORITY_PLACEHOLDER: &str = "[Critical | High | Medium | Low]";
pub const DATE_PLACEHOLDER: &str = "[Date]";

/// Template written by `init` when the project has none.
pub const DEFAULT_TEMPLATE: &str = "\
# [Feature Name]

**Status:** [Backlog | Planning | In Progress | Review | Testing | Complete | Deprecated]
**Priority:** [Critical | High | Medium | Low]
**Created:** [Date]

## Summary

_What does this feature do, and for whom?_

## User Stories

- As a ..., I want ..., so that ...

## Acceptance Criteria

- [ ] ...

## Technical Notes

## Open Questions

---

**Generated using:** feature template
";

// ---------------------------------------------------------------------------
// Slug
// ---------------------------------------------------------------------------

static STRIP_RE: OnceLock<Regex> = OnceLock::new();
static COLLAPSE_RE: OnceLock<Regex> = OnceLock::new();

fn strip_re() -> &'static Regex {
    STRIP_RE.get_or_init(|| Regex::new(r"[^\w\s-]").unwrap())
}

fn collapse_re() -> &'static Regex {
    COLLAPSE_RE.get_or_init(|| Regex::new(r"[-\s]+").unwrap())
}

/// Filesystem-safe form of a feature name: drop everything but word
/// characters, whitespace and hyphens, collapse whitespace/hyphen runs into a
/// single hyphen, lowercase.
pub fn slugify(name: &str) -> String {
    let stripped = strip_re().replace_all(name, "");
    collapse_re()
        .replace_all(stripped.trim(), "-")
        .to_lowercase()
}

pub fn doc_file_name(feature: &Feature) -> String {
    format!("{}-{}.md", feature.id, slugify(&feature.name))
}

/// Physical directory a feature's document is moved into.
pub fn bucket_for(status: Status) -> &'static str {
    if status.is_complete() {
        paths::COMPLETED_BUCKET
    } else {
        paths::ACTIVE_BUCKET
    }
}

// ---------------------------------------------------------------------------
// DocRenderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DocRenderer {
    features_dir: PathBuf,
    template_path: PathBuf,
}

impl DocRenderer {
    pub fn new(features_dir: impl Into<PathBuf>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            features_dir: features_dir.into(),
            template_path: template_path.into(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Fill the template's placeholders for `feature`.
    pub fn render(template: &str, feature: &Feature) -> String {
        template
            .replace(NAME_PLACEHOLDER, &feature.name)
            .replace(STATUS_PLACEHOLDER, &title_case(feature.status.as_str()))
            .replace(PRIORITY_PLACEHOLDER, &title_case(feature.priority.as_str()))
            .replace(DATE_PLACEHOLDER, &feature.created_date.to_string())
    }

    /// Write `<features>/<status>/<id>-<slug>.md`.
    ///
    /// Returns `None` without writing anything when the template is missing.
    pub fn create_doc(&self, feature: &Feature) -> Result<Option<PathBuf>> {
        let Some(template) = io::read_optional(&self.template_path)? else {
            tracing::warn!(template = %self.template_path.display(), "feature template missing");
            return Ok(None);
        };

        let doc = Self::render(&template, feature);
        let dir = self.features_dir.join(feature.status.as_str());
        io::ensure_dir(&dir)?;
        let path = dir.join(doc_file_name(feature));
        std::fs::write(&path, doc)?;
        tracing::debug!(path = %path.display(), "wrote feature document");
        Ok(Some(path))
    }

    /// Move the document from `<old_status>/` into the `completed` or
    /// `active` bucket. Returns `None` when there was no document to move.
    pub fn move_doc(
        &self,
        feature: &Feature,
        old_status: Status,
        new_status: Status,
    ) -> Result<Option<PathBuf>> {
        let file_name = doc_file_name(feature);
        let old_path = self.features_dir.join(old_status.as_str()).join(&file_name);

        let new_dir = self.features_dir.join(bucket_for(new_status));
        io::ensure_dir(&new_dir)?;
        let new_path = new_dir.join(&file_name);

        if !old_path.exists() {
            tracing::debug!(path = %old_path.display(), "no document to move");
            return Ok(None);
        }
        std::fs::rename(&old_path, &new_path)?;
        tracing::debug!(from = %old_path.display(), to = %new_path.display(), "moved feature document");
        Ok(Some(new_path))
    }

    /// Find an existing document for `id` in any of `dirs`, in order.
    pub fn find_doc(&self, id: &str, dirs: &[&str]) -> Result<Option<PathBuf>> {
        let prefix = format!("{id}-");
        for dir in dirs {
            let dir = self.features_dir.join(dir);
            if !dir.is_dir() {
                continue;
            }
            let mut matches: Vec<PathBuf> = Vec::new();
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with(&prefix) && name.ends_with(".md") {
                    matches.push(entry.path());
                }
            }
            matches.sort();
            if let Some(first) = matches.into_iter().next() {
                return Ok(Some(first));
            }
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{feature_id, NewFeature};
    use crate::types::Priority;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn feature(name: &str) -> Feature {
        let mut new = NewFeature::new(name, "desc");
        new.priority = Priority::High;
        Feature::from_new(feature_id(4), new, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
    }

    fn renderer(dir: &TempDir, with_template: bool) -> DocRenderer {
        let features = dir.path().join("docs/features");
        let template = features.join("templates/feature-template.md");
        if with_template {
            std::fs::create_dir_all(template.parent().unwrap()).unwrap();
            std::fs::write(&template, DEFAULT_TEMPLATE).unwrap();
        }
        DocRenderer::new(features, template)
    }

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("Add OAuth Login"), "add-oauth-login");
        assert_eq!(slugify("  Dark mode: v2!  "), "dark-mode-v2");
        assert_eq!(slugify("a -- b\t c"), "a-b-c");
        assert_eq!(slugify("snake_case_name"), "snake_case_name");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_is_idempotent() {
        for name in ["Add OAuth Login", "Résumé upload (beta)", "x - y", "feat_42 export"] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once, "not idempotent for {name}");
            assert_eq!(slugify(name), once);
        }
    }

    #[test]
    fn render_replaces_all_placeholders() {
        let doc = DocRenderer::render(DEFAULT_TEMPLATE, &feature("Add OAuth Login"));
        assert!(doc.starts_with("# Add OAuth Login\n"));
        assert!(doc.contains("**Status:** Backlog"));
        assert!(doc.contains("**Priority:** High"));
        assert!(doc.contains("**Created:** 2026-02-01"));
        for placeholder in [NAME_PLACEHOLDER, STATUS_PLACEHOLDER, PRIORITY_PLACEHOLDER, DATE_PLACEHOLDER] {
            assert!(!doc.contains(placeholder), "left {placeholder} in output");
        }
    }

    #[test]
    fn create_doc_writes_under_status_dir() {
        let dir = TempDir::new().unwrap();
        let r = renderer(&dir, true);
        let path = r.create_doc(&feature("Add OAuth Login")).unwrap().unwrap();
        assert_eq!(
            path,
            dir.path().join("docs/features/backlog/feat-004-add-oauth-login.md")
        );
        assert!(std::fs::read_to_string(path).unwrap().contains("# Add OAuth Login"));
    }

    #[test]
    fn create_doc_without_template_is_noop() {
        let dir = TempDir::new().unwrap();
        let r = renderer(&dir, false);
        assert!(r.create_doc(&feature("Anything")).unwrap().is_none());
        assert!(!dir.path().join("docs/features/backlog").exists());
    }

    #[test]
    fn move_doc_uses_two_buckets() {
        let dir = TempDir::new().unwrap();
        let r = renderer(&dir, true);
        let f = feature("Add OAuth Login");
        r.create_doc(&f).unwrap();

        let moved = r.move_doc(&f, Status::Backlog, Status::Review).unwrap().unwrap();
        assert_eq!(moved, dir.path().join("docs/features/active/feat-004-add-oauth-login.md"));

        let moved = r.move_doc(&f, Status::Active, Status::Complete).unwrap().unwrap();
        assert_eq!(
            moved,
            dir.path().join("docs/features/completed/feat-004-add-oauth-login.md")
        );
        assert!(!dir.path().join("docs/features/active/feat-004-add-oauth-login.md").exists());
    }

    #[test]
    fn move_doc_missing_source_is_silent() {
        let dir = TempDir::new().unwrap();
        let r = renderer(&dir, true);
        let f = feature("Ghost");
        assert!(r.move_doc(&f, Status::Planning, Status::Complete).unwrap().is_none());
    }

    #[test]
    fn find_doc_searches_dirs_in_order() {
        let dir = TempDir::new().unwrap();
        let r = renderer(&dir, true);
        let f = feature("Add OAuth Login");
        r.create_doc(&f).unwrap();
        let found = r.find_doc("feat-004", &["active", "backlog"]).unwrap().unwrap();
        assert!(found.ends_with("backlog/feat-004-add-oauth-login.md"));
        assert!(r.find_doc("feat-099", &["backlog"]).unwrap().is_none());
    }
}
