//! Bridge from the external `specify` spec-generation tool into the backlog.
//!
//! The tool is run to completion in the project root (`init`, `specify`,
//! `plan`, `tasks`), its memory files are read back, a feature is created
//! from the description, and the generated documents are spliced into the
//! feature's markdown file.

use crate::error::{BacklogError, Result};
use crate::feature::NewFeature;
use crate::io;
use crate::manager::FeatureManager;
use crate::paths::{self, Layout};
use crate::render::DocRenderer;
use crate::types::{Level, Priority};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

pub const SPEC_SECTION_HEADING: &str = "## GitHub Spec Kit Output";
pub const FOOTER_MARKER: &str = "---\n\n**Generated using:**";
pub const SPEC_TAGS: [&str; 2] = ["spec-driven", "ai-generated"];
const NAME_MAX_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// SpecTool
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr: String,
}

pub trait SpecTool {
    /// Run the tool with `args` in `cwd`, blocking until it exits.
    fn run(&self, args: &[&str], cwd: &Path) -> Result<ToolOutput>;
}

/// The installed `specify` executable.
#[derive(Debug, Clone)]
pub struct SpecifyCli {
    program: PathBuf,
}

impl SpecifyCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `specify` on PATH, then in the usual per-user and system
    /// install locations.
    pub fn locate() -> Result<Self> {
        if let Ok(p) = which::which("specify") {
            return Ok(Self::new(p));
        }
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(home) = home::home_dir() {
            candidates.push(home.join(".local/bin/specify"));
        }
        candidates.push(PathBuf::from("/usr/local/bin/specify"));
        candidates.push(PathBuf::from("/usr/bin/specify"));
        candidates
            .into_iter()
            .find(|p| p.is_file())
            .map(Self::new)
            .ok_or(BacklogError::SpecToolNotFound)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SpecTool for SpecifyCli {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<ToolOutput> {
        tracing::debug!(program = %self.program.display(), ?args, "running spec tool");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .env("PYTHONIOENCODING", "utf-8")
            .env("PYTHONUTF8", "1")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| BacklogError::SpecToolSpawn(e.to_string()))?;
        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Spec output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecData {
    pub specification: Option<String>,
    pub plan: Option<String>,
    pub tasks: Option<String>,
}

impl SpecData {
    pub fn read(memory_dir: &Path) -> Result<Self> {
        Ok(Self {
            specification: io::read_optional(&memory_dir.join("specification.md"))?,
            plan: io::read_optional(&memory_dir.join("plan.md"))?,
            tasks: io::read_optional(&memory_dir.join("tasks.md"))?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.specification.is_none() && self.plan.is_none() && self.tasks.is_none()
    }

    /// Markdown section holding each present document in a fenced block.
    pub fn section(&self) -> String {
        let mut out = format!("\n\n{SPEC_SECTION_HEADING}\n\n");
        let parts = [
            ("Generated Specification", &self.specification),
            ("Technical Plan", &self.plan),
            ("Generated Tasks", &self.tasks),
        ];
        for (heading, body) in parts {
            if let Some(body) = body {
                out.push_str(&format!("### {heading}\n\n```markdown\n{body}\n```\n\n"));
            }
        }
        out
    }
}

static QUOTE_RE: OnceLock<Regex> = OnceLock::new();

fn quote_re() -> &'static Regex {
    QUOTE_RE.get_or_init(|| Regex::new(r#"^["']|["']$"#).unwrap())
}

/// Short display name from a free-text description.
pub fn feature_name_from(description: &str) -> String {
    let head: String = description.chars().take(NAME_MAX_CHARS).collect();
    let name = quote_re().replace_all(head.trim(), "");
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "New Feature".to_string(),
    }
}

/// Insert `section` before the template footer, or append it.
pub fn splice_section(doc: &str, section: &str) -> String {
    match doc.find(FOOTER_MARKER) {
        Some(pos) => {
            let mut out = String::with_capacity(doc.len() + section.len());
            out.push_str(&doc[..pos]);
            out.push_str(section);
            out.push_str(&doc[pos..]);
            out
        }
        None => format!("{doc}{section}"),
    }
}

// ---------------------------------------------------------------------------
// SpecKit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpecOutcome {
    /// `init` or `specify` exited non-zero.
    StepFailed { step: String, stderr: String },
    /// The tool produced none of its memory files.
    NoSpecData,
    Created {
        feature_id: String,
        /// Document that received the spec section, if one was found.
        enhanced_doc: Option<PathBuf>,
    },
}

pub struct SpecKit<T> {
    layout: Layout,
    tool: T,
}

impl<T: SpecTool> SpecKit<T> {
    pub fn new(layout: Layout, tool: T) -> Self {
        Self { layout, tool }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn create_feature_from_spec(
        &self,
        description: &str,
        priority: Priority,
    ) -> Result<SpecOutcome> {
        let steps: [(&str, Vec<&str>, bool); 4] = [
            ("init", vec!["init"], true),
            ("specify", vec!["specify", description], true),
            ("plan", vec!["plan"], false),
            ("tasks", vec!["tasks"], false),
        ];
        for (step, args, required) in steps {
            let out = self.tool.run(&args, &self.layout.root)?;
            if out.success {
                continue;
            }
            if required {
                return Ok(SpecOutcome::StepFailed {
                    step: step.to_string(),
                    stderr: out.stderr,
                });
            }
            tracing::warn!(step, code = ?out.code, "spec tool step failed, continuing");
        }

        let spec = SpecData::read(&self.layout.spec_memory_dir())?;
        if spec.is_empty() {
            return Ok(SpecOutcome::NoSpecData);
        }

        let fm = FeatureManager::from_layout(&self.layout);
        let mut new = NewFeature::new(feature_name_from(description), description);
        new.priority = priority;
        new.tags = SPEC_TAGS.iter().map(|t| t.to_string()).collect();
        new.business_value = Level::Medium;
        let created = fm.create_feature(new)?;

        let enhanced_doc = enhance_doc(fm.renderer(), &created.feature.id, &spec)?;
        Ok(SpecOutcome::Created {
            feature_id: created.feature.id,
            enhanced_doc,
        })
    }
}

/// Splice the spec section into the feature's document, looked up in
/// `backlog/` then `active/`. Returns `None` when no document exists.
pub fn enhance_doc(renderer: &DocRenderer, feature_id: &str, spec: &SpecData) -> Result<Option<PathBuf>> {
    let dirs = [crate::types::Status::Backlog.as_str(), paths::ACTIVE_BUCKET];
    let Some(path) = renderer.find_doc(feature_id, &dirs)? else {
        tracing::warn!(feature_id, "no document to enhance");
        return Ok(None);
    };
    let doc = std::fs::read_to_string(&path)?;
    std::fs::write(&path, splice_section(&doc, &spec.section()))?;
    Ok(Some(path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::DEFAULT_TEMPLATE;
    use crate::store::BacklogStore;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Writes the memory files on `specify`/`plan`/`tasks`; fails on `fail_step`.
    struct FakeTool {
        memory_dir: PathBuf,
        fail_step: Option<&'static str>,
        write_files: bool,
        calls: RefCell<Vec<String>>,
    }

    impl SpecTool for FakeTool {
        fn run(&self, args: &[&str], _cwd: &Path) -> Result<ToolOutput> {
            let step = args[0];
            self.calls.borrow_mut().push(step.to_string());
            if self.fail_step == Some(step) {
                return Ok(ToolOutput {
                    success: false,
                    code: Some(2),
                    stderr: format!("{step} exploded"),
                });
            }
            if self.write_files {
                let file = match step {
                    "specify" => Some("specification.md"),
                    "plan" => Some("plan.md"),
                    "tasks" => Some("tasks.md"),
                    _ => None,
                };
                if let Some(file) = file {
                    std::fs::create_dir_all(&self.memory_dir).unwrap();
                    std::fs::write(self.memory_dir.join(file), format!("{step} body")).unwrap();
                }
            }
            Ok(ToolOutput {
                success: true,
                code: Some(0),
                stderr: String::new(),
            })
        }
    }

    fn kit(dir: &TempDir, fail_step: Option<&'static str>, write_files: bool) -> SpecKit<FakeTool> {
        let layout = Config::default().layout(dir.path());
        std::fs::create_dir_all(layout.templates_dir()).unwrap();
        std::fs::write(&layout.template_path, DEFAULT_TEMPLATE).unwrap();
        let tool = FakeTool {
            memory_dir: layout.spec_memory_dir(),
            fail_step,
            write_files,
            calls: RefCell::new(Vec::new()),
        };
        SpecKit::new(layout, tool)
    }

    #[test]
    fn feature_name_rules() {
        assert_eq!(feature_name_from("\"add dark mode\""), "Add dark mode");
        assert_eq!(feature_name_from("   "), "New Feature");
        assert_eq!(feature_name_from("ünicode first"), "Ünicode first");
        let long = "x".repeat(80);
        assert_eq!(feature_name_from(&long).chars().count(), 50);
    }

    #[test]
    fn splice_before_footer_or_append() {
        let with_footer = "# Doc\n\nbody\n\n---\n\n**Generated using:** t\n";
        let out = splice_section(with_footer, "\n\nSECTION\n");
        assert!(out.find("SECTION").unwrap() < out.find(FOOTER_MARKER).unwrap());

        let out = splice_section("# Doc\n", "\n\nSECTION\n");
        assert_eq!(out, "# Doc\n\n\nSECTION\n");
    }

    #[test]
    fn section_includes_all_present_parts() {
        let spec = SpecData {
            specification: Some("S".into()),
            plan: None,
            tasks: Some("T".into()),
        };
        let section = spec.section();
        assert!(section.contains("### Generated Specification\n\n```markdown\nS\n```"));
        assert!(!section.contains("Technical Plan"));
        assert!(section.contains("### Generated Tasks\n\n```markdown\nT\n```"));
    }

    #[test]
    fn creates_and_enhances_feature() {
        let dir = TempDir::new().unwrap();
        let kit = kit(&dir, Some("plan"), true);

        let outcome = kit
            .create_feature_from_spec("search across documents", Priority::High)
            .unwrap();
        let SpecOutcome::Created { feature_id, enhanced_doc } = outcome else {
            panic!("expected feature to be created");
        };
        assert_eq!(feature_id, "feat-001");
        assert_eq!(*kit.tool().calls.borrow(), vec!["init", "specify", "plan", "tasks"]);

        let doc = std::fs::read_to_string(enhanced_doc.unwrap()).unwrap();
        assert!(doc.contains(SPEC_SECTION_HEADING));
        assert!(doc.contains("specify body"));
        assert!(doc.contains("tasks body"));
        assert!(!doc.contains("Technical Plan"));

        let fm = FeatureManager::from_layout(&Config::default().layout(dir.path()));
        let stored = fm.store().load().unwrap();
        let f = &stored.backlog.features[0];
        assert_eq!(f.name, "Search across documents");
        assert_eq!(f.priority, Priority::High);
        assert_eq!(f.tags, vec!["spec-driven", "ai-generated"]);
    }

    #[test]
    fn required_step_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let kit = kit(&dir, Some("specify"), true);
        let outcome = kit.create_feature_from_spec("anything", Priority::Low).unwrap();
        assert_eq!(
            outcome,
            SpecOutcome::StepFailed {
                step: "specify".into(),
                stderr: "specify exploded".into(),
            }
        );
        assert_eq!(kit.tool().calls.borrow().len(), 2);
        assert!(!Config::default().layout(dir.path()).backlog_file().exists());
    }

    #[test]
    fn no_output_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let kit = kit(&dir, None, false);
        let outcome = kit.create_feature_from_spec("anything", Priority::Low).unwrap();
        assert_eq!(outcome, SpecOutcome::NoSpecData);
        assert!(!Config::default().layout(dir.path()).backlog_file().exists());
    }
}
