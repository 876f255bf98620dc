//! Issue-tracker capability used by the migration.
//!
//! Requests are phrased as natural-language prompts for an AI-assisted
//! tracker integration. [`PromptTracker`] is the placeholder boundary: it
//! writes the prompt out and synthesizes an identifier instead of calling a
//! real service. [`RecordingTracker`] keeps every request for inspection.

use crate::error::{BacklogError, Result};
use crate::feature::{Epic, Feature};
use crate::types::{Level, Priority};
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const DEFAULT_WORKSPACE: &str = "workspace";
pub const LIST_ISSUES_PROMPT: &str =
    "List all Linear issues in the current workspace with their IDs and titles.";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub labels: Vec<String>,
    pub estimated_hours: f64,
    pub business_value: Level,
    pub technical_complexity: Level,
    pub created_date: NaiveDate,
    /// External project the issue belongs to, when its epic was migrated.
    pub project: Option<String>,
}

impl IssueDraft {
    pub fn from_feature(feature: &Feature, project: Option<String>) -> Self {
        Self {
            title: feature.name.clone(),
            description: feature.description.clone(),
            priority: feature.priority,
            labels: feature.labels(),
            estimated_hours: feature.estimated_hours,
            business_value: feature.business_value,
            technical_complexity: feature.technical_complexity,
            created_date: feature.created_date,
            project,
        }
    }

    pub fn prompt(&self) -> String {
        let labels = if self.labels.is_empty() {
            "None".to_string()
        } else {
            self.labels.join(", ")
        };
        let project = self
            .project
            .as_ref()
            .map(|p| format!("- Project: {p}\n"))
            .unwrap_or_default();
        format!(
            "Create a Linear issue with these details:\n\
             \n\
             Title: {}\n\
             Description: {}\n\
             \n\
             Priority: {}\n\
             Labels: {labels}\n\
             \n\
             Additional context:\n\
             - Estimated effort: {} hours\n\
             - Business value: {}\n\
             - Technical complexity: {}\n\
             - Created date: {}\n\
             {project}\
             \n\
             Please create this issue and return the Linear issue ID.",
            self.title,
            self.description,
            self.priority.rank(),
            self.estimated_hours,
            self.business_value,
            self.technical_complexity,
            self.created_date,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub target_date: Option<String>,
}

impl ProjectDraft {
    pub fn from_epic(epic: &Epic) -> Self {
        Self {
            name: epic.name.clone(),
            description: epic.description.clone(),
            target_date: epic.target_date.clone(),
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            "Create a Linear project with these details:\n\
             \n\
             Name: {}\n\
             Description: {}\n\
             Target date: {}\n\
             \n\
             Please create this project and return the Linear project ID.",
            self.name,
            self.description,
            self.target_date.as_deref().unwrap_or("Not specified"),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerRequest {
    CreateIssue(IssueDraft),
    CreateProject(ProjectDraft),
    ListIssues,
}

impl TrackerRequest {
    pub fn prompt(&self) -> String {
        match self {
            TrackerRequest::CreateIssue(d) => d.prompt(),
            TrackerRequest::CreateProject(d) => d.prompt(),
            TrackerRequest::ListIssues => LIST_ISSUES_PROMPT.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerRef {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: String,
    pub title: String,
}

fn issue_url(workspace: &str, id: &str) -> String {
    format!("https://linear.app/{workspace}/issue/{id}")
}

// ---------------------------------------------------------------------------
// IssueTracker
// ---------------------------------------------------------------------------

pub trait IssueTracker {
    fn create_issue(&mut self, draft: &IssueDraft) -> Result<TrackerRef>;
    fn create_project(&mut self, draft: &ProjectDraft) -> Result<TrackerRef>;
    fn list_issues(&mut self) -> Result<Vec<IssueSummary>>;
}

// ---------------------------------------------------------------------------
// PromptTracker
// ---------------------------------------------------------------------------

/// Writes each prompt to `out` and answers with a made-up `LIN-<n>` id.
pub struct PromptTracker<W> {
    out: W,
    workspace: String,
}

impl<W: Write> PromptTracker<W> {
    pub fn new(out: W, workspace: impl Into<String>) -> Self {
        Self {
            out,
            workspace: workspace.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn send(&mut self, request: &TrackerRequest) -> Result<()> {
        let rule = "-".repeat(50);
        writeln!(self.out, "\n🤖 Claude Prompt:")?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "{}", request.prompt())?;
        writeln!(self.out, "{rule}")?;
        Ok(())
    }

    fn synthesize(&self) -> TrackerRef {
        let id = format!("LIN-{}", rand::thread_rng().gen_range(100..1000));
        let url = issue_url(&self.workspace, &id);
        TrackerRef { id, url }
    }
}

impl<W: Write> IssueTracker for PromptTracker<W> {
    fn create_issue(&mut self, draft: &IssueDraft) -> Result<TrackerRef> {
        self.send(&TrackerRequest::CreateIssue(draft.clone()))?;
        let created = self.synthesize();
        tracing::info!(id = %created.id, title = %draft.title, "mock issue created");
        Ok(created)
    }

    fn create_project(&mut self, draft: &ProjectDraft) -> Result<TrackerRef> {
        self.send(&TrackerRequest::CreateProject(draft.clone()))?;
        let created = self.synthesize();
        tracing::info!(id = %created.id, name = %draft.name, "mock project created");
        Ok(created)
    }

    fn list_issues(&mut self) -> Result<Vec<IssueSummary>> {
        self.send(&TrackerRequest::ListIssues)?;
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// RecordingTracker
// ---------------------------------------------------------------------------

/// Keeps every request and hands out sequential ids `LIN-1`, `LIN-2`, ...
/// Requests whose title or name is in `failing` are rejected.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    pub requests: Vec<TrackerRequest>,
    pub failing: Vec<String>,
    pub issues: Vec<IssueSummary>,
    next: u32,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn issue(&mut self, label: &str) -> Result<TrackerRef> {
        if self.failing.iter().any(|f| f == label) {
            return Err(BacklogError::Tracker(format!("rejected '{label}'")));
        }
        self.next += 1;
        let id = format!("LIN-{}", self.next);
        let url = issue_url(DEFAULT_WORKSPACE, &id);
        Ok(TrackerRef { id, url })
    }
}

impl IssueTracker for RecordingTracker {
    fn create_issue(&mut self, draft: &IssueDraft) -> Result<TrackerRef> {
        self.requests.push(TrackerRequest::CreateIssue(draft.clone()));
        let created = self.issue(&draft.title)?;
        self.issues.push(IssueSummary {
            id: created.id.clone(),
            title: draft.title.clone(),
        });
        Ok(created)
    }

    fn create_project(&mut self, draft: &ProjectDraft) -> Result<TrackerRef> {
        self.requests.push(TrackerRequest::CreateProject(draft.clone()));
        self.issue(&draft.name)
    }

    fn list_issues(&mut self) -> Result<Vec<IssueSummary>> {
        self.requests.push(TrackerRequest::ListIssues);
        Ok(self.issues.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
