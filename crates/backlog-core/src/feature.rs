use crate::types::{Level, Priority, Status};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Format the id handed to the `n`th feature, e.g. `feat-007`.
pub fn feature_id(n: usize) -> String {
    format!("feat-{n:03}")
}

/// Write whole hour counts as integers (`8`, not `8.0`) so stores written
/// with integer hours stay unchanged after a save.
pub fn serialize_hours<S: Serializer>(hours: &f64, s: S) -> Result<S::Ok, S::Error> {
    if hours.fract() == 0.0 && hours.abs() < 1e15 {
        s.serialize_i64(*hours as i64)
    } else {
        s.serialize_f64(*hours)
    }
}

// ---------------------------------------------------------------------------
// Feature
// ---------------------------------------------------------------------------

/// One trackable unit of work as stored in `backlog.json`.
///
/// Keys this type does not model are kept in `extra` so a hand-edited store
/// survives a load/save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    #[serde(default)]
    pub epic: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, serialize_with = "serialize_hours")]
    pub estimated_hours: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub business_value: Level,
    #[serde(default)]
    pub technical_complexity: Level,
    pub created_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub linear_issue: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    /// Build a fresh backlog record from validated input.
    pub fn from_new(id: String, new: NewFeature, created: NaiveDate) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            status: Status::Backlog,
            priority: new.priority,
            epic: new.epic,
            owner: None,
            estimated_hours: new.estimated_hours,
            tags: dedup_tags(new.tags),
            business_value: new.business_value,
            technical_complexity: Level::Medium,
            created_date: created,
            completed_date: None,
            linear_issue: new.linear_issue,
            extra: Map::new(),
        }
    }

    /// Labels used by the issue tracker: the tags plus `epic:<id>` when set.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = self.tags.clone();
        if let Some(ref epic) = self.epic {
            labels.push(format!("epic:{epic}"));
        }
        labels
    }
}

/// Tags behave like an ordered set: first occurrence wins.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// NewFeature
// ---------------------------------------------------------------------------

/// Caller-supplied fields for [`crate::manager::FeatureManager::create_feature`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeature {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub epic: Option<String>,
    pub estimated_hours: f64,
    pub tags: Vec<String>,
    pub business_value: Level,
    pub linear_issue: Option<String>,
}

pub const DEFAULT_ESTIMATED_HOURS: u32 = 8;

impl NewFeature {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority: Priority::Medium,
            epic: None,
            estimated_hours: f64::from(DEFAULT_ESTIMATED_HOURS),
            tags: Vec::new(),
            business_value: Level::Medium,
            linear_issue: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Epic
// ---------------------------------------------------------------------------

/// A loose grouping of features. Features reference epics by id; nothing
/// checks that the referenced epic exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
