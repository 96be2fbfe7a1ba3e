use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use crate::models::CourseRef;

pub const ANY_SECTION: &str = "ANY";

/// A class section the poster currently holds and offers to give up.
///
/// `id` is an opaque handle for list management on the client side; it plays
/// no part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldItem {
    pub id: String,
    pub course: CourseRef,
}

/// The acceptable sections of a wanted course: either the wildcard (any
/// section will do) or an explicit set of labels.
///
/// An empty explicit set can only come from a record written outside the
/// validated API; it satisfies nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionFilter {
    #[serde(rename = "ANY")]
    Any,
    #[serde(rename = "sections")]
    Sections(Vec<String>),
}

impl SectionFilter {
    /// Whether a held section label passes this filter. Labels are compared
    /// exactly; both sides were uppercased at the creation boundary.
    pub fn accepts(&self, section: &str) -> bool {
        match self {
            SectionFilter::Any => true,
            SectionFilter::Sections(labels) => labels.iter().any(|l| l == section),
        }
    }
}

/// A course the poster is willing to receive, with its section constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WantedItem {
    pub course: String,
    pub sections: SectionFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostingStatus {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "CLOSED")]
    Closed,
}

impl PostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingStatus::Open => "OPEN",
            PostingStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(PostingStatus::Open),
            "CLOSED" => Some(PostingStatus::Closed),
            _ => None,
        }
    }
}

/// A swap request: what the owner holds, what they want in return, and an
/// optional reward note. Only OPEN postings participate in matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub id: String,
    pub owner_id: String,
    pub held: Vec<HeldItem>,
    pub wanted: Vec<WantedItem>,
    pub reward: Option<String>,
    pub status: PostingStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Posting {
    pub fn is_open(&self) -> bool {
        self.status == PostingStatus::Open
    }
}

// held/wanted live in the postings table as JSON text columns; decode
// failures surface as column decode errors like any other bad column.
impl sqlx::FromRow<'_, SqliteRow> for Posting {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let held_json: String = row.try_get("held")?;
        let wanted_json: String = row.try_get("wanted")?;
        let status_raw: String = row.try_get("status")?;

        let held = serde_json::from_str(&held_json).map_err(|e| sqlx::Error::ColumnDecode {
            index: "held".into(),
            source: Box::new(e),
        })?;
        let wanted = serde_json::from_str(&wanted_json).map_err(|e| sqlx::Error::ColumnDecode {
            index: "wanted".into(),
            source: Box::new(e),
        })?;
        let status = PostingStatus::parse(&status_raw).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".into(),
            source: format!("unknown posting status: {status_raw}").into(),
        })?;

        Ok(Posting {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            held,
            wanted,
            reward: row.try_get("reward")?,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHeldItem {
    pub code: String,
    pub section: String,
}

/// A wanted course as submitted by the client: a flat list of section labels
/// in which `ANY` (any casing) means the wildcard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWantedItem {
    pub course: String,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPostingRequest {
    pub held: Vec<NewHeldItem>,
    pub wanted: Vec<NewWantedItem>,
    pub reward: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostingRequest {
    pub held: Option<Vec<NewHeldItem>>,
    pub wanted: Option<Vec<NewWantedItem>>,
    pub reward: Option<String>,
}

/// Canonicalize and validate submitted held items. Codes and sections are
/// trimmed and uppercased; the collection must be non-empty.
pub fn canonicalize_held(items: Vec<NewHeldItem>) -> Result<Vec<HeldItem>, String> {
    if items.is_empty() {
        return Err("a posting must hold at least one section".to_string());
    }

    let mut held = Vec::with_capacity(items.len());
    for item in items {
        let code = canonical_label(&item.code)
            .ok_or_else(|| "held course code must not be empty".to_string())?;
        let section = canonical_label(&item.section)
            .ok_or_else(|| "held section label must not be empty".to_string())?;
        held.push(HeldItem {
            id: Uuid::new_v4().to_string(),
            course: CourseRef::new(code, section),
        });
    }
    Ok(held)
}

/// Canonicalize and validate submitted wanted items. Each item needs a
/// non-empty section list; a list containing `ANY` collapses to the wildcard.
/// Duplicate wanted courses within one posting are rejected here, never at
/// match time.
pub fn canonicalize_wanted(items: Vec<NewWantedItem>) -> Result<Vec<WantedItem>, String> {
    if items.is_empty() {
        return Err("a posting must want at least one course".to_string());
    }

    let mut wanted: Vec<WantedItem> = Vec::with_capacity(items.len());
    for item in items {
        let course = canonical_label(&item.course)
            .ok_or_else(|| "wanted course code must not be empty".to_string())?;
        if wanted.iter().any(|w| w.course == course) {
            return Err(format!("duplicate wanted course: {course}"));
        }

        let mut labels: Vec<String> = Vec::new();
        let mut wildcard = false;
        for raw in &item.sections {
            match canonical_label(raw) {
                Some(label) if label == ANY_SECTION => wildcard = true,
                Some(label) => {
                    if !labels.contains(&label) {
                        labels.push(label);
                    }
                }
                None => return Err(format!("empty section label for {course}")),
            }
        }

        let sections = if wildcard {
            SectionFilter::Any
        } else if labels.is_empty() {
            return Err(format!("no acceptable sections given for {course}"));
        } else {
            SectionFilter::Sections(labels)
        };

        wanted.push(WantedItem { course, sections });
    }
    Ok(wanted)
}

fn canonical_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_items_are_uppercased_and_get_ids() {
        let held = canonicalize_held(vec![NewHeldItem {
            code: " cs101 ".to_string(),
            section: "a".to_string(),
        }])
        .unwrap();

        assert_eq!(held.len(), 1);
        assert_eq!(held[0].course, CourseRef::new("CS101", "A"));
        assert!(!held[0].id.is_empty());
    }

    #[test]
    fn empty_held_is_rejected() {
        assert!(canonicalize_held(vec![]).is_err());
    }

    #[test]
    fn any_label_collapses_to_wildcard() {
        let wanted = canonicalize_wanted(vec![NewWantedItem {
            course: "math201".to_string(),
            sections: vec!["B".to_string(), "any".to_string()],
        }])
        .unwrap();

        assert_eq!(wanted[0].sections, SectionFilter::Any);
    }

    #[test]
    fn duplicate_wanted_course_is_rejected() {
        let err = canonicalize_wanted(vec![
            NewWantedItem {
                course: "MATH201".to_string(),
                sections: vec!["B".to_string()],
            },
            NewWantedItem {
                course: "math201".to_string(),
                sections: vec!["C".to_string()],
            },
        ])
        .unwrap_err();

        assert!(err.contains("duplicate"));
    }

    #[test]
    fn empty_section_list_is_rejected() {
        assert!(
            canonicalize_wanted(vec![NewWantedItem {
                course: "PHY100".to_string(),
                sections: vec![],
            }])
            .is_err()
        );
    }

    #[test]
    fn section_labels_are_deduplicated_in_order() {
        let wanted = canonicalize_wanted(vec![NewWantedItem {
            course: "PHY100".to_string(),
            sections: vec!["b".to_string(), "C".to_string(), "B".to_string()],
        }])
        .unwrap();

        assert_eq!(
            wanted[0].sections,
            SectionFilter::Sections(vec!["B".to_string(), "C".to_string()])
        );
    }
}
