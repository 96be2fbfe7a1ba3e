use serde::{Deserialize, Serialize};

/// One concrete course offering: a course code plus the section label
/// (lecture group, tutorial label, or a free-text label on older postings).
///
/// Both fields are canonicalized to uppercase when a posting is created or
/// edited, so comparisons elsewhere are plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub code: String,
    pub section: String,
}

impl CourseRef {
    pub fn new(code: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            section: section.into(),
        }
    }
}
