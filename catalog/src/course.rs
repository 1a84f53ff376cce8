use serde::Serialize;

/// One catalog row after loading. Rows whose duration could not be read
/// never become a `Course`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub title: String,
    pub duration_raw: String,
    pub duration_hours: f64,
    pub is_paid: Option<bool>,
    pub level: Option<String>,
    pub url: String,
    pub published_time: Option<String>,
}

/// Which optional columns the loaded table carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub has_title: bool,
    pub has_is_paid: bool,
    pub has_level: bool,
    pub has_url: bool,
    pub has_published_time: bool,
}

impl Schema {
    /// Human readable notes for every optional column that is missing.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.has_title {
            out.push("column 'course_title' not found; titles are empty".to_string());
        }
        if !self.has_published_time {
            out.push("column 'published_time' not found".to_string());
        }
        if !self.has_is_paid {
            out.push("column 'is_paid' not found; filtering by course type is skipped".to_string());
        }
        if !self.has_level {
            out.push("column 'level' not found; level filtering is skipped".to_string());
        }
        if !self.has_url {
            out.push("column 'url' not found; links are empty".to_string());
        }
        out
    }

    /// Notes for the ranking filters that this table cannot apply.
    pub fn skipped_filters(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.has_is_paid {
            out.push("column 'is_paid' not found; filtering by course type is skipped".to_string());
        }
        if !self.has_level {
            out.push("column 'level' not found; level filtering is skipped".to_string());
        }
        out
    }
}

/// Course rows with the schema they were read under.
#[derive(Debug, Clone, Default)]
pub struct CourseTable {
    pub courses: Vec<Course>,
    pub schema: Schema,
    /// Rows discarded because no duration could be extracted.
    pub dropped_rows: usize,
}
