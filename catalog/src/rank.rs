//! Keyword ranking and the filter pipeline applied on top of it.

use crate::error::{CatalogError, Result};
use crate::Catalog;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Items at or below this cosine similarity never reach the filters.
pub const SIMILARITY_THRESHOLD: f32 = 0.1;
/// Upper bound on returned items.
pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub keyword: String,
    pub max_duration_hours: f64,
    pub is_paid: Option<bool>,
    pub level: Option<String>,
}

impl Query {
    pub fn new(keyword: impl Into<String>, max_duration_hours: f64) -> Self {
        Self { keyword: keyword.into(), max_duration_hours, is_paid: None, level: None }
    }

    pub fn paid(mut self, is_paid: bool) -> Self {
        self.is_paid = Some(is_paid);
        self
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum CourseType {
    #[default]
    Both,
    Paid,
    Free,
}

impl CourseType {
    pub fn is_paid(self) -> Option<bool> {
        match self {
            CourseType::Both => None,
            CourseType::Paid => Some(true),
            CourseType::Free => Some(false),
        }
    }
}

impl FromStr for CourseType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(CourseType::Both),
            "paid" => Ok(CourseType::Paid),
            "free" => Ok(CourseType::Free),
            _ => Err(CatalogError::InvalidQuery(format!("unknown course type '{s}' (expected Both, Paid or Free)"))),
        }
    }
}

impl TryFrom<String> for CourseType {
    type Error = CatalogError;

    fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CourseType::Both => "Both",
            CourseType::Paid => "Paid",
            CourseType::Free => "Free",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum LevelChoice {
    #[default]
    AllLevels,
    Beginner,
    Intermediate,
    Expert,
}

impl LevelChoice {
    pub fn label(self) -> &'static str {
        match self {
            LevelChoice::AllLevels => "All Levels",
            LevelChoice::Beginner => "Beginner Level",
            LevelChoice::Intermediate => "Intermediate Level",
            LevelChoice::Expert => "Expert Level",
        }
    }

    /// The level value to filter on; `None` means no level filter.
    pub fn level(self) -> Option<&'static str> {
        match self {
            LevelChoice::AllLevels => None,
            other => Some(other.label()),
        }
    }
}

impl FromStr for LevelChoice {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        [LevelChoice::AllLevels, LevelChoice::Beginner, LevelChoice::Intermediate, LevelChoice::Expert]
            .into_iter()
            .find(|l| l.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CatalogError::InvalidQuery(format!("unknown level '{s}'")))
    }
}

impl TryFrom<String> for LevelChoice {
    type Error = CatalogError;

    fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl fmt::Display for LevelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The user-facing query form: a daily budget, a number of days and two choices.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub keyword: String,
    #[serde(default = "default_daily_hours")]
    pub daily_hours: f64,
    #[serde(default = "default_num_days")]
    pub num_days: f64,
    #[serde(default)]
    pub course_type: CourseType,
    #[serde(default)]
    pub level: LevelChoice,
}

fn default_daily_hours() -> f64 { 2.0 }
fn default_num_days() -> f64 { 5.0 }

impl QueryForm {
    pub fn has_keyword(&self) -> bool {
        !self.keyword.trim().is_empty()
    }

    pub fn max_duration_hours(&self) -> f64 {
        self.daily_hours * self.num_days
    }

    pub fn into_query(self) -> Result<Query> {
        for (name, value) in [("daily_hours", self.daily_hours), ("num_days", self.num_days)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CatalogError::InvalidQuery(format!("{name} must be a positive number, got {value}")));
            }
        }
        let max_duration_hours = self.max_duration_hours();
        Ok(Query {
            keyword: self.keyword,
            max_duration_hours,
            is_paid: self.course_type.is_paid(),
            level: self.level.level().map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCourse {
    /// Row of the course in the loaded catalog.
    pub id: usize,
    pub score: f32,
    pub title: String,
    pub duration_raw: String,
    pub is_paid: Option<bool>,
    pub level: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum Recommendation {
    /// The keyword was blank.
    NeedsKeyword,
    /// Nothing survived the similarity floor and the filters.
    NoMatches,
    Results(Vec<RankedCourse>),
}

impl Recommendation {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Recommendation::NeedsKeyword => Some("Please enter a keyword to search for courses."),
            Recommendation::NoMatches => Some("No courses found with the specified criteria."),
            Recommendation::Results(_) => None,
        }
    }

    pub fn results(&self) -> &[RankedCourse] {
        match self {
            Recommendation::Results(r) => r.as_slice(),
            _ => &[],
        }
    }
}

/// Rank `catalog` against `query`.
///
/// Order matters: similarity floor, sort, duration, paid flag, level, cap.
pub fn rank(catalog: &Catalog, query: &Query) -> Recommendation {
    if query.keyword.trim().is_empty() {
        return Recommendation::NeedsKeyword;
    }

    let scores = catalog.index().scores(&query.keyword);
    let mut hits: Vec<(usize, f32)> = scores
        .into_iter()
        .enumerate()
        .filter(|(_, s)| *s > SIMILARITY_THRESHOLD)
        .collect();
    // stable: equal scores keep table order
    hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let schema = catalog.schema();
    let courses = catalog.courses();
    let wanted_level = query.level.as_ref().map(|l| l.to_lowercase());
    let results: Vec<RankedCourse> = hits
        .into_iter()
        .filter(|(i, _)| courses[*i].duration_hours <= query.max_duration_hours)
        .filter(|(i, _)| match query.is_paid {
            Some(paid) if schema.has_is_paid => courses[*i].is_paid == Some(paid),
            _ => true,
        })
        .filter(|(i, _)| match &wanted_level {
            Some(level) if schema.has_level => {
                courses[*i].level.as_ref().map(|l| l.to_lowercase()).as_ref() == Some(level)
            }
            _ => true,
        })
        .take(MAX_RESULTS)
        .map(|(i, score)| {
            let c = &courses[i];
            RankedCourse {
                id: i,
                score,
                title: c.title.clone(),
                duration_raw: c.duration_raw.clone(),
                is_paid: c.is_paid,
                level: c.level.clone(),
                url: c.url.clone(),
            }
        })
        .collect();

    tracing::debug!(keyword = %query.keyword, hits = results.len(), "ranked query");
    if results.is_empty() {
        Recommendation::NoMatches
    } else {
        Recommendation::Results(results)
    }
}
