use crate::course::{Course, CourseTable, Schema};
use crate::error::{CatalogError, Result};
use csv::{ReaderBuilder, StringRecord};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const COL_TITLE: &str = "course_title";
pub const COL_DURATION: &str = "content_duration";
pub const COL_PUBLISHED: &str = "published_time";
pub const COL_IS_PAID: &str = "is_paid";
pub const COL_LEVEL: &str = "level";
pub const COL_URL: &str = "url";

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"[0-9]+").expect("valid regex");
}

/// Hours taken from the first run of digits anywhere in `raw`.
/// `"3.5 hours"` reads as 3.
pub fn parse_duration_hours(raw: &str) -> Option<f64> {
    DIGITS.find(raw).and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Lenient boolean reading for the `is_paid` column.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

pub fn load_courses<P: AsRef<Path>>(path: P) -> Result<CourseTable> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|source| CatalogError::Io { path: path.display().to_string(), source })?;
    let table = read_courses(f)?;
    tracing::info!(
        path = %path.display(),
        courses = table.courses.len(),
        dropped = table.dropped_rows,
        "catalog loaded"
    );
    Ok(table)
}

pub fn read_courses<R: Read>(reader: R) -> Result<CourseTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let duration_col = position(COL_DURATION).ok_or(CatalogError::MissingColumn(COL_DURATION))?;
    let title_col = position(COL_TITLE);
    let published_col = position(COL_PUBLISHED);
    let is_paid_col = position(COL_IS_PAID);
    let level_col = position(COL_LEVEL);
    let url_col = position(COL_URL);

    let schema = Schema {
        has_title: title_col.is_some(),
        has_is_paid: is_paid_col.is_some(),
        has_level: level_col.is_some(),
        has_url: url_col.is_some(),
        has_published_time: published_col.is_some(),
    };
    for warning in schema.warnings() {
        tracing::warn!("{warning}");
    }

    let mut courses = Vec::new();
    let mut dropped_rows = 0usize;
    // counted over every row, including the ones dropped below
    let mut published_counts: HashMap<String, usize> = HashMap::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if let Some(t) = field(&record, published_col) {
            *published_counts.entry(t).or_insert(0) += 1;
        }
        let duration_raw = field(&record, Some(duration_col)).unwrap_or_default();
        let Some(duration_hours) = parse_duration_hours(&duration_raw) else {
            tracing::debug!(row, duration = %duration_raw, "dropping row without a readable duration");
            dropped_rows += 1;
            continue;
        };
        courses.push(Course {
            title: field(&record, title_col).unwrap_or_default(),
            duration_raw,
            duration_hours,
            is_paid: field(&record, is_paid_col).as_deref().and_then(parse_bool),
            level: field(&record, level_col),
            url: field(&record, url_col).unwrap_or_default(),
            published_time: field(&record, published_col),
        });
    }

    if let Some(mode) = mode(published_counts) {
        for c in courses.iter_mut().filter(|c| c.published_time.is_none()) {
            c.published_time = Some(mode.clone());
        }
    }

    Ok(CourseTable { courses, schema, dropped_rows })
}

/// Non-empty cell at `col`, if the column exists and the row reaches it.
fn field(record: &StringRecord, col: Option<usize>) -> Option<String> {
    col.and_then(|c| record.get(c))
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
}

/// Most frequent value; ties go to the smallest.
fn mode(counts: HashMap<String, usize>) -> Option<String> {
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(t, _)| t)
}
