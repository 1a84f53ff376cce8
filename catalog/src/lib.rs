pub mod course;
pub mod error;
pub mod index;
pub mod loader;
pub mod rank;
pub mod tokenizer;

pub use course::{Course, CourseTable, Schema};
pub use error::{CatalogError, Result};
pub use index::{CatalogIndex, DocId, IndexOptions, Posting, TermId};
pub use rank::{rank, CourseType, LevelChoice, Query, QueryForm, RankedCourse, Recommendation};

use serde::Serialize;
use std::path::Path;

/// Loaded courses and the title index built over them.
///
/// Built once and never mutated; row `i` of [`Catalog::courses`] is document
/// `i` of [`Catalog::index`]. Share it by reference (or behind an `Arc`).
#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Vec<Course>,
    schema: Schema,
    dropped_rows: usize,
    index: CatalogIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub courses: usize,
    pub dropped_rows: usize,
    pub num_terms: usize,
    pub schema: Schema,
    pub options: IndexOptions,
    pub warnings: Vec<String>,
}

impl Catalog {
    pub fn new(table: CourseTable, options: IndexOptions) -> Self {
        let titles: Vec<&str> = table.courses.iter().map(|c| c.title.as_str()).collect();
        let index = CatalogIndex::build(&titles, options);
        tracing::info!(courses = table.courses.len(), num_terms = index.num_terms(), "catalog index built");
        Self { courses: table.courses, schema: table.schema, dropped_rows: table.dropped_rows, index }
    }

    /// Read a CSV catalog and index it.
    pub fn open<P: AsRef<Path>>(path: P, options: IndexOptions) -> Result<Self> {
        let table = loader::load_courses(path)?;
        Ok(Self::new(table, options))
    }

    pub fn courses(&self) -> &[Course] { &self.courses }

    pub fn course(&self, id: usize) -> Option<&Course> { self.courses.get(id) }

    pub fn schema(&self) -> Schema { self.schema }

    pub fn index(&self) -> &CatalogIndex { &self.index }

    pub fn recommend(&self, query: &Query) -> Recommendation { rank(self, query) }

    /// Rank a raw form. A blank keyword wins over an invalid budget.
    pub fn recommend_form(&self, form: QueryForm) -> Result<Recommendation> {
        if !form.has_keyword() {
            return Ok(Recommendation::NeedsKeyword);
        }
        Ok(self.recommend(&form.into_query()?))
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            courses: self.courses.len(),
            dropped_rows: self.dropped_rows,
            num_terms: self.index.num_terms(),
            schema: self.schema,
            options: self.index.options(),
            warnings: self.schema.warnings(),
        }
    }
}
