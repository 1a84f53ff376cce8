use crate::tokenizer::analyze;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub type TermId = u32;
pub type DocId = u32;

/// Weighting knobs used when the index is built. The same settings are
/// reused for every query projected into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexOptions {
    /// Use `ln((1 + n) / (1 + df)) + 1` instead of `ln(n / df) + 1`.
    pub smooth_idf: bool,
    /// Use `1 + ln(tf)` instead of the raw term count.
    pub sublinear_tf: bool,
    /// Reduce terms to their English stem before counting.
    pub stem: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { smooth_idf: true, sublinear_tf: false, stem: false }
    }
}

#[derive(Debug, Clone)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f32, // normalized tf-idf weight
}

/// TF-IDF vector space over one text field.
///
/// Document ids are row positions in the slice the index was built from, so
/// the score vector returned by [`CatalogIndex::scores`] lines up with that
/// slice.
#[derive(Debug, Default, Clone)]
pub struct CatalogIndex {
    options: IndexOptions,
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
    df: Vec<u32>,
    idf: Vec<f32>,
    postings: Vec<Vec<Posting>>, // indexed by term id, sorted by doc_id
    num_docs: u32,
}

impl CatalogIndex {
    pub fn build<S: AsRef<str>>(docs: &[S], options: IndexOptions) -> Self {
        let num_docs = docs.len() as u32;

        // Per-document term counts, then a sorted vocabulary so term ids are
        // stable for identical input.
        let doc_counts: Vec<HashMap<String, u32>> = docs
            .iter()
            .map(|d| {
                let mut counts: HashMap<String, u32> = HashMap::new();
                for term in analyze(d.as_ref(), options.stem) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut df_by_term: BTreeMap<&str, u32> = BTreeMap::new();
        for counts in &doc_counts {
            for term in counts.keys() {
                *df_by_term.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let terms: Vec<String> = df_by_term.keys().map(|t| t.to_string()).collect();
        let df: Vec<u32> = df_by_term.values().copied().collect();
        let dictionary: HashMap<String, TermId> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as TermId))
            .collect();
        let idf: Vec<f32> = df.iter().map(|&df_t| idf_weight(num_docs, df_t, options.smooth_idf)).collect();

        let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); terms.len()];
        for (doc_id, counts) in doc_counts.into_iter().enumerate() {
            let mut weights: Vec<(TermId, f32)> = counts
                .into_iter()
                .map(|(term, tf_raw)| {
                    let tid = dictionary[&term];
                    (tid, tf_weight(tf_raw, options.sublinear_tf) * idf[tid as usize])
                })
                .collect();
            weights.sort_by_key(|(tid, _)| *tid);
            normalize(&mut weights);
            for (tid, weight) in weights {
                postings[tid as usize].push(Posting { doc_id: doc_id as DocId, weight });
            }
        }

        tracing::debug!(num_docs, num_terms = terms.len(), "built tf-idf index");
        Self { options, dictionary, terms, df, idf, postings, num_docs }
    }

    pub fn options(&self) -> IndexOptions { self.options }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.terms.len() }

    /// Terms in term-id order.
    pub fn vocabulary(&self) -> &[String] { &self.terms }

    pub fn document_frequency(&self, term: &str) -> Option<u32> {
        self.dictionary.get(term).map(|&tid| self.df[tid as usize])
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.dictionary.get(term).map(|&tid| self.idf[tid as usize])
    }

    /// Project free text into the index's space. Terms not seen at build
    /// time are dropped. The returned vector is L2-normalized, or empty when
    /// nothing in the text is known.
    pub fn project(&self, text: &str) -> Vec<(TermId, f32)> {
        let mut tf_q_raw: BTreeMap<TermId, u32> = BTreeMap::new();
        for term in analyze(text, self.options.stem) {
            if let Some(&tid) = self.dictionary.get(&term) {
                *tf_q_raw.entry(tid).or_insert(0) += 1;
            }
        }
        let mut q_weights: Vec<(TermId, f32)> = tf_q_raw
            .into_iter()
            .map(|(tid, tf_raw)| (tid, tf_weight(tf_raw, self.options.sublinear_tf) * self.idf[tid as usize]))
            .collect();
        normalize(&mut q_weights);
        q_weights.retain(|(_, w)| *w > 0.0);
        q_weights
    }

    /// Cosine similarity of `text` against every document, one score per
    /// document in build order. Empty when the vocabulary is empty.
    pub fn scores(&self, text: &str) -> Vec<f32> {
        if self.terms.is_empty() {
            return Vec::new();
        }
        let mut scores = vec![0.0f32; self.num_docs as usize];
        for (tid, q_w) in self.project(text) {
            for p in &self.postings[tid as usize] {
                // cosine since both sides are normalized
                scores[p.doc_id as usize] += p.weight * q_w;
            }
        }
        scores
    }
}

fn tf_weight(tf_raw: u32, sublinear: bool) -> f32 {
    if tf_raw == 0 {
        0.0
    } else if sublinear {
        1.0 + (tf_raw as f32).ln()
    } else {
        tf_raw as f32
    }
}

fn idf_weight(num_docs: u32, df_t: u32, smooth: bool) -> f32 {
    let n = num_docs as f32;
    let df_t = df_t as f32;
    if smooth {
        ((1.0 + n) / (1.0 + df_t)).ln() + 1.0
    } else {
        (n / df_t.max(1.0)).ln() + 1.0
    }
}

fn normalize(weights: &mut [(TermId, f32)]) {
    let norm = weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm == 0.0 { return; }
    for (_, w) in weights.iter_mut() { *w /= norm; }
}
