//! Accuracy reporting and similarity search over collected hashes.
//!
//! Ground truth for the report comes from file names: two images are expected
//! to match when their names share the prefix before the first `_`
//! (`cat_1.png` and `cat_small.jpg` belong together, `dog_1.png` does not).

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::HashRecord;

/// Pairwise outcome counts for one distance threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Classify every unordered pair of `records`.
    ///
    /// A pair is predicted similar when its distance is at most `threshold`.
    pub fn evaluate(records: &[HashRecord], threshold: u32) -> Self {
        let mut matrix = ConfusionMatrix::default();

        for (i, first) in records.iter().enumerate() {
            for second in &records[i + 1..] {
                let expected = name_prefix(&first.path) == name_prefix(&second.path);
                let predicted = first.hash.is_similar(&second.hash, threshold);

                match (expected, predicted) {
                    (true, true) => matrix.true_positives += 1,
                    (false, true) => matrix.false_positives += 1,
                    (false, false) => matrix.true_negatives += 1,
                    (true, false) => matrix.false_negatives += 1,
                }
            }
        }

        debug!(
            "Evaluated {} pairs at threshold {}",
            matrix.total(),
            threshold
        );
        matrix
    }

    /// Number of pairs classified
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall
    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion Matrix:")?;
        writeln!(f, "=================")?;
        writeln!(f, "True Positives: {}", self.true_positives)?;
        writeln!(f, "False Positives: {}", self.false_positives)?;
        writeln!(f, "True Negatives: {}", self.true_negatives)?;
        writeln!(f, "False Negatives: {}", self.false_negatives)?;
        writeln!(f)?;
        writeln!(f, "Metrics:")?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy())?;
        writeln!(f, "Precision: {:.4}", self.precision())?;
        writeln!(f, "Recall: {:.4}", self.recall())?;
        write!(f, "F1 Score: {:.4}", self.f1_score())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// File name up to its first `_`, or the whole name when there is none
fn name_prefix(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('_') {
        Some((prefix, _)) => prefix.to_string(),
        None => name,
    }
}

/// A record close to a query image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarMatch<'a> {
    pub record: &'a HashRecord,
    pub distance: u32,
}

/// Records within `threshold` of `query`, nearest first.
///
/// The query itself is skipped, also when it is spelled differently
/// (`./sample/cat.png` and `sample/cat.png`). The comparison is strict:
/// a record at exactly `threshold` bits does not match.
pub fn find_similar<'a>(
    query: &HashRecord,
    records: &'a [HashRecord],
    threshold: u32,
) -> Vec<SimilarMatch<'a>> {
    let query_canonical = fs::canonicalize(&query.path).ok();
    let is_query = |path: &Path| {
        path == query.path
            || query_canonical
                .as_ref()
                .is_some_and(|q| fs::canonicalize(path).ok().as_ref() == Some(q))
    };

    let mut matches: Vec<_> = records
        .iter()
        .filter(|record| !is_query(&record.path))
        .map(|record| SimilarMatch {
            record,
            distance: query.hash.distance(&record.hash),
        })
        .filter(|m| m.distance < threshold)
        .collect();

    matches.sort_by(|a, b| match a.distance.cmp(&b.distance) {
        Ordering::Equal => a.record.path.cmp(&b.record.path),
        other => other,
    });
    matches
}
