//! Result-set equivalence.
//!
//! Two result sets are equivalent when they hold the same multiset of rows
//! and a single column correspondence lines every row up. Row order, column
//! order and column names carry no meaning.

mod multiset;
mod row;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::value::Value;

pub use multiset::{DEFAULT_BUCKETS, RowMultiset};
pub use row::{Candidates, HashedRow, Permutation};

/// Columns and rows returned by evaluating a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names, in output order.
    pub columns: Vec<String>,
    /// Rows, each as wide as `columns`.
    #[serde(rename = "values", alias = "rows", alias = "data")]
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Creates a result set.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// The column correspondence established so far while pairing rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correspondence {
    /// No row has been paired yet; any permutation is acceptable.
    Unconstrained,
    /// Only these permutations explain every row paired so far.
    Narrowed(Vec<Permutation>),
}

impl Correspondence {
    /// The candidates the next pairing may use.
    #[must_use]
    pub fn candidates(&self) -> Candidates<'_> {
        match self {
            Self::Unconstrained => Candidates::Search,
            Self::Narrowed(permutations) => Candidates::Only(permutations),
        }
    }

    /// Keeps only the permutations that also explain the latest pairing.
    ///
    /// Returns `None` once no permutation survives.
    #[must_use]
    pub fn narrow(&self, found: Vec<Permutation>) -> Option<Self> {
        let survivors: Vec<Permutation> = match self {
            Self::Unconstrained => found,
            Self::Narrowed(current) => found.into_iter().filter(|p| current.contains(p)).collect(),
        };
        (!survivors.is_empty()).then_some(Self::Narrowed(survivors))
    }

    /// Returns `true` while at least one permutation is still possible.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Narrowed(permutations) => !permutations.is_empty(),
        }
    }
}

/// Decides whether `actual` holds the same data as `expected`.
///
/// Every column correspondence the first expected row admits is tried in
/// turn. Once the correspondence is fixed, pairing rows greedily is exact.
///
/// Never fails: shape mismatches are simply a `false` verdict.
#[must_use]
pub fn is_equivalent(expected: &ResultSet, actual: &ResultSet) -> bool {
    if expected.column_count() != actual.column_count() {
        debug!(
            expected = expected.column_count(),
            actual = actual.column_count(),
            "column counts differ"
        );
        return false;
    }
    if expected.row_count() != actual.row_count() {
        debug!(
            expected = expected.row_count(),
            actual = actual.row_count(),
            "row counts differ"
        );
        return false;
    }
    let Some(first) = expected.rows.first() else {
        return true;
    };

    let candidates = RowMultiset::from_rows(&actual.rows).permutations_of(&HashedRow::new(first));
    if candidates.is_empty() {
        debug!("first expected row has no counterpart");
        return false;
    }
    debug!(candidates = candidates.len(), "trying column correspondences");

    candidates
        .into_iter()
        .any(|permutation| pairs_every_row(expected, actual, permutation))
}

/// Pairs every expected row with a distinct actual row under `permutation`.
fn pairs_every_row(expected: &ResultSet, actual: &ResultSet, permutation: Permutation) -> bool {
    let mut remaining = RowMultiset::from_rows(&actual.rows);

    let outcome = expected.rows.iter().enumerate().try_fold(
        Correspondence::Narrowed(vec![permutation]),
        |state, (position, row)| {
            let needle = HashedRow::new(row);
            let found = remaining.remove_match(&needle, state.candidates());
            let next = state.narrow(found);
            if next.is_none() {
                debug!(row = position, "expected row has no counterpart");
            }
            next
        },
    );

    outcome.as_ref().is_some_and(Correspondence::is_consistent) && remaining.is_empty()
}
