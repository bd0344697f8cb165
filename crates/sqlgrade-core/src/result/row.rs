//! Rows with a cached hash and column-permutation matching.

use crate::value::{Hash, Value};

/// Seed added to every row hash.
const ROW_SEED: Hash = 17;

/// A column correspondence between two rows of equal arity.
///
/// Position `i` of the stored (actual) row lines up with position `self[i]`
/// of the probing (expected) row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// The identity correspondence over `arity` columns.
    #[must_use]
    pub fn identity(arity: usize) -> Self {
        Self((0..arity).collect())
    }

    /// Returns the target positions.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the zero-column permutation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for Permutation {
    fn from(positions: Vec<usize>) -> Self {
        Self(positions)
    }
}

/// Which permutations a match may use.
#[derive(Debug, Clone, Copy)]
pub enum Candidates<'a> {
    /// Search every permutation of the probing row.
    Search,
    /// Only verify the given permutations.
    Only(&'a [Permutation]),
}

/// A borrowed row with its hash computed once.
///
/// The hash is the sum of the value hashes, so it does not depend on column
/// order.
#[derive(Debug, Clone, Copy)]
pub struct HashedRow<'a> {
    values: &'a [Value],
    hash: Hash,
}

impl<'a> HashedRow<'a> {
    /// Wraps a row and hashes it.
    #[must_use]
    pub fn new(values: &'a [Value]) -> Self {
        let hash = values
            .iter()
            .map(Value::canonical_hash)
            .fold(ROW_SEED, Hash::wrapping_add);
        Self { values, hash }
    }

    /// The cached row hash.
    #[must_use]
    pub const fn hash(&self) -> Hash {
        self.hash
    }

    /// The wrapped values.
    #[must_use]
    pub const fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Number of columns.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.values.len()
    }

    /// Returns every permutation under which `other` lines up with this row.
    ///
    /// Rows of different arity or different hash never match. With
    /// [`Candidates::Only`] the given list is filtered and nothing outside it
    /// is tried.
    #[must_use]
    pub fn matches(&self, other: &HashedRow<'_>, candidates: Candidates<'_>) -> Vec<Permutation> {
        if self.arity() != other.arity() || self.hash != other.hash {
            return Vec::new();
        }

        match candidates {
            Candidates::Search => {
                let mut found = Vec::new();
                let mut used = vec![false; other.arity()];
                let mut current = Vec::with_capacity(self.arity());
                self.search(other, &mut used, &mut current, &mut found);
                found
            }
            Candidates::Only(permutations) => permutations
                .iter()
                .filter(|p| self.aligns(other, p))
                .cloned()
                .collect(),
        }
    }

    fn aligns(&self, other: &HashedRow<'_>, permutation: &Permutation) -> bool {
        permutation.len() == self.arity()
            && self
                .values
                .iter()
                .zip(permutation.as_slice())
                .all(|(value, &target)| other.values.get(target).is_some_and(|o| value.is_same(o)))
    }

    fn search(
        &self,
        other: &HashedRow<'_>,
        used: &mut [bool],
        current: &mut Vec<usize>,
        found: &mut Vec<Permutation>,
    ) {
        let index = current.len();
        let Some(value) = self.values.get(index) else {
            found.push(Permutation(current.clone()));
            return;
        };

        for (target, candidate) in other.values.iter().enumerate() {
            if used[target] || !value.is_same(candidate) {
                continue;
            }
            used[target] = true;
            current.push(target);
            self.search(other, used, current, found);
            current.pop();
            used[target] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[Value]) -> HashedRow<'_> {
        HashedRow::new(values)
    }

    #[test]
    fn test_hash_ignores_column_order() {
        let a = [Value::from("A"), Value::Integer(1)];
        let b = [Value::Integer(1), Value::from("A")];
        assert_eq!(row(&a).hash(), row(&b).hash());
    }

    #[test]
    fn test_search_finds_reordering() {
        let stored = [Value::Integer(1), Value::from("A")];
        let needle = [Value::from("A"), Value::Integer(1)];
        let found = row(&stored).matches(&row(&needle), Candidates::Search);
        assert_eq!(found, vec![Permutation::from(vec![1, 0])]);
    }

    #[test]
    fn test_search_returns_all_permutations_for_repeated_values() {
        let stored = [Value::Integer(7), Value::Integer(7)];
        let found = row(&stored).matches(&row(&stored), Candidates::Search);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&Permutation::identity(2)));
        assert!(found.contains(&Permutation::from(vec![1, 0])));
    }

    #[test]
    fn test_explicit_candidates_are_only_filtered() {
        let stored = [Value::Integer(1), Value::Integer(2)];
        let needle = [Value::Integer(2), Value::Integer(1)];
        let identity = [Permutation::identity(2)];
        assert!(row(&stored)
            .matches(&row(&needle), Candidates::Only(&identity))
            .is_empty());

        let swapped = [Permutation::identity(2), Permutation::from(vec![1, 0])];
        assert_eq!(
            row(&stored).matches(&row(&needle), Candidates::Only(&swapped)),
            vec![Permutation::from(vec![1, 0])]
        );
    }

    #[test]
    fn test_arity_mismatch_never_matches() {
        let short = [Value::Integer(1)];
        let long = [Value::Integer(1), Value::Null];
        assert!(row(&short).matches(&row(&long), Candidates::Search).is_empty());
    }

    #[test]
    fn test_hash_collision_still_compares_values() {
        // Both rows hash to 17 + 6.
        let blob = [Value::Blob(vec![1, 2, 3])];
        let number = [Value::Integer(6)];
        assert_eq!(row(&blob).hash(), row(&number).hash());
        assert!(row(&blob).matches(&row(&number), Candidates::Search).is_empty());
    }

    #[test]
    fn test_nulls_only_match_nulls() {
        let nulls = [Value::Null, Value::Null];
        let mixed = [Value::Null, Value::Integer(17)];
        assert_eq!(row(&nulls).matches(&row(&nulls), Candidates::Search).len(), 2);
        assert!(row(&nulls).matches(&row(&mixed), Candidates::Search).is_empty());
    }

    #[test]
    fn test_zero_arity_rows_match_once() {
        let empty: [Value; 0] = [];
        assert_eq!(
            row(&empty).matches(&row(&empty), Candidates::Search),
            vec![Permutation::identity(0)]
        );
    }
}
