//! Hash-bucketed multiset of rows.

use super::row::{Candidates, HashedRow, Permutation};
use crate::value::Hash;

/// Bucket count used when the number of rows is not known up front.
pub const DEFAULT_BUCKETS: usize = 100;

/// A multiset of rows bucketed by row hash. Duplicate rows are kept.
#[derive(Debug)]
pub struct RowMultiset<'a> {
    buckets: Vec<Vec<HashedRow<'a>>>,
    len: usize,
}

impl Default for RowMultiset<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RowMultiset<'a> {
    /// Creates an empty multiset with [`DEFAULT_BUCKETS`] buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Creates an empty multiset with `count` buckets (at least one).
    #[must_use]
    pub fn with_buckets(count: usize) -> Self {
        Self {
            buckets: (0..count.max(1)).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    /// Builds a multiset over `rows`, with one bucket per row.
    #[must_use]
    pub fn from_rows<R: AsRef<[crate::value::Value]>>(rows: &'a [R]) -> Self {
        let mut set = Self::with_buckets(rows.len());
        for row in rows {
            set.insert(HashedRow::new(row.as_ref()));
        }
        set
    }

    /// Adds a row.
    pub fn insert(&mut self, row: HashedRow<'a>) {
        let index = self.bucket_index(row.hash());
        self.buckets[index].push(row);
        self.len += 1;
    }

    /// Removes the first stored row that `row` matches and returns the
    /// permutations that made it match.
    ///
    /// Returns an empty list, and leaves the multiset untouched, when nothing
    /// in the bucket matches.
    pub fn remove_match(
        &mut self,
        row: &HashedRow<'_>,
        candidates: Candidates<'_>,
    ) -> Vec<Permutation> {
        let index = self.bucket_index(row.hash());
        let bucket = &mut self.buckets[index];

        let hit = bucket.iter().enumerate().find_map(|(position, stored)| {
            let found = stored.matches(row, candidates);
            (!found.is_empty()).then_some((position, found))
        });

        match hit {
            Some((position, found)) => {
                bucket.remove(position);
                self.len -= 1;
                found
            }
            None => Vec::new(),
        }
    }

    /// Every permutation under which `row` lines up with some stored row.
    /// Nothing is removed.
    #[must_use]
    pub fn permutations_of(&self, row: &HashedRow<'_>) -> Vec<Permutation> {
        let mut found: Vec<Permutation> = Vec::new();
        for stored in &self.buckets[self.bucket_index(row.hash())] {
            for permutation in stored.matches(row, Candidates::Search) {
                if !found.contains(&permutation) {
                    found.push(permutation);
                }
            }
        }
        found
    }

    /// Number of stored rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no rows are stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket_index(&self, hash: Hash) -> usize {
        let count = self.buckets.len() as Hash;
        usize::try_from(hash % count).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_keeps_duplicates() {
        let rows = vec![vec![Value::Integer(1)], vec![Value::Integer(1)]];
        let mut set = RowMultiset::from_rows(&rows);
        assert_eq!(set.len(), 2);

        let needle = [Value::Integer(1)];
        let needle = HashedRow::new(&needle);
        assert!(!set.remove_match(&needle, Candidates::Search).is_empty());
        assert!(!set.remove_match(&needle, Candidates::Search).is_empty());
        assert!(set.remove_match(&needle, Candidates::Search).is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn test_failed_removal_leaves_rows() {
        let rows = vec![vec![Value::Integer(1), Value::Integer(2)]];
        let mut set = RowMultiset::from_rows(&rows);

        let needle = [Value::Integer(2), Value::Integer(1)];
        let identity = [Permutation::identity(2)];
        let found = set.remove_match(&HashedRow::new(&needle), Candidates::Only(&identity));
        assert!(found.is_empty());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_permutations_of_collects_every_stored_row() {
        let rows = vec![
            vec![Value::Integer(1), Value::Integer(2)],
            vec![Value::Integer(2), Value::Integer(1)],
        ];
        let set = RowMultiset::from_rows(&rows);
        let needle = [Value::Integer(1), Value::Integer(2)];
        let found = set.permutations_of(&HashedRow::new(&needle));
        assert_eq!(found.len(), 2);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_zero_buckets_is_clamped() {
        let mut set = RowMultiset::with_buckets(0);
        let row = [Value::from("x")];
        set.insert(HashedRow::new(&row));
        assert_eq!(set.len(), 1);
    }
}
