//! Tests for result-set equivalence.

mod common;
use common::*;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngExt, SeedableRng};
use sqlgrade_core::{is_equivalent, ResultSet, Value};

fn ints(rows: &[&[i64]]) -> ResultSet {
    rs(rows
        .iter()
        .map(|row| row.iter().copied().map(Value::from).collect())
        .collect())
}

fn sample() -> ResultSet {
    rs(vec![
        vec![Value::from("Ada"), Value::from(36), Value::from(1.5)],
        vec![Value::from("Alan"), Value::from(41), Value::Null],
        vec![Value::from("Grace"), Value::from(85), Value::from(2.0)],
        vec![Value::from("Ada"), Value::from(36), Value::from(1.5)],
    ])
}

#[test]
fn identical_sets_are_equivalent() {
    assert!(is_equivalent(&sample(), &sample()));
}

#[test]
fn row_order_does_not_matter() {
    let expected = sample();
    let mut rows = expected.rows.clone();
    rows.reverse();
    rows.swap(0, 2);
    assert!(is_equivalent(&expected, &rs(rows)));
}

#[test]
fn column_order_does_not_matter() {
    let expected = sample();
    for order in [[0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]] {
        let actual = permute_columns(&expected, &order);
        assert!(is_equivalent(&expected, &actual), "order {order:?}");
    }
}

#[test]
fn column_names_do_not_matter() {
    let expected = sample();
    let mut actual = sample();
    actual.columns = vec!["a".into(), "b".into(), "c".into()];
    assert!(is_equivalent(&expected, &actual));
}

#[test]
fn swapped_columns_with_renamed_headers() {
    let expected = rs_json(r#"{"columns": ["x", "y"], "values": [["A", 1], ["B", 2]]}"#);
    let actual = rs_json(r#"{"columns": ["y", "x"], "values": [[1, "A"], [2, "B"]]}"#);
    assert!(is_equivalent(&expected, &actual));
}

#[test]
fn missing_row_is_not_equivalent() {
    let expected = sample();
    let mut actual = sample();
    actual.rows.pop();
    assert!(!is_equivalent(&expected, &actual));
    assert!(!is_equivalent(&actual, &expected));
}

#[test]
fn duplicate_rows_must_match_in_number() {
    let expected = rs(vec![vec![Value::from(1)], vec![Value::from(1)]]);
    let actual = rs(vec![vec![Value::from(1)]]);
    assert!(!is_equivalent(&expected, &actual));
    assert!(!is_equivalent(&actual, &expected));
}

#[test]
fn column_count_must_match() {
    let expected = sample();
    let narrower = ResultSet::new(
        vec!["c0".into(), "c1".into()],
        expected.rows.iter().map(|row| row[..2].to_vec()).collect(),
    );
    assert!(!is_equivalent(&expected, &narrower));

    let empty_wide = ResultSet::new(vec!["a".into(), "b".into()], vec![]);
    let empty_narrow = ResultSet::new(vec!["a".into()], vec![]);
    assert!(!is_equivalent(&empty_wide, &empty_narrow));
}

#[test]
fn empty_sets_are_equivalent() {
    let empty = ResultSet::new(vec!["a".into()], vec![]);
    assert!(is_equivalent(&empty, &empty.clone()));
}

#[test]
fn nulls_only_match_nulls_in_the_same_positions() {
    let expected = rs(vec![vec![Value::Null, Value::Null]]);
    assert!(is_equivalent(&expected, &rs(vec![vec![Value::Null, Value::Null]])));

    // 17 is the hash of NULL; it must still not match.
    let lookalike = rs(vec![vec![Value::Null, Value::from(17)]]);
    assert!(!is_equivalent(&expected, &lookalike));
}

#[test]
fn one_correspondence_must_explain_every_row() {
    // Each row matches on its own (row 1 as is, row 2 with the columns
    // swapped) but no single column order explains both.
    let expected = rs(vec![
        vec![Value::from(1), Value::from(2)],
        vec![Value::from(3), Value::from(4)],
    ]);
    let actual = rs(vec![
        vec![Value::from(1), Value::from(2)],
        vec![Value::from(4), Value::from(3)],
    ]);
    assert!(!is_equivalent(&expected, &actual));
}

#[test]
fn ambiguous_first_row_is_resolved_by_later_rows() {
    let expected = rs(vec![
        vec![Value::from(5), Value::from(5)],
        vec![Value::from("a"), Value::from("b")],
    ]);
    let actual = rs(vec![
        vec![Value::from("b"), Value::from("a")],
        vec![Value::from(5), Value::from(5)],
    ]);
    assert!(is_equivalent(&expected, &actual));
}

#[test]
fn kinds_are_not_coerced() {
    let expected = rs(vec![vec![Value::from("1")]]);
    let actual = rs(vec![vec![Value::from(1)]]);
    assert!(!is_equivalent(&expected, &actual));
}

#[test]
fn integral_reals_equal_integers() {
    let expected = rs(vec![vec![Value::from(2), Value::from("x")]]);
    let actual = rs(vec![vec![Value::from("x"), Value::from(2.0)]]);
    assert!(is_equivalent(&expected, &actual));
}

#[test]
fn blobs_compare_by_bytes() {
    // Same byte sum, different bytes.
    let expected = rs(vec![vec![Value::Blob(vec![1, 2])]]);
    let actual = rs(vec![vec![Value::Blob(vec![2, 1])]]);
    assert!(!is_equivalent(&expected, &actual));
    assert!(is_equivalent(&expected, &expected.clone()));
}

#[test]
fn data_alias_is_accepted() {
    let expected = rs_json(r#"{"columns": ["n"], "data": [[1], [2]]}"#);
    let actual = rs_json(r#"{"columns": ["m"], "values": [[2], [1]]}"#);
    assert!(is_equivalent(&expected, &actual));
}

#[test]
fn rows_sharing_a_bucket_do_not_mislead_pairing() {
    // Every row sums to the same hash. The first stored row that lines up
    // with expected row 1 only does so under the wrong column order.
    let expected = ints(&[&[2, 0, 1, 0], &[2, 2, 2, 0], &[0, 0, 2, 1]]);
    let actual = ints(&[&[0, 0, 1, 2], &[2, 2, 0, 2], &[2, 0, 0, 1]]);
    assert!(is_equivalent(&expected, &actual));
    assert!(is_equivalent(&actual, &expected));
}

#[test]
fn any_column_and_row_shuffle_is_equivalent() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for trial in 0..2000 {
        let width = rng.random_range(1..=4);
        let height = rng.random_range(0..=5);
        let rows: Vec<Vec<Value>> = (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| Value::from(rng.random_range(0..3_i64)))
                    .collect()
            })
            .collect();
        let expected = ResultSet::new((0..width).map(|i| format!("c{i}")).collect(), rows);

        let mut order: Vec<usize> = (0..width).collect();
        order.shuffle(&mut rng);
        let mut actual = permute_columns(&expected, &order);
        actual.rows.shuffle(&mut rng);

        assert!(
            is_equivalent(&expected, &actual),
            "trial {trial}: {:?} vs {:?}",
            expected.rows,
            actual.rows
        );
    }
}
