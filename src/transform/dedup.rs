//! Collapses repeated edge identities.
use crate::config::DuplicatePolicy;
use crate::error::{Result, ScenarioError};
use crate::store::{IndexedRows, ScenarioTable};
use std::collections::HashMap;
use tracing::warn;

/// Deduplicates keyed rows into a `ScenarioTable`.
///
/// Under `KeepLast` the last row carrying an identity survives, at the
/// position of that last occurrence. Returns the table and the number of
/// discarded rows.
pub fn deduplicate(rows: &IndexedRows, policy: DuplicatePolicy) -> Result<(ScenarioTable, usize)> {
    // Position of the final occurrence of each identity.
    let mut last_seen = HashMap::with_capacity(rows.len());
    for (i, (identity, _)) in rows.rows.iter().enumerate() {
        if let Some(previous) = last_seen.insert(identity, i) {
            if policy == DuplicatePolicy::Reject {
                return Err(ScenarioError::DuplicateEdge { identity: identity.to_string(), first: previous, second: i });
            }
        }
    }

    let mut table = ScenarioTable::with_capacity(rows.columns.clone(), last_seen.len());
    for (i, (identity, values)) in rows.rows.iter().enumerate() {
        if last_seen.get(identity) == Some(&i) {
            table.insert(identity.clone(), values)?;
        }
    }

    let dropped = rows.len() - table.len();
    if dropped > 0 {
        warn!(dropped, "Found and dropped duplicate exchanges, only the last instance is kept");
    }
    Ok((table, dropped))
}

/// Re-applies deduplication to a table that may already be unique.
pub fn deduplicate_table(table: &ScenarioTable, policy: DuplicatePolicy) -> Result<(ScenarioTable, usize)> {
    let rows = IndexedRows {
        columns: table.columns().to_vec(),
        rows: table.iter().map(|(id, r)| (id.clone(), r.to_vec())).collect(),
    };
    deduplicate(&rows, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EdgeIdentity, EdgeKey, FlowType};

    fn ident(a: &str, b: &str) -> EdgeIdentity {
        EdgeIdentity::new(EdgeKey::new("db", a), EdgeKey::new("db", b), FlowType::Technosphere)
    }

    fn rows() -> IndexedRows {
        IndexedRows {
            columns: vec!["s1".into()],
            rows: vec![
                (ident("a", "b"), vec![1.0]),
                (ident("c", "b"), vec![2.0]),
                (ident("a", "b"), vec![3.0]),
                (ident("a", "b"), vec![4.0]),
            ],
        }
    }

    #[test]
    fn test_last_occurrence_wins() {
        let (table, dropped) = deduplicate(&rows(), DuplicatePolicy::KeepLast).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(&ident("a", "b")), Some(&[4.0][..]));
        // survivors keep the order of their last occurrence
        assert_eq!(table.identities(), &[ident("c", "b"), ident("a", "b")]);
    }

    #[test]
    fn test_reject_policy_reports_both_rows() {
        let err = deduplicate(&rows(), DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, ScenarioError::DuplicateEdge { first: 0, second: 2, .. }));
    }

    #[test]
    fn test_deduplication_is_idempotent() {
        let (once, _) = deduplicate(&rows(), DuplicatePolicy::KeepLast).unwrap();
        let (twice, dropped) = deduplicate_table(&once, DuplicatePolicy::KeepLast).unwrap();
        assert_eq!(dropped, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_flow_type_is_part_of_identity() {
        let k = EdgeKey::new("db", "a");
        let rows = IndexedRows {
            columns: vec!["s1".into()],
            rows: vec![
                (EdgeIdentity::new(k.clone(), k.clone(), FlowType::Production), vec![1.0]),
                (EdgeIdentity::new(k.clone(), k, FlowType::Technosphere), vec![0.2]),
            ],
        };
        let (table, dropped) = deduplicate(&rows, DuplicatePolicy::Reject).unwrap();
        assert_eq!((table.len(), dropped), (2, 0));
    }
}
