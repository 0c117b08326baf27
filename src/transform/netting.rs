//! Folds technosphere self-loops into net production.
//!
//! A `technosphere` edge from a process to itself is the share of its own
//! output the process consumes. The solver expects that share to already be
//! subtracted from the `production` edge at the same key, so for every such
//! loop `(K, K, technosphere)`:
//!
//! `production'(K) = production(K) - loop(K)` column-wise, where a missing
//! `production(K)` starts from the catalog's baseline amount for `K`.
//!
//! The loop row itself is dropped.
use crate::catalog::Catalog;
use crate::error::Result;
use crate::store::{EdgeIdentity, FlowType, ScenarioTable};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NettingReport {
    pub self_loops_netted: usize,
    pub productions_synthesized: usize,
}

#[inline]
fn is_technosphere_loop(identity: &EdgeIdentity) -> bool {
    identity.is_self_loop() && identity.flow_type == FlowType::Technosphere
}

/// Returns a new table without technosphere self-loops.
pub fn net_self_loops<C: Catalog + ?Sized>(table: &ScenarioTable, catalog: &C) -> Result<(ScenarioTable, NettingReport)> {
    // production identity -> the self-loop row netted into it
    let loops: HashMap<EdgeIdentity, usize> = table
        .identities()
        .iter()
        .enumerate()
        .filter(|(_, id)| is_technosphere_loop(id))
        .map(|(i, id)| (id.with_flow_type(FlowType::Production), i))
        .collect();

    let mut report = NettingReport { self_loops_netted: loops.len(), ..Default::default() };
    if loops.is_empty() {
        return Ok((table.clone(), report));
    }

    let mut out = ScenarioTable::with_capacity(table.columns().to_vec(), table.len());
    for (id, row) in table.iter() {
        if is_technosphere_loop(id) {
            continue;
        }
        match loops.get(id) {
            Some(&loop_idx) => out.insert(id.clone(), &subtract(row, table.row_at(loop_idx)))?,
            None => out.insert(id.clone(), row)?,
        }
    }

    // Loops without a production row get one seeded from the baseline amount,
    // appended in the order the loops appeared.
    for (i, id) in table.identities().iter().enumerate() {
        if !is_technosphere_loop(id) {
            continue;
        }
        let production = id.with_flow_type(FlowType::Production);
        if table.contains(&production) {
            continue;
        }
        let amount = catalog.baseline_amount(&id.input)?;
        let seeded = vec![amount; table.width()];
        out.insert(production, &subtract(&seeded, table.row_at(i)))?;
        report.productions_synthesized += 1;
    }

    info!(
        netted = report.self_loops_netted,
        synthesized = report.productions_synthesized,
        "merged technosphere flows to self into production"
    );
    Ok((out, report))
}

fn subtract(lhs: &[f64], rhs: &[f64]) -> Vec<f64> {
    lhs.iter().zip(rhs).map(|(l, r)| l - r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::store::EdgeKey;

    fn key(code: &str) -> EdgeKey { EdgeKey::new("ei", code) }

    fn catalog_with(amount: f64) -> InMemoryCatalog {
        let mut cat = InMemoryCatalog::new();
        let k = cat.add_activity("ei", "k1", "heat", "heat", "CH");
        cat.set_production_amount(&k, amount).unwrap();
        cat
    }

    #[test]
    fn test_synthesizes_production_from_baseline() {
        let mut t = ScenarioTable::new(vec!["s1".into(), "s2".into()]);
        t.insert(EdgeIdentity::new(key("k1"), key("k2"), FlowType::Technosphere), &[10.0, 20.0]).unwrap();
        t.insert(EdgeIdentity::new(key("k1"), key("k1"), FlowType::Technosphere), &[3.0, 5.0]).unwrap();

        let (netted, report) = net_self_loops(&t, &catalog_with(15.0)).unwrap();

        assert_eq!(report, NettingReport { self_loops_netted: 1, productions_synthesized: 1 });
        assert_eq!(netted.len(), 2);
        assert_eq!(netted.row(&EdgeIdentity::new(key("k1"), key("k1"), FlowType::Production)), Some(&[12.0, 10.0][..]));
        assert!(!netted.contains(&EdgeIdentity::new(key("k1"), key("k1"), FlowType::Technosphere)));
        assert_eq!(netted.row(&EdgeIdentity::new(key("k1"), key("k2"), FlowType::Technosphere)), Some(&[10.0, 20.0][..]));
    }

    #[test]
    fn test_subtracts_from_existing_production() {
        let mut t = ScenarioTable::new(vec!["s1".into(), "s2".into()]);
        t.insert(EdgeIdentity::new(key("k1"), key("k1"), FlowType::Production), &[2.0, 4.0]).unwrap();
        t.insert(EdgeIdentity::new(key("k1"), key("k1"), FlowType::Technosphere), &[0.5, 1.0]).unwrap();

        // catalog is never consulted when a production row exists
        let (netted, report) = net_self_loops(&t, &InMemoryCatalog::new()).unwrap();

        assert_eq!(report.productions_synthesized, 0);
        assert_eq!(netted.len(), 1);
        assert_eq!(netted.row_at(0), &[1.5, 3.0]);
    }

    #[test]
    fn test_netting_twice_is_a_noop() {
        let mut t = ScenarioTable::new(vec!["s1".into()]);
        t.insert(EdgeIdentity::new(key("k1"), key("k1"), FlowType::Technosphere), &[3.0]).unwrap();
        let cat = catalog_with(15.0);

        let (once, _) = net_self_loops(&t, &cat).unwrap();
        let (twice, report) = net_self_loops(&once, &cat).unwrap();
        assert_eq!(report, NettingReport::default());
        assert_eq!(twice, once);
    }

    #[test]
    fn test_unknown_process_propagates_catalog_error() {
        let mut t = ScenarioTable::new(vec!["s1".into()]);
        t.insert(EdgeIdentity::new(key("zz"), key("zz"), FlowType::Technosphere), &[3.0]).unwrap();
        assert!(net_self_loops(&t, &InMemoryCatalog::new()).is_err());
    }

    #[test]
    fn test_biosphere_self_edges_are_untouched() {
        let mut t = ScenarioTable::new(vec!["s1".into()]);
        let id = EdgeIdentity::new(key("k1"), key("k1"), FlowType::Biosphere);
        t.insert(id.clone(), &[3.0]).unwrap();
        let (netted, report) = net_self_loops(&t, &InMemoryCatalog::new()).unwrap();
        assert_eq!(report.self_loops_netted, 0);
        assert_eq!(netted.row(&id), Some(&[3.0][..]));
    }
}
