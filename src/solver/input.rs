//! The hand-off to the downstream linear solver: a dense exchange x scenario
//! matrix plus the lookups needed to place each row in the baseline system.
use crate::error::{Result, ScenarioError};
use crate::io::import::clean_scenario_name;
use crate::store::{EdgeIdentity, EdgeKey, FlowType, ScenarioTable};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Edge weight of the exchange graph: the flow type and the matrix row it
/// corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeEdge {
    pub flow_type: FlowType,
    pub row: usize,
}

#[derive(Debug, Clone)]
pub struct SolverInput {
    pub identities: Vec<EdgeIdentity>,
    /// Row-major, `identities.len() * scenario_names.len()`.
    pub samples: Vec<f64>,
    pub scenario_names: Vec<String>,
    graph: DiGraph<EdgeKey, ExchangeEdge>,
    nodes: HashMap<EdgeKey, NodeIndex>,
}

impl SolverInput {
    pub fn from_table(table: &ScenarioTable) -> Self {
        let mut graph = DiGraph::with_capacity(table.len(), table.len());
        let mut nodes: HashMap<EdgeKey, NodeIndex> = HashMap::new();

        for (row, id) in table.identities().iter().enumerate() {
            let mut node = |key: &EdgeKey| *nodes.entry(key.clone()).or_insert_with(|| graph.add_node(key.clone()));
            let (a, b) = (node(&id.input), node(&id.output));
            graph.add_edge(a, b, ExchangeEdge { flow_type: id.flow_type, row });
        }

        Self {
            identities: table.identities().to_vec(),
            samples: table.values().to_vec(),
            scenario_names: table.columns().iter().map(|c| clean_scenario_name(c)).collect(),
            graph,
            nodes,
        }
    }

    pub fn rows(&self) -> usize { self.identities.len() }
    pub fn columns(&self) -> usize { self.scenario_names.len() }
    pub fn graph(&self) -> &DiGraph<EdgeKey, ExchangeEdge> { &self.graph }

    pub fn node_index(&self, key: &EdgeKey) -> Option<NodeIndex> {
        self.nodes.get(key).copied()
    }

    /// Matrix row of an exchange, found by walking the input node's edges.
    pub fn row_of(&self, identity: &EdgeIdentity) -> Option<usize> {
        let a = self.node_index(&identity.input)?;
        let b = self.node_index(&identity.output)?;
        self.graph
            .edges(a)
            .find(|e| e.target() == b && e.weight().flow_type == identity.flow_type)
            .map(|e| e.weight().row)
    }

    pub fn edge_of(&self, row: usize) -> Option<EdgeIndex> {
        self.graph.edge_indices().find(|&e| self.graph[e].row == row)
    }

    /// All exchanges feeding into `key`, as (input key, edge) pairs.
    pub fn inputs_of(&self, key: &EdgeKey) -> Vec<(&EdgeKey, ExchangeEdge)> {
        let Some(node) = self.node_index(key) else { return Vec::new() };
        self.graph
            .edges_directed(node, petgraph::Direction::Incoming)
            .map(|e| (&self.graph[e.source()], *e.weight()))
            .collect()
    }

    /// One scenario as a column vector over all exchanges.
    pub fn scenario(&self, column: usize) -> Option<Vec<f64>> {
        if column >= self.columns() {
            return None;
        }
        let width = self.columns();
        Some((0..self.rows()).map(|r| self.samples[r * width + column]).collect())
    }
}

/// Keeps only exchanges whose output process lives in one of `include`.
pub fn filter_by_output_databases(table: &ScenarioTable, include: &HashSet<String>) -> ScenarioTable {
    table.filter(|id, _| include.contains(&id.output.database))
}

/// Rebuilds a scenario table from identities and per-row samples.
///
/// Column names default to `scenario1..N`.
pub fn scenario_table_from_arrays(
    identities: &[EdgeIdentity],
    samples: &[Vec<f64>],
    names: Option<Vec<String>>,
) -> Result<ScenarioTable> {
    if identities.len() != samples.len() {
        return Err(ScenarioError::MalformedInput(format!(
            "Length mismatch between arrays: {} identities, {} sample rows",
            identities.len(), samples.len()
        )));
    }
    let width = samples.first().map(Vec::len).unwrap_or_else(|| names.as_ref().map_or(0, Vec::len));
    let names = match names {
        Some(names) if names.len() != width => {
            return Err(ScenarioError::MalformedInput(format!(
                "Number of names ({}) should match number of samples columns ({})",
                names.len(), width
            )));
        }
        Some(names) => names,
        None => (1..=width).map(|i| format!("scenario{}", i)).collect(),
    };

    let mut table = ScenarioTable::with_capacity(names, identities.len());
    for (id, row) in identities.iter().zip(samples) {
        table.insert(id.clone(), row)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(db: &str, code: &str) -> EdgeKey { EdgeKey::new(db, code) }

    fn table() -> ScenarioTable {
        let mut t = ScenarioTable::new(vec!["base\n2030".into(), "2050".into()]);
        t.insert(EdgeIdentity::new(key("ei", "steel"), key("fg", "car"), FlowType::Technosphere), &[1.0, 2.0]).unwrap();
        t.insert(EdgeIdentity::new(key("fg", "car"), key("fg", "car"), FlowType::Production), &[1.0, 1.0]).unwrap();
        t.insert(EdgeIdentity::new(key("biosphere3", "co2"), key("ei", "steel"), FlowType::Biosphere), &[0.3, 0.1]).unwrap();
        t.insert(EdgeIdentity::new(key("ei", "steel"), key("fg", "car"), FlowType::Production), &[5.0, 6.0]).unwrap();
        t
    }

    #[test]
    fn test_matrix_and_graph_lookups() {
        let input = SolverInput::from_table(&table());
        assert_eq!((input.rows(), input.columns()), (4, 2));
        assert_eq!(input.scenario_names, vec!["base 2030".to_string(), "2050".to_string()]);
        assert_eq!(input.graph().node_count(), 3);
        assert_eq!(input.graph().edge_count(), 4);

        // parallel edges are told apart by flow type
        let prod = EdgeIdentity::new(key("ei", "steel"), key("fg", "car"), FlowType::Production);
        assert_eq!(input.row_of(&prod), Some(3));
        assert_eq!(input.scenario(1), Some(vec![2.0, 1.0, 0.1, 6.0]));
        assert_eq!(input.scenario(2), None);
        assert!(input.edge_of(2).is_some());

        let into_car = input.inputs_of(&key("fg", "car"));
        assert_eq!(into_car.len(), 3);
    }

    #[test]
    fn test_filter_by_output_database() {
        let include: HashSet<String> = ["fg".to_string()].into_iter().collect();
        let filtered = filter_by_output_databases(&table(), &include);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.identities().iter().all(|id| id.output.database == "fg"));
    }

    #[test]
    fn test_from_arrays_defaults_names_and_checks_shape() {
        let ids: Vec<EdgeIdentity> = table().identities()[..2].to_vec();
        let t = scenario_table_from_arrays(&ids, &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]], None).unwrap();
        assert_eq!(t.columns(), &["scenario1".to_string(), "scenario2".to_string(), "scenario3".to_string()]);
        assert_eq!(t.row_at(1), &[4.0, 5.0, 6.0]);

        assert!(scenario_table_from_arrays(&ids, &[vec![1.0]], None).is_err());
        assert!(scenario_table_from_arrays(&ids, &[vec![1.0], vec![2.0]], Some(vec!["a".into(), "b".into()])).is_err());
    }
}
