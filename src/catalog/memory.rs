use super::{Catalog, LookupBatch, MatchTuple};
use crate::error::{CatalogError, Result};
use crate::store::{Categories, EdgeKey};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub database: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub reference_product: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub categories: Option<Categories>,
    /// Amount of its reference product the process produces. Absent for
    /// elementary flows and for processes that produce exactly one unit.
    #[serde(default)]
    pub production_amount: Option<f64>,
}

impl CatalogEntry {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.database.clone(), self.code.clone())
    }

    fn matches(&self, tuple: &MatchTuple) -> bool {
        if self.database != tuple.database() {
            return false;
        }
        match tuple {
            MatchTuple::Activity { name, product, location, .. } => {
                &self.name == name && &self.reference_product == product && &self.location == location
            }
            MatchTuple::Flow { name, categories, .. } => &self.name == name && &self.categories == categories,
        }
    }
}

/// A catalog snapshot held in memory, e.g. loaded from a JSON export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryCatalog {
    pub entries: Vec<CatalogEntry>,

    // Lookup caches (not serialized, rebuilt on load)
    #[serde(skip)]
    by_name: HashMap<String, Vec<usize>>,
    #[serde(skip)]
    by_key: HashMap<EdgeKey, usize>,
}

impl InMemoryCatalog {
    pub fn new() -> Self { Self::default() }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut catalog = Self { entries, ..Default::default() };
        catalog.rebuild_index();
        catalog
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut catalog: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        catalog.rebuild_index();
        Ok(catalog)
    }

    /// Rebuilds the lookup caches after deserialization.
    pub fn rebuild_index(&mut self) {
        self.by_name.clear();
        self.by_key.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            self.by_name.entry(entry.name.clone()).or_default().push(i);
            self.by_key.insert(entry.key(), i);
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn add_entry(&mut self, entry: CatalogEntry) -> EdgeKey {
        let idx = self.entries.len();
        let key = entry.key();
        self.by_name.entry(entry.name.clone()).or_default().push(idx);
        self.by_key.insert(key.clone(), idx);
        self.entries.push(entry);
        key
    }

    pub fn add_activity(&mut self, database: &str, code: &str, name: &str, product: &str, location: &str) -> EdgeKey {
        self.add_entry(CatalogEntry {
            database: database.into(),
            code: code.into(),
            name: name.into(),
            reference_product: product.into(),
            location: location.into(),
            categories: None,
            production_amount: None,
        })
    }

    pub fn add_flow(&mut self, database: &str, code: &str, name: &str, categories: &[&str]) -> EdgeKey {
        self.add_entry(CatalogEntry {
            database: database.into(),
            code: code.into(),
            name: name.into(),
            reference_product: String::new(),
            location: String::new(),
            categories: Some(Categories(categories.iter().map(|c| c.to_string()).collect())),
            production_amount: None,
        })
    }

    pub fn set_production_amount(&mut self, key: &EdgeKey, amount: f64) -> std::result::Result<(), CatalogError> {
        let idx = *self.by_key.get(key).ok_or_else(|| CatalogError::UnknownKey(key.clone()))?;
        self.entries[idx].production_amount = Some(amount);
        Ok(())
    }
}

impl Catalog for InMemoryCatalog {
    fn resolve_batch(&self, batch: &LookupBatch) -> std::result::Result<HashMap<MatchTuple, EdgeKey>, CatalogError> {
        let mut resolved = HashMap::with_capacity(batch.len());
        for tuple in &batch.tuples {
            let candidates: Vec<&CatalogEntry> = self
                .by_name
                .get(tuple.name())
                .into_iter()
                .flatten()
                .map(|&i| &self.entries[i])
                .filter(|e| batch.databases.contains(&e.database) && e.matches(tuple))
                .collect();

            match candidates.as_slice() {
                [] => {}
                [single] => {
                    resolved.insert(tuple.clone(), single.key());
                }
                many => {
                    return Err(CatalogError::Ambiguous {
                        query: tuple.to_string(),
                        candidates: many.iter().map(|e| e.key()).collect(),
                    });
                }
            }
        }
        Ok(resolved)
    }

    fn baseline_amount(&self, key: &EdgeKey) -> std::result::Result<f64, CatalogError> {
        let idx = self.by_key.get(key).ok_or_else(|| CatalogError::UnknownKey(key.clone()))?;
        Ok(self.entries[*idx].production_amount.unwrap_or(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn batch(tuples: Vec<MatchTuple>, dbs: &[&str]) -> LookupBatch {
        LookupBatch {
            tuples: tuples.into_iter().collect(),
            databases: dbs.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn activity(name: &str, product: &str, location: &str) -> MatchTuple {
        activity_in("ei", name, product, location)
    }

    fn activity_in(database: &str, name: &str, product: &str, location: &str) -> MatchTuple {
        MatchTuple::Activity {
            name: name.into(),
            product: product.into(),
            location: location.into(),
            database: database.into(),
        }
    }

    #[test]
    fn test_resolves_only_within_requested_databases() {
        let mut cat = InMemoryCatalog::new();
        cat.add_activity("ei", "s1", "steel production", "steel", "GLO");
        cat.add_activity("other", "s2", "steel production", "steel", "GLO");

        let found = cat.resolve_batch(&batch(vec![activity("steel production", "steel", "GLO")], &["ei"])).unwrap();
        assert_eq!(found.values().next(), Some(&EdgeKey::new("ei", "s1")));
    }

    #[test]
    fn test_same_activity_in_two_databases_resolves_per_row() {
        let mut cat = InMemoryCatalog::new();
        cat.add_activity("ei", "steel", "steel production", "steel", "GLO");
        cat.add_activity("fg", "steel-copy", "steel production", "steel", "GLO");

        let original = activity_in("ei", "steel production", "steel", "GLO");
        let copy = activity_in("fg", "steel production", "steel", "GLO");
        let found = cat.resolve_batch(&batch(vec![original.clone(), copy.clone()], &["ei", "fg"])).unwrap();
        assert_eq!(found[&original], EdgeKey::new("ei", "steel"));
        assert_eq!(found[&copy], EdgeKey::new("fg", "steel-copy"));
    }

    #[test]
    fn test_missing_tuple_is_absent_not_error() {
        let cat = InMemoryCatalog::new();
        let found = cat.resolve_batch(&batch(vec![activity("nothing", "", "")], &["ei"])).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_ambiguous_match_lists_candidates() {
        let mut cat = InMemoryCatalog::new();
        cat.add_activity("ei", "a", "heat", "heat", "CH");
        cat.add_activity("ei", "b", "heat", "heat", "CH");

        let err = cat.resolve_batch(&batch(vec![activity("heat", "heat", "CH")], &["ei"])).unwrap_err();
        match err {
            CatalogError::Ambiguous { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("Wrong error type: {:?}", other),
        }
    }

    #[test]
    fn test_flow_matching_uses_categories() {
        let mut cat = InMemoryCatalog::new();
        cat.add_flow("biosphere3", "co2-air", "Carbon dioxide", &["air"]);
        cat.add_flow("biosphere3", "co2-water", "Carbon dioxide", &["water"]);

        let tuple = MatchTuple::Flow {
            name: "Carbon dioxide".into(),
            categories: Some(Categories(vec!["water".into()])),
            database: "biosphere3".into(),
        };
        let found = cat.resolve_batch(&batch(vec![tuple.clone()], &["biosphere3"])).unwrap();
        assert_eq!(found[&tuple], EdgeKey::new("biosphere3", "co2-water"));
    }

    #[test]
    fn test_baseline_amount_defaults_to_one() {
        let mut cat = InMemoryCatalog::new();
        let k = cat.add_activity("ei", "a", "heat", "heat", "CH");
        assert_eq!(cat.baseline_amount(&k).unwrap(), 1.0);

        cat.set_production_amount(&k, 15.0).unwrap();
        assert_eq!(cat.baseline_amount(&k).unwrap(), 15.0);

        let missing = EdgeKey::new("ei", "zzz");
        assert_eq!(cat.baseline_amount(&missing), Err(CatalogError::UnknownKey(missing)));
    }

    #[test]
    fn test_load_snapshot_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "entries": [
                {{ "database": "ei", "code": "x", "name": "market for heat", "reference_product": "heat", "location": "CH", "production_amount": 2.5 }}
            ] }}"#
        )
        .unwrap();

        let cat = InMemoryCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.baseline_amount(&EdgeKey::new("ei", "x")).unwrap(), 2.5);
        let found = cat.resolve_batch(&batch(vec![activity("market for heat", "heat", "CH")], &["ei"])).unwrap();
        assert_eq!(found.len(), 1);
    }
}
