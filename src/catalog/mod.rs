//! The activity/flow catalog, seen only through the narrow lookup contract the
//! reconciliation stages need.
pub mod memory;

pub use memory::{CatalogEntry, InMemoryCatalog};

use crate::error::CatalogError;
use crate::store::{Categories, EdgeKey, ExchangeSide};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// The fields a descriptive exchange side is matched on.
///
/// Elementary flows are matched on (name, categories); everything else on
/// (name, reference product, location). Both only match within the database
/// the row names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchTuple {
    Activity { name: String, product: String, location: String, database: String },
    Flow { name: String, categories: Option<Categories>, database: String },
}

impl MatchTuple {
    pub fn for_side(side: &ExchangeSide, biosphere_database: &str) -> Self {
        if side.database == biosphere_database {
            MatchTuple::Flow {
                name: side.name.clone(),
                categories: side.categories.clone(),
                database: side.database.clone(),
            }
        } else {
            MatchTuple::Activity {
                name: side.name.clone(),
                product: side.reference_product.clone(),
                location: side.location.clone(),
                database: side.database.clone(),
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MatchTuple::Activity { name, .. } | MatchTuple::Flow { name, .. } => name,
        }
    }

    pub fn database(&self) -> &str {
        match self {
            MatchTuple::Activity { database, .. } | MatchTuple::Flow { database, .. } => database,
        }
    }
}

impl fmt::Display for MatchTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTuple::Activity { name, product, location, .. } => {
                write!(f, "('{}', '{}', '{}')", name, product, location)
            }
            MatchTuple::Flow { name, categories: Some(c), .. } => write!(f, "('{}', {})", name, c),
            MatchTuple::Flow { name, categories: None, .. } => write!(f, "('{}', None)", name),
        }
    }
}

/// The distinct match tuples of one exchange side of one table, plus the
/// databases that side refers to. One batch is one catalog round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupBatch {
    pub tuples: BTreeSet<MatchTuple>,
    pub databases: BTreeSet<String>,
}

impl LookupBatch {
    pub fn len(&self) -> usize { self.tuples.len() }
    pub fn is_empty(&self) -> bool { self.tuples.is_empty() }
}

/// Read-only lookup service backing key resolution and self-loop netting.
pub trait Catalog {
    /// Resolves every tuple in the batch it can. Tuples without a match are
    /// simply absent from the returned map.
    fn resolve_batch(&self, batch: &LookupBatch) -> Result<HashMap<MatchTuple, EdgeKey>, CatalogError>;

    /// The amount a process produces of its own reference product.
    fn baseline_amount(&self, key: &EdgeKey) -> Result<f64, CatalogError>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn resolve_batch(&self, batch: &LookupBatch) -> Result<HashMap<MatchTuple, EdgeKey>, CatalogError> {
        (**self).resolve_batch(batch)
    }

    fn baseline_amount(&self, key: &EdgeKey) -> Result<f64, CatalogError> {
        (**self).baseline_amount(key)
    }
}
