// crates/geoimport-core/src/importer/hierarchy.rs
use crate::error::Result;
use crate::loader::LineSource;
use crate::model::raw::hierarchy as col;
use crate::model::GeoId;
use std::collections::HashMap;
use tracing::{info, warn};

/// Declared parent links from hierarchy.txt, child → parents in file order.
#[derive(Debug, Default, Clone)]
pub struct HierarchyMap {
    parents: HashMap<GeoId, Vec<GeoId>>,
}

impl HierarchyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the whole file. Malformed lines are logged and ignored.
    pub fn load(source: &LineSource) -> Result<Self> {
        let mut map = Self::new();
        let mut records = source.records()?;
        let mut bad = 0usize;
        while let Some(fields) = records.next() {
            let fields = fields?;
            match (
                fields.get(col::PARENT).parse::<GeoId>(),
                fields.get(col::CHILD).parse::<GeoId>(),
            ) {
                (Ok(parent), Ok(child)) => map.insert(child, parent),
                _ => {
                    bad += 1;
                    warn!(line = records.line_no(), "hierarchy: malformed link ignored");
                }
            }
        }
        info!(links = map.len(), bad, "hierarchy loaded");
        Ok(map)
    }

    pub fn insert(&mut self, child: GeoId, parent: GeoId) {
        let parents = self.parents.entry(child).or_default();
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }

    pub fn parents_of(&self, child: GeoId) -> &[GeoId] {
        self.parents.get(&child).map_or(&[][..], Vec::as_slice)
    }

    /// Number of children with at least one declared parent.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
