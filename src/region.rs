//! Administrative region hierarchy and the flattened location index
//!
//! The asset is a tree rooted at the country: provinces, then cities, then
//! (optionally) districts. Every leaf carries a center coordinate. The index
//! flattens that tree into the lookups the birth-place selectors need.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{NatalError, Result};

/// Separator between region names in a location key
pub const KEY_SEPARATOR: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Center {
    pub longitude: f64,
    pub latitude: f64,
}

/// One node of the region tree
#[derive(Debug, Clone, Deserialize)]
pub struct RegionNode {
    pub name: String,
    pub districts: Vec<RegionNode>,
    #[serde(default)]
    pub center: Option<Center>,
}

impl RegionNode {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            NatalError::RegionData(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn is_leaf(&self) -> bool {
        self.districts.is_empty()
    }
}

/// Join a root-to-leaf trace of names into a location key
pub fn location_key<S: AsRef<str>>(trace: &[S]) -> String {
    trace
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

/// Flattened lookups over a region tree
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    /// Location key -> (longitude, latitude)
    locations: HashMap<String, (f64, f64)>,

    /// Province names in source order
    provinces: Vec<String>,

    /// Province -> city names
    province_cities: HashMap<String, Vec<String>>,

    /// City -> district names (empty when the city is a leaf)
    city_districts: HashMap<String, Vec<String>>,
}

impl LocationIndex {
    /// Load the asset and build the index; any malformed node aborts
    pub fn load(path: &Path) -> Result<Self> {
        let root = RegionNode::from_path(path)?;
        let index = Self::build(&root)?;
        tracing::info!(
            "Loaded {} locations across {} provinces from {}",
            index.len(),
            index.provinces.len(),
            path.display()
        );
        Ok(index)
    }

    pub fn build(root: &RegionNode) -> Result<Self> {
        let mut index = Self::default();
        index.collect_leaves(root, &[])?;

        for province in &root.districts {
            index.provinces.push(province.name.clone());
            index.province_cities.insert(
                province.name.clone(),
                province.districts.iter().map(|c| c.name.clone()).collect(),
            );

            for city in &province.districts {
                index.city_districts.insert(
                    city.name.clone(),
                    city.districts.iter().map(|d| d.name.clone()).collect(),
                );
            }
        }

        Ok(index)
    }

    /// Depth-first pre-order; each child gets its own copy of the trace
    fn collect_leaves(&mut self, node: &RegionNode, trace: &[&str]) -> Result<()> {
        if node.is_leaf() {
            let center = node.center.ok_or_else(|| {
                NatalError::RegionData(format!(
                    "leaf '{}' has no center coordinate",
                    location_key(trace)
                ))
            })?;
            self.locations
                .insert(location_key(trace), (center.longitude, center.latitude));
            return Ok(());
        }

        for child in &node.districts {
            let child_trace = [trace, &[child.name.as_str()]].concat();
            self.collect_leaves(child, &child_trace)?;
        }
        Ok(())
    }

    pub fn provinces(&self) -> &[String] {
        &self.provinces
    }

    pub fn cities(&self, province: &str) -> &[String] {
        self.province_cities
            .get(province)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn districts(&self, city: &str) -> &[String] {
        self.city_districts
            .get(city)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// (longitude, latitude) for a selection; the district is part of the key only when chosen
    pub fn coordinate(&self, province: &str, city: &str, district: Option<&str>) -> Option<(f64, f64)> {
        let key = match district {
            Some(district) => location_key(&[province, city, district]),
            None => location_key(&[province, city]),
        };
        self.locations.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
