//! Part table - name to part descriptor lookup used during derivation
//!
//! The derivation only sees the [`PartTable`] and [`PartInfo`] traits. The
//! bundled [`PartCatalog`] reads a YAML catalog:
//!
//! ```yaml
//! resources:
//!   LiquidFuel: { unit_cost: 0.8, density: 0.005 }
//! parts:
//!   - name: liquidEngine
//!     cost: 1100
//!     mass: 1.25
//!     locked: false
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;

use crate::core::node::CraftNode;

/// Cost and mass of one placed part, split into dry and fuel shares
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartCostMass {
    pub dry_cost: f64,
    pub fuel_cost: f64,
    pub dry_mass: f64,
    pub fuel_mass: f64,
}

/// A matched part descriptor
pub trait PartInfo {
    /// Cost/mass of the part instance described by `part` (a `PART` node)
    fn costs_and_mass(&self, part: &CraftNode) -> PartCostMass;

    /// True while the part's technology has not been researched
    fn is_locked(&self) -> bool;
}

/// Lookup of part descriptors by normalized part name
pub trait PartTable {
    fn find(&self, name: &str) -> Option<&dyn PartInfo>;
}

/// Per-unit pricing and density of a resource
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResourceDef {
    pub unit_cost: f64,
    pub density: f64,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    resources: HashMap<String, ResourceDef>,
    #[serde(default)]
    parts: Vec<CatalogPartDef>,
}

#[derive(Debug, Deserialize)]
struct CatalogPartDef {
    name: String,
    #[serde(default)]
    cost: f64,
    #[serde(default)]
    mass: f64,
    #[serde(default)]
    locked: bool,
}

/// Catalog entry; `cost` is the full-tank list price
#[derive(Debug, Clone)]
pub struct CatalogPart {
    pub name: String,
    pub cost: f64,
    pub mass: f64,
    pub locked: bool,
    resources: Rc<HashMap<String, ResourceDef>>,
}

impl PartInfo for CatalogPart {
    fn costs_and_mass(&self, part: &CraftNode) -> PartCostMass {
        let mut full_cost = 0.0;
        let mut fuel_cost = 0.0;
        let mut fuel_mass = 0.0;

        for resource in part.nodes_named("RESOURCE") {
            let Some(def) = resource
                .get_value("name")
                .and_then(|name| self.resources.get(name))
            else {
                continue;
            };
            let amount = parse_amount(resource.get_value("amount"));
            let max_amount = parse_amount(resource.get_value("maxAmount"));

            full_cost += max_amount * def.unit_cost;
            fuel_cost += amount * def.unit_cost;
            fuel_mass += amount * def.density;
        }

        PartCostMass {
            dry_cost: (self.cost - full_cost).max(0.0),
            fuel_cost: fuel_cost.max(0.0),
            dry_mass: self.mass.max(0.0),
            fuel_mass: fuel_mass.max(0.0),
        }
    }

    fn is_locked(&self) -> bool {
        self.locked
    }
}

fn parse_amount(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Part table backed by a YAML catalog file
#[derive(Debug, Default)]
pub struct PartCatalog {
    parts: HashMap<String, CatalogPart>,
    resources: Rc<HashMap<String, ResourceDef>>,
}

impl PartCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog, or an empty one if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no part catalog at {}, every part will be missing", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read part catalog {}", path.display()))?;
        Self::from_yaml(&content)
            .wrap_err_with(|| format!("invalid part catalog {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        let file: CatalogFile = serde_yml::from_str(content).into_diagnostic()?;

        let mut catalog = Self {
            parts: HashMap::new(),
            resources: Rc::new(file.resources),
        };
        for def in file.parts {
            catalog.insert(def.name, def.cost, def.mass, def.locked);
        }
        log::debug!("part catalog loaded with {} parts", catalog.len());
        Ok(catalog)
    }

    /// Register a resource definition shared by every catalog part
    pub fn with_resource(mut self, name: &str, unit_cost: f64, density: f64) -> Self {
        Rc::make_mut(&mut self.resources).insert(
            name.to_string(),
            ResourceDef { unit_cost, density },
        );
        for part in self.parts.values_mut() {
            part.resources = Rc::clone(&self.resources);
        }
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, cost: f64, mass: f64, locked: bool) {
        let name = name.into();
        self.parts.insert(
            name.clone(),
            CatalogPart {
                name,
                cost,
                mass,
                locked,
                resources: Rc::clone(&self.resources),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl PartTable for PartCatalog {
    fn find(&self, name: &str) -> Option<&dyn PartInfo> {
        self.parts.get(name).map(|p| p as &dyn PartInfo)
    }
}
