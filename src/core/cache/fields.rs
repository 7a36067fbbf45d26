//! Field mapping between [`CraftInfo`] and flat cache entries
//!
//! Every cached field is listed once in [`FIELDS`] with its stable name and a
//! typed accessor. The accessor variant is the field's coercion rule, so a
//! cached string is parsed according to the declaration, never by inspecting
//! the live value.

use thiserror::Error;

use crate::entities::craft::{ConstructionType, CraftInfo};

/// Cached value that could not be turned back into its field type
#[derive(Debug, Error, PartialEq)]
pub enum CoercionError {
    #[error("cached entry has no '{field}' field")]
    Missing { field: &'static str },

    #[error("cached field '{field}' = {value:?} is not a valid {expected}")]
    Invalid {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Typed getter/setter pair; the variant names the coercion applied on fetch
#[derive(Clone, Copy)]
pub enum Accessor {
    Text {
        get: fn(&CraftInfo) -> String,
        set: fn(&mut CraftInfo, String),
    },
    Integer {
        get: fn(&CraftInfo) -> u32,
        set: fn(&mut CraftInfo, u32),
    },
    Float {
        get: fn(&CraftInfo) -> f64,
        set: fn(&mut CraftInfo, f64),
    },
    Boolean {
        get: fn(&CraftInfo) -> bool,
        set: fn(&mut CraftInfo, bool),
    },
    Construction {
        get: fn(&CraftInfo) -> ConstructionType,
        set: fn(&mut CraftInfo, ConstructionType),
    },
}

/// One cached field
#[derive(Clone, Copy)]
pub struct FieldMapping {
    pub name: &'static str,
    pub accessor: Accessor,
}

/// Every derived field persisted in a cache entry
pub const FIELDS: &[FieldMapping] = &[
    FieldMapping {
        name: "name",
        accessor: Accessor::Text {
            get: |c| c.name.clone(),
            set: |c, v| c.name = v,
        },
    },
    FieldMapping {
        name: "alt_name",
        accessor: Accessor::Text {
            get: |c| c.alt_name.clone(),
            set: |c, v| c.alt_name = v,
        },
    },
    FieldMapping {
        name: "description",
        accessor: Accessor::Text {
            get: |c| c.description.clone(),
            set: |c, v| c.description = v,
        },
    },
    FieldMapping {
        name: "construction_type",
        accessor: Accessor::Construction {
            get: |c| c.construction_type,
            set: |c, v| c.construction_type = v,
        },
    },
    FieldMapping {
        name: "missing_parts",
        accessor: Accessor::Boolean {
            get: |c| c.missing_parts,
            set: |c, v| c.missing_parts = v,
        },
    },
    FieldMapping {
        name: "locked_parts",
        accessor: Accessor::Boolean {
            get: |c| c.locked_parts,
            set: |c, v| c.locked_parts = v,
        },
    },
    FieldMapping {
        name: "stage_count",
        accessor: Accessor::Integer {
            get: |c| c.stage_count,
            set: |c, v| c.stage_count = v,
        },
    },
    FieldMapping {
        name: "part_count",
        accessor: Accessor::Integer {
            get: |c| c.part_count,
            set: |c, v| c.part_count = v,
        },
    },
    FieldMapping {
        name: "cost_dry",
        accessor: Accessor::Float {
            get: |c| c.cost.dry,
            set: |c, v| c.cost.dry = v,
        },
    },
    FieldMapping {
        name: "cost_fuel",
        accessor: Accessor::Float {
            get: |c| c.cost.fuel,
            set: |c, v| c.cost.fuel = v,
        },
    },
    FieldMapping {
        name: "cost_total",
        accessor: Accessor::Float {
            get: |c| c.cost.total,
            set: |c, v| c.cost.total = v,
        },
    },
    FieldMapping {
        name: "mass_dry",
        accessor: Accessor::Float {
            get: |c| c.mass.dry,
            set: |c, v| c.mass.dry = v,
        },
    },
    FieldMapping {
        name: "mass_fuel",
        accessor: Accessor::Float {
            get: |c| c.mass.fuel,
            set: |c, v| c.mass.fuel = v,
        },
    },
    FieldMapping {
        name: "mass_total",
        accessor: Accessor::Float {
            get: |c| c.mass.total,
            set: |c, v| c.mass.total = v,
        },
    },
];

impl FieldMapping {
    /// Cached string form of this field
    pub fn read(&self, info: &CraftInfo) -> String {
        match self.accessor {
            Accessor::Text { get, .. } => get(info),
            Accessor::Integer { get, .. } => get(info).to_string(),
            Accessor::Float { get, .. } => get(info).to_string(),
            Accessor::Boolean { get, .. } => get(info).to_string(),
            Accessor::Construction { get, .. } => get(info).to_string(),
        }
    }

    /// Coerce `raw` by this field's rule and store it into `info`
    pub fn apply(&self, info: &mut CraftInfo, raw: &str) -> Result<(), CoercionError> {
        match self.accessor {
            Accessor::Text { set, .. } => set(info, raw.to_string()),
            Accessor::Integer { set, .. } => {
                let value = raw.trim().parse::<u32>().map_err(|_| self.invalid(raw))?;
                set(info, value);
            }
            Accessor::Float { set, .. } => {
                let value = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| self.invalid(raw))?;
                set(info, value);
            }
            Accessor::Boolean { set, .. } => {
                let value = match raw.trim().to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => return Err(self.invalid(raw)),
                };
                set(info, value);
            }
            Accessor::Construction { set, .. } => {
                let value = raw
                    .parse::<ConstructionType>()
                    .map_err(|_| self.invalid(raw))?;
                set(info, value);
            }
        }
        Ok(())
    }

    /// Name of the coercion rule, for diagnostics
    pub fn rule(&self) -> &'static str {
        match self.accessor {
            Accessor::Text { .. } => "text",
            Accessor::Integer { .. } => "integer",
            Accessor::Float { .. } => "number",
            Accessor::Boolean { .. } => "boolean",
            Accessor::Construction { .. } => "construction type",
        }
    }

    fn invalid(&self, raw: &str) -> CoercionError {
        CoercionError::Invalid {
            field: self.name,
            value: raw.to_string(),
            expected: self.rule(),
        }
    }
}
