//! Derivation of craft metadata from raw file content
//!
//! Pure: the same content and part table always produce the same
//! [`CraftInfo`]. The cache is never consulted here.

use crate::core::node::{CraftNode, NodeSyntaxError};
use crate::core::parts::PartTable;
use crate::entities::craft::{ConstructionType, CraftInfo};

/// Parse `content` and compute every derived field except `name`
///
/// `source_name` labels syntax diagnostics. `name` comes from the file path and
/// is left empty for the caller to fill in.
pub fn derive(
    content: &str,
    source_name: &str,
    parts: &dyn PartTable,
) -> Result<CraftInfo, NodeSyntaxError> {
    let root = CraftNode::parse(content, source_name)?;
    Ok(derive_from_node(&root, parts))
}

/// Compute derived fields from an already parsed craft
pub fn derive_from_node(root: &CraftNode, parts: &dyn PartTable) -> CraftInfo {
    let mut info = CraftInfo {
        alt_name: root.get_value("ship").unwrap_or_default().to_string(),
        description: root.get_value("description").unwrap_or_default().to_string(),
        construction_type: ConstructionType::from_craft_type(root.get_value("type")),
        ..CraftInfo::default()
    };

    let mut max_stage: i64 = 0;
    let mut part_count: u32 = 0;

    for part in root.nodes_named("PART") {
        part_count += 1;

        if let Some(stage) = part.get_value("istg").and_then(|s| s.trim().parse::<i64>().ok()) {
            max_stage = max_stage.max(stage);
        }

        match parts.find(&part_name(part)) {
            Some(matched) => {
                let split = matched.costs_and_mass(part);
                info.cost.add(split.dry_cost, split.fuel_cost);
                info.mass.add(split.dry_mass, split.fuel_mass);
                if matched.is_locked() {
                    info.locked_parts = true;
                }
            }
            None => info.missing_parts = true,
        }
    }

    info.part_count = part_count;
    // Stage indices are 0-based, so the count is one past the highest index,
    // even for a craft with no staged parts.
    info.stage_count = u32::try_from(max_stage.saturating_add(1)).unwrap_or(u32::MAX);
    info
}

/// Part name with any `_<suffix>` version tag removed
fn part_name(part: &CraftNode) -> String {
    part.get_value("part")
        .and_then(|name| name.split('_').next())
        .unwrap_or_default()
        .trim()
        .to_string()
}
