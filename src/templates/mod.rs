// mod.rs - Input template formats (custom nuclease rules, modification table)

pub mod cleavage;
pub mod modifications;

use std::fs::create_dir_all;
use std::path::Path;
use crate::data::ChargeTable;

// Re-export main types for convenience
pub use cleavage::{CleavageRule, CleavageRuleSet, NucleotideCode};
pub use modifications::{IncludeMode, ModificationMap, ModificationRow, ModificationTable, PositionOptions};

/// File name of the generated cleavage template
pub const CLEAVAGE_TEMPLATE_FILE: &str = "custom_nuclease.txt";
/// File name of the generated modification template
pub const MODIFICATION_TEMPLATE_FILE: &str = "modifications.txt";
/// File names of the built-in charge tables, written as editable starting points
pub const MS1_CHARGES_FILE: &str = "charges_MS1.txt";
pub const MS2_CHARGES_FILE: &str = "charges_MS2.txt";

/// Write both documented templates and the default charge tables into `dir`
pub fn write_templates(dir: &Path) -> Result<Vec<String>, String> {
    create_dir_all(dir)
        .map_err(|e| format!("Failed to create template directory '{}': {}", dir.display(), e))?;

    let mut written = Vec::new();
    for (name, content) in [
        (CLEAVAGE_TEMPLATE_FILE, cleavage::template_text().to_string()),
        (MODIFICATION_TEMPLATE_FILE, modifications::template_text().to_string()),
        (MS1_CHARGES_FILE, ChargeTable::default_ms1().to_text()),
        (MS2_CHARGES_FILE, ChargeTable::default_ms2().to_text()),
    ] {
        let path = dir.join(name);
        std::fs::write(&path, content)
            .map_err(|e| format!("Failed to write template '{}': {}", path.display(), e))?;
        println!("📝 Template written: {}", path.display());
        written.push(path.display().to_string());
    }
    Ok(written)
}
