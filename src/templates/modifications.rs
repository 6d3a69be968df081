// modifications.rs - Modified nucleotide position annotations

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use crate::data::RnaSequenceSet;

/// Column names of the modification template header
pub const HEADER: [&str; 5] = ["Molecule", "Position", "ID", "ID_ext", "Include"];

/// Which variants of an annotated position enter the digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeMode {
    /// 0: only the unmodified nucleotide
    UnmodifiedOnly,
    /// 1: only the modified nucleotide
    ModifiedOnly,
    /// 2: both variants
    Both,
}

impl IncludeMode {
    pub fn includes_unmodified(&self) -> bool {
        matches!(self, Self::UnmodifiedOnly | Self::Both)
    }

    pub fn includes_modified(&self) -> bool {
        matches!(self, Self::ModifiedOnly | Self::Both)
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::UnmodifiedOnly => 0,
            Self::ModifiedOnly => 1,
            Self::Both => 2,
        }
    }
}

impl FromStr for IncludeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Self::UnmodifiedOnly),
            "1" => Ok(Self::ModifiedOnly),
            "2" => Ok(Self::Both),
            other => Err(format!("Include must be 0, 1 or 2 (found '{}')", other)),
        }
    }
}

impl fmt::Display for IncludeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One data row of the modification template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationRow {
    pub molecule: String,
    /// 1-based nucleotide index
    pub position: usize,
    pub id: char,
    pub id_ext: String,
    pub include: IncludeMode,
}

impl ModificationRow {
    fn parse(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != HEADER.len() {
            return Err(format!(
                "expected {} fields ({}), found {}",
                HEADER.len(),
                HEADER.join(" "),
                fields.len()
            ));
        }

        let position = fields[1]
            .parse::<usize>()
            .map_err(|_| format!("Position '{}' is not a positive integer", fields[1]))?;
        if position == 0 {
            return Err("Position is 1-based and cannot be 0".to_string());
        }

        let mut id_chars = fields[2].chars();
        let id = match (id_chars.next(), id_chars.next()) {
            (Some(c), None) => c,
            _ => return Err(format!("ID '{}' must be a single character", fields[2])),
        };

        Ok(Self {
            molecule: fields[0].to_string(),
            position,
            id,
            id_ext: fields[3].to_string(),
            include: fields[4].parse()?,
        })
    }
}

/// Parsed modification template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModificationTable {
    pub rows: Vec<ModificationRow>,
}

impl ModificationTable {
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut rows = Vec::new();
        let mut header_seen = false;

        for (line_num, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if !header_seen {
                let columns: Vec<&str> = trimmed.split_whitespace().collect();
                if columns != HEADER {
                    return Err(format!(
                        "Modification template line {}: expected header '{}', found '{}'",
                        line_num + 1,
                        HEADER.join(" "),
                        trimmed
                    ));
                }
                header_seen = true;
                continue;
            }

            let row = ModificationRow::parse(trimmed)
                .map_err(|e| format!("Modification template line {}: {}", line_num + 1, e))?;
            rows.push(row);
        }

        if !header_seen {
            return Err(format!(
                "Modification template has no header line '{}'",
                HEADER.join(" ")
            ));
        }
        Ok(Self { rows })
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read modification template '{}': {}", path.display(), e))?;
        let table = Self::parse(&content).map_err(|e| format!("{}: {}", path.display(), e))?;
        println!("🧪 Modification template loaded: {} ({} positions)", path.display(), table.rows.len());
        Ok(table)
    }

    /// ID -> ID_ext pairs declared by the table; conflicting labels are an error
    pub fn ext_map(&self) -> Result<BTreeMap<char, String>, String> {
        let mut map: BTreeMap<char, String> = BTreeMap::new();
        for row in &self.rows {
            if let Some(existing) = map.get(&row.id) {
                if existing != &row.id_ext {
                    return Err(format!(
                        "Modification ID '{}' is labelled both {} and {}",
                        row.id, existing, row.id_ext
                    ));
                }
            } else {
                map.insert(row.id, row.id_ext.clone());
            }
        }
        Ok(map)
    }

    /// Bind rows to sequence records. Rows naming no known molecule are dropped with a warning.
    pub fn resolve(&self, sequences: &RnaSequenceSet) -> Result<ModificationMap, String> {
        let mut by_molecule: HashMap<String, BTreeMap<usize, Vec<ModificationRow>>> = HashMap::new();
        let mut skipped = 0;

        for row in &self.rows {
            let record = match sequences.find(&row.molecule)? {
                Some(record) => record,
                None => {
                    eprintln!(
                        "⚠️  WARNING: molecule '{}' of the modification template matches no FASTA record, row skipped",
                        row.molecule
                    );
                    skipped += 1;
                    continue;
                }
            };

            if row.position > record.len() {
                return Err(format!(
                    "Modification {} at position {} is beyond the end of {} ({} nt)",
                    row.id_ext,
                    row.position,
                    record.id,
                    record.len()
                ));
            }

            by_molecule
                .entry(record.id.clone())
                .or_default()
                .entry(row.position)
                .or_default()
                .push(row.clone());
        }

        if skipped > 0 {
            println!("⚠️  {} modification rows skipped", skipped);
        }
        Ok(ModificationMap { by_molecule })
    }
}

/// Residue alternatives for a position: `None` is the unmodified nucleotide
pub type PositionOptions = Vec<Option<char>>;

/// Modification rows grouped by molecule and 1-based position
#[derive(Debug, Clone, Default)]
pub struct ModificationMap {
    by_molecule: HashMap<String, BTreeMap<usize, Vec<ModificationRow>>>,
}

impl ModificationMap {
    pub fn is_empty(&self) -> bool {
        self.by_molecule.is_empty()
    }

    /// Annotated positions of a molecule within `start..=end` (1-based)
    pub fn positions_in(&self, molecule: &str, start: usize, end: usize) -> Vec<usize> {
        self.by_molecule
            .get(molecule)
            .map(|positions| positions.range(start..=end).map(|(p, _)| *p).collect())
            .unwrap_or_default()
    }

    /// Alternatives for one position. Unannotated positions only offer the unmodified residue.
    pub fn options_at(&self, molecule: &str, position: usize) -> PositionOptions {
        let rows = match self.by_molecule.get(molecule).and_then(|p| p.get(&position)) {
            Some(rows) => rows,
            None => return vec![None],
        };

        let mut options = Vec::new();
        if rows.iter().any(|r| r.include.includes_unmodified()) {
            options.push(None);
        }
        for row in rows.iter().filter(|r| r.include.includes_modified()) {
            if !options.contains(&Some(row.id)) {
                options.push(Some(row.id));
            }
        }
        options
    }

    /// Every modification ID that may appear in a digest
    pub fn modified_ids(&self) -> Vec<char> {
        let mut ids: Vec<char> = self
            .by_molecule
            .values()
            .flat_map(|positions| positions.values())
            .flatten()
            .filter(|r| r.include.includes_modified())
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Documented modification template, written by `--generate-templates`
pub fn template_text() -> &'static str {
    r#"# Modified nucleotide template
#
# Lines starting with '#' are comments. The first other line is the header
#   Molecule Position ID ID_ext Include
# followed by one row per modified position, fields separated by spaces:
#   Molecule  sequence identifier, the FASTA header (without '>') or its prefix
#   Position  1-based index of the nucleotide in the sequence
#   ID        one-letter code of the modified nucleotide (as in the alphabet)
#   ID_ext    bracketed name of the modification, e.g. [m1A]
#   Include   0 = digest only the unmodified nucleotide
#             1 = digest only the modified nucleotide
#             2 = digest both variants
Molecule Position ID ID_ext Include
tRNA-Phe 37 W [yW] 1
tRNA-Phe 58 B [m1A] 2
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RnaRecord, RnaSequenceSet};

    fn sequences() -> RnaSequenceSet {
        RnaSequenceSet::from_records(vec![
            RnaRecord::new("tRNA-Phe", "yeast", b"GCGGAUUUAGCUCAG"),
            RnaRecord::new("5S", "", b"ACGU"),
        ])
        .unwrap()
    }

    #[test]
    fn test_include_mode() {
        assert_eq!("0".parse::<IncludeMode>().unwrap(), IncludeMode::UnmodifiedOnly);
        assert_eq!("1".parse::<IncludeMode>().unwrap(), IncludeMode::ModifiedOnly);
        assert_eq!("2".parse::<IncludeMode>().unwrap(), IncludeMode::Both);
        assert!("3".parse::<IncludeMode>().is_err());
        assert!(IncludeMode::Both.includes_modified() && IncludeMode::Both.includes_unmodified());
        assert!(!IncludeMode::ModifiedOnly.includes_unmodified());
    }

    #[test]
    fn test_parse_template() {
        let table = ModificationTable::parse(template_text()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].molecule, "tRNA-Phe");
        assert_eq!(table.rows[0].position, 37);
        assert_eq!(table.rows[0].id, 'W');
        assert_eq!(table.rows[0].id_ext, "[yW]");
        assert_eq!(table.rows[1].include, IncludeMode::Both);
    }

    #[test]
    fn test_parse_errors() {
        assert!(ModificationTable::parse("tRNA 3 B [m1A] 1\n").is_err());
        assert!(ModificationTable::parse("# nothing\n").is_err());

        let header = "Molecule Position ID ID_ext Include\n";
        let bad_rows = [
            "tRNA 0 B [m1A] 1",
            "tRNA x B [m1A] 1",
            "tRNA 3 BB [m1A] 1",
            "tRNA 3 B [m1A] 5",
            "tRNA 3 B [m1A]",
        ];
        for row in bad_rows {
            let err = ModificationTable::parse(&format!("{}{}\n", header, row)).unwrap_err();
            assert!(err.contains("line 2"), "{}: {}", row, err);
        }

        // Header-only table is valid and empty
        assert!(ModificationTable::parse(header).unwrap().rows.is_empty());
    }

    #[test]
    fn test_resolve_and_options() {
        let table = ModificationTable::parse(
            "Molecule Position ID ID_ext Include\n\
             tRNA-Phe 5 B [m1A] 1\n\
             tRNA-Phe 9 B [m1A] 2\n\
             tRNA-Phe 12 D [D] 0\n\
             unknown 1 B [m1A] 1\n",
        )
        .unwrap();

        let map = table.resolve(&sequences()).unwrap();
        assert_eq!(map.options_at("tRNA-Phe", 5), vec![Some('B')]);
        assert_eq!(map.options_at("tRNA-Phe", 9), vec![None, Some('B')]);
        assert_eq!(map.options_at("tRNA-Phe", 12), vec![None]);
        assert_eq!(map.options_at("tRNA-Phe", 1), vec![None]);
        assert_eq!(map.positions_in("tRNA-Phe", 1, 9), vec![5, 9]);
        assert_eq!(map.modified_ids(), vec!['B']);
    }

    #[test]
    fn test_alternatives_on_one_position() {
        let table = ModificationTable::parse(
            "Molecule Position ID ID_ext Include\n5S 2 B [m5C] 1\n5S 2 E [ac4C] 2\n",
        )
        .unwrap();
        let map = table.resolve(&sequences()).unwrap();
        assert_eq!(map.options_at("5S", 2), vec![None, Some('B'), Some('E')]);
    }

    #[test]
    fn test_position_beyond_molecule() {
        let table = ModificationTable::parse("Molecule Position ID ID_ext Include\n5S 5 B [m1A] 1\n").unwrap();
        assert!(table.resolve(&sequences()).is_err());
    }

    #[test]
    fn test_header_prefix_match() {
        let table = ModificationTable::parse("Molecule Position ID ID_ext Include\ntRNA 2 B [m1A] 1\n").unwrap();
        let map = table.resolve(&sequences()).unwrap();
        assert_eq!(map.options_at("tRNA-Phe", 2), vec![Some('B')]);

        // Two tRNAs share the prefix: the row cannot be placed
        let two_trnas = RnaSequenceSet::from_records(vec![
            RnaRecord::new("tRNA-Phe", "", b"GCGGAUUUAG"),
            RnaRecord::new("tRNA-Leu", "", b"GCCGAUUUAG"),
        ])
        .unwrap();
        let err = table.resolve(&two_trnas).unwrap_err();
        assert!(err.contains("ambiguous"));
    }

    #[test]
    fn test_ext_map_conflict() {
        let table = ModificationTable::parse(
            "Molecule Position ID ID_ext Include\n5S 1 B [m1A] 1\n5S 2 B [m5C] 1\n",
        )
        .unwrap();
        assert!(table.ext_map().is_err());
    }
}
