// alphabet.rs - Nucleotide alphabet with elemental compositions

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use serde::Deserialize;
use super::elements::ElementalComposition;

/// A single nucleotide (standard or modified) of the alphabet
#[derive(Debug, Clone, PartialEq)]
pub struct NucleotideEntry {
    pub id: char,
    pub id_ext: String,
    pub base: ElementalComposition,
    pub backbone: ElementalComposition,
}

impl NucleotideEntry {
    /// Mass of the base only (used for free base ions and base losses)
    pub fn base_mass(&self) -> f64 {
        self.base.mass()
    }

    /// Mass of the residue within a chain (base + backbone)
    pub fn nucleotide_mass(&self) -> f64 {
        self.base.mass() + self.backbone.mass()
    }
}

/// One row of the alphabet CSV file. Empty cells count as zero atoms.
#[derive(Debug, Deserialize)]
struct AlphabetRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "ID_ext")]
    id_ext: String,
    #[serde(rename = "base_C", default)]
    base_c: Option<f64>,
    #[serde(rename = "base_H", default)]
    base_h: Option<f64>,
    #[serde(rename = "base_N", default)]
    base_n: Option<f64>,
    #[serde(rename = "base_O", default)]
    base_o: Option<f64>,
    #[serde(rename = "base_S", default)]
    base_s: Option<f64>,
    #[serde(rename = "base_P", default)]
    base_p: Option<f64>,
    #[serde(rename = "base_Se", default)]
    base_se: Option<f64>,
    #[serde(rename = "base_F", default)]
    base_f: Option<f64>,
    #[serde(rename = "base_H2", default)]
    base_h2: Option<f64>,
    #[serde(rename = "base_C13", default)]
    base_c13: Option<f64>,
    #[serde(rename = "base_N15", default)]
    base_n15: Option<f64>,
    #[serde(rename = "base_O18", default)]
    base_o18: Option<f64>,
    #[serde(rename = "backbone_C", default)]
    backbone_c: Option<f64>,
    #[serde(rename = "backbone_H", default)]
    backbone_h: Option<f64>,
    #[serde(rename = "backbone_N", default)]
    backbone_n: Option<f64>,
    #[serde(rename = "backbone_O", default)]
    backbone_o: Option<f64>,
    #[serde(rename = "backbone_S", default)]
    backbone_s: Option<f64>,
    #[serde(rename = "backbone_P", default)]
    backbone_p: Option<f64>,
    #[serde(rename = "backbone_Se", default)]
    backbone_se: Option<f64>,
    #[serde(rename = "backbone_F", default)]
    backbone_f: Option<f64>,
    #[serde(rename = "backbone_H2", default)]
    backbone_h2: Option<f64>,
    #[serde(rename = "backbone_C13", default)]
    backbone_c13: Option<f64>,
    #[serde(rename = "backbone_N15", default)]
    backbone_n15: Option<f64>,
    #[serde(rename = "backbone_O18", default)]
    backbone_o18: Option<f64>,
}

impl AlphabetRow {
    fn into_entry(self) -> Result<NucleotideEntry, String> {
        let id_str = self.id.trim();
        let mut chars = id_str.chars();
        let id = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(format!("ID '{}' must be a single character", id_str)),
        };

        let base = ElementalComposition {
            c: self.base_c.unwrap_or(0.0),
            h: self.base_h.unwrap_or(0.0),
            n: self.base_n.unwrap_or(0.0),
            o: self.base_o.unwrap_or(0.0),
            s: self.base_s.unwrap_or(0.0),
            p: self.base_p.unwrap_or(0.0),
            se: self.base_se.unwrap_or(0.0),
            f: self.base_f.unwrap_or(0.0),
            h2: self.base_h2.unwrap_or(0.0),
            c13: self.base_c13.unwrap_or(0.0),
            n15: self.base_n15.unwrap_or(0.0),
            o18: self.base_o18.unwrap_or(0.0),
        };
        let backbone = ElementalComposition {
            c: self.backbone_c.unwrap_or(0.0),
            h: self.backbone_h.unwrap_or(0.0),
            n: self.backbone_n.unwrap_or(0.0),
            o: self.backbone_o.unwrap_or(0.0),
            s: self.backbone_s.unwrap_or(0.0),
            p: self.backbone_p.unwrap_or(0.0),
            se: self.backbone_se.unwrap_or(0.0),
            f: self.backbone_f.unwrap_or(0.0),
            h2: self.backbone_h2.unwrap_or(0.0),
            c13: self.backbone_c13.unwrap_or(0.0),
            n15: self.backbone_n15.unwrap_or(0.0),
            o18: self.backbone_o18.unwrap_or(0.0),
        };

        Ok(NucleotideEntry {
            id,
            id_ext: self.id_ext.trim().to_string(),
            base,
            backbone,
        })
    }
}

/// Alphabet of nucleotides with precomputed masses
#[derive(Debug, Clone)]
pub struct NucleotideAlphabet {
    pub name: String,
    entries: Vec<NucleotideEntry>,
    index: HashMap<char, usize>,
}

impl NucleotideAlphabet {
    /// Build an alphabet from entries, rejecting duplicate IDs
    pub fn from_entries(name: &str, entries: Vec<NucleotideEntry>) -> Result<Self, String> {
        let mut index = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.id, i).is_some() {
                return Err(format!("Duplicate nucleotide ID '{}' in alphabet {}", entry.id, name));
            }
        }
        Ok(Self {
            name: name.to_string(),
            entries,
            index,
        })
    }

    /// The four standard ribonucleotides as residues within a chain
    pub fn standard() -> Self {
        let backbone = ElementalComposition::chnop(5.0, 8.0, 0.0, 6.0, 1.0);
        let entries = vec![
            NucleotideEntry {
                id: 'A',
                id_ext: "A".to_string(),
                base: ElementalComposition::chnop(5.0, 4.0, 5.0, 0.0, 0.0),
                backbone,
            },
            NucleotideEntry {
                id: 'C',
                id_ext: "C".to_string(),
                base: ElementalComposition::chnop(4.0, 4.0, 3.0, 1.0, 0.0),
                backbone,
            },
            NucleotideEntry {
                id: 'G',
                id_ext: "G".to_string(),
                base: ElementalComposition::chnop(5.0, 4.0, 5.0, 1.0, 0.0),
                backbone,
            },
            NucleotideEntry {
                id: 'U',
                id_ext: "U".to_string(),
                base: ElementalComposition::chnop(4.0, 3.0, 2.0, 2.0, 0.0),
                backbone,
            },
        ];
        Self::from_entries("standard", entries).expect("standard alphabet has unique IDs")
    }

    /// Load an alphabet from a CSV file (`#` lines are comments)
    pub fn from_csv(path: &Path) -> Result<Self, String> {
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| format!("Failed to open alphabet file '{}': {}", path.display(), e))?;

        let mut entries = Vec::new();
        for (row_num, result) in reader.deserialize::<AlphabetRow>().enumerate() {
            let row = result.map_err(|e| {
                format!("Invalid alphabet row {} in '{}': {}", row_num + 1, path.display(), e)
            })?;
            if row.id.trim().is_empty() {
                continue;
            }
            let entry = row.into_entry().map_err(|e| {
                format!("Invalid alphabet row {} in '{}': {}", row_num + 1, path.display(), e)
            })?;
            entries.push(entry);
        }

        if entries.is_empty() {
            return Err(format!("Alphabet file '{}' contains no nucleotides", path.display()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let alphabet = Self::from_entries(&name, entries)?;
        println!("⚗️  Alphabet {} loaded: {} nucleotides", alphabet.name, alphabet.len());
        Ok(alphabet)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[NucleotideEntry] {
        &self.entries
    }

    pub fn get(&self, id: char) -> Option<&NucleotideEntry> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: char) -> bool {
        self.index.contains_key(&id)
    }

    /// Residue mass of a nucleotide within a chain
    pub fn nucleotide_mass(&self, id: char) -> Result<f64, String> {
        self.get(id)
            .map(|e| e.nucleotide_mass())
            .ok_or_else(|| format!("Nucleotide '{}' is not part of alphabet {}", id, self.name))
    }

    /// Mass of the base of a nucleotide
    pub fn base_mass(&self, id: char) -> Result<f64, String> {
        self.get(id)
            .map(|e| e.base_mass())
            .ok_or_else(|| format!("Nucleotide '{}' is not part of alphabet {}", id, self.name))
    }

    /// Extended name of a nucleotide
    pub fn ext(&self, id: char) -> Option<&str> {
        self.get(id).map(|e| e.id_ext.as_str())
    }

    /// ID -> ID_ext map, used to compare alphabets
    pub fn ext_map(&self) -> BTreeMap<char, String> {
        self.entries
            .iter()
            .map(|e| (e.id, e.id_ext.clone()))
            .collect()
    }

    /// Pairs of nucleotides whose masses differ by less than `threshold_da`
    pub fn close_mass_pairs(&self, threshold_da: f64) -> Vec<(char, char, f64)> {
        let mut pairs = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                let diff = (a.nucleotide_mass() - b.nucleotide_mass()).abs();
                if diff < threshold_da {
                    pairs.push((a.id, b.id, diff));
                }
            }
        }
        pairs
    }
}

/// Differences between two ID -> ID_ext maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlphabetDiff {
    /// IDs present in `other` only
    pub added: BTreeSet<char>,
    /// IDs present in `reference` only
    pub removed: BTreeSet<char>,
    /// IDs in both with a different ID_ext
    pub changed: BTreeSet<char>,
}

impl AlphabetDiff {
    pub fn between(reference: &BTreeMap<char, String>, other: &BTreeMap<char, String>) -> Self {
        let mut diff = Self::default();
        for (id, ext) in other {
            match reference.get(id) {
                None => {
                    diff.added.insert(*id);
                }
                Some(ref_ext) if ref_ext != ext => {
                    diff.changed.insert(*id);
                }
                Some(_) => {}
            }
        }
        for id in reference.keys() {
            if !other.contains_key(id) {
                diff.removed.insert(*id);
            }
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Print one warning line per kind of difference
    pub fn report(&self, reference_name: &str, other_name: &str) {
        let fmt = |set: &BTreeSet<char>| set.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ");
        if !self.changed.is_empty() {
            eprintln!(
                "⚠️  WARNING: IDs with a different ID_ext in {} compared to {}: {}",
                other_name, reference_name, fmt(&self.changed)
            );
        }
        if !self.added.is_empty() {
            eprintln!(
                "⚠️  WARNING: IDs in {} missing from {}: {}",
                other_name, reference_name, fmt(&self.added)
            );
        }
        if !self.removed.is_empty() {
            eprintln!(
                "⚠️  WARNING: IDs in {} absent from {}: {}",
                reference_name, other_name, fmt(&self.removed)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_standard_masses() {
        let alphabet = NucleotideAlphabet::standard();
        assert_eq!(alphabet.len(), 4);

        // Residue masses of AMP, CMP, GMP and UMP within a chain
        assert!((alphabet.nucleotide_mass('A').unwrap() - 329.05252).abs() < 1e-4);
        assert!((alphabet.nucleotide_mass('C').unwrap() - 305.04129).abs() < 1e-4);
        assert!((alphabet.nucleotide_mass('G').unwrap() - 345.04743).abs() < 1e-4);
        assert!((alphabet.nucleotide_mass('U').unwrap() - 306.02530).abs() < 1e-4);

        assert!((alphabet.base_mass('U').unwrap() - 111.01945).abs() < 1e-4);
        assert!(alphabet.nucleotide_mass('X').is_err());
    }

    #[test]
    fn test_close_mass_pairs() {
        let alphabet = NucleotideAlphabet::standard();
        // C and U differ by ~0.984 Da
        assert!(alphabet.close_mass_pairs(0.5).is_empty());
        let pairs = alphabet.close_mass_pairs(1.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].0, pairs[0].1), ('C', 'U'));
    }

    #[test]
    fn test_from_csv() {
        let path = std::env::temp_dir().join("rnadigest_alphabet_test.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# light alphabet").unwrap();
        writeln!(
            file,
            "ID,ID_ext,base_C,base_H,base_N,base_O,base_P,backbone_C,backbone_H,backbone_N,backbone_O,backbone_P"
        )
        .unwrap();
        writeln!(file, "A,A,5,4,5,0,0,5,8,0,6,1").unwrap();
        writeln!(file, "U,U,4,3,2,2,,5,8,,6,1").unwrap();
        writeln!(file, "B,[m1A],6,6,5,0,0,5,8,0,6,1").unwrap();
        drop(file);

        let alphabet = NucleotideAlphabet::from_csv(&path).unwrap();
        assert_eq!(alphabet.len(), 3);
        assert_eq!(alphabet.ext('B'), Some("[m1A]"));

        // m1A is A + CH2
        let delta = alphabet.nucleotide_mass('B').unwrap() - alphabet.nucleotide_mass('A').unwrap();
        assert!((delta - 14.01565).abs() < 1e-4);
        assert!((alphabet.nucleotide_mass('U').unwrap() - 306.02530).abs() < 1e-4);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let standard = NucleotideAlphabet::standard();
        let mut entries = standard.entries().to_vec();
        entries.push(entries[0].clone());
        assert!(NucleotideAlphabet::from_entries("dup", entries).is_err());
    }

    #[test]
    fn test_alphabet_diff() {
        let reference: BTreeMap<char, String> =
            [('A', "A"), ('C', "C"), ('B', "[m1A]")].iter().map(|(k, v)| (*k, v.to_string())).collect();
        let other: BTreeMap<char, String> =
            [('A', "A"), ('B', "[m6A]"), ('D', "[D]")].iter().map(|(k, v)| (*k, v.to_string())).collect();

        let diff = AlphabetDiff::between(&reference, &other);
        assert_eq!(diff.added.iter().copied().collect::<Vec<_>>(), vec!['D']);
        assert_eq!(diff.removed.iter().copied().collect::<Vec<_>>(), vec!['C']);
        assert_eq!(diff.changed.iter().copied().collect::<Vec<_>>(), vec!['B']);
        assert!(!diff.is_empty());
        assert!(AlphabetDiff::between(&reference, &reference).is_empty());
    }
}
