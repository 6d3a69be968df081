// mod.rs - Mapping of identified targets back onto the RNA sequences

use std::collections::BTreeMap;
use std::path::Path;
use crate::data::{ReportEntry, RnaSequenceSet};

/// Unmodified ribonucleotides, left out of the mapping when only modified residues are requested
pub const STANDARD_NUCLEOTIDES: [char; 4] = ['A', 'C', 'G', 'U'];

#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    /// Shorter targets are ignored
    pub min_length: usize,
    /// Targets scoring below are ignored
    pub sp_cutoff: f64,
    /// Skip A, C, G and U
    pub modified_only: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            sp_cutoff: 0.0,
            modified_only: false,
        }
    }
}

/// A target covering a residue
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueMatch {
    pub sequence: String,
    pub isotope: String,
    pub sp: f64,
    pub rt: String,
    /// The residue is the last one of the target
    pub terminal: bool,
    /// Residue of the target at this position
    pub residue: char,
}

impl ResidueMatch {
    /// `isotope_enz_Sp_RT_sequence_[@]_residue`, `@` marking the last residue of the target
    pub fn field(&self) -> String {
        // Debug keeps the decimal point of whole scores, e.g. `1.0`
        format!(
            "{}_enz_{:?}_{}_{}_{}_{}",
            self.isotope,
            self.sp,
            self.rt,
            self.sequence,
            if self.terminal { "@" } else { "" },
            self.residue
        )
    }
}

/// One residue number of a molecule with every target covering it
#[derive(Debug, Clone, PartialEq)]
pub struct MappedResidue {
    pub molecule: String,
    /// 1-based residue number
    pub nres: usize,
    /// Residue listed first when several targets disagree on the position
    pub residue: char,
    pub ext: String,
    pub matches: Vec<ResidueMatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    pub molecule: String,
    pub length: usize,
    pub covered: usize,
}

impl Coverage {
    pub fn fraction(&self) -> f64 {
        if self.length == 0 {
            0.0
        } else {
            self.covered as f64 / self.length as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingResult {
    pub residues: Vec<MappedResidue>,
    pub coverage: Vec<Coverage>,
}

/// Map every accepted target of a report onto the sequences
pub fn map_report(
    entries: &[ReportEntry],
    sequences: &RnaSequenceSet,
    exts: &BTreeMap<char, String>,
    config: &MappingConfig,
) -> Result<MappingResult, String> {
    let mut accepted: Vec<&ReportEntry> = entries
        .iter()
        .filter(|e| !e.is_decoy())
        .filter(|e| e.sequence.chars().count() >= config.min_length && e.sp >= config.sp_cutoff)
        .collect();

    // Longest targets first, best score first among equal lengths
    accepted.sort_by(|a, b| {
        b.sequence
            .chars()
            .count()
            .cmp(&a.sequence.chars().count())
            .then(b.sp.total_cmp(&a.sp))
    });

    let mut by_residue: BTreeMap<(String, usize, char), Vec<ResidueMatch>> = BTreeMap::new();
    let mut covered: BTreeMap<String, Vec<bool>> = sequences
        .records
        .iter()
        .map(|r| (r.id.clone(), vec![false; r.len()]))
        .collect();

    for entry in accepted {
        let length = entry.sequence.chars().count();
        for location in entry.locations()? {
            if location.end - location.start + 1 != length {
                return Err(format!(
                    "Target {} has {} residues but location {} spans {}",
                    entry.sequence,
                    length,
                    location,
                    location.end - location.start + 1
                ));
            }
            let record = match sequences.find(&location.molecule)? {
                Some(record) => record,
                None => {
                    eprintln!(
                        "⚠️  WARNING: molecule '{}' of target {} is not in the sequences, skipped",
                        location.molecule, entry.sequence
                    );
                    continue;
                }
            };
            if location.end > record.len() {
                return Err(format!(
                    "Location {} of target {} is beyond the end of {} ({} nt)",
                    location,
                    entry.sequence,
                    record.id,
                    record.len()
                ));
            }

            if let Some(flags) = covered.get_mut(&record.id) {
                flags[location.start - 1..location.end]
                    .iter_mut()
                    .for_each(|f| *f = true);
            }

            for (offset, residue) in entry.sequence.chars().enumerate() {
                if config.modified_only && STANDARD_NUCLEOTIDES.contains(&residue) {
                    continue;
                }
                let nres = location.start + offset;
                by_residue
                    .entry((record.id.clone(), nres, residue))
                    .or_default()
                    .push(ResidueMatch {
                        sequence: entry.sequence.clone(),
                        isotope: entry.isotope.clone(),
                        sp: entry.sp,
                        rt: entry.rt.clone(),
                        terminal: nres == location.end,
                        residue,
                    });
            }
        }
    }

    // Residues seen on the same position (unmodified and modified) share one row, ordered by ID_ext
    let mut by_position: BTreeMap<(String, usize), Vec<(String, char, Vec<ResidueMatch>)>> = BTreeMap::new();
    for ((molecule, nres, residue), matches) in by_residue {
        let ext = exts.get(&residue).cloned().unwrap_or_else(|| residue.to_string());
        by_position
            .entry((molecule, nres))
            .or_default()
            .push((ext, residue, matches));
    }

    let residues = by_position
        .into_iter()
        .filter_map(|((molecule, nres), mut variants)| {
            variants.sort_by(|a, b| a.0.cmp(&b.0));
            let (ext, residue) = variants.first().map(|(e, r, _)| (e.clone(), *r))?;
            Some(MappedResidue {
                molecule,
                nres,
                residue,
                ext,
                matches: variants.into_iter().flat_map(|(_, _, m)| m).collect(),
            })
        })
        .collect();

    let coverage = sequences
        .records
        .iter()
        .map(|r| Coverage {
            molecule: r.id.clone(),
            length: r.len(),
            covered: covered.get(&r.id).map(|f| f.iter().filter(|&&c| c).count()).unwrap_or(0),
        })
        .collect();

    Ok(MappingResult { residues, coverage })
}

/// Write `molecule,nres,mod,mod_ext,matches...`, one match per column
pub fn write_mapping_csv(path: &Path, residues: &[MappedResidue]) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("Failed to create mapping file '{}': {}", path.display(), e))?;

    writer
        .write_record(["molecule", "nres", "mod", "mod_ext", "matches"])
        .map_err(|e| format!("Write error: {}", e))?;
    for r in residues {
        let mut record = vec![r.molecule.clone(), r.nres.to_string(), r.residue.to_string(), r.ext.clone()];
        record.extend(r.matches.iter().map(|m| m.field()));
        writer.write_record(&record).map_err(|e| format!("Write error: {}", e))?;
    }
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;

    println!("✅ Mapping written to: {} ({} residues)", path.display(), residues.len());
    Ok(())
}

pub fn write_coverage_csv(path: &Path, coverage: &[Coverage]) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("Failed to create coverage file '{}': {}", path.display(), e))?;

    writer
        .write_record(["molecule", "length", "covered", "coverage"])
        .map_err(|e| format!("Write error: {}", e))?;
    for c in coverage {
        writer
            .write_record([
                c.molecule.clone(),
                c.length.to_string(),
                c.covered.to_string(),
                format!("{:.4}", c.fraction()),
            ])
            .map_err(|e| format!("Write error: {}", e))?;
    }
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;

    println!("✅ Coverage written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RnaRecord;

    fn entry(location: &str, sequence: &str, sp: f64) -> ReportEntry {
        ReportEntry {
            molecule_location: location.to_string(),
            sequence: sequence.to_string(),
            sequence_mod: String::new(),
            isotope: "light".to_string(),
            sp,
            rt: "10.5".to_string(),
        }
    }

    fn sequences() -> RnaSequenceSet {
        RnaSequenceSet::from_records(vec![
            RnaRecord::new("tRNA", "", b"GCGGAUUUAG"),
            RnaRecord::new("rRNA", "", b"ACGUACGU"),
        ])
        .unwrap()
    }

    fn exts() -> BTreeMap<char, String> {
        BTreeMap::from([('B', "[m1A]".to_string()), ('D', "[D]".to_string())])
    }

    fn modified_only() -> MappingConfig {
        MappingConfig {
            modified_only: true,
            ..MappingConfig::default()
        }
    }

    #[test]
    fn test_modified_residues_only() {
        let entries = vec![
            entry("tRNA:4-7", "GBDU", 0.9),
            entry("tRNA:3-7", "GGBDU", 0.5),
            entry("decoy", "UDBG", 2.0),
        ];
        let result = map_report(&entries, &sequences(), &exts(), &modified_only()).unwrap();

        let keys: Vec<(usize, char)> = result.residues.iter().map(|r| (r.nres, r.residue)).collect();
        assert_eq!(keys, vec![(5, 'B'), (6, 'D')]);
        assert_eq!(result.residues[0].ext, "[m1A]");

        // Longest target listed first
        let first = &result.residues[0].matches;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].sequence, "GGBDU");
        assert_eq!(first[0].field(), "light_enz_0.5_10.5_GGBDU__B");
    }

    #[test]
    fn test_all_residues_share_position_rows() {
        let entries = vec![entry("tRNA:4-6", "GAU", 0.9), entry("tRNA:4-6", "GBU", 0.7)];
        let result = map_report(&entries, &sequences(), &exts(), &MappingConfig::default()).unwrap();

        let keys: Vec<(usize, char)> = result.residues.iter().map(|r| (r.nres, r.residue)).collect();
        assert_eq!(keys, vec![(4, 'G'), (5, 'A'), (6, 'U')]);

        // A and m1A on position 5 end up on one row, A first
        let five = &result.residues[1];
        assert_eq!(five.ext, "A");
        let fields: Vec<String> = five.matches.iter().map(|m| m.field()).collect();
        assert_eq!(fields, vec!["light_enz_0.9_10.5_GAU__A", "light_enz_0.7_10.5_GBU__B"]);

        // Last residue of each target carries @
        let six = &result.residues[2];
        assert!(six.matches.iter().all(|m| m.terminal));
        assert_eq!(six.matches[0].field(), "light_enz_0.9_10.5_GAU_@_U");
        assert!(!result.residues[0].matches[0].terminal);
    }

    #[test]
    fn test_filters() {
        let entries = vec![entry("rRNA:1-4", "ACGU", 0.2), entry("rRNA:5-6", "AC", 0.9)];
        let config = MappingConfig {
            sp_cutoff: 0.1,
            ..MappingConfig::default()
        };
        let result = map_report(&entries, &sequences(), &exts(), &config).unwrap();
        assert_eq!(result.residues.len(), 4);
        assert_eq!(result.residues[0].ext, "A");

        let strict = MappingConfig { sp_cutoff: 0.5, ..config.clone() };
        assert!(map_report(&entries, &sequences(), &exts(), &strict).unwrap().residues.is_empty());

        let unmodified = MappingConfig { modified_only: true, ..config };
        assert!(map_report(&entries, &sequences(), &exts(), &unmodified).unwrap().residues.is_empty());
    }

    #[test]
    fn test_coverage() {
        let entries = vec![
            entry("tRNA:1-3;rRNA:1-3", "GCG", 0.9),
            entry("tRNA:2-5", "CGGA", 0.9),
        ];
        let result = map_report(&entries, &sequences(), &exts(), &MappingConfig::default()).unwrap();
        assert_eq!(result.coverage[0].molecule, "tRNA");
        assert_eq!(result.coverage[0].covered, 5);
        assert!((result.coverage[0].fraction() - 0.5).abs() < 1e-12);
        assert_eq!(result.coverage[1].covered, 3);
    }

    #[test]
    fn test_location_beyond_molecule() {
        let entries = vec![entry("rRNA:7-10", "GUAA", 0.9)];
        assert!(map_report(&entries, &sequences(), &exts(), &MappingConfig::default()).is_err());
    }

    #[test]
    fn test_target_longer_than_location() {
        // Four residues on a two-residue span would run past the 8 nt of rRNA
        let entries = vec![entry("rRNA:7-8", "GUBD", 0.9)];
        let err = map_report(&entries, &sequences(), &exts(), &MappingConfig::default()).unwrap_err();
        assert!(err.contains("spans 2"));
    }

    #[test]
    fn test_write_csv() {
        let entries = vec![entry("tRNA:4-7", "GBDU", 0.9), entry("tRNA:4-6", "GBD", 0.7)];
        let result = map_report(&entries, &sequences(), &exts(), &modified_only()).unwrap();

        let path = std::env::temp_dir().join("rnadigest_mapping_test.csv");
        write_mapping_csv(&path, &result.residues).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "molecule,nres,mod,mod_ext,matches");
        assert_eq!(lines[1], "tRNA,5,B,[m1A],light_enz_0.9_10.5_GBDU__B,light_enz_0.7_10.5_GBD__B");
        assert_eq!(lines[2], "tRNA,6,D,[D],light_enz_0.9_10.5_GBDU__D,light_enz_0.7_10.5_GBD_@_D");
        let _ = std::fs::remove_file(&path);

        let path = std::env::temp_dir().join("rnadigest_coverage_test.csv");
        write_coverage_csv(&path, &result.coverage).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("tRNA,10,4,0.4000"));
        let _ = std::fs::remove_file(&path);
    }
}
