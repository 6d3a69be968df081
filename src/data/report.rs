// report.rs - Identification report loader (input of the sequence mapping)

use std::fmt;
use std::path::Path;
use serde::Deserialize;

/// Position of a target on a molecule, written as `molecule:start-end`.
/// Reports may also give it as `molecule,start,end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportLocation {
    pub molecule: String,
    pub start: usize,
    pub end: usize,
}

impl ReportLocation {
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        let malformed = || format!("Location '{}' is not molecule:start-end", text);
        let (molecule, start, end) = match text.rsplitn(3, ',').collect::<Vec<_>>().as_slice() {
            [end, start, molecule] => (*molecule, *start, *end),
            _ => {
                let (molecule, range) = text.rsplit_once(':').ok_or_else(malformed)?;
                let (start, end) = range.split_once('-').ok_or_else(malformed)?;
                (molecule, start, end)
            }
        };
        let start = start
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid start in location '{}'", text))?;
        let end = end
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid end in location '{}'", text))?;
        if molecule.is_empty() || start == 0 || end < start {
            return Err(format!("Invalid location '{}'", text));
        }
        Ok(Self {
            molecule: molecule.to_string(),
            start,
            end,
        })
    }

    /// Parse a `;`-separated list of locations
    pub fn parse_list(text: &str) -> Result<Vec<Self>, String> {
        text.split(';')
            .filter(|s| !s.trim().is_empty())
            .map(Self::parse)
            .collect()
    }
}

impl fmt::Display for ReportLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.molecule, self.start, self.end)
    }
}

/// One identified target of the report.
///
/// Pytheas final reports name the columns `sequence_location`, `sequence_mods` and `Score (Sp)`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportEntry {
    #[serde(alias = "sequence_location")]
    pub molecule_location: String,
    pub sequence: String,
    #[serde(default, alias = "sequence_mods")]
    pub sequence_mod: String,
    #[serde(default)]
    pub isotope: String,
    #[serde(rename = "Sp", alias = "Score (Sp)")]
    pub sp: f64,
    #[serde(rename = "RT", default)]
    pub rt: String,
}

impl ReportEntry {
    pub fn is_decoy(&self) -> bool {
        self.molecule_location.contains("decoy")
    }

    pub fn locations(&self) -> Result<Vec<ReportLocation>, String> {
        ReportLocation::parse_list(&self.molecule_location)
    }

    /// Load all entries of a report CSV file
    pub fn load_csv(path: &Path) -> Result<Vec<Self>, String> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| format!("Failed to open report '{}': {}", path.display(), e))?;

        let entries = reader
            .deserialize::<Self>()
            .enumerate()
            .map(|(i, r)| r.map_err(|e| format!("Invalid report row {} in '{}': {}", i + 1, path.display(), e)))
            .collect::<Result<Vec<_>, String>>()?;

        println!("📄 Report loaded: {} ({} entries)", path.display(), entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_location() {
        let loc = ReportLocation::parse("tRNA:Phe:12-17").unwrap();
        assert_eq!(loc.molecule, "tRNA:Phe");
        assert_eq!((loc.start, loc.end), (12, 17));
        assert_eq!(loc.to_string(), "tRNA:Phe:12-17");

        assert!(ReportLocation::parse("tRNA").is_err());
        assert!(ReportLocation::parse("tRNA:5-3").is_err());
        assert!(ReportLocation::parse("tRNA:0-3").is_err());

        let list = ReportLocation::parse_list("a:1-3;b:4-6").unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_parse_comma_location() {
        let loc = ReportLocation::parse("tRNA-Phe,12,17").unwrap();
        assert_eq!(loc.molecule, "tRNA-Phe");
        assert_eq!((loc.start, loc.end), (12, 17));
        assert_eq!(loc.to_string(), "tRNA-Phe:12-17");
        assert!(ReportLocation::parse("tRNA-Phe,12").is_err());
    }

    #[test]
    fn test_load_csv() {
        let path = std::env::temp_dir().join("rnadigest_report_test.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "molecule_location,sequence,sequence_mod,isotope,Sp,RT").unwrap();
        writeln!(file, "tRNA:1-4,GCBG,GC[m1A]G,light,0.82,12.5").unwrap();
        writeln!(file, "decoy,GBCG,GB[m1A]CG,light,0.10,3.1").unwrap();
        drop(file);

        let entries = ReportEntry::load_csv(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert!((entries[0].sp - 0.82).abs() < 1e-12);
        assert!(!entries[0].is_decoy());
        assert!(entries[1].is_decoy());
        assert_eq!(entries[0].locations().unwrap()[0].end, 4);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_pytheas_columns() {
        let path = std::env::temp_dir().join("rnadigest_pytheas_report_test.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "sequence_location,sequence,sequence_mods,length,isotope,Score (Sp),RT").unwrap();
        writeln!(file, "\"tRNA,1,4;5S,2,5\",GCBG,GC[m1A]G,4,heavy,1.5,20.1").unwrap();
        drop(file);

        let entries = ReportEntry::load_csv(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sequence_mod, "GC[m1A]G");
        assert!((entries[0].sp - 1.5).abs() < 1e-12);
        let locations = entries[0].locations().unwrap();
        assert_eq!(locations[1].molecule, "5S");
        assert_eq!((locations[1].start, locations[1].end), (2, 5));

        std::fs::remove_file(&path).ok();
    }
}
