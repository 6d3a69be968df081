// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub sequences: Option<String>,
    pub output_dir: Option<String>,
    pub summary_json: Option<String>,

    // Digestion
    pub nuclease: Option<String>,
    pub cleavage_rules: Option<String>,
    pub modifications: Option<String>,
    pub miss: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub cleaved_5end: Option<String>,
    pub cleaved_3end: Option<String>,
    pub molecule_5end: Option<String>,
    pub molecule_3end: Option<String>,
    pub decoys: Option<bool>,

    // Masses
    pub nts_light: Option<String>,
    pub nts_heavy: Option<String>,
    pub ion_mode: Option<String>,
    pub ms1_charges: Option<String>,
    pub ms2_charges: Option<String>,
    pub ms1_mzlow: Option<f64>,
    pub ms1_mzhigh: Option<f64>,
    pub ms2_mzlow: Option<f64>,
    pub ms2_mzhigh: Option<f64>,
    pub cid_series: Option<String>,
    pub ms2_min_length: Option<usize>,
    pub ms1_only: Option<bool>,

    // Molecule filtering
    pub include_molecules: Option<String>,
    pub exclude_molecules: Option<String>,

    // Performance
    pub threads: Option<usize>,

    // Flags
    pub dry_run: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# rnadigest.toml - Configuration file for rnadigest
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# RNA sequences (FASTA)
sequences = "/path/to/sequences.fasta"

# Directory receiving Digest_MS1.txt and Digest_MS2.txt
output_dir = "digest"

# JSON run summary
# summary_json = "digest/summary.json"

# =============================================================================
# DIGESTION
# =============================================================================

# Nuclease: RNase_T1, RNase_A, RNase_U2, cusativin, MC1, MAZ, nonspecific, none, custom
nuclease = "RNase_T1"

# Cleavage rule template; selects the custom nuclease, so leave nuclease
# unset (or "custom") when using it
# cleavage_rules = "custom_nuclease.txt"

# Modification table (Molecule Position ID ID_ext Include)
# modifications = "modifications.txt"

# Maximum number of missed cleavages
miss = 1

# Length limits of digestion products (max_length is required for nonspecific)
min_length = 1
# max_length = 20

# End chemistry of cleaved products (comma separated)
cleaved_5end = "OH"
cleaved_3end = "cP"

# End chemistry of the intact molecules (comma separated)
molecule_5end = "P"
molecule_3end = "OH"

# Add decoy sequences
decoys = false

# =============================================================================
# MASSES
# =============================================================================

# Nucleotide alphabets (CSV); the built-in A C G U alphabet is used when omitted
# nts_light = "nts_light.csv"
# nts_heavy = "nts_heavy.csv"

# Ion mode: + or -
ion_mode = "-"

# Charge tables (built-in defaults when omitted)
# ms1_charges = "charges_MS1.txt"
# ms2_charges = "charges_MS2.txt"

# m/z windows
ms1_mzlow = 400.0
ms1_mzhigh = 2000.0
ms2_mzlow = 300.0
ms2_mzhigh = 2000.0

# CID series for sequence-defining fragments
cid_series = "c,y,a,a-B,w,b,x,d,z,y-P,z-P"

# Minimum length of precursors fragmented for MS2
ms2_min_length = 3

# Write the MS1 digest only
ms1_only = false

# =============================================================================
# MOLECULE FILTERING
# =============================================================================

# Include only molecules whose id matches regex pattern
# include_molecules = "tRNA.*"

# Exclude molecules whose id matches regex pattern
# exclude_molecules = "rRNA.*"

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
threads = 8

# =============================================================================
# FLAGS
# =============================================================================

# Validate inputs without computation (dry run)
dry_run = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::generate_sample()).unwrap();
        assert_eq!(config.nuclease.as_deref(), Some("RNase_T1"));
        assert_eq!(config.miss, Some(1));
        assert_eq!(config.ms1_mzlow, Some(400.0));
        assert_eq!(config.threads, Some(8));
        assert!(config.max_length.is_none());
    }

    #[test]
    fn test_config_file_round_trip() {
        let mut config = Config::new();
        config.sequences = Some("trna.fasta".to_string());
        config.decoys = Some(true);

        let path = std::env::temp_dir().join("rnadigest_test_config.toml");
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.sequences.as_deref(), Some("trna.fasta"));
        assert_eq!(loaded.decoys, Some(true));
        let _ = std::fs::remove_file(&path);
    }
}
