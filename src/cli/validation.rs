// validation.rs - Input validation utilities

use std::path::Path;
use std::str::FromStr;
use regex::Regex;
use crate::cli::args::Args;
use crate::core::{CidIon, DigestConfig, IonMode, MzWindow};
use crate::data::ChargeTable;
use crate::enzymes::{NucleaseRegistry, CUSTOM_NUCLEASE, DEFAULT_NUCLEASE};
use crate::templates::CleavageRuleSet;

pub struct ValidationResult {
    pub ion_mode: IonMode,
    pub nuclease_name: String,
    pub cleavage_rules: Option<CleavageRuleSet>,
    pub digest_config: DigestConfig,
    pub cid_series: Vec<CidIon>,
    pub ms1_window: MzWindow,
    pub ms2_window: MzWindow,
    pub ms1_charges: ChargeTable,
    pub ms2_charges: ChargeTable,
    pub molecule_include_regex: Option<Regex>,
    pub molecule_exclude_regex: Option<Regex>,
    pub output_dir: String,
}

/// Parse a comma or space separated list, keeping the first occurrence of each value
pub fn parse_list<T>(text: &str, what: &str) -> Result<Vec<T>, String>
where
    T: FromStr<Err = String> + PartialEq,
{
    let mut values = Vec::new();
    for item in text.split(|c: char| c == ',' || c.is_whitespace()).filter(|s| !s.is_empty()) {
        let value = T::from_str(item).map_err(|e| format!("Invalid {}: {}", what, e))?;
        if !values.contains(&value) {
            values.push(value);
        }
    }
    if values.is_empty() {
        return Err(format!("Empty {} list", what));
    }
    Ok(values)
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    if args.sequences.is_none() {
        return Err("--sequences is required (or set 'sequences' in the config file)".to_string());
    }

    let ion_mode = IonMode::from_str(&args.ion_mode)?;

    // Nuclease: a cleavage template selects the custom nuclease
    let registry = NucleaseRegistry::new();
    let (nuclease_name, cleavage_rules) = match (&args.cleavage_rules, args.nuclease.as_deref()) {
        (Some(path), None) | (Some(path), Some(CUSTOM_NUCLEASE)) => {
            let rules = CleavageRuleSet::from_file(Path::new(path))?;
            (CUSTOM_NUCLEASE.to_string(), Some(rules))
        }
        (Some(_), Some(other)) => {
            return Err(format!(
                "--cleavage-rules defines the custom nuclease and cannot be combined with --nuclease {}",
                other
            ));
        }
        (None, Some(CUSTOM_NUCLEASE)) => {
            return Err("--nuclease custom requires --cleavage-rules".to_string());
        }
        (None, name) => {
            let name = name.unwrap_or(DEFAULT_NUCLEASE);
            if !registry.has_nuclease(name) {
                return Err(format!(
                    "Invalid nuclease '{}'. Available: {}, {}",
                    name,
                    registry.get_nuclease_names().join(", "),
                    CUSTOM_NUCLEASE
                ));
            }
            (name.to_string(), None)
        }
    };

    // Length limits
    if args.min_length == 0 {
        return Err("Minimum length must be at least 1".to_string());
    }
    if let Some(max) = args.max_length {
        if max < args.min_length {
            return Err(format!("Maximum length {} is below minimum length {}", max, args.min_length));
        }
    }
    if nuclease_name == "nonspecific" && args.max_length.is_none() {
        return Err("The nonspecific nuclease requires --max-length".to_string());
    }
    if args.ms2_min_length < 2 {
        return Err("MS2 minimum length must be at least 2".to_string());
    }

    // In nonspecific digestion every bond is a site, so the length limit bounds missed cleavages
    let missed_cleavages = if nuclease_name == "nonspecific" {
        usize::MAX
    } else {
        args.miss
    };

    let digest_config = DigestConfig {
        missed_cleavages,
        min_length: args.min_length,
        max_length: args.max_length,
        cleaved_five_prime: parse_list(&args.cleaved_5end, "cleaved 5' end")?,
        cleaved_three_prime: parse_list(&args.cleaved_3end, "cleaved 3' end")?,
        molecule_five_prime: parse_list(&args.molecule_5end, "molecule 5' end")?,
        molecule_three_prime: parse_list(&args.molecule_3end, "molecule 3' end")?,
        decoys: args.decoys,
    };

    let cid_series = match &args.cid_series {
        Some(text) => parse_list(text, "CID series")?,
        None => CidIon::DEFAULT_SERIES.to_vec(),
    };

    let ms1_window = MzWindow::new(args.ms1_mzlow, args.ms1_mzhigh)
        .map_err(|e| format!("MS1: {}", e))?;
    let ms2_window = MzWindow::new(args.ms2_mzlow, args.ms2_mzhigh)
        .map_err(|e| format!("MS2: {}", e))?;

    let ms1_charges = match &args.ms1_charges {
        Some(path) => ChargeTable::from_file(Path::new(path))?,
        None => ChargeTable::default_ms1(),
    };
    let ms2_charges = match &args.ms2_charges {
        Some(path) => ChargeTable::from_file(Path::new(path))?,
        None => ChargeTable::default_ms2(),
    };

    if let Some(threads) = args.threads {
        if threads == 0 {
            return Err("Number of threads must be at least 1".to_string());
        }
    }

    // Compile regex patterns
    let molecule_include_regex = if let Some(pattern) = &args.include_molecules {
        Some(Regex::new(pattern).map_err(|e| format!("Invalid include_molecules regex: {}", e))?)
    } else {
        None
    };

    let molecule_exclude_regex = if let Some(pattern) = &args.exclude_molecules {
        Some(Regex::new(pattern).map_err(|e| format!("Invalid exclude_molecules regex: {}", e))?)
    } else {
        None
    };

    Ok(ValidationResult {
        ion_mode,
        nuclease_name,
        cleavage_rules,
        digest_config,
        cid_series,
        ms1_window,
        ms2_window,
        ms1_charges,
        ms2_charges,
        molecule_include_regex,
        molecule_exclude_regex,
        output_dir: args.output_dir.clone().unwrap_or_else(|| ".".to_string()),
    })
}
