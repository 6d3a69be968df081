// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.sequences.is_none() {
            self.sequences = config.sequences;
        }
        if self.output_dir.is_none() {
            self.output_dir = config.output_dir;
        }
        if self.summary_json.is_none() {
            self.summary_json = config.summary_json;
        }

        // Digestion (only override defaults, not explicit CLI values)
        if self.nuclease.is_none() {
            self.nuclease = config.nuclease;
        }
        if self.cleavage_rules.is_none() {
            self.cleavage_rules = config.cleavage_rules;
        }
        if self.modifications.is_none() {
            self.modifications = config.modifications;
        }
        if self.miss == 0 {
            if let Some(miss) = config.miss {
                self.miss = miss;
            }
        }
        if self.min_length == 1 {
            if let Some(min_length) = config.min_length {
                self.min_length = min_length;
            }
        }
        if self.max_length.is_none() {
            self.max_length = config.max_length;
        }
        if self.cleaved_5end == "OH" {
            if let Some(ends) = config.cleaved_5end {
                self.cleaved_5end = ends;
            }
        }
        if self.cleaved_3end == "cP" {
            if let Some(ends) = config.cleaved_3end {
                self.cleaved_3end = ends;
            }
        }
        if self.molecule_5end == "P" {
            if let Some(ends) = config.molecule_5end {
                self.molecule_5end = ends;
            }
        }
        if self.molecule_3end == "OH" {
            if let Some(ends) = config.molecule_3end {
                self.molecule_3end = ends;
            }
        }

        // Masses
        if self.nts_light.is_none() {
            self.nts_light = config.nts_light;
        }
        if self.nts_heavy.is_none() {
            self.nts_heavy = config.nts_heavy;
        }
        if self.ion_mode == "-" {
            if let Some(mode) = config.ion_mode {
                self.ion_mode = mode;
            }
        }
        if self.ms1_charges.is_none() {
            self.ms1_charges = config.ms1_charges;
        }
        if self.ms2_charges.is_none() {
            self.ms2_charges = config.ms2_charges;
        }
        if self.ms1_mzlow == 400.0 {
            if let Some(value) = config.ms1_mzlow {
                self.ms1_mzlow = value;
            }
        }
        if self.ms1_mzhigh == 2000.0 {
            if let Some(value) = config.ms1_mzhigh {
                self.ms1_mzhigh = value;
            }
        }
        if self.ms2_mzlow == 300.0 {
            if let Some(value) = config.ms2_mzlow {
                self.ms2_mzlow = value;
            }
        }
        if self.ms2_mzhigh == 2000.0 {
            if let Some(value) = config.ms2_mzhigh {
                self.ms2_mzhigh = value;
            }
        }
        if self.cid_series.is_none() {
            self.cid_series = config.cid_series;
        }
        if self.ms2_min_length == 3 {
            if let Some(value) = config.ms2_min_length {
                self.ms2_min_length = value;
            }
        }

        // Molecule filtering
        if self.include_molecules.is_none() {
            self.include_molecules = config.include_molecules;
        }
        if self.exclude_molecules.is_none() {
            self.exclude_molecules = config.exclude_molecules;
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.decoys && config.decoys.unwrap_or(false) {
            self.decoys = true;
        }
        if !self.ms1_only && config.ms1_only.unwrap_or(false) {
            self.ms1_only = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
