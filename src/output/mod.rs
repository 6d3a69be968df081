// mod.rs - Digest library writers

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;
use serde::Serialize;
use crate::core::{format_mz, CidIon, IonMode, Ms1Ion, Ms2Precursor, MzWindow};

pub const MS1_COLUMNS: &str = "m/z_light m/z_heavy molecule residue_start residue_end charge miss sequence sequence_mod 3'end 5'end num_copy molecule_location";
pub const MS2_COLUMNS: &str = "m/z isotope molecule_ID residue_start residue_end charge miss sequence sequence_mod 5'end 3'end num_copy molecule_location CID_series_fragment(charge):m/z";

/// Ensure parent directory exists before creating file
pub fn ensure_parent_dir(file_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(file_path).parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }
    Ok(())
}

/// Run parameters echoed in the header of both digest files
#[derive(Debug, Clone)]
pub struct DigestHeader {
    pub command_line: String,
    pub input_sequences: String,
    pub nuclease: String,
    pub missed_cleavages: usize,
    pub min_length: usize,
    pub max_length: Option<usize>,
    pub modifications: Option<String>,
    pub ion_mode: IonMode,
    pub ms1_window: MzWindow,
    pub ms2_window: MzWindow,
    pub ms2_min_length: usize,
    pub cid_series: Vec<CidIon>,
    pub nts_light: String,
    pub nts_heavy: Option<String>,
    pub decoys: bool,
}

impl DigestHeader {
    fn common_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("# Command: {}", self.command_line),
            format!("# Generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")),
            format!("# rnadigest v{}", env!("CARGO_PKG_VERSION")),
            format!("#INPUT_SEQUENCE {}", self.input_sequences),
            format!("#NUCLEASE {}", self.nuclease),
            format!("#MISSED_CLEAVAGES {}", self.missed_cleavages),
            format!("#MIN_LENGTH_DIGEST {}", self.min_length),
        ];
        if let Some(max) = self.max_length {
            lines.push(format!("#MAX_LENGTH_DIGEST {}", max));
        }
        if let Some(mods) = &self.modifications {
            lines.push(format!("#MODIFICATIONS {}", mods));
        }
        lines.push(format!("#DECOYS_GENERATED {}", if self.decoys { "y" } else { "n" }));
        lines.push(format!("#ION_MODE {}", self.ion_mode.description()));
        lines
    }

    pub fn ms1_lines(&self) -> Vec<String> {
        let mut lines = self.common_lines();
        lines.push(format!("#MZLOW_MS1 {}", self.ms1_window.low));
        lines.push(format!("#MZHIGH_MS1 {}", self.ms1_window.high));
        lines.push(format!("#NTS_LIGHT {}", self.nts_light));
        if let Some(heavy) = &self.nts_heavy {
            lines.push(format!("#NTS_HEAVY {}", heavy));
        }
        lines
    }

    pub fn ms2_lines(&self, targets: usize, decoys: usize) -> Vec<String> {
        let mut lines = self.common_lines();
        lines.push(format!("#MIN_LENGTH {}", self.ms2_min_length));
        let series: Vec<&str> = self.cid_series.iter().map(|s| s.code()).collect();
        lines.push(format!("#CID_SERIES {}", series.join(" ")));
        lines.push(format!("#MZLOW_MS2 {}", self.ms2_window.low));
        lines.push(format!("#MZHIGH_MS2 {}", self.ms2_window.high));
        lines.push(format!("#MZLOW_MS1 {}", self.ms1_window.low));
        lines.push(format!("#MZHIGH_MS1 {}", self.ms1_window.high));
        lines.push(format!("#ELEMENTAL_COMPOSITION_LIGHT {}", self.nts_light));
        if let Some(heavy) = &self.nts_heavy {
            lines.push(format!("#ELEMENTAL_COMPOSITION_HEAVY {}", heavy));
        }
        lines.push(format!("#TARGETS {}", targets));
        lines.push(format!("#DECOYS {}", decoys));
        lines
    }
}

/// One row of the MS1 digest
pub fn ms1_row(ion: &Ms1Ion, mode: IonMode) -> String {
    let p = ion.product;
    let heavy = ion.mz_heavy.map(format_mz).unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} {} {} {} {} {} {} {} {} {} {} {}",
        format_mz(ion.mz_light),
        heavy,
        p.molecule,
        p.start,
        p.end,
        mode.charge_label(ion.charge),
        p.missed,
        p.sequence,
        p.sequence_mod,
        p.three_prime,
        p.five_prime,
        p.num_copy(),
        p.location_field()
    )
}

/// One row of the MS2 digest, fragment ions appended
pub fn ms2_row(precursor: &Ms2Precursor, mode: IonMode, ions: &[String]) -> String {
    let p = precursor.product;
    let mut row = format!(
        "{} {} {} {} {} {} {} {} {} {} {} {} {}",
        format_mz(precursor.mz),
        precursor.isotope,
        p.molecule,
        p.start,
        p.end,
        mode.charge_label(precursor.charge),
        p.missed,
        p.sequence,
        p.sequence_mod,
        p.five_prime,
        p.three_prime,
        p.num_copy(),
        p.location_field()
    );
    for ion in ions {
        row.push(' ');
        row.push_str(ion);
    }
    row
}

/// Write the MS1 digest file
pub fn write_ms1_digest(
    file_path: &str,
    header: &DigestHeader,
    ions: &[Ms1Ion],
) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
    let mut writer = BufWriter::new(file);

    for line in header.ms1_lines() {
        writeln!(writer, "{}", line).map_err(|e| format!("Write error: {}", e))?;
    }
    writeln!(writer, "{}", MS1_COLUMNS).map_err(|e| format!("Write error: {}", e))?;
    for ion in ions {
        writeln!(writer, "{}", ms1_row(ion, header.ion_mode)).map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ MS1 digest written to: {} ({} ions)", file_path, ions.len());
    Ok(())
}

/// Write the MS2 digest file. Targets and decoys are counted per precursor row.
pub fn write_ms2_digest(
    file_path: &str,
    header: &DigestHeader,
    precursors: &[Ms2Precursor],
    fragments: &[Vec<String>],
) -> Result<(), String> {
    if precursors.len() != fragments.len() {
        return Err(format!(
            "MS2 writer got {} precursors but {} fragment lists",
            precursors.len(),
            fragments.len()
        ));
    }

    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
    let mut writer = BufWriter::new(file);

    let decoys = precursors.iter().filter(|p| p.product.decoy).count();
    let targets = precursors.len() - decoys;

    for line in header.ms2_lines(targets, decoys) {
        writeln!(writer, "{}", line).map_err(|e| format!("Write error: {}", e))?;
    }
    writeln!(writer, "{}", MS2_COLUMNS).map_err(|e| format!("Write error: {}", e))?;
    for (precursor, ions) in precursors.iter().zip(fragments) {
        writeln!(writer, "{}", ms2_row(precursor, header.ion_mode, ions))
            .map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!(
        "✅ MS2 digest written to: {} ({} targets, {} decoys)",
        file_path, targets, decoys
    );
    Ok(())
}

/// Counts of one run, written as JSON on request
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub version: String,
    pub generated: String,
    pub nuclease: String,
    pub molecules: usize,
    pub total_length: usize,
    pub targets: usize,
    pub decoys: usize,
    pub ms1_ions: usize,
    pub ms2_precursors: usize,
    pub ms2_fragment_ions: usize,
    pub outputs: Vec<String>,
}

pub fn write_summary_json(file_path: &str, summary: &RunSummary) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| format!("Failed to serialize run summary: {}", e))?;
    std::fs::write(file_path, json)
        .map_err(|e| format!("Failed to write run summary '{}': {}", file_path, e))?;
    println!("📊 Run summary written to: {}", file_path);
    Ok(())
}
