// rnamap.rs - Map identified targets onto the RNA sequences

use std::collections::BTreeMap;
use std::path::Path;
use clap::{Arg, ArgAction, Command};

use rnadigest::chem::NucleotideAlphabet;
use rnadigest::data::{ReportEntry, RnaSequenceSet};
use rnadigest::mapping::{map_report, write_coverage_csv, write_mapping_csv, MappingConfig};
use rnadigest::templates::ModificationTable;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("rnamap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Maps identified RNA digestion products onto their sequences")
        .arg(Arg::new("report")
            .long("report")
            .value_name("FILE")
            .help("Final report CSV (sequence_location, sequence, sequence_mods, isotope, Score (Sp), RT)")
            .required(true))
        .arg(Arg::new("sequences")
            .long("sequences")
            .value_name("FILE")
            .help("FASTA file used for the digestion")
            .required(true))
        .arg(Arg::new("nts-alphabet")
            .long("nts-alphabet")
            .value_name("FILE")
            .help("Nucleotide alphabet CSV providing ID_ext names (default: built-in A C G U)"))
        .arg(Arg::new("modifications")
            .long("modifications")
            .value_name("FILE")
            .help("Modification table providing ID_ext names"))
        .arg(Arg::new("min-length")
            .long("min-length")
            .value_name("N")
            .help("Minimum target length considered (default: 3)")
            .default_value("3"))
        .arg(Arg::new("sp-cutoff")
            .long("sp-cutoff")
            .value_name("SCORE")
            .help("Minimum Sp score considered (default: 0)")
            .default_value("0"))
        .arg(Arg::new("modified-only")
            .long("modified-only")
            .help("Skip unmodified A, C, G and U")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("output")
            .long("output")
            .value_name("FILE")
            .help("Mapping output CSV (default: mapping_output.csv)")
            .default_value("mapping_output.csv"))
        .arg(Arg::new("coverage")
            .long("coverage")
            .value_name("FILE")
            .help("Per-molecule coverage CSV"))
        .get_matches();

    let report_path = matches.get_one::<String>("report").ok_or("--report is required")?;
    let sequences_path = matches.get_one::<String>("sequences").ok_or("--sequences is required")?;
    let output_path = matches.get_one::<String>("output").ok_or("--output is required")?;

    let min_length_str = matches.get_one::<String>("min-length").ok_or("--min-length is required")?;
    let min_length = min_length_str.parse::<usize>()
        .map_err(|_| format!("Invalid minimum length: {}", min_length_str))?;
    let sp_cutoff_str = matches.get_one::<String>("sp-cutoff").ok_or("--sp-cutoff is required")?;
    let sp_cutoff = sp_cutoff_str.parse::<f64>()
        .map_err(|_| format!("Invalid Sp cutoff: {}", sp_cutoff_str))?;

    let config = MappingConfig {
        min_length,
        sp_cutoff,
        modified_only: matches.get_flag("modified-only"),
    };

    println!("🧬 rnamap v{}", env!("CARGO_PKG_VERSION"));
    println!("📄 Report: {}", report_path);
    println!("📂 Sequences: {}", sequences_path);
    println!("🎯 Minimum length: {}, Sp cutoff: {}", config.min_length, config.sp_cutoff);
    println!();

    // ID_ext names: alphabet first, modification table on top
    let alphabet = match matches.get_one::<String>("nts-alphabet") {
        Some(path) => NucleotideAlphabet::from_csv(Path::new(path))?,
        None => NucleotideAlphabet::standard(),
    };
    let mut exts: BTreeMap<char, String> = alphabet.ext_map();
    if let Some(path) = matches.get_one::<String>("modifications") {
        let table = ModificationTable::from_file(Path::new(path))?;
        exts.extend(table.ext_map()?);
    }

    let sequences = RnaSequenceSet::from_fasta(Path::new(sequences_path), None, None)?;
    let entries = ReportEntry::load_csv(Path::new(report_path))?;
    let decoys = entries.iter().filter(|e| e.is_decoy()).count();
    println!("🎭 {} decoy entries skipped", decoys);

    let result = map_report(&entries, &sequences, &exts, &config)?;
    write_mapping_csv(Path::new(output_path), &result.residues)?;

    println!();
    println!("📊 Coverage:");
    for c in &result.coverage {
        println!("  • {}: {}/{} ({:.1}%)", c.molecule, c.covered, c.length, c.fraction() * 100.0);
    }
    if let Some(path) = matches.get_one::<String>("coverage") {
        write_coverage_csv(Path::new(path), &result.coverage)?;
    }

    println!();
    println!("🎉 Mapping complete!");
    Ok(())
}
