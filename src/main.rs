// main.rs - CLI entry point

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use rnadigest::chem::AlphabetDiff;
use rnadigest::cli::Config;
use rnadigest::output::{write_ms1_digest, write_ms2_digest, write_summary_json, DigestHeader, RunSummary};
use rnadigest::prelude::*;
use rnadigest::templates::{write_templates, ModificationMap};

/// Nucleotides closer than this are hard to tell apart in MS1
const CLOSE_MASS_THRESHOLD_DA: f64 = 0.5;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    if let Some(dir) = &args.generate_templates {
        let written = write_templates(Path::new(dir))?;
        println!("✅ {} templates written to {}", written.len(), dir);
        return Ok(());
    }

    if args.list_nucleases {
        let registry = NucleaseRegistry::new();
        println!("Available nucleases:");
        for (name, desc) in registry.list_nucleases() {
            println!("  - {}: {}", name, desc);
        }
        println!("  - {}: rules read from --cleavage-rules", CUSTOM_NUCLEASE);
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    println!("🚀 rnadigest v{}", env!("CARGO_PKG_VERSION"));

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("🧵 Threads: {}", n);
    } else {
        let num_threads = rayon::current_num_threads();
        println!("🧵 Threads: {} (auto-detected)", num_threads);
    }

    // Validate all arguments
    let validation = validate_args(&args)?;
    let (ms1_min_z, ms1_max_z) = validation.ms1_charges.charge_range();
    let (ms2_min_z, ms2_max_z) = validation.ms2_charges.charge_range();
    println!(
        "⚡ Charges: MS1 {}-{}, MS2 {}-{}",
        ms1_min_z, ms1_max_z, ms2_min_z, ms2_max_z
    );
    let sequences_path = args
        .sequences
        .clone()
        .ok_or("--sequences is required")?;

    let total_start = Instant::now();

    // Alphabets
    let light = match &args.nts_light {
        Some(path) => NucleotideAlphabet::from_csv(Path::new(path))?,
        None => NucleotideAlphabet::standard(),
    };
    let heavy = match &args.nts_heavy {
        Some(path) => Some(NucleotideAlphabet::from_csv(Path::new(path))?),
        None => None,
    };
    if let Some(heavy) = &heavy {
        let diff = AlphabetDiff::between(&light.ext_map(), &heavy.ext_map());
        diff.report(&light.name, &heavy.name);
    }
    for (a, b, diff) in light.close_mass_pairs(CLOSE_MASS_THRESHOLD_DA) {
        eprintln!(
            "⚠️  WARNING: nucleotides {} and {} differ by {:.4} Da in alphabet {}",
            a, b, diff, light.name
        );
    }

    // Sequences
    let sequences = RnaSequenceSet::from_fasta(
        Path::new(&sequences_path),
        validation.molecule_include_regex.as_ref(),
        validation.molecule_exclude_regex.as_ref(),
    )?;
    check_residues(&sequences, &light)?;
    if let Some(heavy) = &heavy {
        check_residues(&sequences, heavy)?;
    }

    // Modifications
    let mut exts: BTreeMap<char, String> = light.ext_map();
    let modifications = match &args.modifications {
        Some(path) => {
            let table = ModificationTable::from_file(Path::new(path))?;
            let table_exts = table.ext_map()?;
            check_modification_ids(&table_exts, &light)?;
            if let Some(heavy) = &heavy {
                check_modification_ids(&table_exts, heavy)?;
            }
            exts.extend(table_exts);
            table.resolve(&sequences)?
        }
        None => ModificationMap::default(),
    };

    // Nuclease
    let mut registry = NucleaseRegistry::new();
    if let Some(rules) = validation.cleavage_rules.clone() {
        registry.register_custom(rules);
    }
    let nuclease = registry
        .get_nuclease(&validation.nuclease_name)
        .ok_or_else(|| format!("Nuclease '{}' is not registered", validation.nuclease_name))?;
    println!("✂️  Nuclease: {} ({})", nuclease.name(), nuclease.description());
    println!(
        "🧪 Ion mode: {}, CID series: {}",
        validation.ion_mode.description(),
        validation
            .cid_series
            .iter()
            .map(|s| s.code())
            .collect::<Vec<_>>()
            .join(" ")
    );

    if args.dry_run {
        println!("✅ Dry run completed successfully");
        println!(
            "📊 {} molecules, {} nucleotides, {} modification IDs in use",
            sequences.records.len(),
            sequences.total_length(),
            modifications.modified_ids().len()
        );
        return Ok(());
    }

    // Digestion
    let products = digest_all(
        &sequences,
        nuclease,
        &validation.digest_config,
        &modifications,
        &exts,
    );
    let decoys = products.iter().filter(|p| p.decoy).count();

    let header = DigestHeader {
        command_line,
        input_sequences: sequences_path.clone(),
        nuclease: match &validation.cleavage_rules {
            Some(rules) => format!("{} {}", nuclease.name(), rules.describe()),
            None => nuclease.name().to_string(),
        },
        missed_cleavages: args.miss,
        min_length: args.min_length,
        max_length: args.max_length,
        modifications: args.modifications.clone(),
        ion_mode: validation.ion_mode,
        ms1_window: validation.ms1_window,
        ms2_window: validation.ms2_window,
        ms2_min_length: args.ms2_min_length,
        cid_series: validation.cid_series.clone(),
        nts_light: light.name.clone(),
        nts_heavy: heavy.as_ref().map(|h| h.name.clone()),
        decoys: args.decoys,
    };

    // Precursors
    let light_masses = MassTable::from_alphabet(&light);
    let heavy_masses = heavy.as_ref().map(MassTable::from_alphabet);
    let precursors = PrecursorCalculator {
        light: &light_masses,
        heavy: heavy_masses.as_ref(),
        ion_mode: validation.ion_mode,
        charges: &validation.ms1_charges,
    };

    let output_dir = Path::new(&validation.output_dir);
    let mut outputs = Vec::new();

    let ms1_ions = precursors.ms1_ions(&products, validation.ms1_window)?;
    let ms1_path = output_dir.join("Digest_MS1.txt").to_string_lossy().to_string();
    write_ms1_digest(&ms1_path, &header, &ms1_ions)?;
    outputs.push(ms1_path);

    let mut ms2_precursor_count = 0;
    let mut ms2_fragment_count = 0;
    if !args.ms1_only {
        let ms2_precursors =
            precursors.ms2_precursors(&products, validation.ms1_window, args.ms2_min_length)?;
        println!("🎯 {} precursors selected for MS2", ms2_precursors.len());

        let fragment_config = FragmentConfig {
            ion_mode: validation.ion_mode,
            cid_series: validation.cid_series.clone(),
            window: validation.ms2_window,
            charges: validation.ms2_charges.clone(),
        };
        let calculator = FragmentCalculator {
            light: &light_masses,
            heavy: heavy_masses.as_ref(),
            config: &fragment_config,
        };
        let fragments = calculator.compute_all(&ms2_precursors)?;

        let ms2_path = output_dir.join("Digest_MS2.txt").to_string_lossy().to_string();
        write_ms2_digest(&ms2_path, &header, &ms2_precursors, &fragments)?;
        outputs.push(ms2_path);

        ms2_precursor_count = ms2_precursors.len();
        ms2_fragment_count = fragments.iter().map(|f| f.len()).sum();
    }

    if let Some(summary_path) = &args.summary_json {
        let summary = RunSummary {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated: chrono::Utc::now().to_rfc3339(),
            nuclease: nuclease.name().to_string(),
            molecules: sequences.records.len(),
            total_length: sequences.total_length(),
            targets: products.len() - decoys,
            decoys,
            ms1_ions: ms1_ions.len(),
            ms2_precursors: ms2_precursor_count,
            ms2_fragment_ions: ms2_fragment_count,
            outputs,
        };
        write_summary_json(summary_path, &summary)?;
    }

    println!("⏱️  Total time: {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}

/// Every residue of every molecule must have a mass in the alphabet
fn check_residues(sequences: &RnaSequenceSet, alphabet: &NucleotideAlphabet) -> Result<(), String> {
    for record in &sequences.records {
        if let Some(&residue) = record.sequence.iter().find(|&&r| !alphabet.contains(r as char)) {
            return Err(format!(
                "Molecule {} contains '{}', which is not part of alphabet {}",
                record.id, residue as char, alphabet.name
            ));
        }
    }
    Ok(())
}

/// Modification IDs must exist in the alphabet; differing names are only reported
fn check_modification_ids(
    table_exts: &BTreeMap<char, String>,
    alphabet: &NucleotideAlphabet,
) -> Result<(), String> {
    for (id, ext) in table_exts {
        match alphabet.ext(*id) {
            None => {
                return Err(format!(
                    "Modification {} ({}) is not part of alphabet {}",
                    id, ext, alphabet.name
                ))
            }
            Some(alphabet_ext) if alphabet_ext != ext => eprintln!(
                "⚠️  WARNING: modification {} is {} in the table but {} in alphabet {}",
                id, ext, alphabet_ext, alphabet.name
            ),
            Some(_) => {}
        }
    }
    Ok(())
}
