// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// rnadigest - In silico RNA digestion and m/z library generator
pub struct Args {
    /// path to the RNA sequences (FASTA)
    #[argh(option)]
    pub sequences: Option<String>,

    /// output directory for Digest_MS1.txt and Digest_MS2.txt (default: .)
    #[argh(option)]
    pub output_dir: Option<String>,

    /// nuclease: RNase_T1, RNase_A, RNase_U2, cusativin, MC1, MAZ, nonspecific, none, custom (default: RNase_T1)
    #[argh(option)]
    pub nuclease: Option<String>,

    /// cleavage rule template for the custom nuclease
    #[argh(option)]
    pub cleavage_rules: Option<String>,

    /// modification table (Molecule Position ID ID_ext Include)
    #[argh(option)]
    pub modifications: Option<String>,

    /// nucleotide alphabet with elemental compositions (CSV, default: built-in A C G U)
    #[argh(option)]
    pub nts_light: Option<String>,

    /// isotopically labelled nucleotide alphabet (CSV)
    #[argh(option)]
    pub nts_heavy: Option<String>,

    /// ion mode: + or - (default: -)
    #[argh(option, default = "String::from(\"-\")")]
    pub ion_mode: String,

    /// charge table for precursor ions (default: built-in)
    #[argh(option)]
    pub ms1_charges: Option<String>,

    /// charge table for fragment ions (default: built-in)
    #[argh(option)]
    pub ms2_charges: Option<String>,

    /// minimum m/z of precursor ions (default: 400)
    #[argh(option, default = "400.0")]
    pub ms1_mzlow: f64,

    /// maximum m/z of precursor ions (default: 2000)
    #[argh(option, default = "2000.0")]
    pub ms1_mzhigh: f64,

    /// minimum m/z of fragment ions (default: 300)
    #[argh(option, default = "300.0")]
    pub ms2_mzlow: f64,

    /// maximum m/z of fragment ions (default: 2000)
    #[argh(option, default = "2000.0")]
    pub ms2_mzhigh: f64,

    /// CID series, comma separated (default: c,y,a,a-B,w,b,x,d,z,y-P,z-P)
    #[argh(option)]
    pub cid_series: Option<String>,

    /// maximum number of missed cleavages (default: 0)
    #[argh(option, default = "0")]
    pub miss: usize,

    /// minimum length of digestion products (default: 1)
    #[argh(option, default = "1")]
    pub min_length: usize,

    /// maximum length of digestion products (required for nonspecific)
    #[argh(option)]
    pub max_length: Option<usize>,

    /// end chemistry of cleaved 5' ends, comma separated out of OH,P (default: OH)
    #[argh(option, default = "String::from(\"OH\")")]
    pub cleaved_5end: String,

    /// end chemistry of cleaved 3' ends, comma separated out of OH,P,cP (default: cP)
    #[argh(option, default = "String::from(\"cP\")")]
    pub cleaved_3end: String,

    /// end chemistry of molecule 5' ends, comma separated out of OH,P (default: P)
    #[argh(option, default = "String::from(\"P\")")]
    pub molecule_5end: String,

    /// end chemistry of molecule 3' ends, comma separated out of OH,P,cP (default: OH)
    #[argh(option, default = "String::from(\"OH\")")]
    pub molecule_3end: String,

    /// add decoy sequences to the library
    #[argh(switch)]
    pub decoys: bool,

    /// minimum length of precursors fragmented for MS2 (default: 3)
    #[argh(option, default = "3")]
    pub ms2_min_length: usize,

    /// write the MS1 digest only
    #[argh(switch)]
    pub ms1_only: bool,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// include only molecules whose id matches regex pattern
    #[argh(option)]
    pub include_molecules: Option<String>,

    /// exclude molecules whose id matches regex pattern
    #[argh(option)]
    pub exclude_molecules: Option<String>,

    /// write a JSON run summary to this file
    #[argh(option)]
    pub summary_json: Option<String>,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// list available nucleases and exit
    #[argh(switch)]
    pub list_nucleases: bool,

    /// write documented cleavage and modification templates into this directory and exit
    #[argh(option)]
    pub generate_templates: Option<String>,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
