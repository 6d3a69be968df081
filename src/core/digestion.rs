// digestion.rs - In silico nuclease digestion, modification variants and consolidation

use std::collections::{BTreeMap, HashMap, HashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::core::mass::{FivePrimeEnd, ThreePrimeEnd};
use crate::data::{RnaRecord, RnaSequenceSet};
use crate::enzymes::Nuclease;
use crate::templates::ModificationMap;

/// Molecule name given to decoy products
pub const DECOY: &str = "decoy";

/// Parameters of the digestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Maximum number of skipped cleavage sites inside a product
    pub missed_cleavages: usize,
    pub min_length: usize,
    pub max_length: Option<usize>,
    /// 5' ends produced by the nuclease
    pub cleaved_five_prime: Vec<FivePrimeEnd>,
    /// 3' ends produced by the nuclease
    pub cleaved_three_prime: Vec<ThreePrimeEnd>,
    /// 5' end of the intact molecules
    pub molecule_five_prime: Vec<FivePrimeEnd>,
    /// 3' end of the intact molecules
    pub molecule_three_prime: Vec<ThreePrimeEnd>,
    pub decoys: bool,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            missed_cleavages: 0,
            min_length: 1,
            max_length: None,
            cleaved_five_prime: vec![FivePrimeEnd::Hydroxyl],
            cleaved_three_prime: vec![ThreePrimeEnd::CyclicPhosphate],
            molecule_five_prime: vec![FivePrimeEnd::Phosphate],
            molecule_three_prime: vec![ThreePrimeEnd::Hydroxyl],
            decoys: false,
        }
    }
}

/// A single cleavage product before consolidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleavage {
    pub molecule: String,
    /// 1-based first residue
    pub start: usize,
    /// 1-based last residue
    pub end: usize,
    pub missed: usize,
    /// One-letter codes, modification IDs included
    pub sequence: String,
    pub five_prime: FivePrimeEnd,
    pub three_prime: ThreePrimeEnd,
}

/// A unique digestion product with every location it comes from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestProduct {
    pub molecule: String,
    pub start: usize,
    pub end: usize,
    pub missed: usize,
    pub sequence: String,
    pub sequence_mod: String,
    pub five_prime: FivePrimeEnd,
    pub three_prime: ThreePrimeEnd,
    /// `molecule:start-end` entries, or `decoy`
    pub locations: Vec<String>,
    pub decoy: bool,
}

impl DigestProduct {
    pub fn len(&self) -> usize {
        self.sequence.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn num_copy(&self) -> usize {
        self.locations.len()
    }

    pub fn location_field(&self) -> String {
        self.locations.join(";")
    }
}

/// Written form of a product: ID_ext for modified residues, plain letters otherwise
pub fn annotate_sequence(sequence: &str, exts: &BTreeMap<char, String>) -> String {
    sequence
        .chars()
        .map(|c| match exts.get(&c) {
            Some(ext) => ext.clone(),
            None => c.to_string(),
        })
        .collect()
}

/// Cut a molecule into all products allowed by the nuclease and the configuration
pub fn digest_molecule(
    record: &RnaRecord,
    nuclease: &dyn Nuclease,
    config: &DigestConfig,
    modifications: &ModificationMap,
) -> Vec<Cleavage> {
    let seq = &record.sequence;
    let len = seq.len();
    if len == 0 {
        return Vec::new();
    }

    let sites = nuclease.cleavage_sites(seq);
    let mut starts = vec![0];
    starts.extend(sites.iter().map(|&s| s + 1));
    let mut ends: Vec<usize> = sites.clone();
    ends.push(len - 1);

    let max_length = config.max_length.unwrap_or(usize::MAX);
    let mut products = Vec::new();

    for a in 0..starts.len() {
        let last = a.saturating_add(config.missed_cleavages).min(ends.len() - 1);
        for b in a..=last {
            let (start, end) = (starts[a], ends[b]);
            let length = end - start + 1;
            if length > max_length {
                break;
            }
            if length < config.min_length {
                continue;
            }

            let five_ends = if start == 0 {
                &config.molecule_five_prime
            } else {
                &config.cleaved_five_prime
            };
            let three_ends = if end == len - 1 {
                &config.molecule_three_prime
            } else {
                &config.cleaved_three_prime
            };

            for sequence in modified_variants(record, start, end, modifications) {
                for &five_prime in five_ends {
                    for &three_prime in three_ends {
                        products.push(Cleavage {
                            molecule: record.id.clone(),
                            start: start + 1,
                            end: end + 1,
                            missed: b - a,
                            sequence: sequence.clone(),
                            five_prime,
                            three_prime,
                        });
                    }
                }
            }
        }
    }

    products
}

/// All one-letter sequences of `record[start..=end]` allowed by the modification table
fn modified_variants(
    record: &RnaRecord,
    start: usize,
    end: usize,
    modifications: &ModificationMap,
) -> Vec<String> {
    let plain: Vec<char> = record.sequence[start..=end].iter().map(|&b| b as char).collect();
    let mut variants = vec![plain];

    for position in modifications.positions_in(&record.id, start + 1, end + 1) {
        let options = modifications.options_at(&record.id, position);
        let offset = position - 1 - start;
        variants = variants
            .into_iter()
            .flat_map(|variant| {
                options.iter().map(move |option| {
                    let mut next = variant.clone();
                    if let Some(id) = option {
                        next[offset] = *id;
                    }
                    next
                })
            })
            .collect();
    }

    variants.into_iter().map(|v| v.into_iter().collect()).collect()
}

/// Reverse all residues but the 3'-terminal one
pub fn decoy_sequence(sequence: &str) -> String {
    let chars: Vec<char> = sequence.chars().collect();
    match chars.split_last() {
        Some((last, rest)) => rest.iter().rev().chain(std::iter::once(last)).collect(),
        None => String::new(),
    }
}

/// Merge identical products (same sequence and ends) keeping the first occurrence
pub fn consolidate(cleavages: Vec<Cleavage>, exts: &BTreeMap<char, String>) -> Vec<DigestProduct> {
    let mut products: Vec<DigestProduct> = Vec::new();
    let mut index: HashMap<(String, FivePrimeEnd, ThreePrimeEnd), usize> = HashMap::new();

    for c in cleavages {
        let location = format!("{}:{}-{}", c.molecule, c.start, c.end);
        let key = (c.sequence.clone(), c.five_prime, c.three_prime);
        match index.get(&key) {
            Some(&i) => {
                if !products[i].locations.contains(&location) {
                    products[i].locations.push(location);
                }
            }
            None => {
                index.insert(key, products.len());
                products.push(DigestProduct {
                    sequence_mod: annotate_sequence(&c.sequence, exts),
                    molecule: c.molecule,
                    start: c.start,
                    end: c.end,
                    missed: c.missed,
                    sequence: c.sequence,
                    five_prime: c.five_prime,
                    three_prime: c.three_prime,
                    locations: vec![location],
                    decoy: false,
                });
            }
        }
    }

    products
}

/// Decoys for a set of targets; decoys equal to a target sequence or to each other are dropped
pub fn make_decoys(targets: &[DigestProduct], exts: &BTreeMap<char, String>) -> Vec<DigestProduct> {
    let target_sequences: HashSet<&str> = targets.iter().map(|t| t.sequence.as_str()).collect();
    let mut seen: HashSet<(String, FivePrimeEnd, ThreePrimeEnd)> = HashSet::new();
    let mut decoys = Vec::new();

    for target in targets {
        let sequence = decoy_sequence(&target.sequence);
        if target_sequences.contains(sequence.as_str()) {
            continue;
        }
        if !seen.insert((sequence.clone(), target.five_prime, target.three_prime)) {
            continue;
        }
        decoys.push(DigestProduct {
            molecule: DECOY.to_string(),
            start: target.start,
            end: target.end,
            missed: target.missed,
            sequence_mod: annotate_sequence(&sequence, exts),
            sequence,
            five_prime: target.five_prime,
            three_prime: target.three_prime,
            locations: vec![DECOY.to_string()],
            decoy: true,
        });
    }

    decoys
}

/// Digest every molecule in parallel and return consolidated targets followed by decoys
pub fn digest_all(
    sequences: &RnaSequenceSet,
    nuclease: &dyn Nuclease,
    config: &DigestConfig,
    modifications: &ModificationMap,
    exts: &BTreeMap<char, String>,
) -> Vec<DigestProduct> {
    let per_molecule: Vec<Vec<Cleavage>> = sequences
        .records
        .par_iter()
        .map(|record| digest_molecule(record, nuclease, config, modifications))
        .collect();

    let total: usize = per_molecule.iter().map(|v| v.len()).sum();
    let mut products = consolidate(per_molecule.into_iter().flatten().collect(), exts);
    println!(
        "✂️  Digestion with {}: {} cleavage products, {} unique targets",
        nuclease.name(),
        total,
        products.len()
    );

    if config.decoys {
        let decoys = make_decoys(&products, exts);
        println!("🎭 Decoys generated: {}", decoys.len());
        products.extend(decoys);
    }

    products
}
