// sequence.rs - RNA sequence set loaded from FASTA

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use bio::io::fasta;
use regex::Regex;

/// A single RNA molecule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RnaRecord {
    pub id: String,
    pub description: String,
    /// Upper case, `T` read as `U`, gaps removed
    pub sequence: Vec<u8>,
}

impl RnaRecord {
    pub fn new(id: &str, description: &str, sequence: &[u8]) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            sequence: normalize_sequence(sequence),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Full FASTA header without the leading '>'
    pub fn header(&self) -> String {
        if self.description.is_empty() {
            self.id.clone()
        } else {
            format!("{} {}", self.id, self.description)
        }
    }
}

/// Upper-case the sequence, read DNA `T` as `U` and drop gap characters
pub fn normalize_sequence(sequence: &[u8]) -> Vec<u8> {
    sequence
        .iter()
        .filter(|&&b| b != b'-' && b != b'.' && !b.is_ascii_whitespace())
        .map(|b| match b.to_ascii_uppercase() {
            b'T' => b'U',
            other => other,
        })
        .collect()
}

/// RNA molecules in input order
#[derive(Debug, Clone, Default)]
pub struct RnaSequenceSet {
    pub records: Vec<RnaRecord>,
    index: HashMap<String, usize>,
}

impl RnaSequenceSet {
    /// Build a set from records, rejecting duplicate IDs, empty or non-letter sequences
    pub fn from_records(records: Vec<RnaRecord>) -> Result<Self, String> {
        let mut index = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            if record.is_empty() {
                return Err(format!("Sequence '{}' is empty", record.id));
            }
            if let Some(pos) = record.sequence.iter().position(|b| !b.is_ascii_alphabetic()) {
                return Err(format!(
                    "Sequence '{}' has invalid character '{}' at position {}",
                    record.id,
                    record.sequence[pos] as char,
                    pos + 1
                ));
            }
            if index.insert(record.id.clone(), i).is_some() {
                return Err(format!("Duplicate sequence ID '{}'", record.id));
            }
        }
        Ok(Self { records, index })
    }

    /// Load a FASTA file, optionally keeping only IDs matching `include` and not matching `exclude`
    pub fn from_fasta(
        path: &Path,
        include: Option<&Regex>,
        exclude: Option<&Regex>,
    ) -> Result<Self, String> {
        println!("🧬 Loading RNA sequences from: {}", path.display());
        let file = File::open(path)
            .map_err(|e| format!("Failed to open FASTA file {}: {}", path.display(), e))?;

        let reader = fasta::Reader::new(BufReader::new(file));
        let mut records = Vec::new();
        let mut filtered = 0;

        for record_result in reader.records() {
            let record = record_result
                .map_err(|e| format!("Invalid FASTA record in {}: {}", path.display(), e))?;

            let id = record.id().to_string();
            if include.map(|re| !re.is_match(&id)).unwrap_or(false)
                || exclude.map(|re| re.is_match(&id)).unwrap_or(false)
            {
                filtered += 1;
                continue;
            }

            records.push(RnaRecord::new(
                &id,
                record.desc().unwrap_or(""),
                record.seq(),
            ));
        }

        if records.is_empty() {
            return Err(format!("No sequences left in {} after filtering", path.display()));
        }

        let set = Self::from_records(records)?;
        if filtered > 0 {
            println!("🔍 {} sequences filtered out by ID", filtered);
        }
        println!(
            "✅ Sequences loaded: {} molecules, {} nt",
            set.records.len(),
            set.total_length()
        );
        Ok(set)
    }

    pub fn get(&self, id: &str) -> Option<&RnaRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Find a molecule by exact ID, else by the one record whose header starts with `name`.
    /// A prefix shared by several headers is an error.
    pub fn find(&self, name: &str) -> Result<Option<&RnaRecord>, String> {
        if let Some(record) = self.get(name) {
            return Ok(Some(record));
        }
        let candidates: Vec<&RnaRecord> = self
            .records
            .iter()
            .filter(|r| r.header().starts_with(name))
            .collect();
        match candidates.as_slice() {
            [] => Ok(None),
            [record] => Ok(Some(record)),
            _ => Err(format!(
                "Molecule name '{}' is ambiguous, it matches {}",
                name,
                candidates.iter().map(|r| r.id.as_str()).collect::<Vec<_>>().join(", ")
            )),
        }
    }

    pub fn total_length(&self) -> usize {
        self.records.iter().map(|r| r.len()).sum()
    }
}
