// charges.rs - Charge tables for precursor (MS1) and fragment (MS2) ions

use std::collections::BTreeMap;
use std::path::Path;

/// Charge states to compute for each oligonucleotide length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeTable {
    by_length: BTreeMap<usize, Vec<u32>>,
}

impl ChargeTable {
    /// Parse a table. Lines starting with a digit hold `<length> <z>[,<z>...]`,
    /// every other line is a comment.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut by_length = BTreeMap::new();

        for (line_num, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let length = fields
                .next()
                .and_then(|f| f.parse::<usize>().ok())
                .ok_or_else(|| format!("Charge table line {}: invalid length", line_num + 1))?;
            let charges_field = fields
                .next()
                .ok_or_else(|| format!("Charge table line {}: missing charges", line_num + 1))?;

            let mut charges = charges_field
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|&z| z > 0)
                        .ok_or_else(|| format!("Charge table line {}: invalid charge '{}'", line_num + 1, s))
                })
                .collect::<Result<Vec<u32>, String>>()?;
            charges.sort_unstable();
            charges.dedup();

            if charges.is_empty() {
                return Err(format!("Charge table line {}: no charges for length {}", line_num + 1, length));
            }
            by_length.insert(length, charges);
        }

        if by_length.is_empty() {
            return Err("Charge table has no entries".to_string());
        }
        Ok(Self { by_length })
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read charge table '{}': {}", path.display(), e))?;
        let table = Self::parse(&content).map_err(|e| format!("{}: {}", path.display(), e))?;
        let (min, max) = table.length_range();
        let (min_z, max_z) = table.charge_range();
        println!(
            "⚡ Charge table loaded: {} (lengths {}-{}, charges {}-{})",
            path.display(),
            min,
            max,
            min_z,
            max_z
        );
        Ok(table)
    }

    /// Precursor charges: up to `length - 1` (at least 1), capped at 12, lengths 1-40
    pub fn default_ms1() -> Self {
        let by_length = (1..=40)
            .map(|len: usize| {
                let max_z = len.saturating_sub(1).clamp(1, 12) as u32;
                (len, (1..=max_z).collect())
            })
            .collect();
        Self { by_length }
    }

    /// Fragment charges: up to the fragment length, capped at 8, lengths 1-39
    pub fn default_ms2() -> Self {
        let by_length = (1..=39)
            .map(|len: usize| {
                let max_z = len.clamp(1, 8) as u32;
                (len, (1..=max_z).collect())
            })
            .collect();
        Self { by_length }
    }

    /// Charges listed for a length, empty when the length is not in the table
    pub fn charges_for(&self, length: usize) -> &[u32] {
        self.by_length.get(&length).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains_length(&self, length: usize) -> bool {
        self.by_length.contains_key(&length)
    }

    /// Shortest and longest length covered
    pub fn length_range(&self) -> (usize, usize) {
        let min = self.by_length.keys().next().copied().unwrap_or(0);
        let max = self.by_length.keys().next_back().copied().unwrap_or(0);
        (min, max)
    }

    /// Lowest and highest charge over all lengths
    pub fn charge_range(&self) -> (u32, u32) {
        let all = self.by_length.values().flatten();
        let min = all.clone().min().copied().unwrap_or(0);
        let max = all.max().copied().unwrap_or(0);
        (min, max)
    }

    /// Text form accepted by `parse`
    pub fn to_text(&self) -> String {
        let mut out = String::from("# length charges\n");
        for (length, charges) in &self.by_length {
            let list: Vec<String> = charges.iter().map(|z| z.to_string()).collect();
            out.push_str(&format!("{} {}\n", length, list.join(",")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let table = ChargeTable::parse("# MS1 charges\nlength charges\n2 1\n3 2,1,2\n5 1,2,3\n").unwrap();
        assert_eq!(table.charges_for(2), &[1]);
        assert_eq!(table.charges_for(3), &[1, 2]);
        assert!(table.charges_for(4).is_empty());
        assert!(!table.contains_length(4));
        assert_eq!(table.length_range(), (2, 5));
        assert_eq!(table.charge_range(), (1, 3));
    }

    #[test]
    fn test_parse_errors() {
        assert!(ChargeTable::parse("# empty\n").is_err());
        assert!(ChargeTable::parse("3\n").is_err());
        assert!(ChargeTable::parse("3 0\n").is_err());
        assert!(ChargeTable::parse("3 a,b\n").is_err());
    }

    #[test]
    fn test_defaults() {
        let ms1 = ChargeTable::default_ms1();
        assert_eq!(ms1.charges_for(1), &[1]);
        assert_eq!(ms1.charges_for(4), &[1, 2, 3]);
        assert_eq!(ms1.charges_for(30).len(), 12);
        assert_eq!(ms1.length_range(), (1, 40));

        let ms2 = ChargeTable::default_ms2();
        assert_eq!(ms2.charges_for(2), &[1, 2]);
        assert_eq!(ms2.charges_for(20).len(), 8);

        let reparsed = ChargeTable::parse(&ms1.to_text()).unwrap();
        assert_eq!(reparsed, ms1);
    }
}
