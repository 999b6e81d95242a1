//! Composition File Parser
//!
//! Turns one assembly's delimited composition file into ordered BOM lines.
//! Column roles are found by case-insensitive header synonyms; the IPN column
//! falls back to the first column when no header matches.

use anyhow::Result;
use partforge_models::CompositionEntry;
use std::path::Path;

use crate::delimited::{cell, DelimitedFormat, DelimitedTable};

/// Column positions resolved from a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    pub ipn: usize,
    pub quantity: Option<usize>,
    pub reference: Option<usize>,
    pub description: Option<usize>,
}

/// Parsed composition with diagnostics
#[derive(Debug, Clone)]
pub struct ParsedComposition {
    pub entries: Vec<CompositionEntry>,
    pub roles: ColumnRoles,
    pub warnings: Vec<String>,
}

/// Composition parser
pub struct CompositionParser {
    /// Header synonyms per column role
    part_number_columns: Vec<String>,
    quantity_columns: Vec<String>,
    reference_columns: Vec<String>,
    description_columns: Vec<String>,
}

impl Default for CompositionParser {
    fn default() -> Self {
        Self {
            part_number_columns: vec![
                "ipn".to_string(),
                "part_number".to_string(),
                "part_no".to_string(),
                "pn".to_string(),
                "part".to_string(),
                "item_number".to_string(),
                "item".to_string(),
            ],
            quantity_columns: vec![
                "qty".to_string(),
                "quantity".to_string(),
                "qty_per".to_string(),
                "count".to_string(),
            ],
            reference_columns: vec![
                "ref".to_string(),
                "refdes".to_string(),
                "ref_des".to_string(),
                "reference".to_string(),
                "references".to_string(),
                "reference_designator".to_string(),
                "reference_designators".to_string(),
                "designator".to_string(),
                "designators".to_string(),
            ],
            description_columns: vec![
                "description".to_string(),
                "desc".to_string(),
                "item_description".to_string(),
                "part_description".to_string(),
            ],
        }
    }
}

impl CompositionParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a composition file from disk
    pub fn parse_file(&self, path: &Path) -> Result<ParsedComposition> {
        let table = DelimitedTable::read_file(path)?;
        Ok(self.parse_table(table))
    }

    /// Parse composition bytes in a known format
    pub fn parse_bytes(&self, data: &[u8], format: DelimitedFormat) -> Result<ParsedComposition> {
        let table = DelimitedTable::read(data, format)?;
        Ok(self.parse_table(table))
    }

    fn parse_table(&self, table: DelimitedTable) -> ParsedComposition {
        let roles = self.resolve_roles(&table);
        let mut warnings = table.warnings;
        let mut entries = Vec::with_capacity(table.rows.len());

        for (line, row) in &table.rows {
            let Some(ipn) = cell(row, Some(roles.ipn)) else {
                warnings.push(format!("Row {}: missing part number, skipped", line));
                continue;
            };

            let raw_qty = cell(row, roles.quantity);
            let qty = parse_quantity(raw_qty.unwrap_or(""));
            if let Some(raw) = raw_qty {
                if qty == 1.0 && raw.parse::<f64>().ok() != Some(1.0) {
                    warnings.push(format!("Row {}: quantity {:?} not usable, assuming 1", line, raw));
                }
            }

            entries.push(CompositionEntry {
                ipn: ipn.to_string(),
                qty,
                reference: cell(row, roles.reference).map(str::to_string),
                description: cell(row, roles.description).map(str::to_string),
            });
        }

        ParsedComposition {
            entries,
            roles,
            warnings,
        }
    }

    fn resolve_roles(&self, table: &DelimitedTable) -> ColumnRoles {
        ColumnRoles {
            ipn: table.find_column(&self.part_number_columns).unwrap_or(0),
            quantity: table.find_column(&self.quantity_columns),
            reference: table.find_column(&self.reference_columns),
            description: table.find_column(&self.description_columns),
        }
    }
}

/// Parses a BOM quantity. Missing, non-numeric, negative and non-finite
/// values all fall back to 1.
pub fn parse_quantity(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(qty) if qty.is_finite() && qty >= 0.0 => qty,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(data: &str) -> ParsedComposition {
        CompositionParser::new()
            .parse_bytes(data.as_bytes(), DelimitedFormat::Csv)
            .unwrap()
    }

    #[test]
    fn test_header_synonyms() {
        let parsed = parse("Ref Des,Description,Quantity,Part Number\nR1 R2,10k,2,RES-001\n");
        assert_eq!(
            parsed.roles,
            ColumnRoles {
                ipn: 3,
                quantity: Some(2),
                reference: Some(0),
                description: Some(1),
            }
        );
        let entry = &parsed.entries[0];
        assert_eq!(entry.ipn, "RES-001");
        assert_eq!(entry.qty, 2.0);
        assert_eq!(entry.reference.as_deref(), Some("R1 R2"));
        assert_eq!(entry.description.as_deref(), Some("10k"));
    }

    #[test]
    fn test_ipn_defaults_to_first_column() {
        let parsed = parse("Component,Amount\nCAP-001,3\n");
        assert_eq!(parsed.roles.ipn, 0);
        assert_eq!(parsed.roles.quantity, None);
        assert_eq!(parsed.entries[0].ipn, "CAP-001");
        assert_eq!(parsed.entries[0].qty, 1.0);
    }

    #[test]
    fn test_malformed_quantities_fall_back() {
        let parsed = parse("ipn,qty\nRES-001,abc\nRES-002,-4\nRES-003,\nRES-004,0\nRES-005,2.5\n");
        let quantities: Vec<f64> = parsed.entries.iter().map(|e| e.qty).collect();
        assert_eq!(quantities, vec![1.0, 1.0, 1.0, 0.0, 2.5]);
        assert_eq!(parsed.warnings.len(), 2);
    }

    #[test]
    fn test_rows_without_ipn_are_skipped() {
        let parsed = parse("ipn,qty\n,2\nRES-001,1\n");
        assert_eq!(parsed.entries.len(), 1);
        assert!(parsed.warnings[0].contains("Row 2"));
    }

    #[test]
    fn test_row_order_is_preserved() {
        let parsed = parse("ipn\nPCA-B\nRES-001\nPCA-A\n");
        let order: Vec<&str> = parsed.entries.iter().map(|e| e.ipn.as_str()).collect();
        assert_eq!(order, vec!["PCA-B", "RES-001", "PCA-A"]);
    }

    proptest! {
        /// Parsed quantities are always finite and non-negative
        #[test]
        fn prop_quantity_is_sane(raw in ".{0,12}") {
            let qty = parse_quantity(&raw);
            prop_assert!(qty.is_finite());
            prop_assert!(qty >= 0.0);
        }
    }
}
