//! Spreadsheet document model
//!
//! Builds the sheets and cells of the export independently of the file
//! format, so the layout can be checked without writing a file.

use crate::storage::{Pet, WeightRecord};
use crate::views::history::newest_first;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Name of the summary sheet
pub const SUMMARY_SHEET: &str = "Overview";

/// Longest sheet name produced (Excel allows 31)
pub const MAX_SHEET_NAME: usize = 30;

/// Shown in the summary for pets without records
pub const PLACEHOLDER: &str = "-";

/// Default file name prefix
pub const DEFAULT_FILENAME_PREFIX: &str = "budgie_weights";

const SUMMARY_HEADER: [&str; 5] = ["Name", "Species", "Latest weight (g)", "Latest date", "Records"];
const PET_HEADER: [&str; 3] = ["Date", "Weight (g)", "Notes"];

/// Sheet name Excel reserves for itself
const RESERVED_SHEET: &str = "History";

/// Characters Excel does not allow in sheet names
const FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Display width in characters
    pub fn width(&self) -> usize {
        match self {
            Cell::Text(s) => s.chars().count(),
            Cell::Number(n) => n.to_string().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: String, header: &[&str]) -> Self {
        Self {
            name,
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// The whole export: summary sheet first, then one sheet per pet with data
#[derive(Debug, Clone, PartialEq)]
pub struct ExportWorkbook {
    pub sheets: Vec<Sheet>,
}

impl ExportWorkbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Build the export document
pub fn build_workbook(pets: &[Pet], records: &[WeightRecord]) -> ExportWorkbook {
    let mut taken: HashSet<String> = HashSet::new();
    taken.insert(SUMMARY_SHEET.to_lowercase());
    taken.insert(RESERVED_SHEET.to_lowercase());

    let mut summary = Sheet::new(SUMMARY_SHEET.to_string(), &SUMMARY_HEADER);
    let mut pet_sheets = Vec::new();

    for pet in pets {
        let history = newest_first(records.iter().filter(|r| r.pet_id == pet.id));

        let (latest_weight, latest_date) = match history.first() {
            Some(r) => (Cell::Number(r.weight), Cell::text(r.date.to_string())),
            None => (Cell::text(PLACEHOLDER), Cell::text(PLACEHOLDER)),
        };
        summary.rows.push(vec![
            Cell::text(&pet.name),
            Cell::text(&pet.species),
            latest_weight,
            latest_date,
            Cell::Number(history.len() as f64),
        ]);

        if history.is_empty() {
            continue;
        }

        let mut sheet = Sheet::new(unique_sheet_name(&pet.name, &mut taken), &PET_HEADER);
        sheet.rows = history
            .iter()
            .map(|r| {
                vec![
                    Cell::text(r.date.to_string()),
                    Cell::Number(r.weight),
                    Cell::text(r.notes.as_deref().unwrap_or("")),
                ]
            })
            .collect();
        pet_sheets.push(sheet);
    }

    let mut sheets = Vec::with_capacity(pet_sheets.len() + 1);
    sheets.push(summary);
    sheets.extend(pet_sheets);
    ExportWorkbook { sheets }
}

/// Make a pet name usable as a sheet name
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();
    let truncated: String = trim_edges(&cleaned).chars().take(MAX_SHEET_NAME).collect();
    let name = trim_edges(&truncated);

    if name.is_empty() {
        "Pet".to_string()
    } else {
        name.to_string()
    }
}

/// Strip whitespace and apostrophes from both ends until neither remains
fn trim_edges(s: &str) -> &str {
    let mut current = s;
    loop {
        let next = current.trim().trim_matches('\'');
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

/// Sanitized name, suffixed ` (2)`, ` (3)`, … if already used
/// (case-insensitive, as Excel compares)
fn unique_sheet_name(name: &str, taken: &mut HashSet<String>) -> String {
    let base = sanitize_sheet_name(name);
    let mut candidate = base.clone();
    let mut n = 2;

    while taken.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
        let stem: String = base.chars().take(keep).collect();
        candidate = format!("{}{}", trim_edges(&stem), suffix);
        n += 1;
    }

    taken.insert(candidate.to_lowercase());
    candidate
}

/// `<prefix>_<YYYY-MM-DD>.xlsx`
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.xlsx", prefix, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{seed_pets, seed_records, PetId};

    fn pet(id: &str, name: &str) -> Pet {
        let mut pet = Pet::new(name, "Budgerigar", 0);
        pet.id = PetId::from(id);
        pet
    }

    #[test]
    fn test_summary_plus_one_sheet_per_pet_with_records() {
        let mut pets = seed_pets();
        pets.push(pet("p3", "Empty"));
        pets.push(pet("p4", "Also empty"));
        let records = seed_records();

        let wb = build_workbook(&pets, &records);
        assert_eq!(wb.sheet_names(), vec![SUMMARY_SHEET, "Pippi", "Blue"]);

        let summary = wb.sheet(SUMMARY_SHEET).unwrap();
        assert_eq!(summary.rows.len(), 4);
        assert_eq!(
            summary.rows[2],
            vec![
                Cell::text("Empty"),
                Cell::text("Budgerigar"),
                Cell::text(PLACEHOLDER),
                Cell::text(PLACEHOLDER),
                Cell::Number(0.0),
            ]
        );
        assert_eq!(summary.rows[0][2], Cell::Number(32.5));
        assert_eq!(summary.rows[0][3], Cell::text("2023-10-15"));
        assert_eq!(summary.rows[0][4], Cell::Number(3.0));
    }

    #[test]
    fn test_pet_sheet_rows_newest_first() {
        let mut records = seed_records();
        records[0].notes = Some("first weigh-in".to_string());
        let wb = build_workbook(&seed_pets(), &records);

        let sheet = wb.sheet("Pippi").unwrap();
        assert_eq!(sheet.header, vec!["Date", "Weight (g)", "Notes"]);
        let dates: Vec<&Cell> = sheet.rows.iter().map(|r| &r[0]).collect();
        assert_eq!(
            dates,
            vec![
                &Cell::text("2023-10-15"),
                &Cell::text("2023-10-08"),
                &Cell::text("2023-10-01")
            ]
        );
        assert_eq!(sheet.rows[2][2], Cell::text("first weigh-in"));
        assert_eq!(sheet.rows[0][2], Cell::text(""));
    }

    #[test]
    fn test_no_pets_gives_summary_only() {
        let wb = build_workbook(&[], &seed_records());
        assert_eq!(wb.sheet_names(), vec![SUMMARY_SHEET]);
        assert!(wb.sheets[0].rows.is_empty());
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Kiwi/Mango?"), "Kiwi_Mango_");
        assert_eq!(sanitize_sheet_name("'Quoted'"), "Quoted");
        assert_eq!(sanitize_sheet_name("   "), "Pet");
        let long = "A".repeat(45);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), MAX_SHEET_NAME);
    }

    #[test]
    fn test_sheet_names_never_edge_with_apostrophe() {
        let possessive = format!("{}'s budgie", "X".repeat(29));
        assert_eq!(sanitize_sheet_name(&possessive), "X".repeat(29));
        assert_eq!(sanitize_sheet_name("' 'Kiwi"), "Kiwi");
        assert_eq!(sanitize_sheet_name("Kiwi ' '"), "Kiwi");
        assert_eq!(sanitize_sheet_name("' ' '"), "Pet");
        assert_eq!(sanitize_sheet_name("Mango's"), "Mango's");

        // Suffixed duplicates are cut back to the stem without a dangling apostrophe
        let mut taken = HashSet::new();
        let name = format!("{}'{}", "Y".repeat(25), "Z".repeat(10));
        unique_sheet_name(&name, &mut taken);
        let second = unique_sheet_name(&name, &mut taken);
        assert_eq!(second, format!("{} (2)", "Y".repeat(25)));
    }

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let pets = vec![
            pet("a", "Sunny"),
            pet("b", "sunny"),
            pet("c", "overview"),
            pet("d", "History"),
        ];
        let records: Vec<WeightRecord> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| {
                WeightRecord::new(
                    PetId::from(*id),
                    30.0,
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    None,
                )
            })
            .collect();

        let wb = build_workbook(&pets, &records);
        assert_eq!(
            wb.sheet_names(),
            vec![
                SUMMARY_SHEET,
                "Sunny",
                "sunny (2)",
                "overview (2)",
                "History (2)"
            ]
        );

        let mut taken = HashSet::new();
        let long = "B".repeat(40);
        let first = unique_sheet_name(&long, &mut taken);
        let second = unique_sheet_name(&long, &mut taken);
        assert_eq!(first.chars().count(), MAX_SHEET_NAME);
        assert!(second.ends_with(" (2)"));
        assert_eq!(second.chars().count(), MAX_SHEET_NAME);
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            export_filename(DEFAULT_FILENAME_PREFIX, date),
            "budgie_weights_2024-03-09.xlsx"
        );
    }
}
