//! `.xlsx` writer
//!
//! Renders an `ExportWorkbook` with `rust_xlsxwriter`: bold header row,
//! frozen below the header, numbers as numeric cells and columns sized to
//! their content.

use crate::export::error::ExportResult;
use crate::export::workbook::{Cell, ExportWorkbook, Sheet};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 40;

/// Write the document to `path`
pub fn write_xlsx(document: &ExportWorkbook, path: &Path) -> ExportResult<()> {
    let mut workbook = render(document)?;
    workbook.save(path)?;
    Ok(())
}

/// Render the document to an in-memory `.xlsx` file
pub fn to_xlsx_bytes(document: &ExportWorkbook) -> ExportResult<Vec<u8>> {
    let mut workbook = render(document)?;
    Ok(workbook.save_to_buffer()?)
}

fn render(document: &ExportWorkbook) -> ExportResult<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in &document.sheets {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet, &header_format)?;
    }

    Ok(workbook)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, header_format: &Format) -> ExportResult<()> {
    worksheet.set_name(sheet.name.as_str())?;

    for (col, title) in sheet.header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title.as_str(), header_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (i, row) in sheet.rows.iter().enumerate() {
        let row_num = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) => worksheet.write_string(row_num, col as u16, s.as_str())?,
                Cell::Number(n) => worksheet.write_number(row_num, col as u16, *n)?,
            };
        }
    }

    for (col, title) in sheet.header.iter().enumerate() {
        let widest = sheet
            .rows
            .iter()
            .filter_map(|row| row.get(col))
            .map(Cell::width)
            .chain(std::iter::once(title.chars().count()))
            .max()
            .unwrap_or(MIN_COLUMN_WIDTH);
        let width = (widest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    Ok(())
}
