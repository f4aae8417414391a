//! Table file I/O: delimited text and spreadsheets.

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use crate::error::{DataError, Result};

/// Recognized table file formats, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Excel,
}

impl TableFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "xlsx" | "xls" | "xlsm" | "xlsb" => Some(Self::Excel),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Tsv => "TSV",
            Self::Excel => "Excel",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// Options applied when reading delimited text.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub has_header: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
        }
    }
}

/// Loads a table from `path`, dispatching on the extension.
/// Unrecognized extensions are rejected.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let format = TableFormat::from_extension(path)
        .ok_or_else(|| DataError::UnsupportedFormat(path.to_path_buf()))?;
    match format {
        TableFormat::Csv | TableFormat::Tsv => {
            let delimiter = options.delimiter.unwrap_or_else(|| format.delimiter());
            let df = CsvReadOptions::default()
                .with_has_header(options.has_header)
                .map_parse_options(|opts| opts.with_separator(delimiter))
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()?;
            Ok(df)
        }
        TableFormat::Excel => load_excel(path),
    }
}

/// Writes `df` back to `path`, dispatching on the extension.
pub fn save_table(df: &DataFrame, path: &Path) -> Result<()> {
    let format = TableFormat::from_extension(path)
        .ok_or_else(|| DataError::UnsupportedFormat(path.to_path_buf()))?;
    match format {
        TableFormat::Csv | TableFormat::Tsv => {
            let mut file = File::create(path)?;
            let mut out = df.clone();
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(format.delimiter())
                .finish(&mut out)?;
            Ok(())
        }
        TableFormat::Excel => save_excel(df, path),
    }
}

/// Inferred column type for spreadsheet cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExcelColType {
    Int64,
    Float64,
    Boolean,
    Utf8,
}

/// Loads the first worksheet of an Excel file (eager read via calamine).
fn load_excel(path: &Path) -> Result<DataFrame> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| DataError::Other(format!("Excel: {}", e)))?;
    if workbook.sheet_names().is_empty() {
        return Err(DataError::Other("Excel file has no worksheets".to_string()));
    }
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataError::Other("Excel: no first sheet".to_string()))?
        .map_err(|e| DataError::Other(format!("Excel: {}", e)))?;

    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    if rows.is_empty() {
        return Ok(DataFrame::new(vec![])?);
    }

    let headers: Vec<String> = rows[0]
        .iter()
        .map(|c| calamine::DataType::as_string(c).unwrap_or_else(|| c.to_string()))
        .collect();

    let mut columns = Vec::with_capacity(headers.len());
    for (col_idx, header) in headers.iter().enumerate() {
        let cells: Vec<Option<&Data>> = rows[1..].iter().map(|row| row.get(col_idx)).collect();
        let name = if header.is_empty() {
            format!("column_{}", col_idx + 1)
        } else {
            header.clone()
        };
        let series = excel_column_to_series(name.as_str(), &cells, excel_infer_column_type(&cells));
        columns.push(series.into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Infers a column type from the cells: any string makes the column Utf8,
/// whole-number floats collapse to Int64.
fn excel_infer_column_type(cells: &[Option<&Data>]) -> ExcelColType {
    use calamine::DataType as CalamineTrait;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    for cell in cells.iter().flatten() {
        if CalamineTrait::is_string(*cell) {
            return ExcelColType::Utf8;
        }
        if CalamineTrait::is_float(*cell) {
            has_float = true;
        }
        if CalamineTrait::is_int(*cell) {
            has_int = true;
        }
        if CalamineTrait::is_bool(*cell) {
            has_bool = true;
        }
    }
    if has_int && !has_float {
        ExcelColType::Int64
    } else if has_float {
        let all_whole = cells.iter().flatten().all(|cell| {
            cell.as_f64()
                .map(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
                .unwrap_or(true)
        });
        if all_whole {
            ExcelColType::Int64
        } else {
            ExcelColType::Float64
        }
    } else if has_bool {
        ExcelColType::Boolean
    } else {
        ExcelColType::Utf8
    }
}

/// Builds a polars Series from a column of calamine cells using the inferred type.
fn excel_column_to_series(name: &str, cells: &[Option<&Data>], col_type: ExcelColType) -> Series {
    use calamine::DataType as CalamineTrait;
    match col_type {
        ExcelColType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_i64()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Float64 => {
            let v: Vec<Option<f64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_f64()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Boolean => {
            let v: Vec<Option<bool>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.get_bool()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Utf8 => {
            let v: Vec<Option<String>> = cells
                .iter()
                .map(|c| {
                    c.and_then(|cell| {
                        if CalamineTrait::is_empty(cell) {
                            None
                        } else {
                            cell.as_string()
                        }
                    })
                })
                .collect();
            Series::new(name.into(), v)
        }
    }
}

/// Writes `df` as an xlsx workbook: header row, then one cell per value.
/// Nulls become empty cells.
fn save_excel(df: &DataFrame, path: &Path) -> Result<()> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let xlsx_err = |e: rust_xlsxwriter::XlsxError| DataError::Other(format!("Excel: {}", e));

    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let col = col_idx as u16;
        worksheet
            .write_string(0, col, column.name().as_str())
            .map_err(xlsx_err)?;
        let series = column.as_materialized_series();
        for row_idx in 0..series.len() {
            let row = (row_idx + 1) as u32;
            let value = series.get(row_idx)?;
            match value {
                AnyValue::Null => {}
                other => {
                    if let Ok(n) = other.try_extract::<f64>() {
                        worksheet.write_number(row, col, n).map_err(xlsx_err)?;
                    } else {
                        worksheet
                            .write_string(row, col, other.str_value().as_ref())
                            .map_err(xlsx_err)?;
                    }
                }
            }
        }
    }

    workbook.save(path).map_err(xlsx_err)?;
    Ok(())
}
