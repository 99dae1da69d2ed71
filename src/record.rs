use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use csv::StringRecord;
use log::{info, warn};

use crate::models::DailyRow;

// Positional column schema of the station spreadsheet, declared once.
// Columns 0 and 1 are present in the file but carry nothing the analysis
// needs.
pub const MONTH_COL: usize = 2;
pub const DAY_COL: usize = 3;
pub const YEAR_COL: usize = 4;
pub const TMAX_COL: usize = 5;
pub const TMAX_FLAG_COL: usize = 6;
pub const TMIN_COL: usize = 7;
pub const TMIN_FLAG_COL: usize = 8;
pub const TAVG_COL: usize = 9;

/// Minimum number of columns a data row must carry.
pub const ROW_WIDTH: usize = 10;

/// The daily record for one station: chronological rows, one per calendar
/// day, addressable by integer index. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct DailyRecord {
    rows: Vec<DailyRow>,
}

impl DailyRecord {
    pub fn from_rows(rows: Vec<DailyRow>) -> Self {
        DailyRecord { rows }
    }

    /// Load a record file, dispatching on extension: `.xlsx`/`.xls` are read
    /// as spreadsheets, anything else as headered CSV.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let record = match ext.as_str() {
            "xlsx" | "xls" => Self::from_spreadsheet(path)?,
            _ => {
                let reader = csv::Reader::from_path(path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                Self::from_csv(reader)?
            }
        };
        info!(
            "loaded {} daily rows from {}",
            record.len(),
            path.display()
        );
        Ok(record)
    }

    /// Read a headered CSV export of the station data.
    pub fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> anyhow::Result<Self> {
        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // header is row 0 in the file, so data lines start at 2
            let line = idx + 2;
            let record = result.with_context(|| format!("bad CSV record at line {line}"))?;
            rows.push(row_from_csv(&record, line)?);
        }
        Ok(DailyRecord { rows })
    }

    /// Read the first worksheet of an Excel workbook, skipping the header
    /// row and any fully empty rows.
    pub fn from_spreadsheet(path: &Path) -> anyhow::Result<Self> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .context("workbook has no sheets")?;
        let range = workbook
            .worksheet_range(&sheet)
            .with_context(|| format!("failed to read sheet '{sheet}'"))?;

        let mut rows = Vec::new();
        for (idx, cells) in range.rows().enumerate() {
            if idx == 0 || cells.iter().all(|c| matches!(c, Data::Empty)) {
                continue;
            }
            let line = idx + 1;
            rows.push(row_from_cells(cells, line)?);
        }
        Ok(DailyRecord { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&DailyRow> {
        self.rows.get(idx)
    }

    pub fn rows(&self) -> &[DailyRow] {
        &self.rows
    }

    /// Quality screen for one row. A row is invalid when `tmax` or `tmin`
    /// is missing, when either flag string is empty, or when any flag
    /// character belongs to the unacceptable set.
    ///
    /// This is a policy hook: the yearly driver does not consult it, and
    /// integrating it would change historical counts. The `audit` command
    /// surfaces what it would reject.
    pub fn row_is_valid(&self, idx: usize, unacceptable_flags: &[char]) -> bool {
        let Some(row) = self.rows.get(idx) else {
            return false;
        };
        if row.tmax.is_none() || row.tmin.is_none() {
            return false;
        }
        if row.tmax_flag.is_empty() || row.tmin_flag.is_empty() {
            return false;
        }
        !row
            .tmax_flag
            .chars()
            .chain(row.tmin_flag.chars())
            .any(|c| unacceptable_flags.contains(&c))
    }

    /// Indices of every row the quality screen rejects.
    pub fn invalid_rows(&self, unacceptable_flags: &[char]) -> Vec<usize> {
        (0..self.rows.len())
            .filter(|&idx| !self.row_is_valid(idx, unacceptable_flags))
            .collect()
    }
}

fn row_from_csv(record: &StringRecord, line: usize) -> anyhow::Result<DailyRow> {
    if record.len() < ROW_WIDTH {
        bail!(
            "line {line}: expected at least {ROW_WIDTH} columns, found {}",
            record.len()
        );
    }
    let field = |col: usize| record.get(col).unwrap_or("").trim();

    let month: u32 = field(MONTH_COL)
        .parse()
        .with_context(|| format!("line {line}: bad month '{}'", field(MONTH_COL)))?;
    let day: u32 = field(DAY_COL)
        .parse()
        .with_context(|| format!("line {line}: bad day '{}'", field(DAY_COL)))?;
    let year: i32 = field(YEAR_COL)
        .parse()
        .with_context(|| format!("line {line}: bad year '{}'", field(YEAR_COL)))?;

    let row = DailyRow {
        month,
        day,
        year,
        tmax: parse_temp(field(TMAX_COL))
            .with_context(|| format!("line {line}: bad tmax"))?,
        tmax_flag: field(TMAX_FLAG_COL).to_string(),
        tmin: parse_temp(field(TMIN_COL))
            .with_context(|| format!("line {line}: bad tmin"))?,
        tmin_flag: field(TMIN_FLAG_COL).to_string(),
        tavg: parse_temp(field(TAVG_COL))
            .with_context(|| format!("line {line}: bad tavg"))?,
    };
    warn_on_bad_date(&row, line);
    Ok(row)
}

fn row_from_cells(cells: &[Data], line: usize) -> anyhow::Result<DailyRow> {
    let row = DailyRow {
        month: cell_int(cells, MONTH_COL, line)? as u32,
        day: cell_int(cells, DAY_COL, line)? as u32,
        year: cell_int(cells, YEAR_COL, line)? as i32,
        tmax: cell_temp(cells, TMAX_COL, line)?,
        tmax_flag: cell_flag(cells, TMAX_FLAG_COL),
        tmin: cell_temp(cells, TMIN_COL, line)?,
        tmin_flag: cell_flag(cells, TMIN_FLAG_COL),
        tavg: cell_temp(cells, TAVG_COL, line)?,
    };
    warn_on_bad_date(&row, line);
    Ok(row)
}

fn warn_on_bad_date(row: &DailyRow, line: usize) {
    if NaiveDate::from_ymd_opt(row.year, row.month, row.day).is_none() {
        warn!(
            "line {line}: impossible calendar date {}-{:02}-{:02}",
            row.year, row.month, row.day
        );
    }
}

/// Parse a temperature cell from text. Empty and `NA`/`NaN` markers mean the
/// measurement is missing.
fn parse_temp(field: &str) -> anyhow::Result<Option<f64>> {
    if field.is_empty() || field.eq_ignore_ascii_case("na") || field.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value: f64 = field
        .parse()
        .with_context(|| format!("unparseable temperature '{field}'"))?;
    if value.is_nan() {
        return Ok(None);
    }
    Ok(Some(value))
}

fn cell_int(cells: &[Data], col: usize, line: usize) -> anyhow::Result<i64> {
    match cells.get(col) {
        Some(Data::Int(i)) => Ok(*i),
        Some(Data::Float(f)) => Ok(*f as i64),
        Some(Data::String(s)) => s
            .trim()
            .parse()
            .with_context(|| format!("row {line}: bad integer '{}' in column {col}", s.trim())),
        other => bail!("row {line}: expected integer in column {col}, found {other:?}"),
    }
}

fn cell_temp(cells: &[Data], col: usize, line: usize) -> anyhow::Result<Option<f64>> {
    match cells.get(col) {
        Some(Data::Float(f)) => Ok(Some(*f)),
        Some(Data::Int(i)) => Ok(Some(*i as f64)),
        Some(Data::String(s)) => parse_temp(s.trim())
            .with_context(|| format!("row {line}: bad temperature in column {col}")),
        Some(Data::Empty) | None => Ok(None),
        other => bail!("row {line}: expected temperature in column {col}, found {other:?}"),
    }
}

fn cell_flag(cells: &[Data], col: usize) -> String {
    match cells.get(col) {
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
station,date,month,day,year,tmax,tmax_flag,tmin,tmin_flag,tavg
GL04270,1958-01-01,1,1,1958,-2.1,a,-8.4,a,-5.0
GL04270,1958-01-02,1,2,1958,,a,-9.0,a,-6.2
GL04270,1958-01-03,1,3,1958,-1.0,,-7.7,a,-4.1
GL04270,1958-01-04,1,4,1958,-0.5,aI,-6.3,a,-3.3
GL04270,1958-01-05,1,5,1958,0.4,a,-5.1,a,-2.0
";

    fn sample_record() -> DailyRecord {
        let reader = csv::Reader::from_reader(SAMPLE_CSV.as_bytes());
        DailyRecord::from_csv(reader).unwrap()
    }

    #[test]
    fn csv_rows_parse_positionally() {
        let record = sample_record();
        assert_eq!(record.len(), 5);
        let first = record.get(0).unwrap();
        assert_eq!((first.year, first.month, first.day), (1958, 1, 1));
        assert_eq!(first.tmax, Some(-2.1));
        assert_eq!(first.tavg, Some(-5.0));
        assert_eq!(first.tmax_flag, "a");
    }

    #[test]
    fn empty_cell_is_missing_not_zero() {
        let record = sample_record();
        let second = record.get(1).unwrap();
        assert_eq!(second.tmax, None);
        assert_eq!(second.tmin, Some(-9.0));
    }

    #[test]
    fn validator_rejects_missing_measurements() {
        let record = sample_record();
        assert!(!record.row_is_valid(1, &['I']));
    }

    #[test]
    fn validator_rejects_empty_flag_strings() {
        let record = sample_record();
        assert!(!record.row_is_valid(2, &['I']));
    }

    #[test]
    fn validator_rejects_unacceptable_flag_codes() {
        let record = sample_record();
        assert!(!record.row_is_valid(3, &['I']));
        // same row passes when 'I' is not screened
        assert!(record.row_is_valid(3, &[]));
    }

    #[test]
    fn validator_accepts_clean_rows() {
        let record = sample_record();
        assert!(record.row_is_valid(0, &['I']));
        assert!(record.row_is_valid(4, &['I']));
    }

    #[test]
    fn validator_rejects_out_of_range_index() {
        let record = sample_record();
        assert!(!record.row_is_valid(99, &['I']));
    }

    #[test]
    fn invalid_rows_lists_every_rejection() {
        let record = sample_record();
        assert_eq!(record.invalid_rows(&['I']), vec![1, 2, 3]);
    }

    #[test]
    fn short_rows_are_an_error() {
        let csv = "a,b,c\n1,2,3\n";
        let reader = csv::Reader::from_reader(csv.as_bytes());
        assert!(DailyRecord::from_csv(reader).is_err());
    }

    #[test]
    fn temp_markers_parse_as_missing() {
        assert_eq!(parse_temp("").unwrap(), None);
        assert_eq!(parse_temp("NA").unwrap(), None);
        assert_eq!(parse_temp("NaN").unwrap(), None);
        assert_eq!(parse_temp("0.0").unwrap(), Some(0.0));
        assert!(parse_temp("cold").is_err());
    }

    #[test]
    fn spreadsheet_cells_convert_like_csv_fields() {
        let cells = vec![
            Data::String("GL04270".to_string()),
            Data::String("1958-01-01".to_string()),
            Data::Int(1),
            Data::Float(1.0),
            Data::Int(1958),
            Data::Empty,
            Data::String("a".to_string()),
            Data::Float(-8.4),
            Data::String(" a ".to_string()),
            Data::Float(-5.0),
        ];
        let row = row_from_cells(&cells, 2).unwrap();
        assert_eq!((row.year, row.month, row.day), (1958, 1, 1));
        assert_eq!(row.tmax, None);
        assert_eq!(row.tmin, Some(-8.4));
        assert_eq!(row.tmin_flag, "a");
        assert_eq!(row.tavg, Some(-5.0));
    }
}
