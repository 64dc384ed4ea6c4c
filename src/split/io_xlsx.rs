use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::split::*;

/// Reads a survey export from an Excel file.
///
/// Only one worksheet is read: the one given by name, or else the first one.
/// The first row holds the labels of the questions.
pub fn read_xlsx_table(path: &str, worksheet: Option<&str>) -> QsResult<ResponseTable> {
    let wrange = get_range(path, worksheet)?;

    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyInputSnafu { path })?
        .iter()
        .map(cell_to_string)
        .collect();
    debug!("read_xlsx_table: header: {:?}", header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        debug!("read_xlsx_table: idx: {:?} row: {:?}", idx, &cells);
        rows.push(cells);
    }
    Ok(ResponseTable::new(header, rows)?)
}

/// The text of a cell, as a spreadsheet would export it to CSV.
pub fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(true) => "TRUE".to_string(),
        DataType::Bool(false) => "FALSE".to_string(),
        DataType::DateTime(f) => match cell.as_datetime() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => f.to_string(),
        },
        DataType::Error(e) => format!("{:?}", e),
        DataType::Empty => String::new(),
        #[allow(unreachable_patterns)]
        _ => format!("{:?}", cell),
    }
}

fn get_range(path: &str, worksheet: Option<&str>) -> QsResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };
    Ok(wrange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(cell_to_string(&DataType::String("a b".to_string())), "a b");
        assert_eq!(cell_to_string(&DataType::Int(42)), "42");
        assert_eq!(cell_to_string(&DataType::Float(3.0)), "3");
        assert_eq!(cell_to_string(&DataType::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&DataType::Bool(true)), "TRUE");
        assert_eq!(cell_to_string(&DataType::Empty), "");
        // 2024-01-01 12:00:00
        assert_eq!(
            cell_to_string(&DataType::DateTime(45292.5)),
            "2024-01-01 12:00:00"
        );
    }

    const WORKBOOK: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/responses.xlsx");

    #[test]
    fn first_worksheet() {
        let table = read_xlsx_table(WORKBOOK, None).unwrap();
        assert_eq!(table.header(), &["Timestamp", "PIC", "Q1", "Score"]);
        assert_eq!(table.num_respondents(), 2);
        assert_eq!(table.row(0).unwrap(), &["2024-01-01", "A1", "no, thanks", "3"]);
        // Missing cells are read as empty answers.
        assert_eq!(table.row(1).unwrap(), &["2024-01-02", "", "", "4.5"]);
    }

    #[test]
    fn named_worksheet() {
        let table = read_xlsx_table(WORKBOOK, Some("Other")).unwrap();
        assert_eq!(table.header(), &["Only"]);
        assert_eq!(table.row(0).unwrap(), &["7"]);
        assert!(matches!(
            read_xlsx_table(WORKBOOK, Some("Missing")),
            Err(QualsplitError::MissingWorksheet { .. })
        ));
    }

    #[test]
    fn missing_workbook() {
        assert!(matches!(
            read_xlsx_table("/nonexistent/survey.xlsx", None),
            Err(QualsplitError::OpeningExcel { .. })
        ));
    }
}
