// Primitives for reading CSV files.

use crate::split::*;

/// Reads a CSV survey export. The first line holds the labels of the questions.
///
/// Lines of different lengths are accepted by the reader and reported by the
/// response table, with their line number.
pub fn read_csv_table(path: &str) -> QsResult<ResponseTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut header: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, &row);
        if header.is_none() {
            header = Some(strip_bom(row));
        } else {
            rows.push(row);
        }
    }
    let header = header.context(EmptyInputSnafu { path })?;
    Ok(ResponseTable::new(header, rows)?)
}

// Exports from spreadsheets often start with a byte order mark.
fn strip_bom(mut row: Vec<String>) -> Vec<String> {
    if let Some(first) = row.first_mut() {
        if let Some(s) = first.strip_prefix('\u{feff}') {
            *first = s.to_string();
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn read_quoted_cells() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("in.csv");
        fs::write(
            &p,
            "\u{feff}Timestamp,Why?\n2024-01-01,\"because, well\"\n2024-01-02,\n",
        )
        .unwrap();
        let table = read_csv_table(&p.display().to_string()).unwrap();
        assert_eq!(table.header(), &["Timestamp".to_string(), "Why?".to_string()]);
        assert_eq!(table.num_respondents(), 2);
        assert_eq!(table.rows()[0][1], "because, well");
        assert_eq!(table.rows()[1][1], "");
    }

    #[test]
    fn short_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("in.csv");
        fs::write(&p, "a,b,c\n1,2,3\n4,5\n").unwrap();
        let res = read_csv_table(&p.display().to_string());
        assert!(matches!(
            res,
            Err(QualsplitError::Split {
                source: SplitError::IngestionShape {
                    lineno: 3,
                    expected: 3,
                    found: 2
                }
            })
        ));
    }

    #[test]
    fn empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("in.csv");
        fs::write(&p, "").unwrap();
        assert!(matches!(
            read_csv_table(&p.display().to_string()),
            Err(QualsplitError::EmptyInput { .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_csv_table("/nonexistent/in.csv"),
            Err(QualsplitError::CsvOpen { .. })
        ));
    }
}
