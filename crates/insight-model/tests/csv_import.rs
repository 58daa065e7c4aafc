use insight_model::import::{read_csv_grid, CsvImportError, CsvOptions, CsvTextEncoding};
use insight_model::{load_sheets, CellValue};
use pretty_assertions::assert_eq;

#[test]
fn messy_export_keeps_title_rows_and_blank_separators() {
    let input = "Quarterly report,,\n,,\nName,Revenue,Region\n\
                 Alice,100,East\n,,\nBob,\"1,200\",West\n";
    let grid = read_csv_grid(input.as_bytes(), &CsvOptions::default()).unwrap();

    assert_eq!(grid.len(), 6);
    assert_eq!(grid.cell(0, 0), &CellValue::String("Quarterly report".into()));
    assert!(grid.row(1).iter().all(CellValue::is_blank));
    assert_eq!(grid.cell(3, 1), &CellValue::Number(100.0));
    assert_eq!(grid.cell(5, 1), &CellValue::Number(1200.0));
}

#[test]
fn ragged_rows_keep_their_own_length() {
    let input = "a,b,c\n1\n2,3\n";
    let grid = read_csv_grid(input.as_bytes(), &CsvOptions::default()).unwrap();
    assert_eq!(grid.row(0).len(), 3);
    assert_eq!(grid.row(1).len(), 1);
    assert_eq!(grid.row(2).len(), 2);
    assert_eq!(grid.width(), 3);
}

#[test]
fn utf8_bom_is_stripped_from_first_field() {
    let mut input = vec![0xEF, 0xBB, 0xBF];
    input.extend_from_slice(b"Name,Value\nx,1\n");
    let grid = read_csv_grid(input.as_slice(), &CsvOptions::default()).unwrap();
    assert_eq!(grid.cell(0, 0), &CellValue::String("Name".into()));
}

#[test]
fn auto_encoding_falls_back_to_windows_1252() {
    // "Caf\xE9" is "Café" in Windows-1252 and invalid UTF-8.
    let input: &[u8] = b"Caf\xE9,1\n";
    let grid = read_csv_grid(input, &CsvOptions::default()).unwrap();
    assert_eq!(grid.cell(0, 0), &CellValue::String("Café".into()));

    let strict = CsvOptions {
        encoding: CsvTextEncoding::Utf8,
        ..CsvOptions::default()
    };
    let err = read_csv_grid(input, &strict).unwrap_err();
    assert!(matches!(err, CsvImportError::Parse { row: 1, column: 1, .. }));
}

#[test]
fn empty_input_is_an_error() {
    let err = read_csv_grid(&b""[..], &CsvOptions::default()).unwrap_err();
    assert!(matches!(err, CsvImportError::EmptyInput));
}

#[test]
fn max_rows_bounds_the_read() {
    let input = "a\n1\n2\n3\n4\n";
    let options = CsvOptions {
        max_rows: Some(2),
        ..CsvOptions::default()
    };
    let grid = read_csv_grid(input.as_bytes(), &options).unwrap();
    assert_eq!(grid.len(), 2);
}

#[test]
fn load_sheets_names_csv_sheet_after_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.tsv");
    std::fs::write(&path, "Month\tRevenue\n2024-01\t10\n").unwrap();

    let sheets = load_sheets(&path, None, 8).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, "sales");
    assert_eq!(sheets[0].grid.cell(1, 1), &CellValue::Number(10.0));
}
