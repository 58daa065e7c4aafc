use insight_infer::{
    infer_column_roles, infer_table, score_table, select_best_sheet, ColumnRole,
    InferenceOptions, ScoringOptions,
};
use insight_model::import::{read_csv_grid, CsvOptions};
use insight_model::{grid, CellValue, Grid, SheetGrid};
use pretty_assertions::assert_eq;

fn grid_from_csv(text: &str) -> Grid {
    read_csv_grid(text.as_bytes(), &CsvOptions::default()).expect("csv parses")
}

#[test]
fn exported_report_with_title_and_footer() {
    let g = grid![
        ["Quarterly sales report"],
        [CellValue::Empty],
        ["Region", "Month", "Revenue", "Notes"],
        ["East", "2024-01-01", 100.0, CellValue::Empty],
        [CellValue::Empty],
        [CellValue::Empty],
        ["West", "2024-02-01", 200.0, CellValue::Empty],
        [CellValue::Empty],
        [CellValue::Empty],
        [CellValue::Empty],
        ["Generated by ExportTool v2"],
    ];

    let table = infer_table(&g);
    assert_eq!(table.header_row_index, 2);
    // `Notes` is labeled but never filled in.
    assert_eq!(table.headers, vec!["Region", "Month", "Revenue"]);
    // The two-row gap inside the data survives; the three-row gap ends the table.
    assert_eq!(table.row_count(), 6);
    assert_eq!(table.trimmed_footer_rows, 2);
    assert_eq!(table.rows[3].get("Revenue"), Some(&CellValue::Number(200.0)));
    assert!(table.rows[5].values().iter().all(CellValue::is_blank));

    let roles = infer_column_roles(&table);
    assert_eq!(roles.get("Region"), Some(ColumnRole::Category));
    assert_eq!(roles.get("Revenue"), Some(ColumnRole::Metric));
}

#[test]
fn header_row_from_csv_input() {
    let g = grid_from_csv(
        "Sales export,,\n\
         ,,\n\
         order_id,date,amount\n\
         1,2024-01-05,12.50\n\
         2,2024-01-06,\"1,200.00\"\n\
         3,2024-01-07,7\n",
    );

    let table = infer_table(&g);
    assert_eq!(table.header_row_index, 2);
    assert_eq!(table.headers, vec!["order_id", "date", "amount"]);
    assert_eq!(table.row_count(), 3);

    let roles = infer_column_roles(&table);
    assert_eq!(roles.get("order_id"), Some(ColumnRole::Id));
    assert_eq!(roles.get("date"), Some(ColumnRole::Date));
    assert_eq!(roles.get("amount"), Some(ColumnRole::Metric));
}

#[test]
fn reinferring_a_clean_table_is_stable() {
    let g = grid![
        ["Report"],
        ["Name", "Score"],
        ["a", 1.0],
        ["b", 2.0],
    ];
    let first = infer_table(&g);

    let mut rows = vec![first
        .headers
        .iter()
        .map(|h| CellValue::from(h.as_str()))
        .collect::<Vec<_>>()];
    rows.extend(first.rows.iter().map(|r| r.values().to_vec()));
    let second = infer_table(&Grid::from_rows(rows));

    assert_eq!(second.header_row_index, 0);
    assert_eq!(second.headers, first.headers);
    assert_eq!(second.rows, first.rows);
}

#[test]
fn workbook_picks_the_data_sheet() {
    let readme = SheetGrid::new(
        "ReadMe",
        grid![["This workbook contains monthly figures."], ["See the Data tab."]],
    );
    let mut data_rows = vec![vec![
        CellValue::from("Month"),
        CellValue::from("Units"),
        CellValue::from("Revenue"),
        CellValue::from("Cost"),
        CellValue::from("Region"),
    ]];
    for i in 0..24 {
        data_rows.push(vec![
            CellValue::from(format!("2022-{:02}", i % 12 + 1)),
            CellValue::from(i as f64),
            CellValue::from(i as f64 * 10.0),
            CellValue::from(i as f64 * 4.0),
            CellValue::from(if i % 2 == 0 { "East" } else { "West" }),
        ]);
    }
    let data = SheetGrid::new("Data", Grid::from_rows(data_rows));

    let choice = select_best_sheet(
        &[readme, data],
        &InferenceOptions::default(),
        &ScoringOptions::default(),
    )
    .expect("two candidates");
    assert_eq!(choice.name, "Data");
    // wide + long + three numeric columns
    assert_eq!(choice.score, 23.0);
    assert_eq!(score_table(&choice.table, &ScoringOptions::default()), 23.0);
}
