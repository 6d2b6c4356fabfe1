//! Integration tests for BasketForge

use basketforge::data::{ITEMSETS_FILE, RULES_FILE};
use basketforge::{
    load_order_files, load_order_records, run_analysis, write_report_tables, AnalysisOptions,
    MiningError, MiningParams, NullSink, RecordColumns,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::{tempdir, NamedTempFile};

/// Create a test CSV file with sample order lines
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "order_id,shop,customer,item_id,item_name").unwrap();

    // Lantern and holder bought together three times
    writeln!(file, "1001,North,C1,85123A,WHITE HANGING HEART T-LIGHT HOLDER").unwrap();
    writeln!(file, "1001,North,C1,71053,WHITE METAL LANTERN").unwrap();
    writeln!(file, "1001,North,C1,ICEPACK,Ice pack").unwrap();
    writeln!(file, "1002,North,C2,85123A,WHITE HANGING HEART T-LIGHT HOLDER").unwrap();
    writeln!(file, "1002,North,C2,71053,WHITE METAL LANTERN").unwrap();
    writeln!(file, "1002,North,C2,22633,HAND WARMER UNION JACK").unwrap();
    writeln!(file, "1003,South,C3,85123A,WHITE HANGING HEART T-LIGHT HOLDER").unwrap();
    writeln!(file, "1003,South,C3,71053,WHITE METAL LANTERN").unwrap();
    // Duplicate line within one order
    writeln!(file, "1003,South,C3,71053,WHITE METAL LANTERN").unwrap();

    // Hand warmer with chalkboard
    writeln!(file, "1004,South,C4,22633,HAND WARMER UNION JACK").unwrap();
    writeln!(file, "1004,South,C4,22457,").unwrap();

    // Single-item orders, discarded
    writeln!(file, "1005,South,C5,22457,NATURAL SLATE HEART CHALKBOARD").unwrap();
    writeln!(file, "1006,South,C6,ICEPACK,Ice pack").unwrap();
    writeln!(file, "1006,South,C6,85123A,WHITE HANGING HEART T-LIGHT HOLDER").unwrap();

    file
}

fn columns() -> RecordColumns {
    RecordColumns {
        excluded_items: vec!["ICEPACK".to_string()],
        ..RecordColumns::default()
    }
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_csv();
    let records = load_order_records(test_file.path(), &columns()).unwrap();
    assert_eq!(records.len(), 12);

    let report = run_analysis(
        &records,
        &MiningParams::new(Some(0.5), Some(0.7)),
        &AnalysisOptions::default(),
        &NullSink,
    )
    .unwrap();

    assert_eq!(report.total_orders, 6);
    assert_eq!(report.transaction_count, 4);

    let pair = report
        .itemsets
        .iter()
        .find(|r| r.items == ["71053", "85123A"])
        .unwrap();
    assert_eq!(pair.support, 0.75);
    assert_eq!(pair.order_count, 3);
    assert_eq!(pair.names, ["WHITE METAL LANTERN", "WHITE HANGING HEART T-LIGHT HOLDER"]);

    let rule = report
        .rules
        .iter()
        .find(|r| r.antecedent == ["71053"] && r.consequent == ["85123A"])
        .unwrap();
    assert_eq!(rule.confidence, 1.0);
    assert_eq!(rule.order_count, 3);
    assert!((rule.lift - 4.0 / 3.0).abs() < 1e-12);

    // The chalkboard is in one basket of four, below the threshold
    assert!(report.rules.iter().all(|r| !r.antecedent.contains(&"22457".to_string())));
}

#[test]
fn test_default_parameters() {
    let test_file = create_test_csv();
    let records = load_order_records(test_file.path(), &columns()).unwrap();

    let report = run_analysis(
        &records,
        &MiningParams::default(),
        &AnalysisOptions::default(),
        &NullSink,
    )
    .unwrap();

    assert_eq!(report.params.min_support, 0.25);
    assert_eq!(report.params.min_confidence, 0.6);

    // The only retained chalkboard line has a blank name
    let chalkboard = report
        .itemsets
        .iter()
        .find(|r| r.items == ["22457"])
        .unwrap();
    assert_eq!(chalkboard.names, ["unknown(22457)"]);
}

#[test]
fn test_tables_written() {
    let test_file = create_test_csv();
    let records = load_order_records(test_file.path(), &columns()).unwrap();
    let report = run_analysis(
        &records,
        &MiningParams::new(Some(0.5), None),
        &AnalysisOptions::default(),
        &NullSink,
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let (itemsets_path, rules_path) =
        write_report_tables(&report.itemsets, &report.rules, dir.path()).unwrap();

    assert_eq!(itemsets_path, dir.path().join(ITEMSETS_FILE));
    assert_eq!(rules_path, dir.path().join(RULES_FILE));
    let itemsets_csv = std::fs::read_to_string(itemsets_path).unwrap();
    assert_eq!(itemsets_csv.lines().count(), report.itemsets.len() + 1);
    let rules_csv = std::fs::read_to_string(rules_path).unwrap();
    assert_eq!(rules_csv.lines().count(), report.rules.len() + 1);
}

#[test]
fn test_error_handling_invalid_parameters() {
    let test_file = create_test_csv();
    let records = load_order_records(test_file.path(), &columns()).unwrap();

    let result = run_analysis(
        &records,
        &MiningParams::new(Some(1.5), None),
        &AnalysisOptions::default(),
        &NullSink,
    );
    assert!(matches!(
        result,
        Err(MiningError::InvalidParameter { name: "min_support", .. })
    ));

    let result = run_analysis(
        &records,
        &MiningParams::new(None, Some(-0.1)),
        &AnalysisOptions::default(),
        &NullSink,
    );
    assert!(matches!(
        result,
        Err(MiningError::InvalidParameter { name: "min_confidence", .. })
    ));
}

#[test]
fn test_error_handling_single_item_orders() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "order_id,item_id,item_name").unwrap();
    writeln!(file, "1,a,Apple").unwrap();
    writeln!(file, "2,b,Bread").unwrap();
    writeln!(file, "2,b,Bread").unwrap();

    let records = load_order_records(file.path(), &RecordColumns::default()).unwrap();
    let result = run_analysis(
        &records,
        &MiningParams::default(),
        &AnalysisOptions::default(),
        &NullSink,
    );
    assert!(matches!(result, Err(MiningError::EmptyInput { orders: 2 })));
}

#[test]
fn test_zero_rules_is_not_an_error() {
    let test_file = create_test_csv();
    let records = load_order_records(test_file.path(), &columns()).unwrap();

    let report = run_analysis(
        &records,
        &MiningParams::new(Some(1.0), Some(1.0)),
        &AnalysisOptions::default(),
        &NullSink,
    )
    .unwrap();
    assert!(report.itemsets.is_empty());
    assert!(report.rules.is_empty());
}

fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

#[test]
fn test_orders_split_across_files() {
    // Each file alone holds only single-item orders
    let january = write_csv(&["order_id,item_id,item_name", "1,a,Apple", "2,c,Cheese"]);
    let february = write_csv(&["order_id,item_id,item_name", "1,b,Bread", "2,d,Dates"]);
    let broken = write_csv(&["invoice,sku", "1,a"]);

    let alone = load_order_records(january.path(), &RecordColumns::default()).unwrap();
    let result = run_analysis(
        &alone,
        &MiningParams::default(),
        &AnalysisOptions::default(),
        &NullSink,
    );
    assert!(matches!(result, Err(MiningError::EmptyInput { orders: 2 })));

    let paths: Vec<PathBuf> = [&january, &broken, &february]
        .iter()
        .map(|file| file.path().to_path_buf())
        .collect();
    let records = load_order_files(&paths, &RecordColumns::default()).unwrap();
    assert_eq!(records.len(), 4);

    let report = run_analysis(
        &records,
        &MiningParams::new(Some(0.5), Some(1.0)),
        &AnalysisOptions::default(),
        &NullSink,
    )
    .unwrap();
    assert_eq!(report.total_orders, 2);
    assert_eq!(report.transaction_count, 2);
    assert!(report.itemsets.iter().any(|r| r.items == ["a", "b"]));
    assert!(report.itemsets.iter().any(|r| r.items == ["c", "d"]));
    assert_eq!(report.rules.len(), 4);
}

#[test]
fn test_no_loadable_input_files() {
    let broken = write_csv(&["invoice,sku", "1,a"]);
    let paths = vec![broken.path().to_path_buf(), PathBuf::from("/nonexistent/orders.csv")];
    assert!(load_order_files(&paths, &RecordColumns::default()).is_err());
}

#[test]
fn test_fully_excluded_input_is_empty() {
    let file = write_csv(&[
        "order_id,item_id,item_name",
        "1,ICEPACK,Ice pack",
        "2,ICEPACK,Ice pack",
    ]);
    let records = load_order_records(file.path(), &columns()).unwrap();
    assert!(records.is_empty());

    let result = run_analysis(
        &records,
        &MiningParams::default(),
        &AnalysisOptions::default(),
        &NullSink,
    );
    assert!(matches!(result, Err(MiningError::EmptyInput { orders: 0 })));
}
