//! Order-line loading and result-table export using Polars

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use polars::prelude::*;

use crate::annotate::{AnnotatedItemset, AnnotatedRule};
use crate::transaction::OrderRecord;

/// File name of the exported frequent-itemset table.
pub const ITEMSETS_FILE: &str = "frequent_itemsets.csv";
/// File name of the exported association-rule table.
pub const RULES_FILE: &str = "association_rules.csv";

/// Which CSV columns hold the order id, item id and item name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordColumns {
    pub order_id: String,
    pub item_id: String,
    /// Optional; items without a name are shown with a placeholder
    pub item_name: Option<String>,
    /// Item ids dropped before grouping (packaging, shipping fees, ...)
    pub excluded_items: Vec<String>,
}

impl Default for RecordColumns {
    fn default() -> Self {
        Self {
            order_id: "order_id".to_string(),
            item_id: "item_id".to_string(),
            item_name: Some("item_name".to_string()),
            excluded_items: Vec::new(),
        }
    }
}

/// Load order lines from a CSV file
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `columns` - Column mapping and item exclusions
///
/// # Returns
/// * One `OrderRecord` per row with a non-blank order id and item id
/// * An empty `Vec` when every row was filtered out; the transaction builder
///   reports that as empty input
pub fn load_order_records(
    file_path: &Path,
    columns: &RecordColumns,
) -> crate::Result<Vec<OrderRecord>> {
    // Every column as text: ids such as "0042" must not be parsed as numbers
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))
        .with_context(|| format!("failed to open CSV {}", file_path.display()))?
        .finish()
        .with_context(|| format!("failed to parse CSV {}", file_path.display()))?;

    for required in [&columns.order_id, &columns.item_id] {
        if df.column(required).is_err() {
            anyhow::bail!(
                "required column '{}' not found in {}",
                required,
                file_path.display()
            );
        }
    }

    let df = df
        .lazy()
        .filter(
            col(columns.order_id.as_str())
                .is_not_null()
                .and(col(columns.item_id.as_str()).is_not_null()),
        )
        .collect()?;

    let orders = df.column(&columns.order_id)?.str()?;
    let items = df.column(&columns.item_id)?.str()?;
    let names = match &columns.item_name {
        Some(name_col) => match df.column(name_col) {
            Ok(column) => Some(column.str()?),
            Err(_) => {
                tracing::warn!(
                    column = %name_col,
                    "item name column missing, names will be placeholders"
                );
                None
            }
        },
        None => None,
    };

    let excluded: HashSet<&str> = columns.excluded_items.iter().map(String::as_str).collect();
    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for row in 0..df.height() {
        let (Some(order), Some(item)) = (orders.get(row), items.get(row)) else {
            skipped += 1;
            continue;
        };
        let (order, item) = (order.trim(), item.trim());
        if order.is_empty() || item.is_empty() || excluded.contains(item) {
            skipped += 1;
            continue;
        }

        let name = names
            .and_then(|n| n.get(row))
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        records.push(OrderRecord {
            order_id: order.to_string(),
            item_id: item.to_string(),
            item_name: name,
        });
    }

    tracing::info!(
        path = %file_path.display(),
        rows = df.height(),
        records = records.len(),
        skipped,
        "order lines loaded"
    );

    if records.is_empty() {
        tracing::warn!(path = %file_path.display(), "no usable order lines");
    }

    Ok(records)
}

/// Load and concatenate order lines from several CSV files
///
/// A file that cannot be read or lacks a required column is logged and
/// skipped. Fails only when no file could be loaded at all.
pub fn load_order_files(
    file_paths: &[PathBuf],
    columns: &RecordColumns,
) -> crate::Result<Vec<OrderRecord>> {
    let mut records = Vec::new();
    let mut loaded = 0usize;

    for path in file_paths {
        match load_order_records(path, columns) {
            Ok(file_records) => {
                loaded += 1;
                records.extend(file_records);
            }
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %format!("{error:#}"),
                    "skipping input file"
                );
            }
        }
    }

    if loaded == 0 {
        anyhow::bail!("none of the {} input files could be loaded", file_paths.len());
    }

    tracing::info!(files = loaded, records = records.len(), "input files merged");
    Ok(records)
}

/// Write the frequent-itemset table as CSV.
pub fn write_itemsets_csv(rows: &[AnnotatedItemset], path: &Path) -> crate::Result<()> {
    let mut df = DataFrame::new(vec![
        Series::new("items".into(), join_all(rows.iter().map(|r| &r.items))).into_column(),
        Series::new("names".into(), join_all(rows.iter().map(|r| &r.names))).into_column(),
        Series::new("size".into(), rows.iter().map(|r| r.size as u64).collect::<Vec<_>>())
            .into_column(),
        Series::new("support".into(), rows.iter().map(|r| r.support).collect::<Vec<_>>())
            .into_column(),
        Series::new(
            "order_count".into(),
            rows.iter().map(|r| r.order_count as u64).collect::<Vec<_>>(),
        )
        .into_column(),
    ])?;
    write_frame(&mut df, path)
}

/// Write the association-rule table as CSV.
pub fn write_rules_csv(rows: &[AnnotatedRule], path: &Path) -> crate::Result<()> {
    let metric = |name: &str, f: fn(&AnnotatedRule) -> f64| {
        Series::new(name.into(), rows.iter().map(f).collect::<Vec<_>>()).into_column()
    };

    let mut df = DataFrame::new(vec![
        Series::new("antecedent".into(), join_all(rows.iter().map(|r| &r.antecedent)))
            .into_column(),
        Series::new("consequent".into(), join_all(rows.iter().map(|r| &r.consequent)))
            .into_column(),
        metric("support", |r| r.support),
        metric("confidence", |r| r.confidence),
        metric("lift", |r| r.lift),
        metric("leverage", |r| r.leverage),
        metric("conviction", |r| r.conviction),
        Series::new(
            "antecedent_names".into(),
            join_all(rows.iter().map(|r| &r.antecedent_names)),
        )
        .into_column(),
        Series::new(
            "consequent_names".into(),
            join_all(rows.iter().map(|r| &r.consequent_names)),
        )
        .into_column(),
        Series::new(
            "order_count".into(),
            rows.iter().map(|r| r.order_count as u64).collect::<Vec<_>>(),
        )
        .into_column(),
    ])?;
    write_frame(&mut df, path)
}

/// Write both tables into `output_dir`, creating it if needed.
///
/// Returns the paths of the itemset and rule files.
pub fn write_report_tables(
    itemsets: &[AnnotatedItemset],
    rules: &[AnnotatedRule],
    output_dir: &Path,
) -> crate::Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let itemsets_path = output_dir.join(ITEMSETS_FILE);
    let rules_path = output_dir.join(RULES_FILE);
    write_itemsets_csv(itemsets, &itemsets_path)?;
    write_rules_csv(rules, &rules_path)?;
    Ok((itemsets_path, rules_path))
}

fn join_all<'a>(lists: impl Iterator<Item = &'a Vec<String>>) -> Vec<String> {
    lists.map(|list| list.join(", ")).collect()
}

fn write_frame(df: &mut DataFrame, path: &Path) -> crate::Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    tracing::debug!(path = %path.display(), rows = df.height(), "table written");
    Ok(())
}
