use std::cmp;

use anyhow::Result;

use crate::models::{AnalyzeResponse, Record, StringProperties};

/// Render a single record in human-readable text form.
pub fn print_record_text(record: &Record) -> Result<()> {
    println!("{}", record.value);
    print_properties_indented(&record.properties);
    println!("  created_at        : {}", record.created_at);
    println!("  id                : {}", record.id);
    Ok(())
}

/// Render an analysis result in human-readable text form.
pub fn print_analysis_text(analysis: &AnalyzeResponse) -> Result<()> {
    println!("{}", analysis.value);
    print_properties_indented(&analysis.properties);
    Ok(())
}

fn print_properties_indented(properties: &StringProperties) {
    println!("  length            : {}", properties.length);
    println!("  palindrome        : {}", properties.is_palindrome);
    println!("  unique_characters : {}", properties.unique_characters);
    println!("  word_count        : {}", properties.word_count);
    println!("  hash              : {}", properties.hash);
}

/// Render a list of records, one text block per record separated by
/// blank lines.
pub fn print_records_text(records: &[Record]) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_record_text(record)?;
    }

    println!();
    println!("{} record(s)", records.len());
    Ok(())
}

/// Render a list of records as an aligned table.
pub fn print_records_table(records: &[Record]) -> Result<()> {
    let headers = ["VALUE", "LENGTH", "PALINDROME", "WORDS", "UNIQUE", "CREATED"];

    let rows: Vec<[String; 6]> = records
        .iter()
        .map(|record| {
            [
                record.value.clone(),
                record.properties.length.to_string(),
                record.properties.is_palindrome.to_string(),
                record.properties.word_count.to_string(),
                record.properties.unique_characters.to_string(),
                record.created_at.clone(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = cmp::max(widths[i], cell.len());
        }
    }

    let print_row = |cells: &[String; 6]| {
        let line = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    };

    print_row(&headers.map(str::to_string));
    for row in &rows {
        print_row(row);
    }

    println!();
    println!("{} record(s)", records.len());
    Ok(())
}
