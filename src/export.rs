use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::api::models::{display_value, Row};

/// Encodes query results as CSV: a header of column names, then one line
/// per row in column order. Fields are quoted only when they contain a
/// comma, a quote or a line break; embedded quotes are doubled.
pub fn results_to_csv(columns: &[String], rows: &[Row]) -> Result<Vec<u8>, csv::Error> {
    let mut out = Vec::new();
    write_line(&mut out, columns)?;
    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|column| display_value(row.get(column)))
            .collect();
        write_line(&mut out, &fields)?;
    }
    Ok(out)
}

fn write_line(out: &mut Vec<u8>, fields: &[String]) -> Result<(), csv::Error> {
    // The writer renders a lone empty field as `""`; that line is just blank
    if fields.len() <= 1 && fields.iter().all(String::is_empty) {
        out.push(b'\n');
        return Ok(());
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(fields)?;

    let line = writer.into_inner().map_err(|e| {
        csv::Error::from(std::io::Error::new(e.error().kind(), e.error().to_string()))
    })?;
    out.extend_from_slice(&line);
    Ok(())
}
