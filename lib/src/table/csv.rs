//! CSV encoding and decoding for [`RecordTable`].
//!
//! The first record is the header. Column types are inferred per column:
//! integers if every non-empty cell parses as `i64`, floats if every non-empty
//! cell parses as `f64`, text otherwise. Empty cells become [`Value::Null`].

use super::{Column, RecordTable, TableError, Value};
use ::csv::{ReaderBuilder, Writer};
use std::io::{Read, Write};

/// Decode a CSV stream into a table.
pub fn decode_csv<R: Read>(reader: R) -> Result<RecordTable, TableError> {
    let mut rdr = ReaderBuilder::new().trim(::csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result?;
        for (idx, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(idx).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    RecordTable::from_columns(columns)
}

/// Encode a table as CSV with a header row.
pub fn encode_csv<W: Write>(table: &RecordTable, writer: W) -> Result<(), TableError> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(table.column_names())?;
    for row in 0..table.n_rows() {
        wtr.write_record(
            table
                .columns()
                .iter()
                .map(|column| cell_text(&column.values()[row])),
        )?;
    }
    wtr.flush().map_err(::csv::Error::from)?;
    Ok(())
}

/// Floats keep their decimal point so whole values decode as floats again.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Float(v) => format!("{:?}", v),
        other => other.to_string(),
    }
}

fn infer_column(name: String, cells: Vec<String>) -> Column {
    let non_empty = || cells.iter().filter(|c| !c.is_empty());

    let values = if non_empty().all(|c| c.parse::<i64>().is_ok()) {
        cells
            .iter()
            .map(|c| c.parse().map(Value::Int).unwrap_or(Value::Null))
            .collect()
    } else if non_empty().all(|c| c.parse::<f64>().is_ok()) {
        cells
            .iter()
            .map(|c| c.parse().map(Value::Float).unwrap_or(Value::Null))
            .collect()
    } else {
        cells
            .into_iter()
            .map(|c| if c.is_empty() { Value::Null } else { Value::Text(c) })
            .collect()
    };
    Column::new(name, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_infers_column_types() {
        let data = "Diabetes_012,BMI,Sex,Note\n0,24.5,1,ok\n2,31,0,\n1,,1,fine\n";
        let table = decode_csv(data.as_bytes()).unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(
            table.column("Diabetes_012").unwrap().values(),
            &[Value::Int(0), Value::Int(2), Value::Int(1)]
        );
        assert_eq!(
            table.column("BMI").unwrap().values(),
            &[Value::Float(24.5), Value::Float(31.0), Value::Null]
        );
        assert_eq!(
            table.column("Note").unwrap().values(),
            &[Value::Text("ok".into()), Value::Null, Value::Text("fine".into())]
        );
    }

    #[test]
    fn test_decode_header_only() {
        let table = decode_csv("a,b\n".as_bytes()).unwrap();
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.n_rows(), 0);
    }

    #[test]
    fn test_encode_then_decode_keeps_values() {
        let table = RecordTable::from_columns(vec![
            Column::new("Age", vec![Value::Int(1), Value::Int(12)]),
            Column::new("BMI", vec![Value::Float(20.5), Value::Null]),
        ])
        .unwrap();

        let mut buf = Vec::new();
        encode_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("Age,BMI\n1,20.5\n"));

        let decoded = decode_csv(buf.as_slice()).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_whole_floats_stay_floats() {
        let table = RecordTable::from_columns(vec![Column::new(
            "BMI",
            vec![Value::Float(1.0), Value::Float(2.0), Value::Null],
        )])
        .unwrap();

        let mut buf = Vec::new();
        encode_csv(&table, &mut buf).unwrap();
        assert!(String::from_utf8(buf.clone()).unwrap().starts_with("BMI\n1.0\n2.0\n"));

        let decoded = decode_csv(buf.as_slice()).unwrap();
        assert_eq!(decoded, table);
    }
}
