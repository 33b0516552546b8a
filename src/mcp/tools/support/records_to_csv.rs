/// Renders a header and rows as CSV text.
pub fn records_to_csv<R, I>(header: &[&str], rows: R) -> Result<String, String>
where
    R: IntoIterator<Item = I>,
    I: IntoIterator<Item = String>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(header)
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for row in rows {
        let row: Vec<String> = row.into_iter().collect();
        wtr.write_record(&row)
            .map_err(|e| format!("Failed to write CSV row: {}", e))?;
    }

    wtr.flush()
        .map_err(|e| format!("Failed to flush CSV writer: {}", e))?;

    let csv_bytes = wtr
        .into_inner()
        .map_err(|e| format!("Failed to get CSV bytes: {}", e))?;

    String::from_utf8(csv_bytes).map_err(|e| format!("Failed to convert CSV to string: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_fields_with_commas() {
        let csv = records_to_csv(
            &["name", "limit"],
            vec![
                vec!["Doing, now".to_string(), "5".to_string()],
                vec!["Done".to_string(), "0".to_string()],
            ],
        )
        .unwrap();
        assert_eq!(csv, "name,limit\n\"Doing, now\",5\nDone,0\n");
    }
}
