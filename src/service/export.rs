use crate::models::MilkEntry;
use std::io::Write;

const HEADER: [&str; 8] = [
    "date",
    "shift",
    "customer_id",
    "fat",
    "snf",
    "liters",
    "amount",
    "entry_id",
];

/// Write entries as CSV (header + one row per entry, in the given order)
pub fn write_entries_csv<W: Write>(entries: &[MilkEntry], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADER)?;

    for entry in entries {
        writer.write_record(&[
            entry.date.format("%Y-%m-%d").to_string(),
            entry.shift.map(|s| s.to_string()).unwrap_or_default(),
            entry.customer_id.to_string(),
            entry.fat.to_string(),
            entry.snf.to_string(),
            entry.liters.to_string(),
            entry.amount.to_string(),
            entry.id.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Shift;
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    #[test]
    fn writes_header_and_rows() {
        let entry = MilkEntry {
            id: Uuid::nil(),
            dairy_id: Uuid::nil(),
            customer_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            shift: Some(Shift::Evening),
            fat: BigDecimal::from_str("4.0").unwrap(),
            snf: BigDecimal::from_str("8.5").unwrap(),
            liters: BigDecimal::from_str("10.555").unwrap(),
            amount: BigDecimal::from_str("474.98").unwrap(),
            created_at: Utc::now(),
        };

        let mut out = Vec::new();
        write_entries_csv(&[entry], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "date,shift,customer_id,fat,snf,liters,amount,entry_id");
        assert_eq!(
            lines[1],
            format!(
                "2024-03-15,evening,{nil},4.0,8.5,10.555,474.98,{nil}",
                nil = Uuid::nil()
            )
        );
        assert_eq!(lines.len(), 2);
    }
}
