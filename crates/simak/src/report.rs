//! Plain-text reports: the single-record case card and the recap table.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};

use crate::record::ViolationRecord;

const ORGANIZATION: &str = "BRIGADE INFANTERI 4/DEWA RATNA";
const CARD_TITLE: &str = "KARTU DATA PELANGGARAN HUKUM";
const RECAP_TITLE: &str = "REKAPITULASI PELANGGARAN HUKUM";
const RECAP_HEADERS: [&str; 6] = ["No", "Nama / Pkt / NRP", "Satuan", "Perkara", "Status", "Tanggal"];

/// Suggested file name (without extension) for a record's card.
///
/// Whitespace and path separators in the name become underscores.
#[must_use]
pub fn card_file_name(record: &ViolationRecord) -> String {
    let name: Vec<&str> = record
        .nama
        .split(|c: char| c.is_whitespace() || matches!(c, '/' | '\\'))
        .filter(|part| !part.is_empty())
        .collect();
    format!("Data_Hukum_{}", name.join("_"))
}

/// Suggested file name (without extension) for a recap printed on `date`.
#[must_use]
pub fn recap_file_name(date: NaiveDate) -> String {
    format!("Rekap_Pelanggaran_Brigif4DR_{}", date.format("%Y-%m-%d"))
}

/// Render the case card for one record.
#[must_use]
pub fn render_card(record: &ViolationRecord, issued_on: NaiveDate) -> String {
    let status = match &record.ket_tindakan {
        Some(note) => format!("{} ({note})", record.status),
        None => record.status.to_string(),
    };
    let rows = [
        ("Nama Lengkap", record.nama.clone()),
        ("Pangkat / NRP", format!("{} / {}", record.pangkat, record.nrp)),
        ("Jabatan / Satuan", format!("{} / {}", record.jabatan, record.satuan)),
        ("Jenis Perkara", record.perkara.clone()),
        ("Tanggal Kejadian", record.tanggal.format("%Y-%m-%d").to_string()),
        ("Status Hukum", status),
    ];
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let rule = "=".repeat(CARD_TITLE.len().max(ORGANIZATION.len()));

    let mut out = String::new();
    let _ = writeln!(out, "{CARD_TITLE}");
    let _ = writeln!(out, "{ORGANIZATION}");
    let _ = writeln!(out, "{rule}");
    for (label, value) in &rows {
        let _ = writeln!(out, "{label:<label_width$} : {value}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "KRONOLOGIS SINGKAT:");
    let _ = writeln!(out, "{}", record.kronologis.trim());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Dikeluarkan secara sistem pada: {}",
        issued_on.format("%-d/%-m/%Y")
    );
    out
}

/// Render the numbered recap table of `records`.
#[must_use]
pub fn render_recap(records: &[ViolationRecord], printed_at: NaiveDateTime) -> String {
    let rows: Vec<[String; 6]> = records
        .iter()
        .enumerate()
        .map(|(index, r)| {
            [
                (index + 1).to_string(),
                format!("{} / {} / {}", r.nama, r.pangkat, r.nrp),
                r.satuan.clone(),
                r.perkara.clone(),
                r.status.to_string(),
                r.tanggal.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();

    let mut widths = RECAP_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{RECAP_TITLE}");
    let _ = writeln!(out, "{ORGANIZATION}");
    let _ = writeln!(out);
    write_row(&mut out, &RECAP_HEADERS.map(str::to_string), &widths);
    let separator = widths.map(|w| "-".repeat(w));
    write_row(&mut out, &separator, &widths);
    for row in &rows {
        write_row(&mut out, row, &widths);
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Dicetak pada: {}",
        printed_at.format("%-d/%-m/%Y, %H.%M.%S")
    );
    out
}

fn write_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::record;
    use crate::record::CaseStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_card_contains_fields() {
        let mut r = record("1", "Yonif 405/SK", CaseStatus::ProsesHukum);
        r.ket_tindakan = Some("Sidang".to_string());
        let card = render_card(&r, date(2026, 3, 7));

        assert!(card.starts_with(CARD_TITLE));
        assert!(card.contains("Budi Santoso"));
        assert!(card.contains("Pratu / 31190123456"));
        assert!(card.contains("Tamtama / Yonif 405/SK"));
        assert!(card.contains("Proses Hukum (Sidang)"));
        assert!(card.contains("KRONOLOGIS SINGKAT:"));
        assert!(card.ends_with("Dikeluarkan secara sistem pada: 7/3/2026\n"));
    }

    #[test]
    fn test_card_closed_case_has_no_note() {
        let r = record("1", "A", CaseStatus::Selesai);
        let card = render_card(&r, date(2026, 1, 1));
        assert!(card.contains(": Selesai\n"));
    }

    #[test]
    fn test_recap_numbers_rows() {
        let records = vec![
            record("1", "Yonif 405/SK", CaseStatus::ProsesHukum),
            record("2", "Yonif 406/CK", CaseStatus::Selesai),
        ];
        let at = date(2026, 10, 18).and_hms_opt(14, 5, 3).unwrap();
        let recap = render_recap(&records, at);
        let lines: Vec<&str> = recap.lines().collect();

        assert_eq!(lines[0], RECAP_TITLE);
        assert!(lines[3].starts_with("No | Nama / Pkt / NRP"));
        assert!(lines[5].starts_with("1  | Budi Santoso / Pratu / 31190123456"));
        assert!(lines[6].starts_with("2  | "));
        assert!(lines[6].contains("Yonif 406/CK"));
        assert!(recap.ends_with("Dicetak pada: 18/10/2026, 14.05.03\n"));
    }

    #[test]
    fn test_recap_of_empty_register() {
        let at = date(2026, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        let recap = render_recap(&[], at);
        assert_eq!(recap.lines().count(), 7);
    }

    #[test]
    fn test_file_names() {
        let mut r = record("1", "A", CaseStatus::Selesai);
        r.nama = "Budi  Santoso Putra".to_string();
        assert_eq!(card_file_name(&r), "Data_Hukum_Budi_Santoso_Putra");
        r.nama = "Andi/Budi\\Citra ".to_string();
        assert_eq!(card_file_name(&r), "Data_Hukum_Andi_Budi_Citra");
        assert_eq!(
            recap_file_name(date(2026, 10, 18)),
            "Rekap_Pelanggaran_Brigif4DR_2026-10-18"
        );
    }
}
