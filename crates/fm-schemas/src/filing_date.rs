use chrono::NaiveDate;
use std::path::Path;

/// Filing date encoded in a raw filing's file name.
///
/// The date is the stem's first `_`-separated segment, as `YYYY-MM-DD` or
/// `YYYYMMDD` (`2026-08-14_annual_report.pdf`, `20260814_results.pdf`).
pub fn filing_date_from_name(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    let head = stem.split('_').next()?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%Y%m%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn dashed_and_compact_forms() {
        assert_eq!(
            filing_date_from_name(Path::new("raw/2026-08-14_annual_report.pdf")),
            date(2026, 8, 14)
        );
        assert_eq!(
            filing_date_from_name(Path::new("20250102_results.PDF")),
            date(2025, 1, 2)
        );
        assert_eq!(filing_date_from_name(Path::new("2024-03-31.pdf")), date(2024, 3, 31));
    }

    #[test]
    fn undated_names() {
        assert_eq!(filing_date_from_name(Path::new("annual_2026-08-14.pdf")), None);
        assert_eq!(filing_date_from_name(Path::new("2026-13-01_x.pdf")), None);
        assert_eq!(filing_date_from_name(Path::new("report.pdf")), None);
    }
}
