use chrono::{DateTime, NaiveDateTime, ParseError, Utc};

/// Wall-clock format used for both request bounds and message timestamps.
pub const READABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait DateTimeConvert {
    /// Parses `YYYY-MM-DD HH:MM:SS` as a UTC instant.
    fn to_utc_date_time(&self) -> Result<DateTime<Utc>, ParseError>;
}

impl DateTimeConvert for str {
    fn to_utc_date_time(&self) -> Result<DateTime<Utc>, ParseError> {
        NaiveDateTime::parse_from_str(self, READABLE_TIME_FORMAT).map(|x| x.and_utc())
    }
}

pub trait ReadableTimeConvert {
    fn to_readable_time(&self) -> String;
}

impl ReadableTimeConvert for DateTime<Utc> {
    fn to_readable_time(&self) -> String {
        self.format(READABLE_TIME_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_as_utc() {
        let time = "2024-03-05 07:08:09".to_utc_date_time().unwrap();

        assert_eq!(time.timestamp_millis(), 1_709_622_489_000);
    }

    #[test]
    fn rejects_other_formats() {
        assert!("2024-03-05T07:08:09".to_utc_date_time().is_err());
        assert!("2024-03-05 07:08:09+02:00".to_utc_date_time().is_err());
        assert!("2024-03-05 07:08".to_utc_date_time().is_err());
        assert!("2024-02-30 07:08:09".to_utc_date_time().is_err());
        assert!("".to_utc_date_time().is_err());
    }

    #[test]
    fn formats_with_second_precision() {
        let time = DateTime::from_timestamp_millis(1_709_622_489_999).unwrap();

        assert_eq!(time.to_readable_time(), "2024-03-05 07:08:09");
    }
}
