use crate::collaborators::DateValidator;
use chrono::NaiveDate;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepts zero-padded `yyyy-mm-dd` calendar dates only.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoDateValidator;

impl DateValidator for IsoDateValidator {
    fn is_valid_date(&self, value: &str) -> bool {
        parse_iso_date(value).is_some()
    }
}

pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    // chrono takes signs, spaces and unpadded fields; the store compares strings
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_dates() {
        let v = IsoDateValidator;
        assert!(v.is_valid_date("2020-01-01"));
        assert!(v.is_valid_date("2024-02-29"));
        assert!(!v.is_valid_date("2023-02-29"));
        assert!(!v.is_valid_date("2020-1-1"));
        assert!(!v.is_valid_date("01/01/2020"));
        assert!(!v.is_valid_date("2020-01-01T00:00:00"));
        assert!(!v.is_valid_date(""));
        assert!(!v.is_valid_date("-020-01-01"));
        assert!(!v.is_valid_date("+020-01-01"));
        assert!(!v.is_valid_date(" 020-01-01"));
        assert!(!v.is_valid_date("2020-01- 1"));
    }
}
