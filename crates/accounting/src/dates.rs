//! Date formats used at the ledger boundary.
//!
//! - Vouchers and statement ranges travel as `dd-mm-yyyy`.
//! - Persisted ledger entries carry RFC 3339 timestamps, though some stores
//!   return a bare `yyyy-mm-dd` calendar date.
//! - Statement rows display as `dd/mm/yyyy`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use ledgerdesk_core::{DomainError, DomainResult};

pub const WIRE_DATE_FORMAT: &str = "%d-%m-%Y";
pub const ROW_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `dd-mm-yyyy` date.
pub fn parse_wire_date(text: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), WIRE_DATE_FORMAT)
        .map_err(|e| DomainError::validation(format!("invalid date {text:?}: {e}")))
}

pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

pub fn format_row_date(date: NaiveDate) -> String {
    date.format(ROW_DATE_FORMAT).to_string()
}

/// Parse a ledger timestamp: RFC 3339 first, then a bare calendar date at midnight UTC.
pub fn parse_timestamp(text: &str) -> DomainResult<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| DomainError::validation(format!("invalid timestamp {text:?}: {e}")))
}

/// Serde adapter for `NaiveDate` as `dd-mm-yyyy`.
pub mod wire_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_wire_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_wire_date(&text).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for ledger timestamps (RFC 3339 or `yyyy-mm-dd`).
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_timestamp(&text).map_err(serde::de::Error::custom)
    }
}
