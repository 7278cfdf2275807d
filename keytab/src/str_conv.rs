use crate::Timestamp;
use chrono::{DateTime, TimeZone, Utc};

pub struct StrConv;

impl StrConv {
    /// Short locale-style date and time, as printed by `klist -k -t`.
    pub fn timestamp_to_sfstring(timestamp: DateTime<Utc>) -> String {
        timestamp.format("%x %X").to_string()
    }

    pub fn keytab_timestamp(timestamp: Timestamp) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(timestamp.into(), 0).single()
    }
}
