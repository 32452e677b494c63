use std::fmt::{Display, Formatter};
use std::sync::OnceLock;
use std::time::SystemTime;

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Record the host's UTC offset for all later timestamps.
///
/// The offset can only be read reliably while the process is single
/// threaded, so call this at the top of `main` before starting a runtime.
/// Returns the offset in effect, which is the first one recorded.
pub fn capture_local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

fn local_offset() -> UtcOffset {
    LOCAL_OFFSET
        .get()
        .copied()
        .unwrap_or_else(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// Wall-clock timestamp in the host's local offset.
///
/// Uses the offset from [`capture_local_offset`] when one was recorded,
/// otherwise a fresh lookup that falls back to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalDateTime(OffsetDateTime);

impl LocalDateTime {
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    pub fn from_system_time(value: SystemTime) -> Self {
        Self(OffsetDateTime::from(value).to_offset(local_offset()))
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }

    /// `yyyyMMdd_HHmmss`, used in generated file names.
    pub fn file_stamp(self) -> String {
        let format = format_description!("[year][month][day]_[hour][minute][second]");
        self.0
            .format(&format)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl From<OffsetDateTime> for LocalDateTime {
    fn from(value: OffsetDateTime) -> Self {
        Self(value)
    }
}

impl Display for LocalDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for LocalDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}
