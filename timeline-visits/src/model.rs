use std::fmt;

use chrono::NaiveDateTime;
use eyre::eyre;

use crate::timeline::datetime;

/// Time span a record covers, timestamps kept verbatim from the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeInterval {
    Known { start: String, end: String },
    /// sentinel for record shapes carrying no duration field
    Unknown,
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInterval::Known { start, end } => write!(f, "{} - {}", start, end),
            TimeInterval::Unknown => write!(f, "unknown"),
        }
    }
}

/// One confirmed proximity event: a coordinate of some record fell within
/// the search radius of the reference point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitMatch {
    /// floor-truncated whole meters
    pub distance_m: u64,
    pub interval: TimeInterval,
}

impl VisitMatch {
    /// Instant used for chronological ordering. Matches are only ever built
    /// from records with a known interval, so a failure here is a bug in the
    /// scanner rather than bad input.
    pub fn start_instant(&self) -> eyre::Result<NaiveDateTime> {
        match &self.interval {
            TimeInterval::Known { start, .. } => datetime::parse_instant(start)
                .map_err(|e| eyre!("unparsable start timestamp {:?}: {}", start, e)),
            TimeInterval::Unknown => Err(eyre!("accepted match without a known interval")),
        }
    }

    /// Report line with the distance column left-justified for alignment.
    pub fn report_line(&self) -> String {
        format!(
            "Range: {:<6} Visit between {}",
            format!("{}m", self.distance_m),
            self.interval
        )
    }
}

/// Scan statistics, returned per file and merged by the run controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// records inspected
    pub attempted: u64,
    /// records skipped over a missing or invalid required field
    pub malformed: u64,
}

impl RunStats {
    pub fn absorb(&mut self, other: RunStats) {
        self.attempted += other.attempted;
        self.malformed += other.malformed;
    }

    /// Malformed-record ratio as a percentage, or the absolute count when
    /// nothing was attempted.
    pub fn malformed_ratio(&self) -> String {
        if self.attempted == 0 {
            return format!("{} (total)", self.malformed);
        }
        let percentage = self.malformed as f64 * 100.0 / self.attempted as f64;
        let truncated: String = percentage.to_string().chars().take(5).collect();
        format!("{}%", truncated)
    }
}
