//! Run record schema: one JSON file per tool-flow run

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Timestamp formats accepted besides RFC 3339
const DATE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Outcome of a tool-flow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[serde(alias = "success", alias = "passed")]
    Succeeded,
    #[serde(alias = "failure")]
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing result for one clock domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClockFreq {
    /// Achieved frequency (MHz)
    #[serde(default)]
    pub actual: Option<f64>,
    /// Constrained frequency (MHz)
    #[serde(default)]
    pub requested: Option<f64>,
    #[serde(default)]
    pub met: Option<bool>,
}

/// Maximum frequency, either a single figure or per clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxFreq {
    Single(f64),
    PerClock(BTreeMap<String, ClockFreq>),
}

impl MaxFreq {
    /// The frequency the design actually runs at: the slowest clock domain
    pub fn achieved_mhz(&self) -> Option<f64> {
        match self {
            MaxFreq::Single(mhz) => Some(*mhz),
            MaxFreq::PerClock(clocks) => clocks.values().filter_map(|c| c.actual).reduce(f64::min),
        }
    }
}

/// One run of one toolchain on one board, as written by the CI job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    pub toolchain: String,
    #[serde(default)]
    pub date: Option<String>,
    /// `null` reads as unknown, like a missing field
    #[serde(default, deserialize_with = "status_or_unknown")]
    pub status: RunStatus,
    /// Stage name -> seconds
    #[serde(default)]
    pub runtime: BTreeMap<String, f64>,
    /// Resource name (LUT, DFF, BRAM, ...) -> count
    #[serde(default)]
    pub resources: BTreeMap<String, u64>,
    #[serde(default)]
    pub max_freq: Option<MaxFreq>,
    /// Peak memory (MiB)
    #[serde(default)]
    pub maximum_memory_use: Option<f64>,
    #[serde(default)]
    pub wirelength: Option<u64>,
    /// Tool name -> version string
    #[serde(default)]
    pub versions: BTreeMap<String, String>,
}

impl RunRecord {
    /// Board name, falling back to the device, then "unknown"
    pub fn target(&self) -> &str {
        self.board
            .as_deref()
            .or(self.device.as_deref())
            .unwrap_or("unknown")
    }

    /// Parsed `date`; `None` if missing or unparseable
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date)
    }

    /// The `total` stage if reported, else the sum of all stages
    pub fn total_runtime(&self) -> Option<f64> {
        if let Some(total) = self.runtime.get("total") {
            return Some(*total);
        }
        if self.runtime.is_empty() {
            None
        } else {
            Some(self.runtime.values().sum())
        }
    }
}

fn status_or_unknown<'de, D>(deserializer: D) -> Result<RunStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RunStatus>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a run timestamp; offsets are normalized to UTC
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_record_uses_defaults() {
        let r: RunRecord = serde_json::from_str(r#"{"toolchain": "vpr"}"#).unwrap();
        assert_eq!(r.toolchain, "vpr");
        assert_eq!(r.status, RunStatus::Unknown);
        assert!(r.runtime.is_empty());
        assert!(r.max_freq.is_none());
        assert_eq!(r.target(), "unknown");
    }

    #[test]
    fn missing_toolchain_is_rejected() {
        let r = serde_json::from_str::<RunRecord>(r#"{"board": "arty"}"#);
        assert!(r.is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let r: RunRecord =
            serde_json::from_str(r#"{"toolchain": "vpr", "build_type": "ci", "extra": [1, 2]}"#)
                .unwrap();
        assert_eq!(r.toolchain, "vpr");
    }

    #[test]
    fn status_variants_and_aliases() {
        let parse = |s: &str| -> RunStatus { serde_json::from_str(&format!("\"{}\"", s)).unwrap() };
        assert_eq!(parse("succeeded"), RunStatus::Succeeded);
        assert_eq!(parse("success"), RunStatus::Succeeded);
        assert_eq!(parse("failed"), RunStatus::Failed);
        assert_eq!(parse("timeout"), RunStatus::Unknown);
    }

    #[test]
    fn null_status_reads_as_unknown() {
        let r: RunRecord =
            serde_json::from_str(r#"{"toolchain": "vpr", "status": null, "max_freq": null}"#)
                .unwrap();
        assert_eq!(r.status, RunStatus::Unknown);
        assert!(r.max_freq.is_none());
    }

    #[test]
    fn wrong_status_type_is_still_rejected() {
        let r = serde_json::from_str::<RunRecord>(r#"{"toolchain": "vpr", "status": 3}"#);
        assert!(r.is_err());
    }

    #[test]
    fn target_prefers_board_over_device() {
        let r: RunRecord = serde_json::from_str(
            r#"{"toolchain": "vpr", "board": "arty", "device": "xc7a35t"}"#,
        )
        .unwrap();
        assert_eq!(r.target(), "arty");

        let r: RunRecord =
            serde_json::from_str(r#"{"toolchain": "vpr", "device": "xc7a35t"}"#).unwrap();
        assert_eq!(r.target(), "xc7a35t");
    }

    #[test]
    fn max_freq_single_number() {
        let r: RunRecord =
            serde_json::from_str(r#"{"toolchain": "nextpnr", "max_freq": 87.5}"#).unwrap();
        assert_eq!(r.max_freq.unwrap().achieved_mhz(), Some(87.5));
    }

    #[test]
    fn max_freq_per_clock_takes_slowest_domain() {
        let r: RunRecord = serde_json::from_str(
            r#"{"toolchain": "vpr", "max_freq": {
                "clk": {"actual": 120.0, "requested": 100.0, "met": true},
                "sys_clk": {"actual": 64.2, "requested": 100.0, "met": false},
                "aux": {"requested": 10.0}
            }}"#,
        )
        .unwrap();
        assert_eq!(r.max_freq.unwrap().achieved_mhz(), Some(64.2));
    }

    #[test]
    fn max_freq_per_clock_without_actuals() {
        let f = MaxFreq::PerClock(BTreeMap::from([("clk".to_string(), ClockFreq::default())]));
        assert_eq!(f.achieved_mhz(), None);
    }

    #[test]
    fn total_runtime_prefers_reported_total() {
        let r: RunRecord = serde_json::from_str(
            r#"{"toolchain": "vpr", "runtime": {"synthesis": 2.0, "routing": 3.0, "total": 7.5}}"#,
        )
        .unwrap();
        assert_eq!(r.total_runtime(), Some(7.5));
    }

    #[test]
    fn total_runtime_sums_stages() {
        let r: RunRecord = serde_json::from_str(
            r#"{"toolchain": "vpr", "runtime": {"synthesis": 2.0, "routing": 3.0}}"#,
        )
        .unwrap();
        assert_eq!(r.total_runtime(), Some(5.0));
    }

    #[test]
    fn total_runtime_none_when_absent() {
        let r: RunRecord = serde_json::from_str(r#"{"toolchain": "vpr"}"#).unwrap();
        assert_eq!(r.total_runtime(), None);
    }

    #[test]
    fn parse_date_formats() {
        let expected = NaiveDateTime::parse_from_str("2021-05-10 12:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(parse_date("2021-05-10T12:30:00"), Some(expected));
        assert_eq!(parse_date("2021-05-10 12:30:00"), Some(expected));
        assert_eq!(parse_date("2021-05-10T12:30:00Z"), Some(expected));
        assert_eq!(parse_date("2021-05-10T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
    }
}
