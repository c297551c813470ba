//! Benchmark records and throughput math.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use crate::upload::persist::CsvRow;

/// Megabits per second for `bytes` moved in `duration_secs`.
///
/// Zero when the duration is not strictly positive.
pub fn throughput_mbps(bytes: u64, duration_secs: f64) -> f64 {
    if duration_secs > 0.0 {
        bytes as f64 * 8.0 / (duration_secs * 1e6)
    } else {
        0.0
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn serialize_round4<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round4(*value))
}

fn serialize_iso8601<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// One completed upload, as seen by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRecord {
    #[serde(serialize_with = "serialize_iso8601")]
    pub timestamp: DateTime<Utc>,
    pub bytes_received: u64,
    #[serde(serialize_with = "serialize_round4")]
    pub duration_s: f64,
    #[serde(rename = "throughput_Mbps", serialize_with = "serialize_round4")]
    pub throughput_mbps: f64,
}

impl UploadRecord {
    /// Record an upload that finished now.
    pub fn new(bytes_received: u64, elapsed: Duration) -> Self {
        Self::at(Utc::now(), bytes_received, elapsed.as_secs_f64())
    }

    pub fn at(timestamp: DateTime<Utc>, bytes_received: u64, duration_s: f64) -> Self {
        Self {
            timestamp,
            bytes_received,
            duration_s,
            throughput_mbps: throughput_mbps(bytes_received, duration_s),
        }
    }
}

impl CsvRow for UploadRecord {
    const HEADER: &'static [&'static str] =
        &["timestamp", "bytes_received", "duration_s", "throughput_Mbps"];
}

impl fmt::Display for UploadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timestamp={} bytes_received={} duration_s={} throughput_Mbps={}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.bytes_received,
            round4(self.duration_s),
            round4(self.throughput_mbps),
        )
    }
}

/// Final tally of one upload worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRecord {
    pub client_id: usize,
    pub bytes_sent: u64,
    #[serde(rename = "throughput_Mbps", serialize_with = "serialize_round4")]
    pub throughput_mbps: f64,
}

impl ClientRecord {
    /// Close out a worker that ran for the configured `duration`.
    ///
    /// Throughput is computed against the configured duration, floored at one
    /// second, not against the measured time.
    pub fn finish(client_id: usize, bytes_sent: u64, duration: Duration) -> Self {
        Self {
            client_id,
            bytes_sent,
            throughput_mbps: throughput_mbps(bytes_sent, duration.as_secs_f64().max(1.0)),
        }
    }
}

impl CsvRow for ClientRecord {
    const HEADER: &'static [&'static str] = &["client_id", "bytes_sent", "throughput_Mbps"];
}

impl fmt::Display for ClientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "client {} sent {} bytes ({} Mbps)",
            self.client_id,
            self.bytes_sent,
            round4(self.throughput_mbps),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn throughput_is_bits_over_megaseconds() {
        assert_eq!(throughput_mbps(1_000_000, 1.0), 8.0);
        assert_eq!(throughput_mbps(125_000, 0.5), 2.0);
        assert_eq!(throughput_mbps(0, 3.0), 0.0);
        for (bytes, secs) in [(1u64, 0.001), (65_536, 0.25), (10_000_000_000, 7.5)] {
            assert_eq!(throughput_mbps(bytes, secs), bytes as f64 * 8.0 / (secs * 1e6));
        }
    }

    #[test]
    fn non_positive_duration_gives_zero() {
        assert_eq!(throughput_mbps(1024, 0.0), 0.0);
        assert_eq!(throughput_mbps(1024, -1.0), 0.0);
        assert_eq!(throughput_mbps(1024, f64::NAN), 0.0);
    }

    #[test]
    fn client_throughput_floors_duration_at_one_second() {
        let record = ClientRecord::finish(0, 1_000_000, Duration::ZERO);
        assert_eq!(record.throughput_mbps, 8.0);

        let record = ClientRecord::finish(1, 1_000_000, Duration::from_secs(4));
        assert_eq!(record.throughput_mbps, 2.0);
    }

    #[test]
    fn upload_record_derives_throughput() {
        let record = UploadRecord::new(100, Duration::from_micros(50));
        assert_eq!(record.bytes_received, 100);
        assert!(record.duration_s >= 0.0);
        assert_eq!(record.throughput_mbps, throughput_mbps(100, record.duration_s));
    }

    #[test]
    fn csv_fields_follow_header_and_round() {
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let record = UploadRecord::at(timestamp, 10, 0.123456);

        let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(vec![]);
        writer.serialize(&record).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some(UploadRecord::HEADER.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("2025-01-02T03:04:05.000000Z,10,0.1235,0.0006")
        );
    }

    #[test]
    fn display_echoes_fields() {
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let record = UploadRecord::at(timestamp, 100, 0.5);
        let text = record.to_string();
        assert!(text.contains("bytes_received=100"));
        assert!(text.contains("duration_s=0.5"));
        assert!(text.contains("throughput_Mbps=0.0016"));
    }
}
