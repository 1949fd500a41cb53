//! Schedule document model
//!
//! The schedule is produced by an external generator as a single JSON file and
//! is read-only for this crate. The top level maps a pattern/group name to the
//! group's category and its service channels; each channel carries an ordered
//! (but not necessarily time-sorted) list of programs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Timestamp format used by XMLTV `start`/`stop` attributes (e.g. `20260807120000 +0000`)
pub const XMLTV_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S %z";

/// A full schedule snapshot, replaced wholesale on each refresh
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ScheduleDocument(pub BTreeMap<String, PatternGroup>);

impl ScheduleDocument {
    /// Total number of service channels across all groups
    pub fn total_channels(&self) -> usize {
        self.0.values().map(|g| g.service_channels.len()).sum()
    }

    /// Iterate over all channels together with their owning group
    pub fn channels(&self) -> impl Iterator<Item = (&PatternGroup, &Channel)> {
        self.0
            .values()
            .flat_map(|g| g.service_channels.iter().map(move |c| (g, c)))
    }

    /// Look up a channel by identifier.
    ///
    /// The human-readable `channel_name` takes precedence; the numeric-ish `id`
    /// is kept for backward compatibility and only consulted when no channel
    /// name matches.
    pub fn find_channel(&self, ident: &str) -> Option<&Channel> {
        self.channels()
            .map(|(_, c)| c)
            .find(|c| c.channel_name == ident)
            .or_else(|| self.channels().map(|(_, c)| c).find(|c| c.id == ident))
    }
}

/// One pattern group: a category plus the channels that matched the pattern
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PatternGroup {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub service_channels: Vec<Channel>,
}

/// A virtual channel whose actual source stream changes with the schedule
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub programs: Vec<Program>,
}

/// A scheduled event on a channel
///
/// `start_dt`/`stop_dt` are the instants used for resolution; `start_str`/
/// `stop_str` are the generator's pre-formatted XMLTV timestamps and are
/// passed through to the guide untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Program {
    #[serde(default, deserialize_with = "lenient_instant")]
    pub start_dt: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_instant")]
    pub stop_dt: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_str: Option<String>,
    #[serde(default)]
    pub stop_str: Option<String>,
    #[serde(default)]
    pub program_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    /// Synthesized gap filler; never present in the schedule file
    #[serde(skip)]
    pub is_placeholder: bool,
}

impl Program {
    /// Whether this program is airing at `now`.
    ///
    /// A program with a missing or unparseable boundary is never live.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match (self.start_dt, self.stop_dt) {
            (Some(start), Some(stop)) => start <= now && now < stop,
            _ => false,
        }
    }

    /// Whether this program carries a usable upstream source URL
    pub fn has_source(&self) -> bool {
        matches!(&self.stream_url, Some(url) if !url.is_empty())
    }
}

/// Deserialize an instant from the generator's ISO-8601 strings.
///
/// A missing or unparseable value becomes `None` so that one malformed
/// program does not take the whole document down with it.
fn lenient_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match DateTime::parse_from_rfc3339(&s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Ignoring unparseable schedule timestamp {:?}: {}", s, e);
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_program(json: &str) -> Program {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_document() {
        let doc: ScheduleDocument = serde_json::from_str(
            r#"{
                "sports": {
                    "category": "Sports",
                    "service_channels": [
                        {
                            "id": "101",
                            "channel_name": "News1",
                            "icon_url": "http://icons/news1.png",
                            "programs": [
                                {
                                    "start_dt": "2026-08-07T10:00:00+00:00",
                                    "stop_dt": "2026-08-07T12:00:00+00:00",
                                    "start_str": "20260807100000 +0000",
                                    "stop_str": "20260807120000 +0000",
                                    "program_name": "Morning Show",
                                    "description": "Live news",
                                    "stream_url": "http://src/a.ts"
                                }
                            ]
                        }
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(doc.total_channels(), 1);
        let channel = doc.find_channel("News1").unwrap();
        assert_eq!(channel.id, "101");
        assert_eq!(channel.programs.len(), 1);
        assert!(channel.programs[0].start_dt.is_some());
        assert!(channel.programs[0].has_source());
    }

    #[test]
    fn test_find_channel_prefers_name_over_id() {
        let doc: ScheduleDocument = serde_json::from_str(
            r#"{
                "g": {
                    "category": "Misc",
                    "service_channels": [
                        {"id": "News1", "channel_name": "Other", "programs": []},
                        {"id": "2", "channel_name": "News1", "programs": []}
                    ]
                }
            }"#,
        )
        .unwrap();

        // Both channels match "News1" (one by id, one by name); the name wins.
        assert_eq!(doc.find_channel("News1").unwrap().id, "2");
        assert_eq!(doc.find_channel("2").unwrap().channel_name, "News1");
        assert!(doc.find_channel("nope").is_none());
    }

    #[test]
    fn test_malformed_timestamp_becomes_none() {
        let program = parse_program(
            r#"{
                "start_dt": "not a date",
                "stop_dt": "2026-08-07T12:00:00+00:00",
                "program_name": "Broken"
            }"#,
        );
        assert!(program.start_dt.is_none());
        assert!(program.stop_dt.is_some());
        assert!(!program.is_live(Utc::now()));
    }

    #[test]
    fn test_empty_stream_url_is_not_a_source() {
        let program = parse_program(r#"{"stream_url": ""}"#);
        assert!(!program.has_source());
        let program = parse_program(r#"{"stream_url": "http://src/a.ts"}"#);
        assert!(program.has_source());
        let program = parse_program(r#"{}"#);
        assert!(!program.has_source());
    }

    #[test]
    fn test_is_live_boundaries() {
        let program = parse_program(
            r#"{
                "start_dt": "2026-08-07T10:00:00+00:00",
                "stop_dt": "2026-08-07T12:00:00+00:00"
            }"#,
        );
        let start = program.start_dt.unwrap();
        let stop = program.stop_dt.unwrap();
        assert!(program.is_live(start));
        assert!(!program.is_live(stop));
        assert!(program.is_live(start + chrono::Duration::minutes(30)));
    }
}
