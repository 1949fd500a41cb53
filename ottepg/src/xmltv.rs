//! XMLTV document rendering
//!
//! Serde-backed XMLTV structures serialized with quick-xml, attributes mapped
//! with `@` renames. Every channel is listed; programmes come from the
//! gap-filled view of the visibility window, so a channel with holes (or no
//! programs at all) still has continuous guide coverage.

use crate::error::Result;
use crate::models::{Program, ScheduleDocument, XMLTV_TIMESTAMP_FORMAT};
use crate::resolver::{gap_filled_programs, visibility_window};
use chrono::{DateTime, Utc};
use serde::Serialize;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Name advertised in the `generator-info-name` attribute
pub const GENERATOR_NAME: &str = "OTTGate";

/// Root `<tv>` element
#[derive(Debug, Serialize)]
#[serde(rename = "tv")]
pub struct Tv {
    #[serde(rename = "@generator-info-name")]
    pub generator_info_name: String,
    #[serde(rename = "channel")]
    pub channels: Vec<ChannelEntry>,
    #[serde(rename = "programme")]
    pub programmes: Vec<ProgrammeEntry>,
}

/// `<channel>` element
#[derive(Debug, Serialize)]
pub struct ChannelEntry {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "display-name")]
    pub display_name: String,
    #[serde(rename = "icon", skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

/// `<programme>` element
#[derive(Debug, Serialize)]
pub struct ProgrammeEntry {
    #[serde(rename = "@channel")]
    pub channel: String,
    #[serde(rename = "@start")]
    pub start: String,
    #[serde(rename = "@stop")]
    pub stop: String,
    pub title: String,
    pub desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

/// `<icon src=".."/>` element
#[derive(Debug, Serialize)]
pub struct Icon {
    #[serde(rename = "@src")]
    pub src: String,
}

/// `<category lang="..">` element
#[derive(Debug, Serialize)]
pub struct Category {
    #[serde(rename = "@lang")]
    pub lang: String,
    #[serde(rename = "$text")]
    pub value: String,
}

/// Render the whole schedule as an XMLTV document.
///
/// `placeholder_icon` is the configured fallback icon for synthesized gap
/// fillers; see [`gap_filled_programs`].
pub fn render_epg(
    doc: &ScheduleDocument,
    now: DateTime<Utc>,
    placeholder_icon: Option<&str>,
) -> Result<String> {
    let (window_start, window_end) = visibility_window(now);

    let mut channels = Vec::new();
    let mut programmes = Vec::new();

    for (group, channel) in doc.channels() {
        channels.push(ChannelEntry {
            id: channel.id.clone(),
            display_name: channel.channel_name.clone(),
            icon: channel.icon_url.clone().map(|src| Icon { src }),
        });

        for program in gap_filled_programs(channel, window_start, window_end, placeholder_icon) {
            if let Some(entry) = programme_entry(&channel.id, &group.category, &program) {
                programmes.push(entry);
            }
        }
    }

    let tv = Tv {
        generator_info_name: GENERATOR_NAME.to_string(),
        channels,
        programmes,
    };

    let body = quick_xml::se::to_string(&tv)?;
    Ok(format!("{}\n{}", XML_DECLARATION, body))
}

/// Build one `<programme>` entry, preferring the generator's pre-formatted
/// timestamps and falling back to formatting the parsed instants. Entries
/// with no usable timestamps at all are skipped.
fn programme_entry(channel_id: &str, category: &str, program: &Program) -> Option<ProgrammeEntry> {
    let start = program
        .start_str
        .clone()
        .or_else(|| format_timestamp(program.start_dt))?;
    let stop = program
        .stop_str
        .clone()
        .or_else(|| format_timestamp(program.stop_dt))?;

    Some(ProgrammeEntry {
        channel: channel_id.to_string(),
        start,
        stop,
        title: program.program_name.clone(),
        desc: program.description.clone(),
        category: (!category.is_empty()).then(|| Category {
            lang: "en".to_string(),
            value: category.to_string(),
        }),
        icon: program.icon_url.clone().map(|src| Icon { src }),
    })
}

fn format_timestamp(instant: Option<DateTime<Utc>>) -> Option<String> {
    instant.map(|dt| dt.format(XMLTV_TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> ScheduleDocument {
        serde_json::from_str(
            r#"{
                "news": {
                    "category": "News & Talk",
                    "service_channels": [
                        {
                            "id": "101",
                            "channel_name": "News1",
                            "icon_url": "http://icons/news1.png",
                            "programs": [
                                {
                                    "start_dt": "2026-08-07T10:00:00+00:00",
                                    "stop_dt": "2026-08-07T14:00:00+00:00",
                                    "start_str": "20260807100000 +0000",
                                    "stop_str": "20260807140000 +0000",
                                    "program_name": "Tom & Jerry <Live>",
                                    "description": "A show",
                                    "stream_url": "http://src/a.ts"
                                }
                            ]
                        },
                        {
                            "id": "102",
                            "channel_name": "Empty1",
                            "programs": []
                        }
                    ]
                }
            }"#,
        )
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-08-07T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_epg_lists_all_channels() {
        let xml = render_epg(&sample_document(), now(), None).unwrap();

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("generator-info-name=\"OTTGate\""));
        assert!(xml.contains("<channel id=\"101\">"));
        // A channel without programs is still listed...
        assert!(xml.contains("<channel id=\"102\">"));
        assert!(xml.contains("<display-name>Empty1</display-name>"));
        // ...and gets placeholder programme coverage.
        assert!(xml.contains("programme channel=\"102\""));
        assert!(xml.contains("No scheduled programming"));
    }

    #[test]
    fn test_programme_fields_are_escaped() {
        let xml = render_epg(&sample_document(), now(), None).unwrap();

        assert!(xml.contains("start=\"20260807100000 +0000\""));
        assert!(xml.contains("stop=\"20260807140000 +0000\""));
        assert!(xml.contains("Tom &amp; Jerry &lt;Live&gt;"));
        assert!(xml.contains("<category lang=\"en\">News &amp; Talk</category>"));
        assert!(!xml.contains("Tom & Jerry <Live>"));
    }

    #[test]
    fn test_real_programme_surrounded_by_placeholders() {
        let xml = render_epg(&sample_document(), now(), None).unwrap();

        // The four-hour programme sits inside an 9-day window, so channel 101
        // must carry placeholder coverage on both sides of it.
        let count = xml.matches("programme channel=\"101\"").count();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_empty_document_renders() {
        let xml = render_epg(&ScheduleDocument::default(), now(), None).unwrap();
        assert!(xml.contains("<tv"));
    }
}
