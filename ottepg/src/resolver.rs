//! Active-event resolution with gap filling
//!
//! Resolution answers "what is airing on this channel right now, and which
//! upstream URL should feed it". The channel's programs are first expanded
//! into a gap-free view of the visibility window by inserting synthesized
//! placeholder programs; the active event is the entry covering `now`. When
//! the active event has no source URL of its own (a placeholder, or a
//! metadata-only entry), the most recently ended real program that does carry
//! one supplies the effective source.

use crate::models::{Channel, Program, ScheduleDocument, XMLTV_TIMESTAMP_FORMAT};
use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Days of schedule kept visible behind `now`
pub const VISIBILITY_PAST_DAYS: i64 = 1;

/// Days of schedule kept visible ahead of `now`
pub const VISIBILITY_AHEAD_DAYS: i64 = 7;

/// Title used for synthesized gap fillers
pub const PLACEHOLDER_TITLE: &str = "No scheduled programming";

/// Outcome of resolving a channel identifier at an instant
#[derive(Debug, Clone)]
pub struct Resolution {
    pub channel_id: String,
    pub channel_name: String,
    /// The event airing at the requested instant, possibly a placeholder
    pub event: Option<Program>,
    /// Effective upstream source for the event, after fallback
    pub source_url: Option<String>,
}

/// UTC-day-aligned visibility window around `now`: from midnight of the day
/// before through the end of the seventh day ahead.
pub fn visibility_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = (now - Duration::days(VISIBILITY_PAST_DAYS))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc();
    let end = (now + Duration::days(VISIBILITY_AHEAD_DAYS))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
        + Duration::days(1);
    (start, end)
}

/// Resolve `ident` against the schedule at instant `now`.
///
/// Returns `None` when no channel matches (by `channel_name` first, then by
/// `id`). A matched channel always yields a `Resolution`; `source_url` may
/// still be `None` when neither the active event nor the fallback scan finds
/// a usable stream URL.
pub fn resolve(
    doc: &ScheduleDocument,
    ident: &str,
    now: DateTime<Utc>,
    placeholder_icon: Option<&str>,
) -> Option<Resolution> {
    let channel = doc.find_channel(ident)?;

    let (window_start, window_end) = visibility_window(now);
    let view = gap_filled_programs(channel, window_start, window_end, placeholder_icon);
    let event = view.into_iter().find(|p| p.is_live(now));

    let source_url = match &event {
        Some(e) if e.has_source() => e.stream_url.clone(),
        _ => fallback_source(channel, now),
    };

    Some(Resolution {
        channel_id: channel.id.clone(),
        channel_name: channel.channel_name.clone(),
        event,
        source_url,
    })
}

/// Ordered, gap-free view of a channel's programs over `[window_start, window_end)`.
///
/// Programs with a missing boundary are left out of the view (they can never
/// be live); every hole between the remaining programs, and the stretches
/// before the first and after the last, are covered by placeholders. A
/// channel with no resolvable program at all becomes one placeholder spanning
/// the whole window.
pub fn gap_filled_programs(
    channel: &Channel,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    placeholder_icon: Option<&str>,
) -> Vec<Program> {
    let mut real: Vec<&Program> = channel
        .programs
        .iter()
        .filter(|p| matches!((p.start_dt, p.stop_dt), (Some(s), Some(e)) if s < e))
        .collect();
    // The schedule file does not guarantee time order.
    real.sort_by_key(|p| p.start_dt);

    let mut view = Vec::with_capacity(real.len() * 2 + 1);
    let mut cursor = window_start;

    for program in real {
        let start = program.start_dt.unwrap_or(cursor);
        let stop = program.stop_dt.unwrap_or(cursor);
        if start > cursor {
            view.push(make_placeholder(channel, cursor, start, placeholder_icon));
        }
        view.push(program.clone());
        if stop > cursor {
            cursor = stop;
        }
    }

    if cursor < window_end {
        view.push(make_placeholder(channel, cursor, window_end, placeholder_icon));
    }

    view
}

/// Most recently ended real program carrying a stream URL.
///
/// Programs without a parseable `stop_dt` cannot be ranked and never
/// participate; programs without a parseable `start_dt` still do.
fn fallback_source(channel: &Channel, now: DateTime<Utc>) -> Option<String> {
    channel
        .programs
        .iter()
        .filter(|p| p.has_source())
        .filter_map(|p| p.stop_dt.map(|stop| (stop, p)))
        .filter(|(stop, _)| *stop <= now)
        .max_by_key(|(stop, _)| *stop)
        .and_then(|(_, p)| p.stream_url.clone())
}

fn make_placeholder(
    channel: &Channel,
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
    placeholder_icon: Option<&str>,
) -> Program {
    Program {
        start_dt: Some(start),
        stop_dt: Some(stop),
        start_str: Some(start.format(XMLTV_TIMESTAMP_FORMAT).to_string()),
        stop_str: Some(stop.format(XMLTV_TIMESTAMP_FORMAT).to_string()),
        program_name: PLACEHOLDER_TITLE.to_string(),
        description: format!(
            "{} has no scheduled programming in this time slot.",
            channel.channel_name
        ),
        icon_url: placeholder_icon
            .map(str::to_string)
            .or_else(|| channel.icon_url.clone()),
        stream_url: None,
        is_placeholder: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_with(programs: Vec<Program>) -> Channel {
        Channel {
            id: "42".to_string(),
            channel_name: "News1".to_string(),
            icon_url: Some("http://icons/news1.png".to_string()),
            programs,
        }
    }

    fn program(
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        name: &str,
        stream_url: Option<&str>,
    ) -> Program {
        Program {
            start_dt: Some(start),
            stop_dt: Some(stop),
            start_str: Some(start.format(XMLTV_TIMESTAMP_FORMAT).to_string()),
            stop_str: Some(stop.format(XMLTV_TIMESTAMP_FORMAT).to_string()),
            program_name: name.to_string(),
            description: String::new(),
            icon_url: None,
            stream_url: stream_url.map(str::to_string),
            is_placeholder: false,
        }
    }

    fn doc_with(channel: Channel) -> ScheduleDocument {
        let mut doc = ScheduleDocument::default();
        doc.0.insert(
            "g".to_string(),
            crate::models::PatternGroup {
                category: "News".to_string(),
                service_channels: vec![channel],
            },
        );
        doc
    }

    fn now() -> DateTime<Utc> {
        "2026-08-07T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_empty_channel_is_one_placeholder_spanning_window() {
        let channel = channel_with(vec![]);
        let (start, end) = visibility_window(now());
        let view = gap_filled_programs(&channel, start, end, None);

        assert_eq!(view.len(), 1);
        assert!(view[0].is_placeholder);
        assert_eq!(view[0].start_dt, Some(start));
        assert_eq!(view[0].stop_dt, Some(end));
        // The placeholder inherits the channel icon when no fallback is set.
        assert_eq!(view[0].icon_url.as_deref(), Some("http://icons/news1.png"));
    }

    #[test]
    fn test_window_is_utc_day_aligned() {
        let (start, end) = visibility_window(now());
        assert_eq!(start, "2026-08-06T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(end, "2026-08-15T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_live_program_resolves_unchanged() {
        let on_air = program(
            now() - Duration::hours(1),
            now() + Duration::hours(1),
            "Live Show",
            Some("http://src/a.ts"),
        );
        let doc = doc_with(channel_with(vec![on_air.clone()]));

        let resolution = resolve(&doc, "News1", now(), None).unwrap();
        let event = resolution.event.unwrap();
        assert_eq!(event, on_air);
        assert_eq!(resolution.source_url.as_deref(), Some("http://src/a.ts"));
    }

    #[test]
    fn test_outside_program_resolves_to_placeholder() {
        let later = program(
            now() + Duration::hours(2),
            now() + Duration::hours(3),
            "Later Show",
            Some("http://src/a.ts"),
        );
        let doc = doc_with(channel_with(vec![later]));

        let resolution = resolve(&doc, "News1", now(), None).unwrap();
        let event = resolution.event.unwrap();
        assert!(event.is_placeholder);
        assert!(event.is_live(now()));
    }

    #[test]
    fn test_gaps_between_programs_are_filled() {
        let first = program(
            now() - Duration::hours(4),
            now() - Duration::hours(3),
            "First",
            None,
        );
        let second = program(
            now() + Duration::hours(3),
            now() + Duration::hours(4),
            "Second",
            None,
        );
        // Stored out of order on purpose; the resolver must sort.
        let channel = channel_with(vec![second, first]);
        let (start, end) = visibility_window(now());
        let view = gap_filled_programs(&channel, start, end, None);

        // leading placeholder, First, middle placeholder, Second, trailing placeholder
        assert_eq!(view.len(), 5);
        assert!(view[0].is_placeholder);
        assert_eq!(view[1].program_name, "First");
        assert!(view[2].is_placeholder);
        assert_eq!(view[3].program_name, "Second");
        assert!(view[4].is_placeholder);

        // The view is gap-free across the window.
        let mut cursor = start;
        for entry in &view {
            assert_eq!(entry.start_dt, Some(cursor));
            cursor = entry.stop_dt.unwrap();
        }
        assert_eq!(cursor, end);
    }

    #[test]
    fn test_fallback_uses_most_recently_ended_source() {
        let older = program(
            now() - Duration::hours(6),
            now() - Duration::hours(5),
            "Older",
            Some("http://src/older.ts"),
        );
        let recent = program(
            now() - Duration::hours(3),
            now() - Duration::hours(2),
            "Recent",
            Some("http://src/recent.ts"),
        );
        let upcoming = program(
            now() + Duration::hours(1),
            now() + Duration::hours(2),
            "Upcoming",
            Some("http://src/upcoming.ts"),
        );
        let doc = doc_with(channel_with(vec![older, upcoming, recent]));

        let resolution = resolve(&doc, "News1", now(), None).unwrap();
        assert!(resolution.event.as_ref().unwrap().is_placeholder);
        assert_eq!(
            resolution.source_url.as_deref(),
            Some("http://src/recent.ts")
        );
    }

    #[test]
    fn test_no_source_at_all() {
        let doc = doc_with(channel_with(vec![]));
        let resolution = resolve(&doc, "News1", now(), None).unwrap();
        assert!(resolution.event.is_some());
        assert!(resolution.source_url.is_none());
    }

    #[test]
    fn test_unknown_channel() {
        let doc = doc_with(channel_with(vec![]));
        assert!(resolve(&doc, "Nope", now(), None).is_none());
    }

    #[test]
    fn test_resolves_by_id_when_name_does_not_match() {
        let doc = doc_with(channel_with(vec![]));
        let resolution = resolve(&doc, "42", now(), None).unwrap();
        assert_eq!(resolution.channel_name, "News1");
    }

    #[test]
    fn test_placeholder_icon_overrides_channel_icon() {
        let channel = channel_with(vec![]);
        let (start, end) = visibility_window(now());
        let view = gap_filled_programs(&channel, start, end, Some("http://icons/fallback.png"));
        assert_eq!(
            view[0].icon_url.as_deref(),
            Some("http://icons/fallback.png")
        );
    }

    #[test]
    fn test_metadata_only_program_without_stop_never_feeds_fallback() {
        let mut meta_only = program(
            now() - Duration::hours(2),
            now() - Duration::hours(1),
            "Meta",
            Some("http://src/meta.ts"),
        );
        meta_only.stop_dt = None;
        let doc = doc_with(channel_with(vec![meta_only]));

        let resolution = resolve(&doc, "News1", now(), None).unwrap();
        assert!(resolution.source_url.is_none());
    }
}
