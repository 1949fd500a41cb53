//! M3U playlist rendering
//!
//! Produces the `#EXTM3U` playlist that IPTV players load: one
//! `#EXTINF`/URL pair per channel that has at least one real program, with
//! the usual `tvg-*` attributes and the group's category as `group-title`.

use crate::models::ScheduleDocument;

/// Render the playlist for all channels with at least one program.
///
/// `base_url` is the externally-visible root of this server; stream URLs are
/// formed as `{base_url}/stream/{id}.ts`.
pub fn render_playlist(doc: &ScheduleDocument, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let mut lines = vec!["#EXTM3U".to_string()];

    for (group, channel) in doc.channels() {
        if channel.programs.is_empty() {
            continue;
        }

        lines.push(format!(
            "#EXTINF:-1 tvg-id=\"{}\" tvg-name=\"{}\" tvg-logo=\"{}\" group-title=\"{}\",{}",
            channel.id,
            channel.channel_name,
            channel.icon_url.as_deref().unwrap_or(""),
            group.category,
            channel.channel_name,
        ));
        lines.push(format!("{}/stream/{}.ts", base, channel.id));
    }

    let mut playlist = lines.join("\n");
    playlist.push('\n');
    playlist
}
