//! Rich message payloads attached to announcements.

use commish_channels::MessagePayload;
use commish_league::{SeasonSnapshot, Team};
use serde_json::json;

const EMBED_COLOR: u32 = 0x0099FF;

/// Draft info card sent with the standing predraft announcement.
pub fn draft(snapshot: &SeasonSnapshot, league_id: &str) -> MessagePayload {
    MessagePayload {
        embed: json!({
            "color": EMBED_COLOR,
            "title": "Draft Info (/draft)",
            "url": format!("https://football.fantasysports.yahoo.com/f1/{league_id}/draft"),
            "description": snapshot.name,
            "fields": [
                { "name": ":football: Number of teams", "value": snapshot.teams.len().to_string(), "inline": true },
                { "name": ":date: Season start", "value": season_start_text(snapshot), "inline": true },
            ],
        }),
    }
}

/// Team info card.
pub fn team(team: &Team) -> MessagePayload {
    let draft_grade = team.draft_grade.clone().unwrap_or_else(|| "N/A".into());
    MessagePayload {
        embed: json!({
            "color": EMBED_COLOR,
            "title": "Team Info (/team)",
            "fields": [
                { "name": "Team name", "value": team.name },
                { "name": "Draft grade", "value": draft_grade },
                { "name": "Number of trades", "value": team.number_of_trades.to_string() },
            ],
            "image": { "url": team.logo_url },
        }),
    }
}

fn season_start_text(snapshot: &SeasonSnapshot) -> String {
    match snapshot.season_start {
        Some(start) => start.format("%B %-d, %Y").to_string(),
        None => "TBD".into(),
    }
}
