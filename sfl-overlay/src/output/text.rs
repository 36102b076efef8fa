//! Text fields for OBS text sources
//!
//! Each field is one small file in the output directory, rewritten on every
//! accepted observation.

use serde_json::Value;
use sfl_session::rating::parse_rating;
use sfl_session::Session;

use super::rank::{rank_image_name, rank_name};

const DEFAULT_PLAYER_NAME: &str = "SF6 Player";

/// Display-relevant subset of the scraped player payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCard {
    pub fighter_name: String,
    pub mr: i64,
    pub lp: i64,
    pub rank: i64,
    pub favorite_character: String,
}

impl PlayerCard {
    /// Extract display fields from the payload; `mr` is the validated rating
    pub fn from_payload(data: &Value, mr: i64) -> Self {
        let fighter_name = ["fighter_name", "fighterName"]
            .iter()
            .filter_map(|key| data.get(*key).and_then(Value::as_str))
            .find(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PLAYER_NAME)
            .to_string();

        let lp = data.get("lp").and_then(|v| parse_rating(v).ok()).unwrap_or(0);

        // First present rank key wins; unusable values fall back to rank 1
        let rank = ["ml", "league_rank_number"]
            .iter()
            .filter_map(|key| data.get(*key))
            .find(|v| !v.is_null())
            .and_then(|v| parse_rating(v).ok())
            .unwrap_or(1);

        let favorite_character = data
            .get("favorite_character_tool_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_uppercase();

        Self {
            fighter_name,
            mr,
            lp,
            rank,
            favorite_character,
        }
    }

    pub fn rank_name(&self) -> String {
        rank_name(self.rank)
    }
}

/// Format a signed rating change as `+N`, `-N` or `0`
pub fn format_change(change: i64) -> String {
    if change > 0 {
        format!("+{}", change)
    } else {
        change.to_string()
    }
}

/// File name and content of every text field
///
/// Session fields come from `session` only while it is active; otherwise
/// neutral placeholders are written.
pub fn text_fields(card: &PlayerCard, session: Option<&Session>) -> Vec<(&'static str, String)> {
    let rank_name = card.rank_name();

    let mut fields = vec![
        ("player-name.txt", card.fighter_name.clone()),
        ("mr.txt", card.mr.to_string()),
        ("lp.txt", card.lp.to_string()),
        ("rank-name.txt", rank_name.clone()),
        ("rank-number.txt", card.rank.to_string()),
        ("rank-image-path.txt", format!("images/{}", rank_image_name(card.rank))),
        ("favorite-character.txt", card.favorite_character.clone()),
    ];

    match session.filter(|s| s.is_active) {
        Some(session) => {
            let wins = session.matches.iter().filter(|m| m.win).count();
            let losses = session.matches.len() - wins;
            fields.push(("mr-change.txt", format_change(session.net_change())));
            fields.push(("win-loss.txt", format!("{}/{}", wins, losses)));
            fields.push(("start-mr.txt", session.start_mr.to_string()));
            fields.push(("peak-mr.txt", session.peak_mr.to_string()));
        }
        None => {
            fields.push(("mr-change.txt", "±0".to_string()));
            fields.push(("win-loss.txt", "0/0".to_string()));
            fields.push(("start-mr.txt", card.mr.to_string()));
            fields.push(("peak-mr.txt", card.mr.to_string()));
        }
    }

    fields.push((
        "full-info.txt",
        format!("{}\n{}\nMR: {}\nLP: {}", card.fighter_name, rank_name, card.mr, card.lp),
    ));

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field<'a>(fields: &'a [(&'static str, String)], name: &str) -> &'a str {
        fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_card_from_full_payload() {
        let data = json!({
            "fighter_name": "Daigo",
            "mr": 1800,
            "lp": "25000",
            "ml": 36,
            "favorite_character_tool_name": "ryu"
        });
        let card = PlayerCard::from_payload(&data, 1800);

        assert_eq!(card.fighter_name, "Daigo");
        assert_eq!(card.lp, 25000);
        assert_eq!(card.rank, 36);
        assert_eq!(card.favorite_character, "RYU");
        assert_eq!(card.rank_name(), "Legendary 4");
    }

    #[test]
    fn test_card_fallbacks() {
        let data = json!({ "fighterName": "", "league_rank_number": "x" });
        let card = PlayerCard::from_payload(&data, 1500);

        assert_eq!(card.fighter_name, DEFAULT_PLAYER_NAME);
        assert_eq!(card.lp, 0);
        assert_eq!(card.rank, 1);
        assert_eq!(card.favorite_character, "");
    }

    #[test]
    fn test_card_uses_league_rank_number_when_ml_null() {
        let data = json!({ "ml": null, "league_rank_number": 21 });
        assert_eq!(PlayerCard::from_payload(&data, 0).rank, 21);
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(50), "+50");
        assert_eq!(format_change(-30), "-30");
        assert_eq!(format_change(0), "0");
    }

    #[test]
    fn test_fields_with_active_session() {
        let card = PlayerCard::from_payload(&json!({ "fighter_name": "P1", "lp": 100, "ml": 5 }), 1540);
        let mut session = Session::start(1500, 0);
        session.record(1550, 1);
        session.record(1520, 2);
        session.record(1540, 3);

        let fields = text_fields(&card, Some(&session));

        assert_eq!(field(&fields, "mr-change.txt"), "+40");
        assert_eq!(field(&fields, "win-loss.txt"), "2/1");
        assert_eq!(field(&fields, "start-mr.txt"), "1500");
        assert_eq!(field(&fields, "peak-mr.txt"), "1550");
        assert_eq!(field(&fields, "rank-image-path.txt"), "images/rank5_s.png");
        assert_eq!(field(&fields, "full-info.txt"), "P1\nIron 1\nMR: 1540\nLP: 100");
    }

    #[test]
    fn test_fields_without_active_session() {
        let card = PlayerCard::from_payload(&json!({}), 1500);
        let mut ended = Session::start(1400, 0);
        ended.finish(1);

        for session in [None, Some(&ended)] {
            let fields = text_fields(&card, session);
            assert_eq!(field(&fields, "mr-change.txt"), "±0");
            assert_eq!(field(&fields, "win-loss.txt"), "0/0");
            assert_eq!(field(&fields, "start-mr.txt"), "1500");
            assert_eq!(field(&fields, "peak-mr.txt"), "1500");
        }
    }
}
