use crate::schedule::GeneratedFixture;
use crate::schedule::knockout::Bracket;
use league_api::Team;
use std::collections::HashMap;

/// Render fixtures as one aligned line each for the terminal preview.
pub fn fixture_lines(fixtures: &[GeneratedFixture], teams: &[Team]) -> Vec<String> {
    let names: HashMap<&str, &str> =
        teams.iter().map(|t| (t.id.as_str(), t.short_name.as_str())).collect();

    fixtures
        .iter()
        .map(|f| {
            let home = side_label(&f.home_team_id, &names);
            let away = side_label(&f.away_team_id, &names);
            let mut line = format!(
                "R{:<2} {} {:>5}  {:<14} {:>14} vs {:<14}",
                f.round,
                f.date,
                f.time,
                f.venue,
                home,
                away
            );
            if let Some(notes) = &f.notes {
                line.push_str(&format!("  [{notes}]"));
            }
            line
        })
        .collect()
}

/// Render the bracket skeleton, one round per block.
pub fn bracket_lines(bracket: &Bracket) -> Vec<String> {
    let mut lines = Vec::new();
    for round in &bracket.rounds {
        lines.push(format!("── {} ──", round.name));
        for slot in &round.matches {
            let line = if slot.is_bye {
                // Bye slots record their winner immediately; show who advances.
                let advancing = slot
                    .team1
                    .as_ref()
                    .filter(|t| slot.winner_id.as_deref() == Some(t.id.as_str()))
                    .map(|t| t.short_name.as_str())
                    .unwrap_or("TBD");
                format!("  #{:<3} {advancing} — bye", slot.match_number)
            } else {
                let team1 = slot.team1.as_ref().map(|t| t.short_name.as_str());
                let team2 = slot.team2.as_ref().map(|t| t.short_name.as_str());
                match (team1, team2, slot.previous_match_1, slot.previous_match_2) {
                    (None, None, Some(a), Some(b)) => {
                        format!("  #{:<3} winner of #{a} vs winner of #{b}", slot.match_number)
                    }
                    _ => format!(
                        "  #{:<3} {} vs {}",
                        slot.match_number,
                        team1.unwrap_or("TBD"),
                        team2.unwrap_or("TBD")
                    ),
                }
            };
            lines.push(line);
        }
    }
    lines
}

fn side_label(id: &Option<String>, names: &HashMap<&str, &str>) -> String {
    match id {
        Some(id) => names.get(id.as_str()).map(|n| (*n).to_owned()).unwrap_or_else(|| id.clone()),
        None => "TBD".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn teams() -> Vec<Team> {
        vec![
            Team { id: "t1".into(), name: "Northside Hawks".into(), short_name: "Hawks".into() },
            Team { id: "t2".into(), name: "Dockyard Pistons".into(), short_name: "Pistons".into() },
        ]
    }

    #[test]
    fn fixture_line_shows_round_date_slot_and_short_names() {
        let fixture = GeneratedFixture {
            round: 1,
            home_team_id: Some("t1".into()),
            away_team_id: Some("t2".into()),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            time: "14:00".into(),
            venue: "Court 1".into(),
            notes: None,
        };
        let lines = fixture_lines(&[fixture], &teams());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("R1  2025-01-01 14:00"), "line: {}", lines[0]);
        assert!(lines[0].contains("Hawks vs Pistons"), "line: {}", lines[0]);
    }

    #[test]
    fn unresolved_sides_render_as_tbd() {
        let fixture = GeneratedFixture {
            round: 2,
            home_team_id: None,
            away_team_id: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            time: "18:00".into(),
            venue: "Center Court".into(),
            notes: Some("Knockout Bracket - Final - Series 7, Game 1 of 1".into()),
        };
        let lines = fixture_lines(&[fixture], &teams());
        assert!(lines[0].contains("TBD"));
        assert!(lines[0].contains("[Knockout Bracket - Final"));
    }
}
