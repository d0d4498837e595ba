//! Slash-command payloads registered with the guild.
//!
//! Raw Discord application-command JSON. The claim command is rebuilt from
//! the current roster every startup; the onboarding choices are the fixed
//! step enumerations. Interaction handling itself lives outside this core.

use serde_json::{json, Value};

// Discord application command option types.
const SUB_COMMAND: u8 = 1;
const STRING: u8 = 3;
const MENTIONABLE: u8 = 9;

/// The static command set that never changes between seasons.
pub fn default_commands() -> Vec<Value> {
    vec![
        json!({ "name": "ping", "description": "Replies with pong!" }),
        json!({ "name": "ftc", "description": "Fuck the commish!" }),
        json!({ "name": "draft", "description": "Get draft info" }),
        json!({ "name": "team", "description": "Get team info" }),
        json!({ "name": "constitution", "description": "Get a link to the league constitution" }),
        json!({ "name": "punishments", "description": "Get a link to the current punishment document" }),
        json!({ "name": "help", "description": "List available commands" }),
    ]
}

/// The claim command: members pick which fantasy team they administer.
/// Choices come from the current roster.
pub fn claim_command(choices: &[(String, String)]) -> Value {
    let choices: Vec<Value> = choices
        .iter()
        .map(|(team_id, name)| json!({ "name": name, "value": team_id }))
        .collect();
    json!({
        "name": "claim",
        "description": "Claim the fantasy team you manage",
        "options": [{
            "type": STRING,
            "name": "team",
            "description": "Choose your team",
            "required": true,
            "choices": choices,
        }]
    })
}

/// The onboard command: league-wide and per-member checklist completion.
pub fn onboard_command() -> Value {
    json!({
        "name": "onboard",
        "description": "Complete an onboarding step",
        "default_member_permissions": "0",
        "options": [
            {
                "type": SUB_COMMAND,
                "name": "league",
                "description": "Complete a league-wide onboarding step",
                "options": [{
                    "type": STRING,
                    "name": "step",
                    "description": "Choose a step",
                    "required": true,
                    "choices": [
                        { "name": "Punishments Submitted", "value": "PunishmentsSubmitted" },
                        { "name": "Punishments Polled", "value": "PunishmentsPolled" },
                        { "name": "Punishments Vetoed", "value": "PunishmentsVetoed" },
                    ],
                }]
            },
            {
                "type": SUB_COMMAND,
                "name": "member",
                "description": "Complete an onboarding step for a member",
                "options": [
                    {
                        "type": MENTIONABLE,
                        "name": "user",
                        "description": "Pick a user",
                        "required": true,
                    },
                    {
                        "type": STRING,
                        "name": "step",
                        "description": "Choose a step",
                        "required": true,
                        "choices": [
                            { "name": "Paid", "value": "Paid" },
                            { "name": "Punishments Chosen", "value": "PunishmentsChosen" },
                            { "name": "Punishment Vetoed", "value": "PunishmentVetoed" },
                        ],
                    },
                ]
            },
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_command_carries_roster_choices() {
        let roster = vec![
            ("1".to_string(), "Gridiron Goblins".to_string()),
            ("2".to_string(), "Waiver Wire Warlocks".to_string()),
        ];
        let cmd = claim_command(&roster);
        assert_eq!(cmd["name"], "claim");
        let choices = cmd["options"][0]["choices"].as_array().unwrap();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0]["value"], "1");
        assert_eq!(choices[1]["name"], "Waiver Wire Warlocks");
    }

    #[test]
    fn onboard_command_has_fixed_step_choices() {
        let cmd = onboard_command();
        let subs = cmd["options"].as_array().unwrap();
        assert_eq!(subs.len(), 2);

        let league_choices = subs[0]["options"][0]["choices"].as_array().unwrap();
        assert_eq!(league_choices.len(), 3);
        assert_eq!(league_choices[0]["value"], "PunishmentsSubmitted");

        let member_choices = subs[1]["options"][1]["choices"].as_array().unwrap();
        assert_eq!(member_choices.len(), 3);
        assert_eq!(member_choices[0]["value"], "Paid");
    }

    #[test]
    fn default_commands_are_well_formed() {
        let commands = default_commands();
        assert_eq!(commands.len(), 7);
        for cmd in &commands {
            assert!(cmd["name"].is_string());
            assert!(cmd["description"].is_string());
        }
    }
}
