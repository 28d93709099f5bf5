// Match command JSON API
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::effect::{Effect, Reply};
use super::session::MatchSession;
use crate::engine::{parse_lineup_slots, SetFilter, StatEntry};
use crate::error::MatchError;
use crate::export::PageLayout;
use crate::models::{MatchConfig, Player, RosterIndex, Staff, StatAction, StatKind, TeamId};
use crate::save::KeyValueStore;
use crate::SCHEMA_VERSION;

/// Command request from a front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub schema_version: u8,
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Setup prompts on launch
    Startup,

    /// Full match state
    GetState,

    NewMatch {
        #[serde(default)]
        config: MatchConfig,
    },

    UpdateRoster {
        team: TeamId,
        players: Vec<Player>,
        #[serde(default)]
        staff: Staff,
    },

    SetTeamName { team: TeamId, name: String },

    ChooseServe { team: TeamId },

    /// Slots are roster indices; `-1` is rejected
    ConfirmLineup { team: TeamId, slots: Vec<i64> },

    ConfirmLineups { team_a: Vec<i64>, team_b: Vec<i64> },

    /// Score button (+1 opens attribution, -1 corrects)
    ChangeScore { team: TeamId, delta: i32 },

    /// Scores a point with its attribution in one step
    RecordPoint { team: TeamId, kind: StatKind, action: StatAction, player: RosterIndex },

    CallTimeout { team: TeamId },

    Substitute { team: TeamId, player_in: RosterIndex, player_out: RosterIndex },

    ToggleLibero { team: TeamId, player: RosterIndex },

    SwapSides,

    ResetSet,

    ResetMatch,

    ClearSaved,

    /// Per-player statistics; all sets when `set` is omitted
    Stats {
        team: TeamId,
        #[serde(default)]
        set: Option<usize>,
    },

    Export,
}

/// Response sent back to the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub schema_version: u8,
    pub success: bool,
    pub effects: Vec<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub error_message: Option<String>,
}

impl CommandResponse {
    fn from_reply(reply: Reply) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            success: reply.error.is_none(),
            effects: reply.effects,
            data: None,
            error_message: reply.error.map(|e| e.to_string()),
        }
    }

    fn with_data(data: Value) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            success: true,
            effects: Vec::new(),
            data: Some(data),
            error_message: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            success: false,
            effects: vec![Effect::Alert(message.clone())],
            data: None,
            error_message: Some(message),
        }
    }
}

/// Runs one command against the session.
pub fn handle_command<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    command: Command,
) -> CommandResponse {
    debug!("Handling command {:?}", command);

    let reply = match command {
        Command::Startup => session.startup(),
        Command::GetState => return to_data(session.state()),
        Command::NewMatch { config } => session.new_match(config),
        Command::UpdateRoster { team, players, staff } => {
            session.update_roster(team, players, staff)
        }
        Command::SetTeamName { team, name } => session.set_team_name(team, &name),
        Command::ChooseServe { team } => session.choose_initial_serve(team),
        Command::ConfirmLineup { team, slots } => match parse_lineup_slots(&slots) {
            Ok(six) => session.confirm_lineup(team, &six),
            Err(e) => Reply::rejected(e),
        },
        Command::ConfirmLineups { team_a, team_b } => {
            match (parse_lineup_slots(&team_a), parse_lineup_slots(&team_b)) {
                (Ok(a), Ok(b)) => session.confirm_lineups(&a, &b),
                (Err(e), _) | (_, Err(e)) => Reply::rejected(e),
            }
        }
        Command::ChangeScore { team, delta } => session.change_score(team, delta),
        Command::RecordPoint { team, kind, action, player } => {
            record_point(session, team, kind, action, player)
        }
        Command::CallTimeout { team } => session.call_timeout(team),
        Command::Substitute { team, player_in, player_out } => {
            match session.open_substitution(team) {
                Ok(mut draft) => {
                    draft.select_in(player_in);
                    draft.select_out(player_out);
                    session.commit_substitution(draft)
                }
                Err(reply) => reply,
            }
        }
        Command::ToggleLibero { team, player } => session.toggle_libero(team, player),
        Command::SwapSides => session.swap_sides(),
        Command::ResetSet => session.reset_current_set(),
        Command::ResetMatch => session.reset_match(),
        Command::ClearSaved => session.clear_saved(),
        Command::Stats { team, set } => {
            let filter = set.map_or(SetFilter::All, SetFilter::Set);
            return to_data(&session.state().tally(team, filter));
        }
        Command::Export => {
            let document = session.export(PageLayout::default());
            return to_data(&serde_json::json!({
                "file_name": document.file_name(),
                "pages": document.page_count(),
                "text": document.to_text(),
            }));
        }
    };

    if let Some(e) = &reply.error {
        warn!("Command rejected: {}", e);
    }
    CommandResponse::from_reply(reply)
}

/// Full stat entry flow: refuses the point unless the score button would
/// have opened attribution.
fn record_point<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    team: TeamId,
    kind: StatKind,
    action: StatAction,
    player: RosterIndex,
) -> Reply {
    let reply = session.change_score(team, 1);
    let entry = match reply.effects.as_slice() {
        [Effect::PromptStatEntry(entry)] => entry.clone(),
        _ => return reply,
    };

    let pending = attribute(entry, kind, action, player);
    match pending {
        Ok(pending) => session.commit_stat(pending),
        Err(e) => Reply::rejected(e),
    }
}

fn attribute(
    entry: StatEntry,
    kind: StatKind,
    action: StatAction,
    player: RosterIndex,
) -> Result<crate::engine::PendingStat, MatchError> {
    entry.choose_kind(kind)?.choose_action(action)?.choose_player(player)
}

fn to_data<T: Serialize>(value: &T) -> CommandResponse {
    match serde_json::to_value(value) {
        Ok(data) => CommandResponse::with_data(data),
        Err(e) => {
            error!("Failed to serialize response data: {}", e);
            CommandResponse::error(format!("Failed to serialize response: {}", e))
        }
    }
}

/// Handle a JSON command request
///
/// # Arguments
/// * `request_json` - JSON string containing a CommandRequest
///
/// # Returns
/// JSON string containing a CommandResponse
pub fn handle_command_json<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    request_json: &str,
) -> String {
    let request: CommandRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse CommandRequest: {}", e);
            let response = CommandResponse::error(format!("Invalid JSON format: {}", e));
            return serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string());
        }
    };

    if request.schema_version != SCHEMA_VERSION {
        warn!(
            "Unsupported schema version {} (expected {})",
            request.schema_version, SCHEMA_VERSION
        );
        let response = CommandResponse::error(format!(
            "Unsupported schema version {} (expected {})",
            request.schema_version, SCHEMA_VERSION
        ));
        return serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string());
    }

    let response = handle_command(session, request.command);
    info!("Command handled (success: {})", response.success);
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::MemoryStore;
    use serde_json::json;

    fn send(session: &mut MatchSession<MemoryStore>, request: Value) -> CommandResponse {
        let raw = handle_command_json(session, &request.to_string());
        serde_json::from_str(&raw).unwrap()
    }

    fn roster_json(first: u32) -> Value {
        let players: Vec<Value> = (first..first + 7)
            .map(|n| json!({ "number": n.to_string(), "name": format!("Player {}", n), "isCaptain": n == first }))
            .collect();
        Value::Array(players)
    }

    fn ready_session() -> MatchSession<MemoryStore> {
        let mut session = MatchSession::open(MemoryStore::new());
        for (team, first) in [("A", 1), ("B", 15)] {
            let response = send(
                &mut session,
                json!({ "schema_version": 1, "command": "update_roster", "team": team, "players": roster_json(first) }),
            );
            assert!(response.success, "{:?}", response.error_message);
        }
        send(&mut session, json!({ "schema_version": 1, "command": "choose_serve", "team": "B" }));
        let response = send(
            &mut session,
            json!({ "schema_version": 1, "command": "confirm_lineups",
                    "team_a": [0, 1, 2, 3, 4, 5], "team_b": [0, 1, 2, 3, 4, 5] }),
        );
        assert!(response.success);
        session
    }

    #[test]
    fn test_record_point_end_to_end() {
        let mut session = ready_session();
        let response = send(
            &mut session,
            json!({ "schema_version": 1, "command": "record_point", "team": "A",
                    "kind": "acierto", "action": "ataque", "player": 3 }),
        );
        assert!(response.success);
        assert_eq!(response.effects, vec![Effect::Render]);

        let state = session.state();
        assert_eq!(state.team_a.score, 1);
        assert_eq!(state.serving_team(), Some(TeamId::A));
        let last = state.match_log.last().unwrap();
        assert!(last.contains("#4") && last.contains("Attack"));
    }

    #[test]
    fn test_change_score_prompts_stat_entry() {
        let mut session = ready_session();
        let response = send(
            &mut session,
            json!({ "schema_version": 1, "command": "change_score", "team": "B", "delta": 1 }),
        );
        assert_eq!(response.effects, vec![Effect::PromptStatEntry(StatEntry::new(TeamId::B))]);
        assert_eq!(session.state().team_b.score, 0);
    }

    #[test]
    fn test_sentinel_slot_rejected() {
        let mut session = ready_session();
        let response = send(
            &mut session,
            json!({ "schema_version": 1, "command": "confirm_lineup", "team": "A", "slots": [0, 1, 2, 3, 4, -1] }),
        );
        assert!(!response.success);
        assert!(response.error_message.unwrap().contains("Invalid lineup"));
    }

    #[test]
    fn test_stats_and_export_return_data() {
        let mut session = ready_session();
        send(
            &mut session,
            json!({ "schema_version": 1, "command": "record_point", "team": "B",
                    "kind": "error", "action": "saque", "player": 0 }),
        );

        let response =
            send(&mut session, json!({ "schema_version": 1, "command": "stats", "team": "A" }));
        let tally = response.data.unwrap();
        assert_eq!(tally[0]["errors"]["serve"], json!(1));

        let response = send(&mut session, json!({ "schema_version": 1, "command": "export" }));
        let data = response.data.unwrap();
        assert_eq!(data["file_name"], json!("Match-Away Team-vs-Home Team.txt"));
    }

    #[test]
    fn test_bad_requests() {
        let mut session = MatchSession::open(MemoryStore::new());
        let raw = handle_command_json(&mut session, "not json");
        let response: CommandResponse = serde_json::from_str(&raw).unwrap();
        assert!(!response.success);

        let response = send(&mut session, json!({ "schema_version": 9, "command": "swap_sides" }));
        assert!(response.error_message.unwrap().contains("schema version"));
        assert!(!session.state().sides_swapped);
    }
}
