use serde_json::{json, Map, Value};

use super::error::SaveError;
use super::format::current_timestamp;
use super::SAVE_VERSION;
use crate::models::LINEUP_SIZE;

/// Fields only the old browser front end kept in its saved state.
const LEGACY_UI_FIELDS: [&str; 3] = ["editingTeamId", "substitutionState", "statEntry"];

/// Version of a raw stored document. A bare state object without an
/// envelope is version 0.
pub fn document_version(doc: &Value) -> Result<u32, SaveError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| SaveError::Corrupted("document is not a JSON object".to_string()))?;

    if obj.contains_key("state") {
        let version = obj
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| SaveError::Corrupted("missing document version".to_string()))?;
        return u32::try_from(version)
            .map_err(|_| SaveError::Corrupted(format!("version {} out of range", version)));
    }
    if obj.contains_key("teamA") && obj.contains_key("teamB") {
        return Ok(0);
    }
    Err(SaveError::Corrupted("unrecognized document shape".to_string()))
}

/// Migrate a stored document to the current envelope.
pub fn migrate_document(doc: Value) -> Result<Value, SaveError> {
    let original_version = document_version(&doc)?;

    let migrated = match original_version {
        0 => migrate_v0_to_v1(doc)?,
        SAVE_VERSION => doc,
        v if v > SAVE_VERSION => {
            // Future version - might be compatible
            log::warn!("Loading save from future version {} (current: {})", v, SAVE_VERSION);
            doc
        }
        v => return Err(SaveError::VersionMismatch { found: v, expected: SAVE_VERSION }),
    };

    if original_version < SAVE_VERSION {
        log::info!("Migrated save from version {} to {}", original_version, SAVE_VERSION);
    }
    Ok(migrated)
}

/// Version 0 is the bare state written by the old browser front end.
fn migrate_v0_to_v1(mut state: Value) -> Result<Value, SaveError> {
    log::info!("Migrating save from version 0 to 1");

    let obj = state
        .as_object_mut()
        .ok_or_else(|| SaveError::Corrupted("state is not a JSON object".to_string()))?;

    for key in LEGACY_UI_FIELDS {
        obj.remove(key);
    }
    for key in ["teamA", "teamB"] {
        let team = obj
            .get_mut(key)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SaveError::Corrupted(format!("{} is not an object", key)))?;
        migrate_team_v0(team);
    }

    if let Some(scores) = obj.get_mut("setScores").and_then(Value::as_array_mut) {
        for score in scores.iter_mut().filter_map(Value::as_object_mut) {
            rename_key(score, "winner", "winnerId");
        }
    }
    if !obj.get("matchLog").is_some_and(Value::is_array) {
        obj.insert("matchLog".to_string(), json!([]));
    }

    Ok(json!({
        "version": SAVE_VERSION,
        "timestamp": current_timestamp(),
        "state": state,
    }))
}

fn migrate_team_v0(team: &mut Map<String, Value>) {
    rename_key(team, "subs", "subsUsed");
    team.remove("color");

    if let Some(mut libero_state) = team.remove("liberoState") {
        if let Some(active) = libero_state.get_mut("activeLiberoRosterIndices") {
            team.entry("activeLiberoIndices").or_insert(active.take());
        }
    }
    // Some old saves left null entries behind.
    if let Some(Value::Array(active)) = team.get_mut("activeLiberoIndices") {
        active.retain(Value::is_u64);
    }

    let lineup_ok = team
        .get("startingSix")
        .and_then(Value::as_array)
        .is_some_and(|slots| slots.len() == LINEUP_SIZE);
    if !lineup_ok {
        team.insert("startingSix".to_string(), Value::from(vec![-1i64; LINEUP_SIZE]));
    }

    if let Some(roster) = team.get_mut("roster").and_then(Value::as_array_mut) {
        for player in roster.iter_mut() {
            if !player.is_object() {
                *player = json!({ "number": "", "name": "" });
            }
            if let Some(p) = player.as_object_mut() {
                rename_key(p, "subPartnerRosterIndex", "subPartnerIndex");
                // Jersey numbers were stored as JSON numbers.
                if let Some(number) = p.get_mut("number") {
                    *number = match number.take() {
                        Value::String(s) => Value::String(s),
                        Value::Null => Value::String(String::new()),
                        other => Value::String(other.to_string()),
                    };
                }
            }
        }
    }

    match team.get_mut("statsBySet").and_then(Value::as_array_mut) {
        Some(sets) => {
            for set in sets.iter_mut().filter_map(Value::as_array_mut) {
                for event in set.iter_mut().filter_map(Value::as_object_mut) {
                    rename_key(event, "score", "scoreSnapshot");
                }
            }
        }
        None => {
            team.insert("statsBySet".to_string(), json!([]));
        }
    }
}

fn rename_key(obj: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = obj.remove(from) {
        obj.entry(to).or_insert(value);
    }
}
