use serde::{Deserialize, Serialize};

use crate::engine::StatEntry;
use crate::error::{MatchError, Precondition};

/// What the presentation layer should do after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "data", rename_all = "snake_case")]
pub enum Effect {
    /// Redraw from the current state.
    Render,
    PromptServeChoice,
    PromptLineup,
    /// Ask for the attribution of a point.
    PromptStatEntry(StatEntry),
    /// Notice for the user.
    Alert(String),
}

/// Result of one session operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub effects: Vec<Effect>,
    /// Set when the operation was rejected; the state is then unchanged.
    pub error: Option<MatchError>,
}

impl Reply {
    pub fn ok(effects: Vec<Effect>) -> Self {
        Self { effects, error: None }
    }

    /// Alert with the error message, followed by the setup prompt it points to.
    pub fn rejected(error: MatchError) -> Self {
        let mut effects = vec![Effect::Alert(error.to_string())];
        match error.redirect() {
            Some(Precondition::LineupRequired) => effects.push(Effect::PromptLineup),
            Some(Precondition::ServeNotChosen) => effects.push(Effect::PromptServeChoice),
            Some(Precondition::RostersIncomplete) | None => {}
        }
        Self { effects, error: Some(error) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn alerts(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Alert(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineup_precondition_prompts_lineup() {
        let reply = Reply::rejected(MatchError::PreconditionNotMet(Precondition::LineupRequired));
        assert!(!reply.is_ok());
        assert_eq!(reply.effects.len(), 2);
        assert_eq!(reply.effects[1], Effect::PromptLineup);
    }

    #[test]
    fn test_rule_violation_only_alerts() {
        let reply = Reply::rejected(MatchError::SubstitutionLimitReached);
        assert_eq!(reply.alerts().collect::<Vec<_>>(), vec!["Substitution limit reached"]);
        assert_eq!(reply.effects.len(), 1);
    }

    #[test]
    fn test_effect_wire_shape() {
        let json = serde_json::to_value(Effect::Alert("hi".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({ "effect": "alert", "data": "hi" }));
        let json = serde_json::to_value(Effect::Render).unwrap();
        assert_eq!(json, serde_json::json!({ "effect": "render" }));
    }
}
