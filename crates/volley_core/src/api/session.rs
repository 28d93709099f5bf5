//! Match session
//!
//! [`MatchSession`] owns the running [`MatchState`] and the store it is
//! persisted to. Every operation validates and mutates through the engine,
//! writes the state after a successful change and tells the presentation
//! layer what to do next through a [`Reply`].

use tracing::{info, warn};

use super::effect::{Effect, Reply};
use crate::engine::{PendingStat, ScoreChange, StartupPrompt, SubstitutionDraft};
use crate::error::{MatchError, Precondition};
use crate::export::{ExportDocument, MatchSummary, PageLayout};
use crate::models::{MatchConfig, Player, RosterIndex, Staff, TeamId};
use crate::save::{KeyValueStore, SaveManager};
use crate::state::MatchState;

pub struct MatchSession<S: KeyValueStore> {
    state: MatchState,
    saves: SaveManager<S>,
    load_warning: Option<String>,
}

impl<S: KeyValueStore> MatchSession<S> {
    /// Resumes the stored match, or starts a fresh one when nothing usable is stored.
    pub fn open(store: S) -> Self {
        let saves = SaveManager::new(store);
        let (state, load_warning) = match saves.load() {
            Ok(Some(state)) => (state, None),
            Ok(None) => (MatchState::new(), None),
            Err(e) => {
                warn!("Stored match could not be loaded: {}", e);
                let warning = format!(
                    "The saved match could not be loaded ({}). A new match was started.",
                    e
                );
                (MatchState::new(), Some(warning))
            }
        };
        Self { state, saves, load_warning }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn saves(&self) -> &SaveManager<S> {
        &self.saves
    }

    pub fn into_store(self) -> S {
        self.saves.into_store()
    }

    /// Effects to show when the front end starts.
    pub fn startup(&mut self) -> Reply {
        let mut effects = vec![Effect::Render];
        if let Some(warning) = self.load_warning.take() {
            effects.push(Effect::Alert(warning));
        }
        match self.state.startup_prompt() {
            StartupPrompt::LoadRosters => {
                effects.push(Effect::Alert(Precondition::RostersIncomplete.to_string()))
            }
            StartupPrompt::ChooseServe => effects.push(Effect::PromptServeChoice),
            StartupPrompt::ChooseLineup => effects.push(Effect::PromptLineup),
            StartupPrompt::Ready => {}
        }
        Reply::ok(effects)
    }

    /// Replaces the match with a fresh one using the given rules.
    pub fn new_match(&mut self, config: MatchConfig) -> Reply {
        if let Err(e) = config.validate() {
            return self.reject(e);
        }
        self.state = MatchState::with_config(config);
        info!("New match started");
        self.persist(vec![
            Effect::Render,
            Effect::Alert("New match. Load the rosters of both teams.".to_string()),
        ])
    }

    pub fn update_roster(&mut self, team: TeamId, players: Vec<Player>, staff: Staff) -> Reply {
        if let Err(e) = self.state.update_roster(team, players, staff) {
            return self.reject(e);
        }
        let mut effects = vec![Effect::Render];
        if self.state.rosters_complete() && self.state.initial_serve_team_id.is_none() {
            effects.push(Effect::PromptServeChoice);
        }
        self.persist(effects)
    }

    pub fn set_team_name(&mut self, team: TeamId, name: &str) -> Reply {
        match self.state.set_team_name(team, name) {
            Ok(()) => self.persist(vec![Effect::Render]),
            Err(e) => self.reject(e),
        }
    }

    pub fn choose_initial_serve(&mut self, team: TeamId) -> Reply {
        match self.state.choose_initial_serve(team) {
            Ok(()) => self.persist(vec![Effect::Render, Effect::PromptLineup]),
            Err(e) => self.reject(e),
        }
    }

    pub fn confirm_lineup(&mut self, team: TeamId, six: &[RosterIndex]) -> Reply {
        match self.state.confirm_lineup(team, six) {
            Ok(()) => self.persist(vec![Effect::Render]),
            Err(e) => self.reject(e),
        }
    }

    pub fn confirm_lineups(&mut self, six_a: &[RosterIndex], six_b: &[RosterIndex]) -> Reply {
        match self.state.confirm_lineups(six_a, six_b) {
            Ok(()) => self.persist(vec![Effect::Render]),
            Err(e) => self.reject(e),
        }
    }

    /// Score button. A point asks for its attribution; a correction applies at once.
    pub fn change_score(&mut self, team: TeamId, delta: i32) -> Reply {
        if let Err(e) = self.require_match_open() {
            return self.reject(e);
        }
        match self.state.apply_score_change(team, delta) {
            Ok(ScoreChange::Unchanged) => Reply::ok(Vec::new()),
            Ok(ScoreChange::Corrected { .. }) => self.persist(vec![Effect::Render]),
            Ok(ScoreChange::NeedsAttribution(entry)) => {
                Reply::ok(vec![Effect::PromptStatEntry(entry)])
            }
            Err(e) => self.reject(e),
        }
    }

    pub fn commit_stat(&mut self, pending: PendingStat) -> Reply {
        if let Err(e) = self.require_match_open() {
            return self.reject(e);
        }
        let outcome = match self.state.commit_stat(pending) {
            Ok(outcome) => outcome,
            Err(e) => return self.reject(e),
        };

        let effects = match (outcome.match_winner, outcome.set_ended()) {
            (Some(winner), _) => {
                let team = self.state.team(winner);
                let message = format!(
                    "Match over: {} wins {}-{}.",
                    team.name,
                    team.sets,
                    self.state.team(winner.other()).sets
                );
                info!("{}", message);
                vec![Effect::Render, Effect::Alert(message)]
            }
            // The lineup prompt for the next set replaces the redraw.
            (None, true) => vec![Effect::PromptLineup],
            (None, false) => vec![Effect::Render],
        };
        self.persist(effects)
    }

    pub fn call_timeout(&mut self, team: TeamId) -> Reply {
        match self.state.call_timeout(team) {
            Ok(_) => self.persist(vec![Effect::Render]),
            Err(e) => self.reject(e),
        }
    }

    pub fn open_substitution(&self, team: TeamId) -> Result<SubstitutionDraft, Reply> {
        self.state.open_substitution(team).map_err(Reply::rejected)
    }

    pub fn commit_substitution(&mut self, draft: SubstitutionDraft) -> Reply {
        match self.state.commit_substitution(draft) {
            Ok(()) => self.persist(vec![Effect::Render]),
            Err(e) => self.reject(e),
        }
    }

    pub fn toggle_libero(&mut self, team: TeamId, index: RosterIndex) -> Reply {
        match self.state.toggle_libero_active(team, index) {
            Ok(_) => self.persist(vec![Effect::Render]),
            Err(e) => self.reject(e),
        }
    }

    pub fn swap_sides(&mut self) -> Reply {
        self.state.swap_sides();
        self.persist(vec![Effect::Render])
    }

    pub fn reset_current_set(&mut self) -> Reply {
        self.state.reset_current_set();
        self.persist(vec![Effect::Render])
    }

    pub fn reset_match(&mut self) -> Reply {
        self.state.reset_match();
        self.persist(vec![
            Effect::Render,
            Effect::Alert("Match reset. Load the rosters of both teams.".to_string()),
        ])
    }

    /// Deletes the stored match and starts over.
    pub fn clear_saved(&mut self) -> Reply {
        if let Err(e) = self.saves.clear() {
            warn!("Failed to clear saved match: {}", e);
            let message = format!("Could not clear the saved match: {}", e);
            return Reply::ok(vec![Effect::Alert(message)]);
        }
        self.state = MatchState::new();
        Reply::ok(vec![Effect::Render])
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary::from_state(&self.state)
    }

    pub fn export(&self, layout: PageLayout) -> ExportDocument {
        ExportDocument::render(&self.summary(), layout)
    }

    fn require_match_open(&self) -> Result<(), MatchError> {
        if self.state.is_complete() {
            return Err(MatchError::MatchComplete);
        }
        Ok(())
    }

    fn reject(&self, error: MatchError) -> Reply {
        warn!("Rejected: {}", error);
        Reply::rejected(error)
    }

    fn persist(&mut self, mut effects: Vec<Effect>) -> Reply {
        if let Err(e) = self.saves.save(&self.state) {
            warn!("Failed to save match: {}", e);
            effects.push(Effect::Alert(format!("The match could not be saved: {}", e)));
        }
        Reply::ok(effects)
    }
}
