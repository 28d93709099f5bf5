//! Plain-text views of the match for the terminal.

use volley_core::engine::{PlayerTally, SetFilter};
use volley_core::{Effect, MatchState, Reply, StatEntry, StatKind, SubstitutionDraft, TeamId};

pub fn scoreboard(state: &MatchState) -> String {
    let mut lines = Vec::new();
    let set_number = state.current_set_index() + 1;
    let status = if state.is_complete() {
        "final".to_string()
    } else {
        format!("set {} of up to {}, {}", set_number, state.config.max_sets(), state.score_line())
    };
    lines.push(format!("{} vs {} ({})", state.team_a.name, state.team_b.name, status));

    // Left side of the court first.
    let order = if state.sides_swapped { [TeamId::B, TeamId::A] } else { [TeamId::A, TeamId::B] };
    for id in order {
        let team = state.team(id);
        let serve = if team.serving { " *" } else { "" };
        lines.push(format!(
            "  [{}] {:<20} {:>3}  sets {}  timeouts {}/{}  subs {}/{}{}",
            id,
            team.name,
            team.score,
            team.sets,
            team.timeouts,
            state.config.max_timeouts,
            team.subs_used,
            state.config.max_subs,
            serve
        ));
    }

    for id in [TeamId::A, TeamId::B] {
        let team = state.team(id);
        let court: Vec<String> = team.players_on_court().iter().map(|p| p.label()).collect();
        if court.is_empty() {
            lines.push(format!("  {} court: no lineup", id));
        } else {
            lines.push(format!("  {} court: {}", id, court.join(", ")));
        }
        let liberos: Vec<String> = team
            .active_libero_indices
            .iter()
            .filter_map(|&i| team.player(i))
            .map(|p| p.label())
            .collect();
        if !liberos.is_empty() {
            lines.push(format!("  {} libero: {}", id, liberos.join(", ")));
        }
    }

    if !state.set_scores.is_empty() {
        let sets: Vec<String> = state
            .set_scores
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}: {} ({})", i + 1, s.score, state.team(s.winner_id).name))
            .collect();
        lines.push(format!("  Sets: {}", sets.join(" | ")));
    }

    lines.join("\n")
}

/// Who can start and who can be activated as libero, per team.
pub fn lineup_prompt(state: &MatchState) -> String {
    let mut lines = vec![
        "Next: confirm both lineups with `volley lineup <A|B> <six jersey numbers>`.".to_string(),
    ];
    for id in [TeamId::A, TeamId::B] {
        let team = state.team(id);
        let list = |indices: Vec<usize>| -> String {
            let labels: Vec<String> =
                indices.into_iter().filter_map(|i| team.player(i)).map(|p| p.label()).collect();
            if labels.is_empty() {
                "none".to_string()
            } else {
                labels.join(", ")
            }
        };
        lines.push(format!("  {} starters: {}", id, list(team.lineup_candidates())));
        lines.push(format!("  {} liberos: {}", id, list(team.designated_liberos())));
    }
    lines.join("\n")
}

/// Options for attributing a pending point.
pub fn stat_prompt(entry: &StatEntry, state: &MatchState) -> String {
    let scoring = entry.scoring_team();
    let mut lines = vec![format!(
        "Point for {}. Repeat with --kind, --action and --player:",
        state.team(scoring).name
    )];

    for kind in [StatKind::Success, StatKind::Error] {
        let responsible = match kind {
            StatKind::Success => scoring,
            StatKind::Error => scoring.other(),
        };
        let actions: Vec<&str> = kind.actions().iter().map(|a| a.menu_label(kind)).collect();
        let team = state.team(responsible);
        let players: Vec<String> = team
            .taggable_players()
            .into_iter()
            .filter_map(|i| team.player(i))
            .map(|p| p.label())
            .collect();
        lines.push(format!("  --kind {} ({})", kind.code(), kind.label()));
        lines.push(format!("      actions: {}", actions.join(", ")));
        lines.push(format!("      players ({}): {}", team.name, players.join(", ")));
    }
    lines.join("\n")
}

pub fn substitution_options(draft: &SubstitutionDraft, state: &MatchState) -> String {
    let mut lines = vec![format!(
        "Substitution for {}. Repeat with --in and --out:",
        state.team(draft.team_id).name
    )];
    lines.push("  bench:".to_string());
    for candidate in draft.bench_candidates(state) {
        let mark = if candidate.can_enter { "" } else { "  (only for partner)" };
        lines.push(format!("    {}{}", candidate.label, mark));
    }
    lines.push("  court:".to_string());
    for candidate in draft.court_candidates(state) {
        lines.push(format!("    {}. {}", candidate.position + 1, candidate.label));
    }
    lines.join("\n")
}

pub fn tally_table(tallies: &[PlayerTally], filter: SetFilter) -> String {
    let scope = match filter {
        SetFilter::Set(i) => format!("Set {}", i + 1),
        SetFilter::All => "All sets".to_string(),
    };
    if tallies.is_empty() {
        return format!("{}: no statistics yet", scope);
    }

    let mut lines = vec![
        scope,
        format!(
            "  {:<24} {:>14} {:>14} {:>14} {:>14} {:>14}",
            "Player", "Serve", "Attack", "Block", "Reception", "Defense"
        ),
    ];
    for t in tallies {
        let s = &t.successes;
        let e = &t.errors;
        lines.push(format!(
            "  {:<24} {:>14} {:>14} {:>14} {:>14} {:>14}",
            format!("#{} {}", t.number, t.name),
            format!("{}/{}", s.serve, e.serve),
            format!("{}/{}", s.attack, e.attack),
            format!("{}/{}", s.block, e.block),
            format!("{}/{}", s.reception, e.reception),
            format!("{}/{}", s.defense, e.defense),
        ));
    }
    lines.push("  (successes/errors)".to_string());
    lines.join("\n")
}

/// Text for every effect in a reply. The rejection message itself is left
/// to the caller's error output.
pub fn reply(reply: &Reply, state: &MatchState) -> String {
    let rejection = reply.error.as_ref().map(|e| e.to_string());
    let mut blocks = Vec::new();
    for effect in &reply.effects {
        match effect {
            Effect::Render => blocks.push(scoreboard(state)),
            Effect::PromptServeChoice => {
                blocks.push("Next: choose who serves first with `volley serve <A|B>`.".to_string())
            }
            Effect::PromptLineup => blocks.push(lineup_prompt(state)),
            Effect::PromptStatEntry(entry) => blocks.push(stat_prompt(entry, state)),
            Effect::Alert(message) if rejection.as_deref() == Some(message.as_str()) => {}
            Effect::Alert(message) => blocks.push(format!("! {}", message)),
        }
    }
    blocks.join("\n")
}
