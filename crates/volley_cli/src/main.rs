//! Volley CLI
//!
//! Terminal scoreboard for a volleyball match. Every invocation performs one
//! action on the match stored in `--store` and prints what changed.

mod logging;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;

use volley_core::engine::SetFilter;
use volley_core::{
    handle_command_json, FileStore, MatchConfig, MatchSession, Player, Reply, RosterIndex, Staff,
    StatAction, StatEntry, StatKind, TeamId,
};

#[derive(Parser)]
#[command(name = "volley", version)]
#[command(about = "Volleyball match scorekeeper", long_about = None)]
struct Cli {
    /// Directory holding the saved match
    #[arg(long, env = "VOLLEY_STORE", default_value = "./volley-data", global = true)]
    store: PathBuf,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new match, discarding the current one
    New(RulesArgs),

    /// Load a team roster from a JSON file
    Roster {
        team: TeamId,
        /// File with a player list, or an object with `players`, `staff` and `name`
        #[arg(long)]
        file: PathBuf,
    },

    /// Rename a team
    Name { team: TeamId, name: String },

    /// Choose the team serving the first set
    Serve { team: TeamId },

    /// Confirm a starting six by jersey number, server first
    Lineup {
        team: TeamId,
        #[arg(num_args = 6, required = true)]
        numbers: Vec<String>,
    },

    /// Score a point; without attribution flags, lists the options
    Point {
        team: TeamId,
        #[arg(long)]
        kind: Option<StatKind>,
        #[arg(long)]
        action: Option<StatAction>,
        /// Jersey number of the credited player
        #[arg(long)]
        player: Option<String>,
    },

    /// Take one point away (correction; serve and rotation stay)
    Undo { team: TeamId },

    /// Call a timeout
    Timeout { team: TeamId },

    /// Substitute a player; without flags, lists the options
    Sub {
        team: TeamId,
        #[arg(long = "in")]
        player_in: Option<String>,
        #[arg(long = "out")]
        player_out: Option<String>,
    },

    /// Toggle a libero on or off the court
    Libero { team: TeamId, number: String },

    /// Swap court sides
    SwapSides,

    /// Restart the current set from 0-0
    ResetSet,

    /// Start over with template rosters
    ResetMatch,

    /// Delete the saved match
    Clear,

    /// Show the scoreboard and any pending setup step
    Status,

    /// Per-player statistics
    Stats {
        team: TeamId,
        /// One-based set number; all sets when omitted
        #[arg(long)]
        set: Option<usize>,
    },

    /// Write the match summary as a paginated text file
    Export {
        /// Output path (defaults to Match-<winner>-vs-<loser>.txt)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run a JSON command request ("-" reads stdin)
    Json { request: String },
}

#[derive(Args)]
struct RulesArgs {
    #[arg(long, default_value_t = 25)]
    win_threshold: u32,
    #[arg(long, default_value_t = 3)]
    sets_to_win: u32,
    #[arg(long, default_value_t = 2)]
    max_timeouts: u32,
    #[arg(long, default_value_t = 6)]
    max_subs: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RosterFile {
    Players(Vec<Player>),
    Team {
        #[serde(default)]
        name: Option<String>,
        players: Vec<Player>,
        #[serde(default)]
        staff: Staff,
    },
}

type Session = MatchSession<FileStore>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&logging::LogConfig::from_verbosity(cli.verbose))?;

    let mut session = MatchSession::open(FileStore::new(&cli.store));
    tracing::debug!("Using store {}", cli.store.display());

    match cli.command {
        Commands::New(rules) => {
            let config = MatchConfig {
                win_threshold: rules.win_threshold,
                sets_to_win: rules.sets_to_win,
                max_timeouts: rules.max_timeouts,
                max_subs: rules.max_subs,
            };
            let reply = session.new_match(config);
            finish(&session, reply)
        }

        Commands::Roster { team, file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let roster: RosterFile = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", file.display()))?;
            let (name, players, staff) = match roster {
                RosterFile::Players(players) => (None, players, Staff::default()),
                RosterFile::Team { name, players, staff } => (name, players, staff),
            };
            if let Some(name) = name {
                let reply = session.set_team_name(team, &name);
                if !reply.is_ok() {
                    return finish(&session, reply);
                }
            }
            let reply = session.update_roster(team, players, staff);
            finish(&session, reply)
        }

        Commands::Name { team, name } => {
            let reply = session.set_team_name(team, &name);
            finish(&session, reply)
        }

        Commands::Serve { team } => {
            let reply = session.choose_initial_serve(team);
            finish(&session, reply)
        }

        Commands::Lineup { team, numbers } => {
            let six = numbers
                .iter()
                .map(|n| resolve_player(&session, team, n))
                .collect::<Result<Vec<_>>>()?;
            let reply = session.confirm_lineup(team, &six);
            finish(&session, reply)
        }

        Commands::Point { team, kind, action, player } => {
            let reply = session.change_score(team, 1);
            let entry = match pending_entry(&reply) {
                Some(entry) => entry,
                None => return finish(&session, reply),
            };
            match (kind, action, player) {
                (Some(kind), Some(action), Some(number)) => {
                    let responsible = match kind {
                        StatKind::Success => team,
                        StatKind::Error => team.other(),
                    };
                    let index = resolve_player(&session, responsible, &number)?;
                    let pending = entry
                        .choose_kind(kind)
                        .and_then(|e| e.choose_action(action))
                        .and_then(|e| e.choose_player(index))?;
                    let reply = session.commit_stat(pending);
                    finish(&session, reply)
                }
                _ => finish(&session, reply),
            }
        }

        Commands::Undo { team } => {
            let reply = session.change_score(team, -1);
            finish(&session, reply)
        }

        Commands::Timeout { team } => {
            let reply = session.call_timeout(team);
            finish(&session, reply)
        }

        Commands::Sub { team, player_in, player_out } => {
            let mut draft = match session.open_substitution(team) {
                Ok(draft) => draft,
                Err(reply) => return finish(&session, reply),
            };
            if let Some(number) = player_in {
                draft.select_in(resolve_player(&session, team, &number)?);
            }
            if let Some(number) = player_out {
                draft.select_out(resolve_player(&session, team, &number)?);
            }
            if draft.can_confirm() {
                let reply = session.commit_substitution(draft);
                finish(&session, reply)
            } else {
                println!("{}", render::substitution_options(&draft, session.state()));
                Ok(())
            }
        }

        Commands::Libero { team, number } => {
            let index = resolve_player(&session, team, &number)?;
            let reply = session.toggle_libero(team, index);
            finish(&session, reply)
        }

        Commands::SwapSides => {
            let reply = session.swap_sides();
            finish(&session, reply)
        }

        Commands::ResetSet => {
            let reply = session.reset_current_set();
            finish(&session, reply)
        }

        Commands::ResetMatch => {
            let reply = session.reset_match();
            finish(&session, reply)
        }

        Commands::Clear => {
            let reply = session.clear_saved();
            finish(&session, reply)
        }

        Commands::Status => {
            let reply = session.startup();
            match session.saves().info() {
                Ok(Some(info)) => println!(
                    "Saved {}: {}",
                    info.format_timestamp(),
                    info.get_display_text()
                ),
                Ok(None) => println!("No saved match yet"),
                Err(e) => tracing::warn!("Could not read the saved match: {}", e),
            }
            finish(&session, reply)
        }

        Commands::Stats { team, set } => {
            let filter = match set {
                Some(0) => bail!("set numbers start at 1"),
                Some(n) => SetFilter::Set(n - 1),
                None => SetFilter::All,
            };
            let tallies = session.state().tally(team, filter);
            println!("{}", session.state().team(team).name);
            println!("{}", render::tally_table(&tallies, filter));
            Ok(())
        }

        Commands::Export { out } => {
            let document = session.export(Default::default());
            let path = out.unwrap_or_else(|| PathBuf::from(document.file_name()));
            std::fs::write(&path, document.to_text())
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Exported {} page(s) to {}", document.page_count(), path.display());
            Ok(())
        }

        Commands::Json { request } => {
            let request = if request == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                request
            };
            println!("{}", handle_command_json(&mut session, &request));
            Ok(())
        }
    }
}

/// Stat entry opened by a score request, if any.
fn pending_entry(reply: &Reply) -> Option<StatEntry> {
    reply.effects.iter().find_map(|effect| match effect {
        volley_core::Effect::PromptStatEntry(entry) => Some(entry.clone()),
        _ => None,
    })
}

/// Roster index of the player wearing `number`.
fn resolve_player(session: &Session, team: TeamId, number: &str) -> Result<RosterIndex> {
    let roster = &session.state().team(team).roster;
    match roster.iter().position(|p| p.number == number.trim()) {
        Some(index) => Ok(index),
        None => bail!("team {} has no player #{}", team, number),
    }
}

fn finish(session: &Session, reply: Reply) -> Result<()> {
    let text = render::reply(&reply, session.state());
    if !text.is_empty() {
        println!("{}", text);
    }
    match reply.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
