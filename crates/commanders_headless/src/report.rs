//! Match and batch reports.
//!
//! Reports are plain serde structs so they can be printed to stdout as
//! JSON and reloaded later for comparison.

use std::collections::BTreeMap;

use commanders_core::data::UnitKind;
use commanders_core::factions::FactionState;
use commanders_core::simulation::Match;
use serde::{Deserialize, Serialize};

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Exactly one faction was left standing.
    Victory,
    /// Both factions fell on the same tick.
    Draw,
    /// The time limit ran out with both factions standing.
    Timeout,
}

/// End-of-match snapshot of one faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionReport {
    /// Faction index.
    pub id: u8,
    /// Display name.
    pub name: String,
    /// Unspent resources.
    pub resources: f32,
    /// Living units, workers included.
    pub units: usize,
    /// Living workers.
    pub workers: usize,
    /// Standing structures, including ones under construction.
    pub structures: usize,
    /// HQ health as a fraction of maximum, 0 once it has fallen.
    pub hq_health: f32,
    /// Seconds of production left across every queue.
    pub queued_seconds: f32,
    /// Current tech level.
    pub tech_level: u8,
    /// Whether the faction has been eliminated.
    pub defeated: bool,
    /// Units that left a production queue.
    pub units_produced: u32,
    /// Units destroyed.
    pub units_lost: u32,
    /// Structures destroyed.
    pub structures_lost: u32,
    /// Construction projects paid for.
    pub structures_started: u32,
    /// Resources delivered by workers.
    pub resources_gathered: f32,
    /// Resources paid for structures and units.
    pub resources_spent: f32,
}

impl FactionReport {
    /// Snapshot a faction.
    #[must_use]
    pub fn from_state(faction: &FactionState) -> Self {
        Self {
            id: faction.id.0,
            name: faction.profile.name.clone(),
            resources: faction.resources,
            units: faction.units.len(),
            workers: faction.count_units(UnitKind::Worker),
            structures: faction.structures.len(),
            hq_health: faction.hq().map_or(0.0, |hq| hq.body.health_fraction()),
            queued_seconds: faction.structures.iter().map(|s| s.queued_time()).sum(),
            tech_level: faction.tech_level,
            defeated: faction.defeated,
            units_produced: faction.stats.units_produced,
            units_lost: faction.stats.units_lost,
            structures_lost: faction.stats.structures_lost,
            structures_started: faction.stats.structures_started,
            resources_gathered: faction.stats.resources_gathered,
            resources_spent: faction.stats.resources_spent,
        }
    }
}

/// Result of a single headless match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Seed the match was set up with.
    pub seed: u64,
    /// How the match ended.
    pub outcome: MatchOutcome,
    /// Name of the winning faction, if any.
    pub winner: Option<String>,
    /// Simulated seconds.
    pub elapsed_seconds: f64,
    /// Ticks advanced.
    pub ticks: u64,
    /// Final state hash, for replay comparison.
    pub state_hash: u64,
    /// Per-faction snapshots, in faction order.
    pub factions: Vec<FactionReport>,
}

impl MatchReport {
    /// Snapshot a match that has finished or hit its time limit.
    #[must_use]
    pub fn from_match(game: &Match) -> Self {
        let outcome = if !game.is_finished() {
            MatchOutcome::Timeout
        } else if game.winner().is_some() {
            MatchOutcome::Victory
        } else {
            MatchOutcome::Draw
        };
        let winner = game
            .winner()
            .and_then(|id| game.factions().get(id.index()))
            .map(|f| f.profile.name.clone());

        Self {
            seed: game.config().seed,
            outcome,
            winner,
            elapsed_seconds: game.elapsed_time(),
            ticks: game.tick(),
            state_hash: game.state_hash(),
            factions: game.factions().iter().map(FactionReport::from_state).collect(),
        }
    }
}

/// Aggregate over many match reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches summarized.
    pub total_matches: u32,
    /// Victories per faction name.
    pub wins_by_faction: BTreeMap<String, u32>,
    /// Victories per faction name as a fraction of all matches.
    pub win_rates: BTreeMap<String, f64>,
    /// Matches where both factions fell together.
    pub draws: u32,
    /// Matches stopped by the time limit.
    pub timeouts: u32,
    /// Mean simulated duration.
    pub avg_duration_seconds: f64,
    /// Shortest simulated duration.
    pub min_duration_seconds: f64,
    /// Longest simulated duration.
    pub max_duration_seconds: f64,
    /// Mean units produced per match, per faction name.
    pub avg_units_produced: BTreeMap<String, f64>,
    /// Mean resources gathered per match, per faction name.
    pub avg_resources_gathered: BTreeMap<String, f64>,
}

impl BatchSummary {
    /// Calculate a summary from a list of match reports.
    #[must_use]
    pub fn from_reports(reports: &[MatchReport]) -> Self {
        if reports.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_matches: reports.len() as u32,
            min_duration_seconds: f64::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0.0;
        let mut produced: BTreeMap<String, u64> = BTreeMap::new();
        let mut gathered: BTreeMap<String, f64> = BTreeMap::new();

        for report in reports {
            duration_sum += report.elapsed_seconds;
            summary.min_duration_seconds = summary.min_duration_seconds.min(report.elapsed_seconds);
            summary.max_duration_seconds = summary.max_duration_seconds.max(report.elapsed_seconds);

            match (report.outcome, &report.winner) {
                (MatchOutcome::Victory, Some(name)) => {
                    *summary.wins_by_faction.entry(name.clone()).or_default() += 1;
                }
                (MatchOutcome::Timeout, _) => summary.timeouts += 1,
                _ => summary.draws += 1,
            }

            for faction in &report.factions {
                *produced.entry(faction.name.clone()).or_default() += u64::from(faction.units_produced);
                *gathered.entry(faction.name.clone()).or_default() += f64::from(faction.resources_gathered);
            }
        }

        let total = f64::from(summary.total_matches);
        summary.avg_duration_seconds = duration_sum / total;
        summary.win_rates = summary
            .wins_by_faction
            .iter()
            .map(|(name, wins)| (name.clone(), f64::from(*wins) / total))
            .collect();
        summary.avg_units_produced = produced
            .into_iter()
            .map(|(name, sum)| (name, sum as f64 / total))
            .collect();
        summary.avg_resources_gathered = gathered
            .into_iter()
            .map(|(name, sum)| (name, sum / total))
            .collect();

        summary
    }
}
