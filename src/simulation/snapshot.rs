//! Serialisable HUD data

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ai::{AgentState, AgentVariant};
use crate::core::error::Result;
use crate::core::types::{AgentId, BuildingId, SettlementId};
use crate::entity::player::Player;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: Vec2,
    pub floor: usize,
    pub health: f32,
    pub max_health: f32,
    pub ammo: u32,
    pub score: u32,
    pub sneaking: bool,
    pub settlement: Option<SettlementId>,
    pub building: Option<BuildingId>,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            position: player.position(),
            floor: player.floor,
            health: player.health,
            max_health: player.max_health,
            ammo: player.ammo,
            score: player.score,
            sneaking: player.sneaking,
            settlement: player.settlement,
            building: player.building,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub settlement: SettlementId,
    pub id: AgentId,
    pub variant: AgentVariant,
    pub position: Vec2,
    pub floor: usize,
    pub state: AgentState,
    pub health: f32,
    pub max_health: f32,
    pub alert_level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub elapsed: f64,
    pub player: PlayerSnapshot,
    pub agents: Vec<AgentSnapshot>,
    pub loaded_chunks: usize,
    pub settlements: usize,
    pub cleared_settlements: usize,
    pub projectiles: usize,
    pub pickups: usize,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Agents per state name, sorted by name
    pub fn state_counts(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for agent in &self.agents {
            let name = agent.state.name();
            match counts.iter_mut().find(|(n, _)| *n == name) {
                Some((_, count)) => *count += 1,
                None => counts.push((name, 1)),
            }
        }
        counts.sort_unstable_by_key(|(name, _)| *name);
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(state: AgentState) -> AgentSnapshot {
        AgentSnapshot {
            settlement: SettlementId::new(1, 1),
            id: AgentId(0),
            variant: AgentVariant::Rifleman,
            position: Vec2::ZERO,
            floor: 0,
            state,
            health: 100.0,
            max_health: 100.0,
            alert_level: 0,
        }
    }

    #[test]
    fn test_state_counts() {
        let player = Player::new(Vec2::ZERO, &crate::core::config::PlayerConfig::default());
        let snapshot = Snapshot {
            tick: 0,
            elapsed: 0.0,
            player: PlayerSnapshot::from(&player),
            agents: vec![agent(AgentState::Patrol), agent(AgentState::Idle), agent(AgentState::Patrol)],
            loaded_chunks: 9,
            settlements: 1,
            cleared_settlements: 0,
            projectiles: 0,
            pickups: 0,
        };
        assert_eq!(snapshot.state_counts(), vec![("idle", 1), ("patrol", 2)]);
    }
}
