//! Presentation requests raised by the simulation.
//!
//! The core never calls into the UI directly. It queues [`GameEvent`]s and
//! the UI layer drains them once per frame.

use crate::progression::UpgradeOption;

/// End-of-run numbers shown on the game over screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Seconds survived.
    pub time: f32,
    pub kills: u32,
    pub gold: u32,
    pub level: u32,
}

impl RunSummary {
    /// `mm:ss` for the results screen.
    pub fn time_survived_str(&self) -> String {
        let total = self.time.max(0.0) as u32;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Show these cards and wait for `apply_upgrade`.
    ShowUpgradeChoice(Vec<UpgradeOption>),
    LevelUp { level: u32 },
    BossWarning,
    GameOver(RunSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_time_formats_minutes_and_seconds() {
        let summary = RunSummary { time: 754.9, kills: 0, gold: 0, level: 1 };
        assert_eq!(summary.time_survived_str(), "12:34");
        let summary = RunSummary { time: 5.0, ..summary };
        assert_eq!(summary.time_survived_str(), "00:05");
    }
}
