use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_POINTS: u32 = 100;

/// Bonus earned by answering correctly within `within_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusTier {
    pub within_secs: f64,
    pub bonus: u32,
}

impl BonusTier {
    pub const fn new(within_secs: f64, bonus: u32) -> Self {
        Self { within_secs, bonus }
    }
}

pub fn default_bonus_table() -> Vec<BonusTier> {
    vec![
        BonusTier::new(1.0, 500),
        BonusTier::new(2.0, 300),
        BonusTier::new(4.0, 200),
        BonusTier::new(5.0, 100),
        BonusTier::new(10.0, 50),
        BonusTier::new(20.0, 25),
    ]
}

/// Per-round breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundScore {
    pub base: u32,
    pub bonus: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreState {
    pub cumulative: u64,
    pub last_round: u32,
}

/// Maps (correct?, elapsed seconds) to points and keeps the running total.
#[derive(Debug, Clone)]
pub struct ScoreEngine {
    base_points: u32,
    table: Vec<BonusTier>,
    state: ScoreState,
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_POINTS, default_bonus_table())
    }
}

impl ScoreEngine {
    /// `table` must be sorted by ascending `within_secs`; `QuizConfig::validate`
    /// enforces that for configured tables.
    pub fn new(base_points: u32, table: Vec<BonusTier>) -> Self {
        Self {
            base_points,
            table,
            state: ScoreState::default(),
        }
    }

    /// First tier whose threshold is not exceeded wins; inclusive on the boundary.
    pub fn time_bonus(&self, elapsed_secs: f64) -> u32 {
        if elapsed_secs.is_nan() {
            return 0;
        }
        let t = elapsed_secs.max(0.0);
        self.table
            .iter()
            .find(|tier| t <= tier.within_secs)
            .map_or(0, |tier| tier.bonus)
    }

    pub fn breakdown(&self, correct: bool, elapsed_secs: f64) -> RoundScore {
        if !correct {
            return RoundScore::default();
        }
        let bonus = self.time_bonus(elapsed_secs);
        RoundScore {
            base: self.base_points,
            bonus,
            total: self.base_points.saturating_add(bonus),
        }
    }

    pub fn evaluate(&self, correct: bool, elapsed_secs: f64) -> u32 {
        self.breakdown(correct, elapsed_secs).total
    }

    /// Score a round and fold it into the cumulative total.
    pub fn apply(&mut self, correct: bool, elapsed_secs: f64) -> RoundScore {
        let round = self.breakdown(correct, elapsed_secs);
        self.state.last_round = round.total;
        self.state.cumulative += u64::from(round.total);
        round
    }

    pub fn state(&self) -> ScoreState {
        self.state
    }

    pub fn cumulative(&self) -> u64 {
        self.state.cumulative
    }

    pub fn base_points(&self) -> u32 {
        self.base_points
    }
}
