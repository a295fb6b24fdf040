use crate::session::RoundResult;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Aggregates shown on the results screen
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub rounds: usize,
    pub correct: usize,
    pub timed_out: usize,
    /// Mean time to answer, over rounds that were answered at all
    pub mean_answer_secs: Option<f64>,
    pub best_round: u32,
}

impl SessionSummary {
    pub fn from_rounds(rounds: &[RoundResult]) -> Self {
        let answer_times: Vec<f64> = rounds
            .iter()
            .filter(|r| !r.timed_out())
            .map(|r| r.elapsed_secs)
            .collect();

        Self {
            rounds: rounds.len(),
            correct: rounds.iter().filter(|r| r.correct).count(),
            timed_out: rounds.len() - answer_times.len(),
            mean_answer_secs: mean(&answer_times),
            best_round: rounds.iter().map(|r| r.round_score).max().unwrap_or(0),
        }
    }

    /// Percentage of correct answers, rounded
    pub fn accuracy(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        ((self.correct as f64 / self.rounds as f64) * 100.0).round()
    }
}
