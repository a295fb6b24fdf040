use rand::Rng;

use crate::error::PoolError;
use crate::question::QuestionRecord;

/// Questions available to one session, plus which of them were already shown.
///
/// Selection draws uniformly from an explicit list of remaining indices and
/// swap-removes the pick, so every draw is O(1) and can never repeat.
#[derive(Debug)]
pub struct QuestionPool<R: Rng> {
    questions: Vec<QuestionRecord>,
    remaining: Vec<usize>,
    shown: Vec<usize>,
    limit: usize,
    rng: R,
}

impl<R: Rng> QuestionPool<R> {
    /// Build a pool that will hand out at most `rounds_target` questions.
    pub fn load(
        questions: Vec<QuestionRecord>,
        rounds_target: usize,
        rng: R,
    ) -> Result<Self, PoolError> {
        if questions.is_empty() {
            return Err(PoolError::Empty);
        }
        let limit = questions.len().min(rounds_target);
        Ok(Self {
            remaining: (0..questions.len()).collect(),
            shown: Vec::with_capacity(limit),
            questions,
            limit,
            rng,
        })
    }

    pub fn pick_next_unseen(&mut self) -> Result<(usize, &QuestionRecord), PoolError> {
        if self.is_exhausted() {
            return Err(PoolError::Exhausted {
                shown: self.shown.len(),
            });
        }
        let slot = self.rng.gen_range(0..self.remaining.len());
        let index = self.remaining.swap_remove(slot);
        self.shown.push(index);
        Ok((index, &self.questions[index]))
    }

    pub fn is_exhausted(&self) -> bool {
        self.shown.len() >= self.limit
    }

    pub fn get(&self, index: usize) -> Option<&QuestionRecord> {
        self.questions.get(index)
    }

    /// Indices in the order they were shown
    pub fn shown_indices(&self) -> &[usize] {
        &self.shown
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number of questions this session will show in total.
    pub fn limit(&self) -> usize {
        self.limit
    }
}
