//! The round state machine.
//!
//! ```text
//! AwaitingQuestion -> AnswerPending -> Evaluating -> Delay -> AwaitingQuestion
//!        |
//!        +-> Completed   (pool exhausted)
//! ```
//!
//! The session is advanced by `on_tick` and by `submit_answer`; each call
//! makes at most one externally visible step. `Evaluating` only exists inside
//! the call that leaves `AnswerPending`. State changes are reported as
//! [`SessionEvent`]s that the caller drains; nothing is rendered from here.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::QuizConfig;
use crate::error::SessionError;
use crate::leaderboard::PlayerRecord;
use crate::player::PlayerIdentity;
use crate::pool::QuestionPool;
use crate::question::{OptionLetter, QuestionRecord};
use crate::score::{ScoreEngine, ScoreState};
use crate::timer::{Countdown, TimerEvent};

/// Everything a session needs to know about who plays and how.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub player: PlayerIdentity,
    pub config: QuizConfig,
}

impl SessionContext {
    pub fn new(player: PlayerIdentity, config: QuizConfig) -> Self {
        Self { player, config }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    AwaitingQuestion,
    AnswerPending,
    Evaluating,
    Delay,
    Completed,
}

/// Outcome of one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    /// 1-based
    pub round: usize,
    pub question_index: usize,
    /// `None` when the response timer ran out
    pub chosen: Option<OptionLetter>,
    pub correct_option: OptionLetter,
    pub correct: bool,
    pub elapsed_secs: f64,
    pub base: u32,
    pub bonus: u32,
    pub round_score: u32,
}

impl RoundResult {
    pub fn timed_out(&self) -> bool {
        self.chosen.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged { from: Phase, to: Phase },
    QuestionShown { round: usize, index: usize },
    ResponseTick { remaining: Duration },
    RoundScored(RoundResult),
    DelayTick { remaining: Duration },
    Completed(PlayerRecord),
}

#[derive(Debug)]
pub struct Session<R: Rng = StdRng> {
    context: SessionContext,
    pool: QuestionPool<R>,
    scorer: ScoreEngine,
    response_timer: Countdown,
    delay_timer: Countdown,
    phase: Phase,
    current: Option<(usize, OptionLetter)>,
    rounds_completed: usize,
    history: Vec<RoundResult>,
    completion: Option<PlayerRecord>,
    events: Vec<SessionEvent>,
}

impl<R: Rng> Session<R> {
    /// Validate configuration and questions and park the session in
    /// `AwaitingQuestion`. Nothing is shown until `load_next` or the first tick.
    pub fn new(
        context: SessionContext,
        questions: Vec<QuestionRecord>,
        rng: R,
    ) -> Result<Self, SessionError> {
        context.config.validate()?;
        let pool = QuestionPool::load(questions, context.config.total_rounds_target, rng)?;
        let scorer = ScoreEngine::new(
            context.config.base_points,
            context.config.time_bonus_table.clone(),
        );
        tracing::debug!(
            player = context.player.name(),
            pool = pool.len(),
            rounds = pool.limit(),
            "session ready"
        );

        Ok(Self {
            context,
            pool,
            scorer,
            response_timer: Countdown::new(),
            delay_timer: Countdown::new(),
            phase: Phase::AwaitingQuestion,
            current: None,
            rounds_completed: 0,
            history: Vec::new(),
            completion: None,
            events: Vec::new(),
        })
    }

    /// Show the next unseen question, or complete the session when the round
    /// target is met. Ignored outside `AwaitingQuestion`.
    pub fn load_next(&mut self) -> Phase {
        if self.phase != Phase::AwaitingQuestion {
            return self.phase;
        }

        match self.pool.pick_next_unseen() {
            Ok((index, question)) => {
                self.current = Some((index, question.correct_option));
                self.response_timer.start(self.context.config.max_response());
                self.transition(Phase::AnswerPending);
                self.events.push(SessionEvent::QuestionShown {
                    round: self.rounds_completed + 1,
                    index,
                });
            }
            // the pool is never empty here, so the only failure is exhaustion
            Err(_) => {
                let record = PlayerRecord::new(self.context.player.name(), self.scorer.cumulative());
                tracing::info!(
                    player = %record.name,
                    score = record.score,
                    rounds = self.rounds_completed,
                    "session completed"
                );
                self.current = None;
                self.completion = Some(record.clone());
                self.transition(Phase::Completed);
                self.events.push(SessionEvent::Completed(record));
            }
        }
        self.phase
    }

    /// Answer the current question. Returns `None` (and changes nothing) when
    /// no answer is pending, e.g. because the response timer already expired.
    pub fn submit_answer(&mut self, letter: OptionLetter) -> Option<RoundResult> {
        let (index, correct_option) = match (self.phase, self.current) {
            (Phase::AnswerPending, Some(shown)) => shown,
            _ => {
                tracing::debug!(%letter, phase = %self.phase, "ignoring late answer");
                return None;
            }
        };
        self.response_timer.stop();
        let elapsed = self.response_timer.elapsed().as_secs_f64();
        Some(self.resolve(index, correct_option, Some(letter), elapsed))
    }

    /// Advance timers by `dt`.
    pub fn on_tick(&mut self, dt: Duration) {
        match self.phase {
            Phase::AwaitingQuestion => {
                self.load_next();
            }
            Phase::AnswerPending => match self.response_timer.tick(dt) {
                Some(TimerEvent::Tick { remaining }) => {
                    self.events.push(SessionEvent::ResponseTick { remaining });
                }
                Some(TimerEvent::Expired) => {
                    if let Some((index, correct_option)) = self.current {
                        let elapsed = self.context.config.max_response_secs;
                        self.resolve(index, correct_option, None, elapsed);
                    }
                }
                None => {}
            },
            Phase::Delay => match self.delay_timer.tick(dt) {
                Some(TimerEvent::Tick { remaining }) => {
                    self.events.push(SessionEvent::DelayTick { remaining });
                }
                Some(TimerEvent::Expired) => self.transition(Phase::AwaitingQuestion),
                None => {}
            },
            Phase::Evaluating | Phase::Completed => {}
        }
    }

    /// AnswerPending -> Evaluating -> Delay
    fn resolve(
        &mut self,
        index: usize,
        correct_option: OptionLetter,
        chosen: Option<OptionLetter>,
        elapsed_secs: f64,
    ) -> RoundResult {
        self.transition(Phase::Evaluating);

        let correct = chosen == Some(correct_option);
        let score = self.scorer.apply(correct, elapsed_secs);

        self.rounds_completed += 1;
        let result = RoundResult {
            round: self.rounds_completed,
            question_index: index,
            chosen,
            correct_option,
            correct,
            elapsed_secs,
            base: score.base,
            bonus: score.bonus,
            round_score: score.total,
        };
        tracing::info!(
            round = result.round,
            correct,
            elapsed_secs,
            round_score = result.round_score,
            total = self.scorer.cumulative(),
            "round scored"
        );
        self.history.push(result.clone());
        self.events.push(SessionEvent::RoundScored(result.clone()));

        self.delay_timer
            .start(self.context.config.inter_round_delay());
        self.transition(Phase::Delay);
        result
    }

    fn transition(&mut self, to: Phase) {
        let from = self.phase;
        tracing::debug!(%from, %to, "phase change");
        self.phase = to;
        self.events.push(SessionEvent::PhaseChanged { from, to });
    }

    /// Hand pending notifications to the presentation layer.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, SessionEvent> {
        self.events.drain(..)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.current.and_then(|(i, _)| self.pool.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current.map(|(i, _)| i)
    }

    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    /// Rounds this session will play: `min(pool size, configured target)`
    pub fn total_rounds(&self) -> usize {
        self.pool.limit()
    }

    pub fn shown_indices(&self) -> &[usize] {
        self.pool.shown_indices()
    }

    pub fn score(&self) -> ScoreState {
        self.scorer.state()
    }

    pub fn last_round(&self) -> Option<&RoundResult> {
        self.history.last()
    }

    pub fn history(&self) -> &[RoundResult] {
        &self.history
    }

    pub fn response_remaining(&self) -> Duration {
        self.response_timer.remaining()
    }

    pub fn delay_remaining(&self) -> Duration {
        self.delay_timer.remaining()
    }

    /// `(player name, final score)` once the session is completed
    pub fn completion(&self) -> Option<&PlayerRecord> {
        self.completion.as_ref()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, PoolError};
    use crate::question::Options;
    use assert_matches::assert_matches;
    use rand::SeedableRng;
    use std::collections::HashSet;

    const TICK: Duration = Duration::from_millis(100);

    fn questions(n: usize) -> Vec<QuestionRecord> {
        (0..n)
            .map(|i| QuestionRecord {
                prompt: format!("q{i}"),
                options: Options {
                    a: "w".into(),
                    b: "x".into(),
                    c: "y".into(),
                    d: "z".into(),
                },
                correct_option: OptionLetter::ALL[i % 4],
            })
            .collect()
    }

    fn context(rounds: usize) -> SessionContext {
        SessionContext::new(
            PlayerIdentity::register("Ana", None).unwrap(),
            QuizConfig {
                total_rounds_target: rounds,
                max_response_secs: 2.0,
                inter_round_delay_secs: 0.5,
                ..QuizConfig::default()
            },
        )
    }

    fn session(pool: usize, rounds: usize) -> Session<StdRng> {
        Session::new(context(rounds), questions(pool), StdRng::seed_from_u64(7)).unwrap()
    }

    fn tick_n(s: &mut Session<StdRng>, n: usize) {
        for _ in 0..n {
            s.on_tick(TICK);
        }
    }

    fn correct_letter(s: &Session<StdRng>) -> OptionLetter {
        s.current_question().unwrap().correct_option
    }

    fn wrong_letter(s: &Session<StdRng>) -> OptionLetter {
        let right = correct_letter(s);
        OptionLetter::ALL.into_iter().find(|l| *l != right).unwrap()
    }

    #[test]
    fn test_empty_pool_fails_to_start() {
        let res = Session::new(context(10), vec![], StdRng::seed_from_u64(1));
        assert_matches!(res, Err(SessionError::Pool(PoolError::Empty)));
    }

    #[test]
    fn test_invalid_config_fails_to_start() {
        let res = Session::new(context(0), questions(3), StdRng::seed_from_u64(1));
        assert_matches!(res, Err(SessionError::Config(ConfigError::ZeroRounds)));
    }

    #[test]
    fn test_starts_awaiting_question() {
        let mut s = session(5, 3);
        assert_eq!(s.phase(), Phase::AwaitingQuestion);
        assert!(s.current_question().is_none());
        assert_eq!(s.drain_events().count(), 0);

        assert_eq!(s.load_next(), Phase::AnswerPending);
        assert!(s.current_question().is_some());
        assert_eq!(s.response_remaining(), Duration::from_secs(2));
    }

    #[test]
    fn test_correct_answer_scores_and_delays() {
        let mut s = session(5, 3);
        s.load_next();
        tick_n(&mut s, 5); // 0.5s

        let letter = correct_letter(&s);
        let result = s.submit_answer(letter).unwrap();
        assert!(result.correct);
        assert_eq!(result.round, 1);
        assert!((result.elapsed_secs - 0.5).abs() < 1e-9);
        assert_eq!(result.round_score, 600);
        assert_eq!(s.phase(), Phase::Delay);
        assert_eq!(s.score().cumulative, 600);
        assert_eq!(s.rounds_completed(), 1);

        let phases: Vec<_> = s
            .drain_events()
            .filter_map(|e| match e {
                SessionEvent::PhaseChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![Phase::AnswerPending, Phase::Evaluating, Phase::Delay]
        );
    }

    #[test]
    fn test_wrong_answer_scores_zero() {
        let mut s = session(5, 3);
        s.load_next();
        let result = s.submit_answer(wrong_letter(&s)).unwrap();
        assert!(!result.correct);
        assert_eq!(result.round_score, 0);
        assert_eq!(s.score().cumulative, 0);
    }

    #[test]
    fn test_timeout_counts_as_unanswered() {
        let mut s = session(5, 3);
        s.load_next();
        tick_n(&mut s, 20); // exactly 2s

        assert_eq!(s.phase(), Phase::Delay);
        let last = s.last_round().unwrap().clone();
        assert!(last.timed_out());
        assert!(!last.correct);
        assert_eq!(last.round_score, 0);
        assert_eq!(last.elapsed_secs, 2.0);

        // the late answer loses the race
        assert_eq!(s.submit_answer(OptionLetter::A), None);
        assert_eq!(s.rounds_completed(), 1);
    }

    #[test]
    fn test_answer_stops_response_timer() {
        let mut s = session(5, 3);
        s.load_next();
        s.submit_answer(correct_letter(&s));
        s.drain_events().for_each(drop);

        // run well past the response window; only the delay timer reports
        tick_n(&mut s, 4);
        for ev in s.drain_events() {
            assert_matches!(ev, SessionEvent::DelayTick { .. });
        }
        assert_eq!(s.rounds_completed(), 1);
    }

    #[test]
    fn test_delay_expiry_returns_to_awaiting() {
        let mut s = session(5, 3);
        s.load_next();
        s.submit_answer(correct_letter(&s));
        tick_n(&mut s, 5);
        assert_eq!(s.phase(), Phase::AwaitingQuestion);
        tick_n(&mut s, 1);
        assert_eq!(s.phase(), Phase::AnswerPending);
    }

    #[test]
    fn test_submit_ignored_outside_answer_pending() {
        let mut s = session(5, 3);
        assert_eq!(s.submit_answer(OptionLetter::B), None);
        assert_eq!(s.phase(), Phase::AwaitingQuestion);
    }

    #[test]
    fn test_full_session_completes() {
        let mut s = session(4, 10);
        let mut expected = 0u64;
        let mut guard = 0;
        while !s.is_completed() {
            s.on_tick(TICK);
            if s.phase() == Phase::AnswerPending {
                let r = s.submit_answer(correct_letter(&s)).unwrap();
                expected += u64::from(r.round_score);
            }
            guard += 1;
            assert!(guard < 1000, "session never completed");
        }

        assert_eq!(s.rounds_completed(), 4);
        let shown: HashSet<_> = s.shown_indices().iter().collect();
        assert_eq!(shown.len(), s.shown_indices().len());
        assert_eq!(s.score().cumulative, expected);
        assert_eq!(expected, 4 * 600);

        let done = s.completion().unwrap();
        assert_eq!(done.name, "Ana");
        assert_eq!(done.score, expected);
        assert!(s
            .drain_events()
            .any(|e| e == SessionEvent::Completed(PlayerRecord::new("Ana", expected))));

        // terminal: further input is ignored
        s.on_tick(TICK);
        assert_eq!(s.load_next(), Phase::Completed);
        assert_eq!(s.submit_answer(OptionLetter::A), None);
    }

    #[test]
    fn test_round_target_below_pool_size() {
        let mut s = session(30, 3);
        let mut guard = 0;
        while !s.is_completed() {
            s.on_tick(TICK);
            guard += 1;
            assert!(guard < 1000);
        }
        assert_eq!(s.rounds_completed(), 3);
        assert_eq!(s.total_rounds(), 3);
        assert_eq!(s.score().cumulative, 0);
        assert!(s.history().iter().all(RoundResult::timed_out));
    }
}
