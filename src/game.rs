use crate::mode::GameMode;
use crate::stats::{session_stats, SessionStats};
use crate::timing::{self, Clock};
use chrono::{DateTime, Local};

/// Maximum response window after the stimulus appears.
pub const RESPONSE_DEADLINE_MS: u64 = 10_000;
/// Reaction time recorded for a round that timed out.
pub const TIMEOUT_CAP_MS: u64 = 10_000;
/// How long the false-start notice stays up before the round retries.
pub const FALSE_START_HOLD_MS: u64 = 2_000;
/// How long the round result stays up before continuation is evaluated.
pub const ROUND_END_HOLD_MS: u64 = 1_500;
/// Pause between rounds.
pub const NEXT_ROUND_DELAY_MS: u64 = 1_000;

/// Lifecycle phase of a session. Each phase carries exactly the data
/// that is meaningful in it; `Stimulus` is the only one that needs a
/// timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown,
    FalseStart,
    Stimulus { stimulus_at_ms: u64 },
    RoundEnd,
    SessionComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    /// Countdown expiry: show the stimulus.
    Stimulus,
    /// Response window expiry: record a timeout.
    ResponseDeadline,
    /// False-start notice expiry: retry the round.
    FalseStartHold,
    /// Round-result display expiry: evaluate continuation.
    RoundEndHold,
    /// Inter-round pause expiry: start the next countdown.
    NextRound,
}

/// The single outstanding timer, stored as data rather than an ambient
/// callback. Arming a new one replaces (cancels) the previous one; the
/// generation stamp lets a stale timer no-op instead of mutating a
/// superseded session.
#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    kind: TimerKind,
    due_at_ms: u64,
    generation: u64,
}

/// Resolution of one round. Exactly one of valid response, false
/// start, or timeout holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub round_number: u32,
    pub reaction_time_ms: u64,
    pub false_start: bool,
    pub timed_out: bool,
    pub timestamp: DateTime<Local>,
}

impl RoundOutcome {
    pub fn valid(round_number: u32, reaction_time_ms: u64) -> Self {
        Self {
            round_number,
            reaction_time_ms,
            false_start: false,
            timed_out: false,
            timestamp: Local::now(),
        }
    }

    pub fn false_start(round_number: u32) -> Self {
        Self {
            round_number,
            reaction_time_ms: 0,
            false_start: true,
            timed_out: false,
            timestamp: Local::now(),
        }
    }

    pub fn timed_out(round_number: u32) -> Self {
        Self {
            round_number,
            reaction_time_ms: TIMEOUT_CAP_MS,
            false_start: false,
            timed_out: true,
            timestamp: Local::now(),
        }
    }
}

/// The round/session state machine. Owns the session exclusively;
/// collaborators only ever see immutable snapshots.
///
/// Single-threaded and cooperative: timers fire from `poll`, which the
/// host loop calls every tick, and `handle_action` is the only other
/// external input.
#[derive(Debug)]
pub struct Game<C: Clock> {
    mode: GameMode,
    phase: Phase,
    current_round: u32,
    rounds: Vec<RoundOutcome>,
    timer: Option<PendingTimer>,
    generation: u64,
    completed: Option<SessionStats>,
    clock: C,
}

impl<C: Clock> Game<C> {
    pub fn new(mode: GameMode, clock: C) -> Self {
        Self {
            mode,
            phase: Phase::Idle,
            current_round: 0,
            rounds: Vec::new(),
            timer: None,
            generation: 0,
            completed: None,
            clock,
        }
    }

    /// Begin a new session. Safe from any state: implicitly resets,
    /// which also invalidates whatever timer was outstanding.
    pub fn start(&mut self) {
        self.reset();
        self.current_round = 1;
        self.phase = Phase::Countdown;
        self.arm_stimulus_timer();
    }

    /// Abort any in-progress session and return to `Idle`. Bumping the
    /// generation makes any timer armed before this point stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.timer = None;
        self.rounds.clear();
        self.completed = None;
        self.current_round = 0;
        self.phase = Phase::Idle;
    }

    /// Swap the mode configuration and reset.
    pub fn change_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.reset();
    }

    /// The user's response signal. Meaningful only in `Countdown`
    /// (false start) and `Stimulus` (valid response); a no-op in every
    /// other phase.
    pub fn handle_action(&mut self) {
        let now = self.clock.now_ms();

        match self.phase {
            Phase::Countdown => {
                self.timer = None;
                self.rounds
                    .push(RoundOutcome::false_start(self.current_round));
                self.phase = Phase::FalseStart;
                self.arm(TimerKind::FalseStartHold, FALSE_START_HOLD_MS);
            }
            Phase::Stimulus { stimulus_at_ms } => {
                self.timer = None;
                let rt = timing::reaction_time(stimulus_at_ms, now).max(0) as u64;
                if timing::is_suspicious(rt) {
                    log::warn!(
                        "suspicious reaction time {}ms in round {}",
                        rt,
                        self.current_round
                    );
                }
                self.rounds
                    .push(RoundOutcome::valid(self.current_round, rt));
                self.phase = Phase::RoundEnd;
                self.arm(TimerKind::RoundEndHold, ROUND_END_HOLD_MS);
            }
            _ => {}
        }
    }

    /// Fire the pending timer if its deadline has passed. Called on
    /// every host tick; does nothing when no timer is due.
    pub fn poll(&mut self) {
        let Some(timer) = self.timer else {
            return;
        };
        let now = self.clock.now_ms();
        if now < timer.due_at_ms {
            return;
        }

        self.timer = None;
        if timer.generation != self.generation {
            // structurally unreachable (reset clears the timer), kept
            // as the last line of defense against sequencing bugs
            log::debug!("dropped stale {:?} timer", timer.kind);
            return;
        }

        match timer.kind {
            TimerKind::Stimulus => {
                self.phase = Phase::Stimulus { stimulus_at_ms: now };
                self.arm(TimerKind::ResponseDeadline, RESPONSE_DEADLINE_MS);
            }
            TimerKind::ResponseDeadline => {
                self.rounds
                    .push(RoundOutcome::timed_out(self.current_round));
                self.phase = Phase::RoundEnd;
                self.arm(TimerKind::RoundEndHold, ROUND_END_HOLD_MS);
            }
            TimerKind::FalseStartHold => {
                // retry the same round number with a fresh delay
                self.phase = Phase::Countdown;
                self.arm_stimulus_timer();
            }
            TimerKind::RoundEndHold => {
                if self.current_round >= self.mode.rounds() {
                    self.completed = Some(session_stats(&self.rounds));
                    self.phase = Phase::SessionComplete;
                } else {
                    self.current_round += 1;
                    self.arm(TimerKind::NextRound, NEXT_ROUND_DELAY_MS);
                }
            }
            TimerKind::NextRound => {
                self.phase = Phase::Countdown;
                self.arm_stimulus_timer();
            }
        }
    }

    /// Statistics over the rounds accumulated so far. Once the session
    /// completes this returns the cached final value.
    pub fn session_stats(&self) -> SessionStats {
        self.completed
            .unwrap_or_else(|| session_stats(&self.rounds))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn rounds(&self) -> &[RoundOutcome] {
        &self.rounds
    }

    pub fn last_round(&self) -> Option<&RoundOutcome> {
        self.rounds.last()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::SessionComplete
    }

    /// Final stats, present only after the session completed.
    pub fn completed_stats(&self) -> Option<SessionStats> {
        self.completed
    }

    /// Deadline of the armed timer, if any. The host loop and tests
    /// use this to know how far away the next transition is.
    pub fn armed_deadline_ms(&self) -> Option<u64> {
        self.timer.map(|t| t.due_at_ms)
    }

    /// Milliseconds until the armed timer fires (0 if overdue).
    pub fn remaining_ms(&self) -> Option<u64> {
        self.timer
            .map(|t| t.due_at_ms.saturating_sub(self.clock.now_ms()))
    }

    fn arm(&mut self, kind: TimerKind, delay_ms: u64) {
        self.timer = Some(PendingTimer {
            kind,
            due_at_ms: self.clock.now_ms() + delay_ms,
            generation: self.generation,
        });
    }

    fn arm_stimulus_timer(&mut self) {
        let delay = timing::random_delay(self.mode.min_delay_ms(), self.mode.max_delay_ms());
        self.arm(TimerKind::Stimulus, delay);
    }
}
