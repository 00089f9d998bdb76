use crate::game::RoundOutcome;
use crate::util::{mean, median, std_dev};
use serde::Serialize;

/// Aggregated statistics for one session, derived from the accumulated
/// round outcomes at completion time. Immutable once computed; a new
/// session produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStats {
    pub average: f64,
    pub best: f64,
    pub worst: f64,
    pub median: f64,
    pub standard_deviation: f64,
    pub consistency_score: f64,
    pub total_rounds: usize,
    pub valid_rounds: usize,
    pub false_starts: usize,
}

impl SessionStats {
    fn empty(total_rounds: usize) -> Self {
        Self {
            average: 0.0,
            best: 0.0,
            worst: 0.0,
            median: 0.0,
            standard_deviation: 0.0,
            consistency_score: 0.0,
            total_rounds,
            valid_rounds: 0,
            false_starts: total_rounds,
        }
    }
}

/// Pure aggregation over a session's ordered round outcomes.
///
/// False starts are excluded from the timing statistics but counted in
/// `total_rounds`/`false_starts`. Timed-out rounds count as valid,
/// contributing their capped reaction time.
pub fn session_stats(rounds: &[RoundOutcome]) -> SessionStats {
    let times: Vec<f64> = rounds
        .iter()
        .filter(|r| !r.false_start)
        .map(|r| r.reaction_time_ms as f64)
        .collect();

    if times.is_empty() {
        return SessionStats::empty(rounds.len());
    }

    let average = mean(&times).unwrap_or(0.0);
    let standard_deviation = std_dev(&times).unwrap_or(0.0);

    // coefficient of variation, inverted and clamped to [0, 100]
    let consistency_score = if average > 0.0 {
        (100.0 - (standard_deviation / average) * 100.0).max(0.0)
    } else {
        0.0
    };

    SessionStats {
        average,
        best: times.iter().cloned().fold(f64::INFINITY, f64::min),
        worst: times.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        median: median(&times).unwrap_or(0.0),
        standard_deviation,
        consistency_score,
        total_rounds: rounds.len(),
        valid_rounds: times.len(),
        false_starts: rounds.len() - times.len(),
    }
}

/// A reaction time beats the stored personal best when there is no
/// stored best yet or it is strictly faster.
pub fn is_personal_best(time_ms: f64, previous_best_ms: Option<f64>) -> bool {
    match previous_best_ms {
        Some(prev) => time_ms < prev,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(round: u32, rt: u64) -> RoundOutcome {
        RoundOutcome::valid(round, rt)
    }

    #[test]
    fn test_standard_session_scenario() {
        let rounds: Vec<RoundOutcome> = [200, 180, 220, 190, 210]
            .iter()
            .enumerate()
            .map(|(i, &rt)| valid(i as u32 + 1, rt))
            .collect();

        let stats = session_stats(&rounds);

        assert_eq!(stats.average, 200.0);
        assert_eq!(stats.best, 180.0);
        assert_eq!(stats.worst, 220.0);
        assert_eq!(stats.median, 200.0);
        assert!((stats.standard_deviation - 14.142135623730951).abs() < 1e-9);
        assert!((stats.consistency_score - 92.92893218813452).abs() < 1e-9);
        assert_eq!(stats.total_rounds, 5);
        assert_eq!(stats.valid_rounds, 5);
        assert_eq!(stats.false_starts, 0);
    }

    #[test]
    fn test_empty_input() {
        let stats = session_stats(&[]);
        assert_eq!(stats.average, 0.0);
        assert_eq!(stats.best, 0.0);
        assert_eq!(stats.worst, 0.0);
        assert_eq!(stats.median, 0.0);
        assert_eq!(stats.standard_deviation, 0.0);
        assert_eq!(stats.consistency_score, 0.0);
        assert_eq!(stats.total_rounds, 0);
        assert_eq!(stats.valid_rounds, 0);
        assert_eq!(stats.false_starts, 0);
    }

    #[test]
    fn test_all_false_starts() {
        let rounds = vec![
            RoundOutcome::false_start(1),
            RoundOutcome::false_start(1),
            RoundOutcome::false_start(1),
        ];
        let stats = session_stats(&rounds);
        assert_eq!(stats.average, 0.0);
        assert_eq!(stats.consistency_score, 0.0);
        assert_eq!(stats.total_rounds, 3);
        assert_eq!(stats.valid_rounds, 0);
        assert_eq!(stats.false_starts, 3);
    }

    #[test]
    fn test_false_start_then_valid_same_round() {
        let rounds = vec![RoundOutcome::false_start(1), valid(1, 240)];
        let stats = session_stats(&rounds);
        assert_eq!(stats.total_rounds, 2);
        assert_eq!(stats.valid_rounds, 1);
        assert_eq!(stats.false_starts, 1);
        assert_eq!(stats.average, 240.0);
    }

    #[test]
    fn test_timed_out_rounds_count_as_valid() {
        let rounds = vec![valid(1, 200), RoundOutcome::timed_out(2)];
        let stats = session_stats(&rounds);
        assert_eq!(stats.valid_rounds, 2);
        assert_eq!(stats.worst, 10_000.0);
        assert_eq!(stats.average, 5_100.0);
    }

    #[test]
    fn test_median_even_count() {
        let rounds = vec![valid(1, 100), valid(2, 200), valid(3, 300), valid(4, 400)];
        let stats = session_stats(&rounds);
        assert_eq!(stats.median, 250.0);
    }

    #[test]
    fn test_idempotence() {
        let rounds = vec![
            valid(1, 321),
            RoundOutcome::false_start(2),
            valid(2, 280),
            RoundOutcome::timed_out(3),
        ];
        let first = session_stats(&rounds);
        let second = session_stats(&rounds);
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_round_is_perfectly_consistent() {
        let stats = session_stats(&[valid(1, 250)]);
        assert_eq!(stats.standard_deviation, 0.0);
        assert_eq!(stats.consistency_score, 100.0);
        assert_eq!(stats.best, 250.0);
        assert_eq!(stats.worst, 250.0);
    }

    #[test]
    fn test_consistency_score_floor_at_zero() {
        // wildly spread times drive the coefficient of variation past 100%
        let rounds = vec![valid(1, 1), valid(2, 10_000), valid(3, 1)];
        let stats = session_stats(&rounds);
        assert_eq!(stats.consistency_score, 0.0);
    }

    #[test]
    fn test_is_personal_best() {
        assert!(is_personal_best(200.0, None));
        assert!(is_personal_best(180.0, Some(200.0)));
        assert!(!is_personal_best(200.0, Some(200.0)));
        assert!(!is_personal_best(240.0, Some(200.0)));
    }
}
