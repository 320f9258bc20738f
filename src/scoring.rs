//! Time-decayed scoring for correct answers.
//!
//! The award is computed once when the answer is submitted and never
//! recomputed afterwards, so a player's score only ever grows by scoring
//! outputs (and resets to zero only on an explicit restart).

/// Fraction of the time limit inside which a correct answer earns full points.
const INSTANT_WINDOW_RATIO: f64 = 0.03;
/// Fraction of the base points any correct answer is guaranteed to earn.
const SLOW_ANSWER_FLOOR_RATIO: f64 = 0.1;

/// Compute the points awarded for an answer.
///
/// Incorrect answers always score zero. Correct answers inside the instant
/// window (3% of the time limit) earn the full base points; past it the award
/// decays linearly down to a floor of 10% of the base points, so a correct
/// but slow answer still earns something.
pub fn award_points(correct: bool, time_spent_ms: u64, base_points: u32, time_limit_secs: u32) -> u32 {
    if !correct {
        return 0;
    }

    let limit_ms = f64::from(time_limit_secs) * 1000.0;
    let min_time_for_max = limit_ms * INSTANT_WINDOW_RATIO;
    let spent_ms = time_spent_ms as f64;

    if spent_ms <= min_time_for_max {
        return base_points;
    }

    let ratio = ((limit_ms - spent_ms) / (limit_ms - min_time_for_max)).max(0.0);
    let floor = (f64::from(base_points) * SLOW_ANSWER_FLOOR_RATIO).floor() as u32;
    let scaled = (f64::from(base_points) * ratio).round() as u32;

    scaled.max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incorrect_answers_score_zero() {
        assert_eq!(award_points(false, 0, 1000, 30), 0);
        assert_eq!(award_points(false, 45_000, 1000, 30), 0);
    }

    #[test]
    fn instant_answers_earn_full_points() {
        // 3% of a 30s limit is 900ms.
        assert_eq!(award_points(true, 0, 100, 30), 100);
        assert_eq!(award_points(true, 900, 100, 30), 100);
        assert_eq!(award_points(true, 450, 735, 30), 735);
    }

    #[test]
    fn answers_at_or_past_the_limit_earn_the_floor() {
        assert_eq!(award_points(true, 30_000, 100, 30), 10);
        assert_eq!(award_points(true, 120_000, 100, 30), 10);
        // floor(250 * 0.1) = 25
        assert_eq!(award_points(true, 60_000, 250, 60), 25);
    }

    #[test]
    fn award_decays_monotonically_with_time_spent() {
        let mut previous = u32::MAX;
        for spent_ms in (0..=35_000).step_by(250) {
            let awarded = award_points(true, spent_ms, 1000, 30);
            assert!(
                awarded <= previous,
                "award increased from {previous} to {awarded} at {spent_ms}ms"
            );
            previous = awarded;
        }
    }

    #[test]
    fn one_second_answer_on_thirty_second_question_rounds_to_full() {
        // ratio = (30000 - 1000) / (30000 - 900) = 0.99656..., round(99.656) = 100
        assert_eq!(award_points(true, 1_000, 100, 30), 100);
    }

    #[test]
    fn midway_answer_earns_roughly_half() {
        // ratio = (30000 - 15000) / 29100 = 0.5154..., round(51.54) = 52
        assert_eq!(award_points(true, 15_000, 100, 30), 52);
    }
}
