use crate::Error;

/// Seconds for a stage's remaining balance to unlock in full (30 days).
pub const FULL_STREAM_UNLOCK_PERIOD: u64 = 30 * 24 * 60 * 60; // 2_592_000

/// Portion of `amount_left` unlocked at `now` for a stream checkpointed at
/// `last_checkpoint`.
///
/// Accrual is linear over [`FULL_STREAM_UNLOCK_PERIOD`] and truncates toward
/// zero. Each withdrawal moves the checkpoint, so the curve restarts against
/// the smaller remaining balance. A checkpoint in the future unlocks nothing.
pub fn unlocked_amount(amount_left: i128, last_checkpoint: u64, now: u64) -> Result<i128, Error> {
    if amount_left <= 0 {
        return Ok(0);
    }

    let elapsed = now.saturating_sub(last_checkpoint);
    if elapsed >= FULL_STREAM_UNLOCK_PERIOD {
        return Ok(amount_left);
    }

    let unlocked = amount_left
        .checked_mul(i128::from(elapsed))
        .ok_or(Error::MathOverflow)?
        .checked_div(i128::from(FULL_STREAM_UNLOCK_PERIOD))
        .ok_or(Error::MathOverflow)?;

    Ok(unlocked.min(amount_left))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_over_the_period() {
        assert_eq!(unlocked_amount(100, 0, 0), Ok(0));
        assert_eq!(unlocked_amount(100, 0, FULL_STREAM_UNLOCK_PERIOD / 2), Ok(50));
        assert_eq!(unlocked_amount(100, 0, FULL_STREAM_UNLOCK_PERIOD), Ok(100));
        assert_eq!(
            unlocked_amount(100, 0, FULL_STREAM_UNLOCK_PERIOD * 3 / 2),
            Ok(100)
        );
    }

    #[test]
    fn truncates_toward_zero() {
        // 7 * 1 / 2_592_000 rounds down to nothing
        assert_eq!(unlocked_amount(7, 10, 11), Ok(0));
        assert_eq!(
            unlocked_amount(1_000_000_007, 0, FULL_STREAM_UNLOCK_PERIOD / 3),
            Ok(333_333_335)
        );
    }

    #[test]
    fn future_checkpoint_unlocks_nothing() {
        assert_eq!(unlocked_amount(500, 1_000, 10), Ok(0));
    }

    #[test]
    fn empty_or_negative_balance() {
        assert_eq!(unlocked_amount(0, 0, FULL_STREAM_UNLOCK_PERIOD), Ok(0));
        assert_eq!(unlocked_amount(-5, 0, FULL_STREAM_UNLOCK_PERIOD), Ok(0));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            unlocked_amount(i128::MAX, 0, FULL_STREAM_UNLOCK_PERIOD / 2),
            Err(Error::MathOverflow)
        );
    }

    #[test]
    fn full_period_skips_the_multiplication() {
        assert_eq!(
            unlocked_amount(i128::MAX, 0, FULL_STREAM_UNLOCK_PERIOD),
            Ok(i128::MAX)
        );
        assert_eq!(
            unlocked_amount(i128::MAX / 2, 5, 5 + 2 * FULL_STREAM_UNLOCK_PERIOD),
            Ok(i128::MAX / 2)
        );
    }
}
