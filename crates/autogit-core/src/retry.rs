//! Bounded retry for fallible operations.

use std::fmt::Display;

use tracing::warn;

/// Run `op` up to `max_attempts` times, returning the first `Ok` or the
/// last `Err`.
///
/// There is no back-off between attempts: the intended use is papering
/// over transient engine failures (lock contention, a dropped connection)
/// where an immediate second try is cheap relative to the surrounding run.
/// Earlier failures are logged and discarded; only the final result is
/// visible to the caller.
pub fn attempt<T, E, F>(max_attempts: u32, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Display,
{
    debug_assert!(max_attempts > 0, "max_attempts must be at least 1");
    let mut attempts = 0;
    loop {
        attempts += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempts < max_attempts => {
                warn!(attempt = attempts, error = %err, "attempt failed, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_success_short_circuits() {
        let mut calls = 0;
        let result: Result<u32, String> = attempt(2, || {
            calls += 1;
            Ok(7)
        });
        assert_eq!(result, Ok(7));
        assert_eq!(calls, 1);
    }

    #[test]
    fn retry_recovers_from_one_failure() {
        let mut calls = 0;
        let result: Result<u32, String> = attempt(2, || {
            calls += 1;
            if calls == 1 {
                Err("transient".to_string())
            } else {
                Ok(42)
            }
        });
        assert_eq!(result, Ok(42));
        assert_eq!(calls, 2);
    }

    #[test]
    fn last_error_wins_when_all_attempts_fail() {
        let mut calls = 0;
        let result: Result<u32, String> = attempt(2, || {
            calls += 1;
            Err(format!("failure {calls}"))
        });
        assert_eq!(result, Err("failure 2".to_string()));
        assert_eq!(calls, 2);
    }

    #[test]
    fn single_attempt_never_retries() {
        let mut calls = 0;
        let result: Result<u32, String> = attempt(1, || {
            calls += 1;
            Err("nope".to_string())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
