//! Bounded waits around blocking service calls.

use super::ServiceError;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Runs `call` on a helper thread and waits at most `timeout` for it.
///
/// On timeout the helper thread is detached; its eventual result is
/// dropped. A panic inside `call` is reported as a transport error.
pub fn call_with_deadline<T, F>(timeout: Duration, call: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("qkd-service-call".into())
        .spawn(move || {
            let _ = tx.send(call());
        })
        .map_err(|e| ServiceError::Transport(e.to_string()))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::warn!(timeout_ms = timeout.as_millis(), "Quantum service call timed out");
            Err(ServiceError::Timeout(timeout.as_millis()))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(ServiceError::Transport(
            "service call aborted".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_call_returns_value() {
        let result = call_with_deadline(Duration::from_secs(1), || Ok(42));
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn test_error_is_forwarded() {
        let result: Result<(), _> =
            call_with_deadline(Duration::from_secs(1), || Err(ServiceError::NoBackend));
        assert_eq!(result, Err(ServiceError::NoBackend));
    }

    #[test]
    fn test_slow_call_times_out() {
        let result = call_with_deadline(Duration::from_millis(10), || {
            thread::sleep(Duration::from_millis(500));
            Ok(())
        });
        assert!(matches!(result, Err(ServiceError::Timeout(10))));
    }

    #[test]
    fn test_panicking_call_is_transport_error() {
        let result: Result<(), _> =
            call_with_deadline(Duration::from_secs(1), || panic!("device driver crashed"));
        assert!(matches!(result, Err(ServiceError::Transport(_))));
    }
}
