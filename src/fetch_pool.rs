use rayon::prelude::*;

use crate::api::{CancelToken, FetchError};

/// Outcome of a league-wide fan-out: one slot per input, in input order.
#[derive(Debug)]
pub struct FanOut<K, T> {
    pub results: Vec<(K, Result<T, FetchError>)>,
}

impl<K, T> FanOut<K, T> {
    pub fn successes(&self) -> impl Iterator<Item = (&K, &T)> {
        self.results
            .iter()
            .filter_map(|(key, res)| res.as_ref().ok().map(|value| (key, value)))
    }

    /// Failures worth reporting; cancelled items are left out.
    pub fn errors(&self) -> Vec<(&K, &FetchError)> {
        self.results
            .iter()
            .filter_map(|(key, res)| match res {
                Err(err) if !err.is_aborted() => Some((key, err)),
                _ => None,
            })
            .collect()
    }

    pub fn was_cancelled(&self) -> bool {
        self.results
            .iter()
            .any(|(_, res)| matches!(res, Err(FetchError::Aborted)))
    }

    pub fn into_values(self) -> impl Iterator<Item = (K, T)> {
        self.results
            .into_iter()
            .filter_map(|(key, res)| res.ok().map(|value| (key, value)))
    }
}

/// Runs `action` on a dedicated pool with exactly `threads` workers so a fan-out
/// never has more than that many requests in flight.
pub fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|idx| format!("fetch-{idx}"))
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

/// Fetches every key through `fetch`, `threads` at a time. Per-item failures are kept
/// alongside the successes; once `cancel` fires the remaining items resolve to `Aborted`.
pub fn fan_out<K, T, F>(
    keys: Vec<K>,
    threads: usize,
    cancel: &CancelToken,
    fetch: F,
) -> FanOut<K, T>
where
    K: Send + Sync,
    T: Send,
    F: Fn(&K) -> Result<T, FetchError> + Sync + Send,
{
    let values: Vec<Result<T, FetchError>> = with_fetch_pool(threads, || {
        keys.par_iter()
            .with_max_len(1)
            .map(|key| {
                if cancel.is_cancelled() {
                    return Err(FetchError::Aborted);
                }
                fetch(key)
            })
            .collect()
    });
    FanOut {
        results: keys.into_iter().zip(values).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn keeps_input_order_and_collects_errors() {
        let cancel = CancelToken::new();
        let keys: Vec<u32> = (0..12).collect();
        let out = fan_out(keys, 5, &cancel, |k| {
            if k % 4 == 3 {
                Err(FetchError::Http {
                    status: 500,
                    body: format!("team {k}"),
                })
            } else {
                Ok(k * 10)
            }
        });
        let order: Vec<u32> = out.results.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, (0..12).collect::<Vec<_>>());
        assert_eq!(out.errors().len(), 3);
        let values: Vec<u32> = out.successes().map(|(_, v)| *v).collect();
        assert_eq!(values[..3], [0, 10, 20]);
        assert!(!out.was_cancelled());
    }

    #[test]
    fn never_exceeds_worker_count() {
        let cancel = CancelToken::new();
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let out = fan_out((0..20).collect::<Vec<u32>>(), 5, &cancel, |_| {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(out.successes().count(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 5);
    }

    #[test]
    fn cancelled_token_short_circuits() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let out = fan_out(vec!["Arsenal", "Chelsea"], 2, &cancel, |_| Ok(1));
        assert!(out.was_cancelled());
        assert!(out.errors().is_empty());
        assert_eq!(out.into_values().count(), 0);
    }
}
