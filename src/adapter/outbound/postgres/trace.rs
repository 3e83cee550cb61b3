//! Sampled call-site capture for newly created pool connections.
//!
//! Capturing a backtrace is expensive, so only one in every `sample`
//! creations is traced. Purely diagnostic.

use std::backtrace::Backtrace;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use deadpool_postgres::Hook;
use tracing::debug;

pub(super) fn creation_hook(sample: u32) -> Hook {
    let created = Arc::new(AtomicU64::new(0));
    Hook::sync_fn(move |_client, _metrics| {
        let n = created.fetch_add(1, Ordering::Relaxed) + 1;
        if should_sample(n, sample) {
            debug!(
                connection = n,
                backtrace = %Backtrace::force_capture(),
                "Pool opened a new connection"
            );
        }
        Ok(())
    })
}

fn should_sample(n: u64, sample: u32) -> bool {
    sample != 0 && n % u64::from(sample) == 1 % u64::from(sample)
}

#[cfg(test)]
mod tests {
    use super::should_sample;

    #[test]
    fn samples_first_and_every_nth() {
        let hits: Vec<u64> = (1..=25).filter(|n| should_sample(*n, 10)).collect();
        assert_eq!(hits, vec![1, 11, 21]);
    }

    #[test]
    fn zero_disables_sampling() {
        assert!(!(1..100).any(|n| should_sample(n, 0)));
    }

    #[test]
    fn sample_of_one_traces_everything() {
        assert!((1..10).all(|n| should_sample(n, 1)));
    }
}
