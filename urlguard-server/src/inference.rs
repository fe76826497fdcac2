//! Concurrent model invocation
//!
//! Every model runs on the blocking pool. All calls of one request share a
//! single deadline; results are gathered in load order only after each call
//! has settled or the deadline has passed, so the tally never sees a
//! partial set.
//!
//! A call that misses the deadline cannot be cancelled and keeps its
//! blocking thread. [`Stragglers`] counts those calls per model; a model
//! with one still running is not called again until it returns, so a hung
//! model holds at most one pool thread.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use urlguard_core::logic::ensemble::{self, ModelVerdict};
use urlguard_core::logic::features::FeatureVector;
use urlguard_core::logic::model::{ModelError, ModelRegistry};

// Lifecycle of one call
const RUNNING: u8 = 0;
const DONE: u8 = 1;
const ABANDONED: u8 = 2;

/// Per-model count of calls still running after their request gave up on them.
/// Indexed by load order.
pub struct Stragglers {
    counts: Vec<Arc<AtomicUsize>>,
}

impl Stragglers {
    pub fn for_registry(registry: &ModelRegistry) -> Self {
        Self {
            counts: (0..registry.len()).map(|_| Arc::new(AtomicUsize::new(0))).collect(),
        }
    }

    pub fn running(&self, index: usize) -> usize {
        self.counts
            .get(index)
            .map(|count| count.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        (0..self.counts.len()).map(|i| self.running(i)).sum()
    }

    /// Mark a timed-out call abandoned; the call itself clears the mark when it returns
    fn abandon(&self, index: usize, call: &AtomicU8) {
        let Some(count) = self.counts.get(index) else {
            return;
        };
        // Count first so the call's decrement can never run ahead of it
        count.fetch_add(1, Ordering::AcqRel);
        if call
            .compare_exchange(RUNNING, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            count.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// One verdict per loaded model, in load order
pub async fn run_models(
    registry: &ModelRegistry,
    stragglers: &Stragglers,
    features: &FeatureVector,
    timeout: Duration,
) -> Vec<ModelVerdict> {
    let deadline = Instant::now() + timeout;
    let timeout_ms = timeout.as_millis() as u64;

    let pending: Vec<_> = registry
        .models()
        .iter()
        .enumerate()
        .map(|(index, loaded)| {
            let name = loaded.name.clone();
            let stalled = stragglers.running(index);
            if stalled > 0 {
                return (index, name, Err(stalled));
            }

            let call = Arc::new(AtomicU8::new(RUNNING));
            let call_state = call.clone();
            let count = stragglers.counts.get(index).cloned();
            let loaded = loaded.clone();
            let features = *features;

            let handle = tokio::task::spawn_blocking(move || {
                let verdict = ensemble::invoke(&loaded, &features);
                if call_state.swap(DONE, Ordering::AcqRel) == ABANDONED {
                    if let Some(count) = count {
                        count.fetch_sub(1, Ordering::AcqRel);
                    }
                }
                verdict
            });
            (index, name, Ok((handle, call)))
        })
        .collect();

    let mut verdicts = Vec::with_capacity(pending.len());
    for (index, name, call) in pending {
        let (handle, call) = match call {
            Ok(call) => call,
            Err(stalled) => {
                tracing::warn!(model = %name, stalled, "Model skipped: earlier call still running");
                verdicts.push(ModelVerdict::failed(name, &ModelError::Stalled(stalled)));
                continue;
            }
        };

        let verdict = match timeout_at(deadline, handle).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                tracing::warn!(model = %name, "Model task failed: {}", e);
                ModelVerdict::failed(name, &ModelError::Panicked(e.to_string()))
            }
            Err(_) => {
                stragglers.abandon(index, &call);
                tracing::warn!(
                    model = %name,
                    stragglers = stragglers.total(),
                    "Model missed the {} ms deadline",
                    timeout_ms
                );
                ModelVerdict::failed(name, &ModelError::TimedOut(timeout_ms))
            }
        };
        verdicts.push(verdict);
    }

    verdicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use urlguard_core::logic::features::FEATURE_COUNT;
    use urlguard_core::{ClassifierModel, Label};

    struct Fixed(Label);

    impl ClassifierModel for Fixed {
        fn technology(&self) -> &'static str {
            "fixed"
        }

        fn predict_label(&self, _features: &FeatureVector) -> Result<Label, ModelError> {
            Ok(self.0)
        }
    }

    struct Slow(Duration);

    impl ClassifierModel for Slow {
        fn technology(&self) -> &'static str {
            "slow"
        }

        fn predict_label(&self, _features: &FeatureVector) -> Result<Label, ModelError> {
            std::thread::sleep(self.0);
            Ok(Label::Benign)
        }
    }

    struct Panicking;

    impl ClassifierModel for Panicking {
        fn technology(&self) -> &'static str {
            "panicking"
        }

        fn predict_label(&self, _features: &FeatureVector) -> Result<Label, ModelError> {
            panic!("bad artifact")
        }
    }

    fn features() -> FeatureVector {
        FeatureVector::from_values([0.0; FEATURE_COUNT])
    }

    #[tokio::test]
    async fn test_verdicts_in_load_order() {
        let registry = ModelRegistry::new()
            .with_model("slow_benign", Arc::new(Slow(Duration::from_millis(30))))
            .with_model("phishing", Arc::new(Fixed(Label::Phishing)))
            .with_model("malicious", Arc::new(Fixed(Label::Malicious)));

        let verdicts = run_models(&registry, &Stragglers::for_registry(&registry), &features(), Duration::from_secs(5)).await;

        let names: Vec<&str> = verdicts.iter().map(|v| v.model_name.as_str()).collect();
        assert_eq!(names, vec!["slow_benign", "phishing", "malicious"]);
        assert_eq!(verdicts[0].predicted_label, Label::Benign);
        assert!(verdicts.iter().all(|v| v.error.is_none()));
    }

    #[tokio::test]
    async fn test_deadline_marks_model_failed() {
        let registry = ModelRegistry::new()
            .with_model("fast", Arc::new(Fixed(Label::Benign)))
            .with_model("slow", Arc::new(Slow(Duration::from_millis(600))));

        let verdicts = run_models(&registry, &Stragglers::for_registry(&registry), &features(), Duration::from_millis(100)).await;

        assert_eq!(verdicts[0].predicted_label, Label::Benign);
        assert_eq!(verdicts[1].predicted_label, Label::Error);
        assert_eq!(verdicts[1].error.as_deref(), Some("inference timed out after 100 ms"));
    }

    #[tokio::test]
    async fn test_hung_model_is_skipped_until_it_returns() {
        let registry = ModelRegistry::new()
            .with_model("fast", Arc::new(Fixed(Label::Benign)))
            .with_model("slow", Arc::new(Slow(Duration::from_millis(400))));
        let stragglers = Stragglers::for_registry(&registry);
        let timeout = Duration::from_millis(50);

        let first = run_models(&registry, &stragglers, &features(), timeout).await;
        assert_eq!(first[1].error.as_deref(), Some("inference timed out after 50 ms"));
        assert_eq!(stragglers.running(1), 1);

        let started = std::time::Instant::now();
        let second = run_models(&registry, &stragglers, &features(), timeout).await;
        assert_eq!(second[0].predicted_label, Label::Benign);
        assert_eq!(second[1].predicted_label, Label::Error);
        assert_eq!(
            second[1].error.as_deref(),
            Some("skipped: 1 earlier call(s) still running past the deadline")
        );
        assert!(started.elapsed() < Duration::from_millis(300));
        assert_eq!(stragglers.running(1), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(stragglers.running(1), 0);
        assert_eq!(stragglers.total(), 0);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let registry = ModelRegistry::new()
            .with_model("panics", Arc::new(Panicking))
            .with_model("ok", Arc::new(Fixed(Label::Defacement)));

        let verdicts = run_models(&registry, &Stragglers::for_registry(&registry), &features(), Duration::from_secs(1)).await;

        assert_eq!(verdicts[0].predicted_label, Label::Error);
        assert!(verdicts[0].error.as_deref().unwrap().contains("bad artifact"));
        assert_eq!(verdicts[1].predicted_label, Label::Defacement);
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = ModelRegistry::new();
        let verdicts = run_models(&registry, &Stragglers::for_registry(&registry), &features(), Duration::from_millis(10)).await;
        assert!(verdicts.is_empty());
    }
}
