//! Lazy, memoizing model loader.
//!
//! [`ModelLoader`] wraps an injected [`Acquire`] implementation with a
//! per-instance cache keyed by (task, model). Each key gets at most one
//! acquisition attempt at a time: duplicate callers await the same shared
//! future and observe the same result. Failures are logged, evicted from the
//! cache, and reported as an absent result, never as an error or a panic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use log::{debug, error, info};

use crate::catalog::{Quantization, Task};
use crate::error::AcquireError;
use crate::fallback::{self, FallbackOutcome};
use crate::progress::ProgressEvent;

/// Callback invoked with every progress event an acquisition reports.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Seam between the loader and the real model runtime.
///
/// Implementations fetch model files and construct the task-specific
/// inference pipeline. Injected at [`ModelLoader::new`], so tests swap in a
/// double without touching any network or runtime.
pub trait Acquire: Send + Sync {
    /// Opaque inference callable produced by a successful acquisition.
    type Pipeline: Send + Sync + 'static;

    /// Fetch and initialize one model. May reject with any [`AcquireError`];
    /// the loader converts every rejection into an absent result.
    fn acquire(
        &self,
        task: Task,
        model_id: &str,
        options: AcquireOptions,
    ) -> BoxFuture<'static, Result<Self::Pipeline, AcquireError>>;
}

/// Caller-facing options for [`ModelLoader::load`].
///
/// Merged into [`AcquireOptions`] with this precedence, lowest first: the
/// fixed `q8` quantization default, the caller's progress callback, then any
/// caller-supplied overrides. A caller that names `quantization` explicitly
/// always wins over the default.
#[derive(Clone, Default)]
pub struct LoadOptions {
    /// Receives the acquisition's progress events as they happen.
    pub on_progress: Option<ProgressCallback>,
    /// Overrides the default [`Quantization::Q8`] when set.
    pub quantization: Option<Quantization>,
    /// Revision pin forwarded verbatim to the acquisition function.
    pub revision: Option<String>,
}

/// Merged options handed to the acquisition function.
#[derive(Clone)]
pub struct AcquireOptions {
    pub quantization: Quantization,
    pub on_progress: Option<ProgressCallback>,
    pub revision: Option<String>,
}

impl From<LoadOptions> for AcquireOptions {
    fn from(options: LoadOptions) -> Self {
        Self {
            quantization: options.quantization.unwrap_or_default(),
            on_progress: options.on_progress,
            revision: options.revision,
        }
    }
}

/// Cache key for one loadable model instance within a session.
fn load_key(task: Task, model_id: &str) -> String {
    format!("{}:{}", task, model_id)
}

/// One cached load: in flight until it settles, then a settled value that
/// every awaiter observes identically.
type SharedLoad<P> = Shared<BoxFuture<'static, Option<Arc<P>>>>;

/// Lazily acquires each (task, model) pair at most once per session.
///
/// Every loader owns its own cache; independent instances never share state.
/// A successful load stays cached for the loader's lifetime, a failed one is
/// evicted so the next call retries from scratch. There are no automatic
/// retries, timeouts, or cancellation at this layer; an in-flight
/// acquisition always runs to completion.
pub struct ModelLoader<A: Acquire> {
    acquirer: A,
    cache: Mutex<HashMap<String, SharedLoad<A::Pipeline>>>,
}

impl<A: Acquire> ModelLoader<A> {
    /// Create a loader around an acquisition function with an empty cache.
    pub fn new(acquirer: A) -> Self {
        Self {
            acquirer,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Load a model for a task, reusing any cached or in-flight attempt.
    ///
    /// Returns the shared pipeline on success and `None` on failure. The
    /// caller retries by calling `load` again with the same arguments; that
    /// starts a fresh attempt only because the failed entry was evicted.
    pub async fn load(
        &self,
        task: Task,
        model_id: &str,
        options: LoadOptions,
    ) -> Option<Arc<A::Pipeline>> {
        let key = load_key(task, model_id);

        // Insert before the first await so a duplicate call always observes
        // the in-flight attempt instead of starting its own.
        let load = {
            let mut cache = self.cache.lock().unwrap();
            match cache.get(&key) {
                Some(existing) => {
                    debug!("Reusing cached load for '{}'", key);
                    existing.clone()
                }
                None => {
                    info!("Loading model '{}' for task '{}'", model_id, task);
                    let load = self.begin_load(task, model_id.to_string(), options.into());
                    cache.insert(key.clone(), load.clone());
                    load
                }
            }
        };

        let result = load.clone().await;

        // A failed attempt must not poison the cache. Evict it, but only if
        // the entry still refers to this attempt: a concurrent retry may
        // already have replaced it.
        if result.is_none() {
            let mut cache = self.cache.lock().unwrap();
            if cache.get(&key).is_some_and(|current| current.ptr_eq(&load)) {
                cache.remove(&key);
            }
        }

        result
    }

    /// Try an ordered list of models for one task, first success wins.
    /// Accepts the chains produced by [`crate::catalog::fallback_chain`].
    pub async fn load_with_fallback<S: AsRef<str>>(
        &self,
        task: Task,
        model_ids: &[S],
        options: LoadOptions,
    ) -> Option<FallbackOutcome<A::Pipeline>> {
        fallback::load_with_fallback(
            |task, model_id: String, options| async move {
                self.load(task, &model_id, options).await
            },
            task,
            model_ids,
            options,
        )
        .await
    }

    fn begin_load(
        &self,
        task: Task,
        model_id: String,
        options: AcquireOptions,
    ) -> SharedLoad<A::Pipeline> {
        let acquisition = self.acquirer.acquire(task, &model_id, options);
        async move {
            match acquisition.await {
                Ok(pipeline) => {
                    info!("Model '{}' ready for task '{}'", model_id, task);
                    Some(Arc::new(pipeline))
                }
                Err(err) => {
                    error!(
                        "Failed to load model '{}' for task '{}': {}",
                        model_id, task, err
                    );
                    None
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Whether a load for this (task, model) pair is cached, settled or not.
    pub fn is_cached(&self, task: Task, model_id: &str) -> bool {
        self.cache
            .lock()
            .unwrap()
            .contains_key(&load_key(task, model_id))
    }

    /// Number of cached loads, in flight and settled.
    pub fn cached_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Drop every cached load. In-flight acquisitions still run to
    /// completion; their results are simply no longer shared.
    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Test double for the runtime seam: counts invocations, optionally
    /// fails, and resolves after a short delay so loads can overlap.
    struct MockAcquirer {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl MockAcquirer {
        fn new(fail: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    fail,
                },
                calls,
            )
        }
    }

    impl Acquire for MockAcquirer {
        type Pipeline = String;

        fn acquire(
            &self,
            task: Task,
            model_id: &str,
            _options: AcquireOptions,
        ) -> BoxFuture<'static, Result<String, AcquireError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            let label = format!("{}:{}", task, model_id);
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                if fail {
                    Err(AcquireError::Runtime("mock failure".into()))
                } else {
                    Ok(label)
                }
            }
            .boxed()
        }
    }

    #[test]
    fn test_load_key_is_unique_per_task_model_pair() {
        assert_eq!(
            load_key(Task::SentimentAnalysis, "m"),
            "sentiment-analysis:m"
        );
        assert_ne!(
            load_key(Task::SentimentAnalysis, "m"),
            load_key(Task::Summarization, "m")
        );
    }

    #[test]
    fn test_options_merge_defaults_quantization_to_q8() {
        let merged: AcquireOptions = LoadOptions::default().into();
        assert_eq!(merged.quantization, Quantization::Q8);
        assert!(merged.on_progress.is_none());
        assert!(merged.revision.is_none());
    }

    #[test]
    fn test_caller_quantization_overrides_default() {
        let merged: AcquireOptions = LoadOptions {
            quantization: Some(Quantization::Fp16),
            ..Default::default()
        }
        .into();
        assert_eq!(merged.quantization, Quantization::Fp16);
    }

    #[tokio::test]
    async fn test_duplicate_loads_share_one_acquisition() {
        let (acquirer, calls) = MockAcquirer::new(false);
        let loader = ModelLoader::new(acquirer);

        let (a, b) = tokio::join!(
            loader.load(Task::SentimentAnalysis, "m", LoadOptions::default()),
            loader.load(Task::SentimentAnalysis, "m", LoadOptions::default()),
        );

        let a = a.expect("first load succeeds");
        let b = b.expect("second load succeeds");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_successful_load_stays_cached() {
        let (acquirer, calls) = MockAcquirer::new(false);
        let loader = ModelLoader::new(acquirer);

        let first = loader
            .load(Task::ImageClassification, "vit", LoadOptions::default())
            .await
            .expect("load succeeds");
        let second = loader
            .load(Task::ImageClassification, "vit", LoadOptions::default())
            .await
            .expect("cached load succeeds");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(loader.is_cached(Task::ImageClassification, "vit"));
        assert_eq!(loader.cached_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_resolves_to_none_and_is_evicted() {
        let (acquirer, calls) = MockAcquirer::new(true);
        let loader = ModelLoader::new(acquirer);

        let result = loader
            .load(Task::Summarization, "m", LoadOptions::default())
            .await;
        assert!(result.is_none());
        assert!(!loader.is_cached(Task::Summarization, "m"));

        // Eviction means the next call starts a fresh attempt.
        let retry = loader
            .load(Task::Summarization, "m", LoadOptions::default())
            .await;
        assert!(retry.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_pairs_load_independently() {
        let (acquirer, calls) = MockAcquirer::new(false);
        let loader = ModelLoader::new(acquirer);

        let a = loader
            .load(Task::SentimentAnalysis, "m", LoadOptions::default())
            .await
            .expect("load succeeds");
        let b = loader
            .load(Task::Summarization, "m", LoadOptions::default())
            .await
            .expect("load succeeds");

        assert_eq!(*a, "sentiment-analysis:m");
        assert_eq!(*b, "summarization:m");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(loader.cached_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_forgets_settled_loads() {
        let (acquirer, calls) = MockAcquirer::new(false);
        let loader = ModelLoader::new(acquirer);

        loader
            .load(Task::SentimentAnalysis, "m", LoadOptions::default())
            .await
            .expect("load succeeds");
        loader.clear();
        assert_eq!(loader.cached_count(), 0);

        loader
            .load(Task::SentimentAnalysis, "m", LoadOptions::default())
            .await
            .expect("load succeeds");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Acquirer that only succeeds for one model identifier.
    struct SelectiveAcquirer {
        ok_model: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl Acquire for SelectiveAcquirer {
        type Pipeline = String;

        fn acquire(
            &self,
            _task: Task,
            model_id: &str,
            _options: AcquireOptions,
        ) -> BoxFuture<'static, Result<String, AcquireError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if model_id == self.ok_model {
                Ok(model_id.to_string())
            } else {
                Err(AcquireError::NotFound(model_id.to_string()))
            };
            async move { result }.boxed()
        }
    }

    #[tokio::test]
    async fn test_loader_fallback_reports_winning_model() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = ModelLoader::new(SelectiveAcquirer {
            ok_model: "second",
            calls: calls.clone(),
        });

        let outcome = loader
            .load_with_fallback(
                Task::Summarization,
                &["first", "second", "third"],
                LoadOptions::default(),
            )
            .await
            .expect("second candidate loads");

        assert_eq!(outcome.model, "second");
        assert_eq!(*outcome.pipeline, "second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // The failed first candidate was evicted, the winner stays cached.
        assert!(!loader.is_cached(Task::Summarization, "first"));
        assert!(loader.is_cached(Task::Summarization, "second"));
    }

    /// Acquirer that reports a canned progress sequence through the merged
    /// options before succeeding.
    struct ProgressAcquirer;

    impl Acquire for ProgressAcquirer {
        type Pipeline = ();

        fn acquire(
            &self,
            _task: Task,
            _model_id: &str,
            options: AcquireOptions,
        ) -> BoxFuture<'static, Result<(), AcquireError>> {
            async move {
                if let Some(on_progress) = &options.on_progress {
                    on_progress(&ProgressEvent::Initiate {
                        file: "model.onnx".into(),
                    });
                    on_progress(&ProgressEvent::Progress {
                        file: "model.onnx".into(),
                        progress: 45.7,
                    });
                    on_progress(&ProgressEvent::Ready);
                }
                Ok(())
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_progress_callback_is_threaded_through() {
        let seen: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let options = LoadOptions {
            on_progress: Some(Arc::new(move |event: &ProgressEvent| {
                sink.lock().unwrap().push(event.clone());
            })),
            ..Default::default()
        };

        let loader = ModelLoader::new(ProgressAcquirer);
        loader
            .load(Task::ImageClassification, "vit", options)
            .await
            .expect("load succeeds");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[1],
            ProgressEvent::Progress {
                file: "model.onnx".into(),
                progress: 45.7,
            }
        );
    }
}
