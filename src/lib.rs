//! On-demand model loading for single-shot inference tasks.
//!
//! This crate coordinates everything *around* model acquisition without
//! performing any of it: fetching and initializing a model is delegated to an
//! injected [`Acquire`] implementation, and this crate supplies the lazy
//! memoizing cache ([`ModelLoader`]), the sequential fallback chain
//! ([`load_with_fallback`]), the lifecycle state machine
//! ([`next_model_status`]), and the progress formatting
//! ([`format_progress`]) a frontend needs while a download is running.
//!
//! # Example
//!
//! ```no_run
//! use futures_util::future::BoxFuture;
//! use futures_util::FutureExt;
//! use inferkit::{Acquire, AcquireError, AcquireOptions, LoadOptions, ModelLoader, Task};
//!
//! struct RuntimeAcquirer;
//!
//! impl Acquire for RuntimeAcquirer {
//!     type Pipeline = Box<dyn Fn(&str) -> String + Send + Sync>;
//!
//!     fn acquire(
//!         &self,
//!         _task: Task,
//!         _model_id: &str,
//!         _options: AcquireOptions,
//!     ) -> BoxFuture<'static, Result<Self::Pipeline, AcquireError>> {
//!         // Hand off to the real model runtime here.
//!         async move { Err(AcquireError::Runtime("no runtime wired up".into())) }.boxed()
//!     }
//! }
//!
//! # async fn demo() {
//! let loader = ModelLoader::new(RuntimeAcquirer);
//! let pipeline = loader
//!     .load(Task::SentimentAnalysis, "distilbert-sst2", LoadOptions::default())
//!     .await;
//! // Failures surface as an absent result, never a panic or an error.
//! assert!(pipeline.is_none());
//! # }
//! ```

mod catalog;
mod error;
mod fallback;
mod loader;
mod progress;
mod status;

pub use catalog::{
    catalog_entry, fallback_chain, task_catalog, Quantization, Task, TaskCatalogEntry,
};
pub use error::AcquireError;
pub use fallback::{load_with_fallback, FallbackOutcome};
pub use loader::{Acquire, AcquireOptions, LoadOptions, ModelLoader, ProgressCallback};
pub use progress::{format_progress, DisplayProgress, ProgressEvent};
pub use status::{next_model_status, ModelStatus, StatusEvent};
