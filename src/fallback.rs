//! Sequential fallback over an ordered list of candidate models.

use std::future::Future;
use std::sync::Arc;

use log::{info, warn};

use crate::catalog::Task;
use crate::loader::LoadOptions;

/// Successful fallback result, tagged with the model that actually loaded so
/// callers can tell which candidate in the chain won.
#[derive(Debug)]
pub struct FallbackOutcome<P> {
    pub pipeline: Arc<P>,
    pub model: String,
}

/// Try `model_ids` in order, returning the first pipeline that loads.
///
/// Strictly sequential: the next candidate is only attempted after the
/// previous one failed, so a success never spends bandwidth on the rest of
/// the chain. Exhausting the list yields `None`; no error is raised.
///
/// `load_fn` is typically [`crate::ModelLoader::load`], but any function
/// with the same absent-on-failure contract works.
pub async fn load_with_fallback<P, F, Fut, S>(
    load_fn: F,
    task: Task,
    model_ids: &[S],
    options: LoadOptions,
) -> Option<FallbackOutcome<P>>
where
    F: Fn(Task, String, LoadOptions) -> Fut,
    Fut: Future<Output = Option<Arc<P>>>,
    S: AsRef<str>,
{
    for model_id in model_ids {
        let model_id = model_id.as_ref();
        match load_fn(task, model_id.to_string(), options.clone()).await {
            Some(pipeline) => {
                info!("Fallback settled on model '{}' for task '{}'", model_id, task);
                return Some(FallbackOutcome {
                    pipeline,
                    model: model_id.to_string(),
                });
            }
            None => {
                warn!("Model '{}' unavailable for task '{}'", model_id, task);
            }
        }
    }

    warn!(
        "All {} candidate models failed for task '{}'",
        model_ids.len(),
        task
    );
    None
}
