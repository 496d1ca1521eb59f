use serde::{Deserialize, Serialize};

/// Inference task supported by the playground.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Task {
    SentimentAnalysis,
    ImageClassification,
    Summarization,
}

/// Weight quantization requested from the model runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Quantization {
    /// 8-bit weights. Small downloads, low memory; the default everywhere.
    #[default]
    Q8,
    /// 4-bit weights for very constrained environments.
    Q4,
    Fp16,
    Fp32,
}

/// Static information about one task and its candidate models.
/// This is hardcoded and never changes at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCatalogEntry {
    pub task: Task,
    /// Human-readable name (e.g., "Sentiment Analysis")
    pub display_name: String,
    /// Short description shown on the task's page
    pub description: String,
    /// Model tried first for this task
    pub default_model: String,
    /// Alternates tried in order when the default fails to load
    pub fallback_models: Vec<String>,
    /// Quantization requested for every candidate
    pub quantization: Quantization,
}

/// Catalog entry for a single task.
pub fn catalog_entry(task: Task) -> Option<TaskCatalogEntry> {
    task_catalog().into_iter().find(|e| e.task == task)
}

/// Ordered candidate list for a task: the default model followed by its
/// fallbacks. Feed this to [`crate::load_with_fallback`].
pub fn fallback_chain(task: Task) -> Vec<String> {
    catalog_entry(task)
        .map(|entry| {
            let mut chain = vec![entry.default_model];
            chain.extend(entry.fallback_models);
            chain
        })
        .unwrap_or_default()
}

/// Hardcoded catalog of playground tasks.
/// Model identifiers are ONNX conversions published on the Hugging Face hub.
pub fn task_catalog() -> Vec<TaskCatalogEntry> {
    vec![
        TaskCatalogEntry {
            task: Task::SentimentAnalysis,
            display_name: "Sentiment Analysis".into(),
            description: "Classify a short text as positive or negative.".into(),
            default_model: "Xenova/distilbert-base-uncased-finetuned-sst-2-english".into(),
            fallback_models: vec![],
            quantization: Quantization::Q8,
        },
        TaskCatalogEntry {
            task: Task::ImageClassification,
            display_name: "Image Classification".into(),
            description: "Label an image with the most likely object classes.".into(),
            default_model: "Xenova/vit-base-patch16-224".into(),
            fallback_models: vec![],
            quantization: Quantization::Q8,
        },
        TaskCatalogEntry {
            task: Task::Summarization,
            display_name: "Text Summarization".into(),
            description: "Condense a long passage into a few sentences.".into(),
            default_model: "Xenova/distilbart-cnn-6-6".into(),
            // Summarization models are the largest in the playground, so two
            // progressively smaller alternates back up the default.
            fallback_models: vec![
                "Xenova/distilbart-xsum-12-3".into(),
                "Xenova/t5-small".into(),
            ],
            quantization: Quantization::Q8,
        },
    ]
}
