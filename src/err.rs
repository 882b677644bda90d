use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum SeqErr {
    #[error("[Source] Unsupported source kind: {kind}")]
    UnsupportedSourceKind { kind: &'static str },

    #[error("[Gatherer] Batch size must be positive, got {size}")]
    InvalidBatchSize { size: usize },

    #[error("[Gatherer] Window size must be positive, got {size}")]
    InvalidWindowSize { size: usize },

    #[error("[Collector] Non-numeric element for numeric collector: {kind}")]
    NonNumericElement { kind: &'static str },
}
