use thiserror::Error;

pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    /// `init` was called with neither a filter state nor a paint state.
    #[error("editor init requires a filter state or a paint state")]
    MissingInitState,
}
