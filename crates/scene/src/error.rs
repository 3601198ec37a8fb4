use multiview_layout::LayoutError;

/// Errors from building or updating the mini-scene arena.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("invalid arena config: {0}")]
    InvalidConfig(String),
    #[error("unknown demo `{0}` (expected stacked, copy-out, toggle or grid)")]
    UnknownDemo(String),
    #[error("layout has {layout} regions but the arena holds {scenes} scenes")]
    LayoutMismatch { layout: usize, scenes: usize },
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
