use thiserror::Error;

/// Ways a selection session can end without handing off a bitmap.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("selection of {width}x{height} px is below the minimum size")]
    Degenerate { width: u32, height: u32 },

    #[error("selection cancelled")]
    Cancelled,

    #[error("screen capture failed: {0:#}")]
    CaptureFailed(anyhow::Error),

    #[error("could not open selection overlay: {0:#}")]
    OverlayUnavailable(anyhow::Error),
}

impl SelectionError {
    /// Whether the user should hear about this outcome.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            SelectionError::Degenerate { .. } | SelectionError::Cancelled
        )
    }
}
