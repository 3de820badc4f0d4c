use std::fmt;

use tracing::{info, warn};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeleteState {
    #[default]
    Idle,
    Confirming,
    Deleting,
}

impl fmt::Display for DeleteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Confirming => write!(f, "Awaiting confirmation"),
            Self::Deleting => write!(f, "Deleting"),
        }
    }
}

/// Two-step confirm/execute guard for "delete all".
#[derive(Debug, Default)]
pub struct DeletionGuard {
    state: DeleteState,
    last_error: Option<String>,
}

impl DeletionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DeleteState {
        self.state
    }

    pub fn is_deleting(&self) -> bool {
        self.state == DeleteState::Deleting
    }

    /// Error from the last failed delete, until the next request.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn request_delete(&mut self) {
        if self.state == DeleteState::Idle {
            self.state = DeleteState::Confirming;
            self.last_error = None;
        }
    }

    pub fn cancel_delete_confirm(&mut self) {
        if self.state == DeleteState::Confirming {
            self.state = DeleteState::Idle;
        }
    }

    /// Returns `true` exactly when the caller must now issue the delete call.
    pub fn confirm_delete(&mut self) -> bool {
        if self.state != DeleteState::Confirming {
            return false;
        }
        self.state = DeleteState::Deleting;
        info!("Delete-all confirmed");
        true
    }

    pub fn finish_delete(&mut self, result: &Result<()>) {
        if self.state != DeleteState::Deleting {
            return;
        }
        self.state = DeleteState::Idle;
        match result {
            Ok(()) => {
                self.last_error = None;
                info!("Delete-all complete");
            }
            Err(e) => {
                warn!(error = %e, "Delete-all failed");
                self.last_error = Some(e.to_string());
            }
        }
    }
}
