//! Submission lifecycle shared by the forms.
use crate::{state::State, Error};
use std::future::Future;
use tracing::{debug, warn};

/// The `submitting` and `error` flags of a form.
///
/// A submission sends exactly one write. While it is in flight, further submissions are refused.
/// On success the error flag is cleared and the caller's success handler runs (typically to reset
/// the draft); on failure the error flag is raised and the draft is left alone, so that the user
/// can retry.
#[derive(Clone, Debug, Default)]
pub struct Submission {
    submitting: State<bool>,
    error: State<bool>,
}

impl Submission {
    pub fn new() -> Submission {
        Submission::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    pub fn has_error(&self) -> bool {
        self.error.get()
    }

    pub fn submitting_state(&self) -> &State<bool> {
        &self.submitting
    }

    pub fn error_state(&self) -> &State<bool> {
        &self.error
    }

    /// Starts a submission. `submitting` is set before this returns.
    ///
    /// Returns `false`, and drops `write` without polling it, if a submission is already in flight.
    /// Must be called from within a `tokio::task::LocalSet`.
    pub fn submit<R: 'static>(
        &self,
        write: impl Future<Output = Result<R, Error>> + 'static,
        on_success: impl FnOnce(R) + 'static,
    ) -> bool {
        if self.submitting.get() {
            debug!("already submitting");
            return false;
        }
        self.submitting.set(true);
        let this = self.clone();
        tokio::task::spawn_local(async move {
            match write.await {
                Ok(value) => {
                    this.error.set(false);
                    on_success(value);
                }
                Err(err) => {
                    warn!("submission failed: {err}");
                    this.error.set(true);
                }
            }
            this.submitting.set(false);
        });
        true
    }
}
