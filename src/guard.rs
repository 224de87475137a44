//! Navigation guard: intercepts page-leave actions while writes are pending.
//!
//! The guard has no state machine of its own. It observes the queue's
//! pending-work signal and, for each intercepted navigation attempt, either
//! waves it through or asks the host's prompt for confirmation. Declining
//! cancels the navigation outright - pending writes are never abandoned
//! silently. Interception is registered through an explicit host seam and
//! restored to defaults when the guard drops.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// The kind of page-leave action being intercepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Browser reload or window close
    Reload,
    /// Browser back/forward
    HistoryPop,
    /// In-app same-origin link activation
    LinkActivation,
    /// Programmatic in-app navigation call
    Programmatic,
}

/// Outcome of an intercepted navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Let the navigation proceed
    Allow,
    /// The user declined the prompt; cancel the navigation entirely
    Cancelled,
}

/// Host-provided interception registration. `install` arms whatever
/// reload/history/link/router hooks the host environment offers; `restore`
/// must return every hooked behavior to its default.
pub trait NavigationHost: Send + Sync {
    fn install(&self);
    fn restore(&self);
}

/// Confirmation prompt shown before leaving with unflushed writes.
/// Returns true to proceed with the navigation.
pub trait LeavePrompt: Send + Sync {
    fn confirm_leave(&self, kind: NavigationKind) -> bool;
}

/// Non-blocking user notifications. The engine calls these around the
/// persistent "saving" indicator and on persistence failures; all methods
/// default to no-ops so hosts implement only what they surface.
pub trait Notifier: Send + Sync {
    fn saving_started(&self) {}
    fn saving_dismissed(&self) {}
    fn persistence_failed(&self, _message: &str) {}
}

/// Notifier that surfaces nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {}

/// Guards navigation while the rank queue has pending work.
///
/// Installs the host's interceptors on construction and restores them on
/// drop, so a closed board session can never leave hooks behind.
pub struct NavigationGuard {
    host: std::sync::Arc<dyn NavigationHost>,
    prompt: std::sync::Arc<dyn LeavePrompt>,
    pending: watch::Receiver<bool>,
    watcher: JoinHandle<()>,
}

impl NavigationGuard {
    /// Install the guard over the given pending-work signal
    pub fn install(
        host: std::sync::Arc<dyn NavigationHost>,
        prompt: std::sync::Arc<dyn LeavePrompt>,
        notifier: std::sync::Arc<dyn Notifier>,
        pending: watch::Receiver<bool>,
    ) -> Self {
        host.install();
        let watcher = tokio::spawn(watch_saving(notifier, pending.clone()));
        Self {
            host,
            prompt,
            pending,
            watcher,
        }
    }

    /// True while the observed queue has unflushed writes
    pub fn pending(&self) -> bool {
        *self.pending.borrow()
    }

    /// Decide an intercepted navigation attempt.
    ///
    /// With no pending work every attempt is allowed without prompting.
    /// Declining the prompt cancels the attempt and touches nothing else.
    pub fn decide(&self, kind: NavigationKind) -> NavigationDecision {
        if !self.pending() {
            return NavigationDecision::Allow;
        }
        if self.prompt.confirm_leave(kind) {
            debug!(?kind, "navigation confirmed with pending writes");
            NavigationDecision::Allow
        } else {
            debug!(?kind, "navigation cancelled; writes still pending");
            NavigationDecision::Cancelled
        }
    }
}

impl Drop for NavigationGuard {
    fn drop(&mut self) {
        self.watcher.abort();
        self.host.restore();
    }
}

/// Mirror the pending signal into the host's persistent "saving"
/// notification, dismissing it on the true -> false transition.
async fn watch_saving(notifier: std::sync::Arc<dyn Notifier>, mut rx: watch::Receiver<bool>) {
    let mut saving = *rx.borrow_and_update();
    if saving {
        notifier.saving_started();
    }
    while rx.changed().await.is_ok() {
        let now = *rx.borrow_and_update();
        if now && !saving {
            notifier.saving_started();
        } else if !now && saving {
            notifier.saving_dismissed();
        }
        saving = now;
    }
}
