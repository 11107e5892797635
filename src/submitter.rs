//! The landing page's email form.
//!
//! `Idle --submit--> Pending --> Success | Failure --display window--> Idle`.
//! An invalid email never leaves `Idle`; a submit while `Pending` is ignored.

use crate::configuration::SignupSettings;
use crate::provider::{send_json, ProviderError, SignupProvider};
use crate::routes::{SubscriberEmail, SubscriptionRequest, ValidationError};
use anyhow::Context;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";
pub const DISABLED_MESSAGE: &str = "Email signup is currently unavailable.";
pub const SUCCESS_MESSAGE: &str = "Thank you for signing up!";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SubscriptionOutcome {
    Idle,
    Pending,
    Success,
    Failure { message: String },
}

impl SubscriptionOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubscriptionOutcome::Pending)
    }

    fn is_settled(&self) -> bool {
        matches!(
            self,
            SubscriptionOutcome::Success | SubscriptionOutcome::Failure { .. }
        )
    }

    /// Text for the confirmation toast, if one should be shown.
    pub fn message(&self) -> Option<&str> {
        match self {
            SubscriptionOutcome::Success => Some(SUCCESS_MESSAGE),
            SubscriptionOutcome::Failure { message } => Some(message),
            _ => None,
        }
    }
}

impl From<ProviderError> for SubscriptionOutcome {
    fn from(e: ProviderError) -> Self {
        let message = match e {
            ProviderError::Rejected {
                message: Some(message),
                ..
            } => message,
            _ => GENERIC_FAILURE_MESSAGE.to_owned(),
        };
        SubscriptionOutcome::Failure { message }
    }
}

// Each submission bumps `generation`, so late timers and dropped futures
// only ever touch the submission they belong to.
#[derive(Debug)]
struct Slot {
    outcome: SubscriptionOutcome,
    generation: u64,
}

struct Shared {
    state: watch::Sender<Slot>,
    closed: AtomicBool,
}

impl Shared {
    fn replace_if(
        &self,
        generation: u64,
        when: impl FnOnce(&SubscriptionOutcome) -> bool,
        next: SubscriptionOutcome,
    ) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        self.state.send_if_modified(|slot| {
            if slot.generation != generation || !when(&slot.outcome) {
                return false;
            }
            slot.outcome = next;
            true
        })
    }
}

/// Read side for views rendering the form state.
pub struct OutcomeWatch(watch::Receiver<Slot>);

impl OutcomeWatch {
    pub fn current(&self) -> SubscriptionOutcome {
        self.0.borrow().outcome.clone()
    }

    /// Waits for the next state change. `None` once the submitter is gone.
    pub async fn changed(&mut self) -> Option<SubscriptionOutcome> {
        self.0.changed().await.ok()?;
        Some(self.0.borrow_and_update().outcome.clone())
    }
}

// Puts a `Pending` state back to `Idle` if the submit future is dropped
// before the response arrives.
struct PendingGuard<'a> {
    shared: &'a Shared,
    generation: u64,
    settled: bool,
}

impl PendingGuard<'_> {
    fn settle(mut self, outcome: SubscriptionOutcome) {
        self.settled = true;
        self.shared
            .replace_if(self.generation, SubscriptionOutcome::is_pending, outcome);
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled
            && self.shared.replace_if(
                self.generation,
                SubscriptionOutcome::is_pending,
                SubscriptionOutcome::Idle,
            )
        {
            tracing::warn!("Signup submission was cancelled before it completed");
        }
    }
}

pub struct SubscriptionSubmitter {
    http_client: reqwest::Client,
    endpoint: reqwest::Url,
    enabled: bool,
    provider: SignupProvider,
    groups: Vec<String>,
    source_tag: String,
    display_window: Duration,
    shared: Arc<Shared>,
}

impl SubscriptionSubmitter {
    pub fn build(settings: &SignupSettings) -> Result<Self, anyhow::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("Failed to build the signup http client")?;
        let (state, _) = watch::channel(Slot {
            outcome: SubscriptionOutcome::Idle,
            generation: 0,
        });

        Ok(Self {
            http_client,
            endpoint: settings.endpoint()?,
            enabled: settings.enabled,
            provider: settings.provider,
            groups: settings.groups.clone(),
            source_tag: settings.source_tag.clone(),
            display_window: settings.display_window(),
            shared: Arc::new(Shared {
                state,
                closed: AtomicBool::new(false),
            }),
        })
    }

    pub fn outcome(&self) -> SubscriptionOutcome {
        self.shared.state.borrow().outcome.clone()
    }

    pub fn watch_outcome(&self) -> OutcomeWatch {
        OutcomeWatch(self.shared.state.subscribe())
    }

    /// Validates `raw_email` and posts it to the configured endpoint.
    ///
    /// Validation errors come back as `Err` and leave the state untouched.
    /// While a request is in flight this returns `Ok(Pending)` without
    /// sending anything.
    #[tracing::instrument(
        name = "Submit an email signup",
        skip_all,
        fields(provider = self.provider.as_ref())
    )]
    pub async fn submit(&self, raw_email: &str) -> Result<SubscriptionOutcome, ValidationError> {
        if self.shared.closed.load(Ordering::Acquire) {
            tracing::debug!("Ignoring submit on a closed form");
            return Ok(self.outcome());
        }
        if self.outcome().is_pending() {
            return Ok(SubscriptionOutcome::Pending);
        }

        let email = SubscriberEmail::parse(raw_email).map_err(|e| {
            tracing::debug!(error = %e, "Signup form input rejected");
            e
        })?;

        let mut generation = 0;
        let started = self.shared.state.send_if_modified(|slot| {
            if slot.outcome.is_pending() {
                return false;
            }
            slot.generation += 1;
            slot.outcome = SubscriptionOutcome::Pending;
            generation = slot.generation;
            true
        });
        if !started {
            return Ok(SubscriptionOutcome::Pending);
        }

        let guard = PendingGuard {
            shared: &self.shared,
            generation,
            settled: false,
        };
        let outcome = if self.enabled {
            self.send(email).await
        } else {
            tracing::info!("Email signup is disabled, nothing was sent");
            SubscriptionOutcome::Failure {
                message: DISABLED_MESSAGE.to_owned(),
            }
        };
        guard.settle(outcome.clone());
        self.revert_after_display_window(generation);

        Ok(outcome)
    }

    /// Stops every later state change, e.g. when the form is unmounted.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
    }

    async fn send(&self, email: SubscriberEmail) -> SubscriptionOutcome {
        let request = SubscriptionRequest::new(email, self.source_tag.as_str());
        let builder = self
            .http_client
            .post(self.endpoint.clone())
            .json(&self.provider.body(&request, &self.groups));

        match send_json(builder).await {
            Ok(()) => {
                tracing::info!("Signup accepted");
                SubscriptionOutcome::Success
            }
            Err(e) => {
                match &e {
                    ProviderError::Transport(cause) => tracing::error!(
                        error.cause_chain = ?cause,
                        "Signup request could not be delivered"
                    ),
                    ProviderError::Rejected { status, message } => tracing::warn!(
                        status = status.as_u16(),
                        reason = message.as_deref().unwrap_or_default(),
                        "Signup endpoint rejected the request"
                    ),
                }
                e.into()
            }
        }
    }

    fn revert_after_display_window(&self, generation: u64) {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let window = self.display_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(shared) = shared.upgrade() {
                shared.replace_if(
                    generation,
                    SubscriptionOutcome::is_settled,
                    SubscriptionOutcome::Idle,
                );
            }
        });
    }
}
