//! Catalog session controller.
//!
//! Owns the application state, performs the network work the reducer asks for, and
//! publishes state snapshots for presentation layers.

use super::reducer::{self, Effect, Intent, Outcome};
use super::state::AppState;
use crate::api::CatalogApi;
use crate::storage::TokenStore;
use anyhow::Result;
use std::collections::VecDeque;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Intent(Intent),
    Quit,
}

/// State published after every transition.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    /// Number of intents the controller has taken in so far.
    pub handled: u64,
    pub state: AppState,
}

pub(crate) struct Controller<A> {
    api: A,
    tokens: TokenStore,
    state: AppState,
    handled: u64,
    observer: Option<UnboundedSender<Snapshot>>,
}

impl<A: CatalogApi> Controller<A> {
    pub(crate) fn new(api: A, tokens: TokenStore) -> Self {
        Self {
            api,
            tokens,
            state: AppState::default(),
            handled: 0,
            observer: None,
        }
    }

    /// Publish a snapshot after every transition.
    pub(crate) fn with_observer(mut self, tx: UnboundedSender<Snapshot>) -> Self {
        self.observer = Some(tx);
        self
    }

    pub(crate) fn state(&self) -> &AppState {
        &self.state
    }

    pub(crate) fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Run one intent to completion, including any follow-up requests.
    pub(crate) async fn dispatch(&mut self, intent: Intent) {
        self.handled += 1;
        debug!(?intent, "dispatch");
        let mut next = reducer::reduce(&mut self.state, intent);
        loop {
            self.state.busy = next.is_some();
            self.publish();
            let Some(effect) = next else {
                break;
            };
            let outcome = self.execute(effect).await;
            next = reducer::apply_outcome(&mut self.state, outcome);
        }
    }

    fn publish(&self) {
        if let Some(tx) = &self.observer {
            let _ = tx.send(Snapshot {
                handled: self.handled,
                state: self.state.clone(),
            });
        }
    }

    async fn execute(&mut self, effect: Effect) -> Outcome {
        match effect {
            Effect::RestoreSession => match self.tokens.load() {
                Ok(Some(token)) => {
                    self.api.set_token(Some(token));
                    Outcome::SessionChecked(self.api.check_session().await)
                }
                Ok(None) => Outcome::NoStoredSession,
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "could not read stored token");
                    Outcome::NoStoredSession
                }
            },
            Effect::SignIn(credentials) => match self.api.sign_in(&credentials).await {
                Ok(resp) => {
                    if let Err(e) = self.tokens.save(&resp.token, resp.expired) {
                        warn!(error = %format!("{e:#}"), "could not persist token");
                    }
                    self.api.set_token(Some(resp.token));
                    Outcome::SignedIn(Ok(()))
                }
                Err(e) => Outcome::SignedIn(Err(e)),
            },
            Effect::ForgetSession => {
                if let Err(e) = self.tokens.clear() {
                    warn!(error = %format!("{e:#}"), "could not remove stored token");
                }
                self.api.set_token(None);
                Outcome::SessionForgotten
            }
            Effect::FetchProducts { page } => {
                Outcome::ProductsFetched(self.api.list_products(page).await)
            }
            Effect::CreateProduct(product) => Outcome::ProductSaved {
                created: true,
                result: self.api.create_product(&product).await,
            },
            Effect::UpdateProduct { id, product } => Outcome::ProductSaved {
                created: false,
                result: self.api.update_product(&id, &product).await,
            },
            Effect::DeleteProduct { id } => {
                Outcome::ProductDeleted(self.api.delete_product(&id).await)
            }
        }
    }
}

/// Serve UI commands until quit. Intents are handled strictly one after another, so a
/// request always finishes before the next intent is looked at.
///
/// Every published snapshot carries the count of intents received on `cmd_rx`, which
/// lets the UI tell whether the controller has caught up with its input.
///
/// Commands keep being read while a request is in flight: intents queue up behind it,
/// and `Quit` (or a closed channel) drops the request and returns at once.
pub(crate) async fn run_controller<A: CatalogApi>(
    mut controller: Controller<A>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut queued: VecDeque<Intent> = VecDeque::new();
    loop {
        let intent = match queued.pop_front() {
            Some(intent) => intent,
            None => match cmd_rx.recv().await {
                Some(UiCommand::Intent(intent)) => intent,
                Some(UiCommand::Quit) | None => break,
            },
        };

        let work = controller.dispatch(intent);
        tokio::pin!(work);
        loop {
            tokio::select! {
                biased;
                _ = &mut work => break,
                cmd = cmd_rx.recv() => match cmd {
                    Some(UiCommand::Intent(next)) => queued.push_back(next),
                    Some(UiCommand::Quit) | None => {
                        debug!(queued = queued.len(), "quit while a request was in flight");
                        return Ok(());
                    }
                },
            }
        }
    }
    Ok(())
}
