//! Exchange orchestrator.
//!
//! [`ExchangeWorkflow`] owns the whole exchange form state and moves it
//! through four phases:
//!
//! ```text
//!                 load ok (≥1 token)
//! Bootstrapping ─────────────────────▶ Ready ◀──────────────┐
//!      │  ▲                             │                   │ settled / abandoned
//!      │  │ retry                       │ valid request     │
//!      ▼  │                             ▼                   │
//!     Failed                        Exchanging ─────────────┘
//! ```
//!
//! | Phase | Allowed operations |
//! |-------|--------------------|
//! | `Bootstrapping` | none |
//! | `Ready` | select, swap, set amount, request exchange, refresh catalog |
//! | `Exchanging` | set amount (does not affect the in-flight request) |
//! | `Failed` | retry, set amount |
//!
//! The handle is cheap to clone. State lives behind one lock that is never
//! held across an `.await`, so snapshots stay readable while an exchange is
//! settling. Every change is published to receivers obtained from
//! [`ExchangeWorkflow::subscribe`].

use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::validator::validate_amount;
use crate::{
    convert, AmountError, Catalog, CatalogError, CatalogSource, Currency, SettlementClock, Token,
};

/// Workflow lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Bootstrapping,
    Ready,
    Exchanging,
    Failed,
}

impl WorkflowPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bootstrapping => "bootstrapping",
            Self::Ready => "ready",
            Self::Exchanging => "exchanging",
            Self::Failed => "failed",
        }
    }
}

impl Display for WorkflowPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported at the workflow boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Catalog fetch failed or produced no usable token.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("token '{currency}' is not in the catalog")]
    TokenNotFound { currency: String },

    #[error("an exchange is already in flight")]
    ExchangeInFlight,

    #[error("{operation} is not allowed while the workflow is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: WorkflowPhase,
    },
}

impl WorkflowError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Catalog(error) => error.code(),
            Self::Amount(error) => error.code(),
            Self::TokenNotFound { .. } => "workflow.token_not_found",
            Self::ExchangeInFlight => "workflow.exchange_in_flight",
            Self::InvalidPhase { .. } => "workflow.invalid_phase",
        }
    }

    /// Whether repeating the same call later may succeed without user input.
    pub const fn retryable(&self) -> bool {
        match self {
            Self::Catalog(error) => error.retryable(),
            Self::ExchangeInFlight => true,
            Self::Amount(_) | Self::TokenNotFound { .. } | Self::InvalidPhase { .. } => false,
        }
    }
}

impl Serialize for WorkflowError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("WorkflowError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// One user-initiated conversion attempt, captured from the form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub source_currency: Currency,
    pub target_currency: Currency,
    pub amount_text: String,
}

impl ExchangeRequest {
    /// Validates the amount, then resolves both currencies against `catalog`.
    fn quote(&self, catalog: &Catalog) -> Result<QuotedExchange, WorkflowError> {
        let amount = validate_amount(&self.amount_text)?;
        let source = resolve(catalog, &self.source_currency)?;
        let target = resolve(catalog, &self.target_currency)?;
        Ok(QuotedExchange {
            amount,
            source,
            target,
        })
    }
}

fn resolve(catalog: &Catalog, currency: &Currency) -> Result<Token, WorkflowError> {
    catalog
        .find(currency.as_str())
        .cloned()
        .ok_or_else(|| WorkflowError::TokenNotFound {
            currency: currency.to_string(),
        })
}

/// Request whose inputs are fixed for the duration of the settlement delay.
#[derive(Debug, Clone)]
struct QuotedExchange {
    amount: f64,
    source: Token,
    target: Token,
}

impl QuotedExchange {
    fn settle(self) -> ExchangeResult {
        ExchangeResult {
            amount: self.amount,
            converted_amount: convert(self.amount, self.source.price, self.target.price),
            source_currency: self.source.currency,
            target_currency: self.target.currency,
        }
    }
}

/// Outcome of a settled exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResult {
    pub amount: f64,
    pub source_currency: Currency,
    pub target_currency: Currency,
    pub converted_amount: f64,
}

impl Display for ExchangeResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} = {:.6} {}",
            self.amount, self.source_currency, self.converted_amount, self.target_currency
        )
    }
}

/// Read-only view of the workflow handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowSnapshot {
    pub phase: WorkflowPhase,
    pub catalog: Catalog,
    pub source: Option<Currency>,
    pub target: Option<Currency>,
    pub amount_text: Option<String>,
    /// Parsed amount when the current text is valid.
    pub amount: Option<f64>,
    /// Amount problem that should be shown to the user right now.
    pub amount_error: Option<AmountError>,
    pub last_result: Option<ExchangeResult>,
    pub exchange_error: Option<WorkflowError>,
    pub catalog_error: Option<CatalogError>,
}

impl WorkflowSnapshot {
    pub fn is_exchanging(&self) -> bool {
        self.phase == WorkflowPhase::Exchanging
    }

    /// Whether an exchange request would pass the amount gate right now.
    pub fn can_request_exchange(&self) -> bool {
        self.phase == WorkflowPhase::Ready && self.amount.is_some()
    }

    pub fn source_token(&self) -> Option<&Token> {
        self.source
            .as_ref()
            .and_then(|currency| self.catalog.find(currency.as_str()))
    }

    pub fn target_token(&self) -> Option<&Token> {
        self.target
            .as_ref()
            .and_then(|currency| self.catalog.find(currency.as_str()))
    }
}

#[derive(Debug)]
struct WorkflowState {
    phase: WorkflowPhase,
    loading: bool,
    catalog: Catalog,
    source: Option<Currency>,
    target: Option<Currency>,
    amount_text: Option<String>,
    amount_check: Result<f64, AmountError>,
    exchange_attempted: bool,
    last_result: Option<ExchangeResult>,
    exchange_error: Option<WorkflowError>,
    catalog_error: Option<CatalogError>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            phase: WorkflowPhase::Bootstrapping,
            loading: false,
            catalog: Catalog::empty(),
            source: None,
            target: None,
            amount_text: None,
            amount_check: Err(AmountError::Missing),
            exchange_attempted: false,
            last_result: None,
            exchange_error: None,
            catalog_error: None,
        }
    }
}

impl WorkflowState {
    fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            phase: self.phase,
            catalog: self.catalog.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            amount_text: self.amount_text.clone(),
            amount: self.amount_check.ok(),
            amount_error: self.surfaced_amount_error(),
            last_result: self.last_result.clone(),
            exchange_error: self.exchange_error.clone(),
            catalog_error: self.catalog_error.clone(),
        }
    }

    /// `Missing` stays hidden until the field was edited or an exchange attempted.
    fn surfaced_amount_error(&self) -> Option<AmountError> {
        match self.amount_check {
            Ok(_) => None,
            Err(error) if error.is_neutral() => {
                (self.amount_text.is_some() || self.exchange_attempted).then_some(error)
            }
            Err(error) => Some(error),
        }
    }

    fn require_phase(
        &self,
        operation: &'static str,
        expected: WorkflowPhase,
    ) -> Result<(), WorkflowError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn begin_bootstrap(&mut self) -> Result<(), WorkflowError> {
        self.require_phase("bootstrap", WorkflowPhase::Bootstrapping)?;
        if self.loading {
            return Err(WorkflowError::InvalidPhase {
                operation: "bootstrap",
                phase: self.phase,
            });
        }
        self.loading = true;
        Ok(())
    }

    fn begin_retry(&mut self) -> Result<(), WorkflowError> {
        self.require_phase("retry", WorkflowPhase::Failed)?;
        self.phase = WorkflowPhase::Bootstrapping;
        self.loading = true;
        self.catalog_error = None;
        Ok(())
    }

    fn abandon_load(&mut self) {
        self.loading = false;
    }

    fn finish_bootstrap(
        &mut self,
        outcome: Result<Catalog, CatalogError>,
    ) -> Result<usize, WorkflowError> {
        self.loading = false;
        let catalog = match outcome {
            Ok(catalog) if !catalog.is_empty() => catalog,
            Ok(_) => return Err(self.fail_bootstrap(CatalogError::empty())),
            Err(error) => return Err(self.fail_bootstrap(error)),
        };

        let default_currency = catalog.first().map(|token| token.currency.clone());
        self.source = default_currency.clone();
        self.target = default_currency;
        self.catalog = catalog;
        self.catalog_error = None;
        self.phase = WorkflowPhase::Ready;
        Ok(self.catalog.len())
    }

    fn fail_bootstrap(&mut self, error: CatalogError) -> WorkflowError {
        self.phase = WorkflowPhase::Failed;
        self.catalog = Catalog::empty();
        self.catalog_error = Some(error.clone());
        WorkflowError::Catalog(error)
    }

    fn apply_refresh(
        &mut self,
        outcome: Result<Catalog, CatalogError>,
    ) -> Result<usize, WorkflowError> {
        match outcome {
            Ok(catalog) => {
                self.catalog = catalog;
                if self.catalog.is_empty() {
                    let error = CatalogError::empty();
                    self.catalog_error = Some(error.clone());
                    Err(WorkflowError::Catalog(error))
                } else {
                    self.catalog_error = None;
                    Ok(self.catalog.len())
                }
            }
            Err(error) => {
                self.catalog_error = Some(error.clone());
                Err(WorkflowError::Catalog(error))
            }
        }
    }

    fn resolve_selection(
        &self,
        operation: &'static str,
        currency: &str,
    ) -> Result<Currency, WorkflowError> {
        self.require_phase(operation, WorkflowPhase::Ready)?;
        self.catalog
            .find(currency)
            .map(|token| token.currency.clone())
            .ok_or_else(|| WorkflowError::TokenNotFound {
                currency: currency.to_owned(),
            })
    }

    fn select_source(&mut self, currency: &str) -> Result<(), WorkflowError> {
        let currency = self.resolve_selection("select_source", currency)?;
        self.source = Some(currency);
        self.clear_resolved_selection_error();
        Ok(())
    }

    fn select_target(&mut self, currency: &str) -> Result<(), WorkflowError> {
        let currency = self.resolve_selection("select_target", currency)?;
        self.target = Some(currency);
        self.clear_resolved_selection_error();
        Ok(())
    }

    fn clear_resolved_selection_error(&mut self) {
        let resolves = |side: &Option<Currency>| {
            side.as_ref()
                .is_some_and(|currency| self.catalog.contains(currency.as_str()))
        };
        if matches!(self.exchange_error, Some(WorkflowError::TokenNotFound { .. }))
            && resolves(&self.source)
            && resolves(&self.target)
        {
            self.exchange_error = None;
        }
    }

    fn swap(&mut self) -> Result<(), WorkflowError> {
        self.require_phase("swap", WorkflowPhase::Ready)?;
        std::mem::swap(&mut self.source, &mut self.target);
        Ok(())
    }

    fn set_amount(&mut self, text: String) -> Result<f64, WorkflowError> {
        if self.phase == WorkflowPhase::Bootstrapping {
            return Err(WorkflowError::InvalidPhase {
                operation: "set_amount",
                phase: self.phase,
            });
        }

        self.amount_check = validate_amount(&text);
        self.amount_text = Some(text);

        let amount_error_shown = matches!(self.exchange_error, Some(WorkflowError::Amount(_)));
        match self.amount_check {
            Ok(amount) => {
                if amount_error_shown {
                    self.exchange_error = None;
                }
                Ok(amount)
            }
            Err(error) => {
                if amount_error_shown {
                    self.exchange_error = Some(WorkflowError::Amount(error));
                }
                Err(WorkflowError::Amount(error))
            }
        }
    }

    fn begin_exchange(&mut self) -> Result<QuotedExchange, WorkflowError> {
        match self.phase {
            WorkflowPhase::Ready => {}
            WorkflowPhase::Exchanging => return Err(WorkflowError::ExchangeInFlight),
            phase => {
                return Err(WorkflowError::InvalidPhase {
                    operation: "request_exchange",
                    phase,
                })
            }
        }

        let (Some(source_currency), Some(target_currency)) =
            (self.source.clone(), self.target.clone())
        else {
            return Err(WorkflowError::InvalidPhase {
                operation: "request_exchange",
                phase: self.phase,
            });
        };

        self.exchange_attempted = true;
        let request = ExchangeRequest {
            source_currency,
            target_currency,
            amount_text: self.amount_text.clone().unwrap_or_default(),
        };

        match request.quote(&self.catalog) {
            Ok(quoted) => {
                self.phase = WorkflowPhase::Exchanging;
                self.exchange_error = None;
                Ok(quoted)
            }
            Err(error) => {
                self.exchange_error = Some(error.clone());
                Err(error)
            }
        }
    }

    fn finish_exchange(&mut self, result: ExchangeResult) {
        self.phase = WorkflowPhase::Ready;
        self.last_result = Some(result);
        self.exchange_error = None;
    }

    fn abandon_exchange(&mut self) {
        if self.phase == WorkflowPhase::Exchanging {
            self.phase = WorkflowPhase::Ready;
        }
    }
}

struct WorkflowInner {
    catalog_source: Arc<dyn CatalogSource>,
    clock: Arc<dyn SettlementClock>,
    settlement_delay: Duration,
    state: Mutex<WorkflowState>,
    updates: watch::Sender<WorkflowSnapshot>,
}

/// Restores a consistent state if an in-flight future is dropped early.
struct AbandonGuard<'a> {
    workflow: &'a ExchangeWorkflow,
    recover: fn(&mut WorkflowState),
    armed: bool,
}

impl<'a> AbandonGuard<'a> {
    fn new(workflow: &'a ExchangeWorkflow, recover: fn(&mut WorkflowState)) -> Self {
        Self {
            workflow,
            recover,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("workflow operation dropped before completion");
            self.workflow.mutate(self.recover);
        }
    }
}

/// Exchange orchestrator handle.
#[derive(Clone)]
pub struct ExchangeWorkflow {
    inner: Arc<WorkflowInner>,
}

impl ExchangeWorkflow {
    /// Creates a workflow in `Bootstrapping`; call [`bootstrap`](Self::bootstrap) to load the catalog.
    pub fn new(
        catalog_source: Arc<dyn CatalogSource>,
        clock: Arc<dyn SettlementClock>,
        settlement_delay: Duration,
    ) -> Self {
        let state = WorkflowState::default();
        let (updates, _) = watch::channel(state.snapshot());
        Self {
            inner: Arc::new(WorkflowInner {
                catalog_source,
                clock,
                settlement_delay,
                state: Mutex::new(state),
                updates,
            }),
        }
    }

    /// Creates a workflow and runs the initial catalog load.
    ///
    /// The workflow is returned even when the load fails; it is then in
    /// `Failed` and the error is part of its snapshot.
    pub async fn launch(
        catalog_source: Arc<dyn CatalogSource>,
        clock: Arc<dyn SettlementClock>,
        settlement_delay: Duration,
    ) -> Self {
        let workflow = Self::new(catalog_source, clock, settlement_delay);
        let _ = workflow.bootstrap().await;
        workflow
    }

    pub fn settlement_delay(&self) -> Duration {
        self.inner.settlement_delay
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.inner.updates.borrow().clone()
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.inner.updates.borrow().phase
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Loads the catalog for the first time.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Catalog`] when the fetch fails or yields no usable
    /// token; the workflow is then `Failed`.
    pub async fn bootstrap(&self) -> Result<(), WorkflowError> {
        self.mutate(WorkflowState::begin_bootstrap)?;
        self.complete_load().await
    }

    /// Leaves `Failed` and loads the catalog again.
    pub async fn retry(&self) -> Result<(), WorkflowError> {
        self.mutate(WorkflowState::begin_retry)?;
        info!("retrying catalog load");
        self.complete_load().await
    }

    async fn complete_load(&self) -> Result<(), WorkflowError> {
        let mut guard = AbandonGuard::new(self, WorkflowState::abandon_load);
        let outcome = self.inner.catalog_source.load().await;
        guard.disarm();

        match self.mutate(|state| state.finish_bootstrap(outcome)) {
            Ok(tokens) => {
                info!(tokens, "catalog ready");
                Ok(())
            }
            Err(error) => {
                warn!(code = error.code(), error = %error, "catalog load failed");
                Err(error)
            }
        }
    }

    /// Reloads the catalog while `Ready`, keeping the current selections.
    ///
    /// A fetch failure keeps the previous catalog; an empty answer replaces it.
    /// Either way the problem is surfaced as the snapshot's `catalog_error`.
    pub async fn refresh_catalog(&self) -> Result<usize, WorkflowError> {
        self.mutate(|state| state.require_phase("refresh_catalog", WorkflowPhase::Ready))?;
        let outcome = self.inner.catalog_source.load().await;
        let refreshed = self.mutate(|state| state.apply_refresh(outcome));
        match &refreshed {
            Ok(tokens) => debug!(tokens, "catalog refreshed"),
            Err(error) => warn!(code = error.code(), error = %error, "catalog refresh failed"),
        }
        refreshed
    }

    pub fn select_source(&self, currency: &str) -> Result<(), WorkflowError> {
        self.mutate(|state| state.select_source(currency))
    }

    pub fn select_target(&self, currency: &str) -> Result<(), WorkflowError> {
        self.mutate(|state| state.select_target(currency))
    }

    /// Exchanges source and target; amount and last result are untouched.
    pub fn swap(&self) -> Result<(), WorkflowError> {
        self.mutate(WorkflowState::swap)
    }

    /// Stores the amount text and revalidates it before returning.
    ///
    /// The text is kept even when invalid; the `Err` carries the reason so the
    /// caller does not need to read a snapshot. Never starts an exchange.
    pub fn set_amount(&self, text: impl Into<String>) -> Result<f64, WorkflowError> {
        let text = text.into();
        self.mutate(|state| state.set_amount(text))
    }

    /// Validates the form, waits the settlement delay, and converts.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Amount`] when the amount is missing or invalid
    /// - [`WorkflowError::TokenNotFound`] when a selection left the catalog
    /// - [`WorkflowError::ExchangeInFlight`] when another exchange is settling
    /// - [`WorkflowError::InvalidPhase`] outside `Ready`
    ///
    /// Amount and token errors are also surfaced in the snapshot.
    pub async fn request_exchange(&self) -> Result<ExchangeResult, WorkflowError> {
        let quoted = match self.mutate(WorkflowState::begin_exchange) {
            Ok(quoted) => quoted,
            Err(error) => {
                debug!(code = error.code(), error = %error, "exchange rejected");
                return Err(error);
            }
        };

        let mut guard = AbandonGuard::new(self, WorkflowState::abandon_exchange);
        info!(
            source = %quoted.source.currency,
            target = %quoted.target.currency,
            amount = quoted.amount,
            delay_ms = self.inner.settlement_delay.as_millis() as u64,
            "exchange settling"
        );
        self.inner.clock.sleep(self.inner.settlement_delay).await;

        let result = quoted.settle();
        guard.disarm();
        self.mutate(|state| state.finish_exchange(result.clone()));
        info!(converted_amount = result.converted_amount, "exchange settled");
        Ok(result)
    }

    fn mutate<R>(&self, apply: impl FnOnce(&mut WorkflowState) -> R) -> R {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let outcome = apply(&mut state);
        let next = state.snapshot();
        self.inner.updates.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;

    use super::*;
    use crate::{IconTemplate, InstantClock, UtcDateTime};

    struct StaticSource(Result<Catalog, CatalogError>);

    impl CatalogSource for StaticSource {
        fn load<'a>(
            &'a self,
        ) -> Pin<Box<dyn Future<Output = Result<Catalog, CatalogError>> + Send + 'a>> {
            let outcome = self.0.clone();
            Box::pin(async move { outcome })
        }
    }

    fn catalog(entries: &[(&str, f64)]) -> Catalog {
        let as_of = UtcDateTime::parse("2023-08-29T07:10:40.000Z").expect("valid timestamp");
        Catalog::from_tokens(entries.iter().map(|(currency, price)| {
            Token::new(
                Currency::parse(currency).expect("valid currency"),
                *price,
                as_of,
                &IconTemplate::default(),
            )
            .expect("valid token")
        }))
    }

    fn workflow_with(outcome: Result<Catalog, CatalogError>) -> ExchangeWorkflow {
        ExchangeWorkflow::new(
            Arc::new(StaticSource(outcome)),
            Arc::new(InstantClock),
            Duration::from_secs(3),
        )
    }

    #[tokio::test]
    async fn bootstrap_selects_first_token_for_both_sides() {
        let workflow = workflow_with(Ok(catalog(&[("ETH", 3000.0), ("USDC", 1.0)])));
        assert_eq!(workflow.phase(), WorkflowPhase::Bootstrapping);

        workflow.bootstrap().await.expect("catalog loads");

        let snapshot = workflow.snapshot();
        assert_eq!(snapshot.phase, WorkflowPhase::Ready);
        assert_eq!(snapshot.source.as_ref().map(Currency::as_str), Some("ETH"));
        assert_eq!(snapshot.target.as_ref().map(Currency::as_str), Some("ETH"));
        assert_eq!(snapshot.amount_error, None);
    }

    #[tokio::test]
    async fn bootstrap_cannot_run_twice() {
        let workflow = workflow_with(Ok(catalog(&[("ETH", 3000.0)])));
        workflow.bootstrap().await.expect("catalog loads");

        let err = workflow.bootstrap().await.expect_err("already ready");
        assert_eq!(
            err,
            WorkflowError::InvalidPhase {
                operation: "bootstrap",
                phase: WorkflowPhase::Ready,
            }
        );
    }

    #[tokio::test]
    async fn operations_are_rejected_while_bootstrapping() {
        let workflow = workflow_with(Ok(catalog(&[("ETH", 3000.0)])));

        assert!(matches!(
            workflow.select_source("ETH"),
            Err(WorkflowError::InvalidPhase { .. })
        ));
        assert!(matches!(
            workflow.swap(),
            Err(WorkflowError::InvalidPhase { .. })
        ));
        assert!(matches!(
            workflow.set_amount("1"),
            Err(WorkflowError::InvalidPhase { .. })
        ));
        assert!(matches!(
            workflow.request_exchange().await,
            Err(WorkflowError::InvalidPhase { .. })
        ));
        assert_eq!(workflow.snapshot().amount_text, None);
    }

    #[tokio::test]
    async fn missing_amount_surfaces_only_after_interaction() {
        let workflow = workflow_with(Ok(catalog(&[("ETH", 3000.0), ("USDC", 1.0)])));
        workflow.bootstrap().await.expect("catalog loads");
        assert_eq!(workflow.snapshot().amount_error, None);

        let err = workflow.request_exchange().await.expect_err("amount missing");
        assert_eq!(err, WorkflowError::Amount(AmountError::Missing));
        let snapshot = workflow.snapshot();
        assert_eq!(snapshot.phase, WorkflowPhase::Ready);
        assert_eq!(snapshot.amount_error, Some(AmountError::Missing));
        assert_eq!(snapshot.exchange_error, Some(err));
    }

    #[tokio::test]
    async fn correcting_amount_clears_surfaced_exchange_error() {
        let workflow = workflow_with(Ok(catalog(&[("ETH", 3000.0), ("USDC", 1.0)])));
        workflow.bootstrap().await.expect("catalog loads");
        let _ = workflow.set_amount("abc");
        let _ = workflow.request_exchange().await;
        assert!(workflow.snapshot().exchange_error.is_some());

        assert_eq!(workflow.set_amount("2"), Ok(2.0));
        let snapshot = workflow.snapshot();
        assert_eq!(snapshot.exchange_error, None);
        assert_eq!(snapshot.amount, Some(2.0));
        assert!(snapshot.can_request_exchange());
    }

    #[tokio::test]
    async fn empty_refresh_turns_selections_into_token_not_found() {
        let workflow = workflow_with(Ok(catalog(&[("ETH", 3000.0)])));
        workflow.bootstrap().await.expect("catalog loads");
        workflow.set_amount("1").expect("valid amount");

        let refreshed = {
            let mut state = workflow.inner.state.lock().expect("lock");
            state.apply_refresh(Ok(Catalog::empty()))
        };
        assert_eq!(refreshed, Err(WorkflowError::Catalog(CatalogError::empty())));

        let err = workflow.request_exchange().await.expect_err("token vanished");
        assert_eq!(
            err,
            WorkflowError::TokenNotFound {
                currency: String::from("ETH")
            }
        );
        assert_eq!(workflow.phase(), WorkflowPhase::Ready);
    }

    #[test]
    fn workflow_error_serializes_as_code_and_message() {
        let value = serde_json::to_value(WorkflowError::TokenNotFound {
            currency: String::from("ETH"),
        })
        .expect("serializable");
        assert_eq!(value["code"], "workflow.token_not_found");
        assert_eq!(value["message"], "token 'ETH' is not in the catalog");
    }

    #[test]
    fn result_display_uses_six_decimals() {
        let result = ExchangeResult {
            amount: 2.0,
            source_currency: Currency::parse("ETH").expect("valid currency"),
            target_currency: Currency::parse("USDC").expect("valid currency"),
            converted_amount: 6000.0,
        };
        assert_eq!(result.to_string(), "2 ETH = 6000.000000 USDC");
    }
}
