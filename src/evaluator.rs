//! Policy evaluator - runs every rule and collects the outcomes.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use secrecy::SecretString;

#[cfg(feature = "async")]
use secrecy::ExposeSecret;

#[cfg(feature = "async")]
use tokio::sync::mpsc;

#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::blocklist::{BlocklistSource, FileBlocklist};
use crate::config::{ConfigError, PolicyThresholds, UnavailablePolicy};
use crate::rules::{Rule, RuleInput, RuleKind, RuleSet};

/// How a single rule ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStatus {
    Passed,
    Failed,
    /// The rule could not be decided, e.g. the blocklist was unreadable.
    Unavailable { cause: String },
}

/// Outcome of one rule for one credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule: RuleKind,
    pub status: RuleStatus,
    /// `true` only for [`RuleStatus::Passed`].
    pub passed: bool,
    pub message: String,
}

impl RuleOutcome {
    pub fn rule_name(&self) -> &'static str {
        self.rule.name()
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.status, RuleStatus::Unavailable { .. })
    }
}

/// Per-rule outcomes in rule order plus the pass summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    pub outcomes: Vec<RuleOutcome>,
    pub passed_count: usize,
    /// Rules counted toward the summary. Unavailable rules are left out
    /// under [`UnavailablePolicy::Exclude`].
    pub total_count: usize,
}

impl EvaluationResult {
    fn from_outcomes(outcomes: Vec<RuleOutcome>, policy: UnavailablePolicy) -> Self {
        let (passed_count, total_count) =
            outcomes
                .iter()
                .fold((0, 0), |(passed, total), outcome| match (&outcome.status, policy) {
                    (RuleStatus::Passed, _) => (passed + 1, total + 1),
                    (RuleStatus::Unavailable { .. }, UnavailablePolicy::Exclude) => (passed, total),
                    _ => (passed, total + 1),
                });

        Self {
            outcomes,
            passed_count,
            total_count,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed_count == self.total_count
    }

    pub fn unavailable_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_unavailable()).count()
    }

    pub fn failed_rules(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            let (mark, label) = match outcome.status {
                RuleStatus::Passed => ("\u{2713}", "Test Passed"),
                RuleStatus::Failed => ("\u{2717}", "Test Failed"),
                RuleStatus::Unavailable { .. } => ("?", "Test Unavailable"),
            };
            writeln!(f, "{} | {}: {}", mark, label, outcome.message)?;
        }
        write!(f, "Total passed tests: {}/{}", self.passed_count, self.total_count)
    }
}

/// Evaluates credential pairs against a fixed rule set and thresholds.
///
/// The engine holds no per-evaluation state, so one instance can serve
/// concurrent callers.
pub struct PolicyEngine {
    thresholds: PolicyThresholds,
    rules: RuleSet,
    blocklist: Arc<dyn BlocklistSource>,
    unavailable_policy: UnavailablePolicy,
}

impl PolicyEngine {
    /// Creates an engine with the standard rule set.
    ///
    /// # Errors
    ///
    /// Returns error if the thresholds do not validate.
    pub fn new(
        thresholds: PolicyThresholds,
        blocklist: Arc<dyn BlocklistSource>,
    ) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self {
            thresholds,
            rules: RuleSet::standard(),
            blocklist,
            unavailable_policy: UnavailablePolicy::default(),
        })
    }

    /// Thresholds from [`PolicyThresholds::from_env`] and the blocklist file
    /// from [`FileBlocklist::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(
            PolicyThresholds::from_env()?,
            Arc::new(FileBlocklist::from_env()),
        )
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_unavailable_policy(mut self, policy: UnavailablePolicy) -> Self {
        self.unavailable_policy = policy;
        self
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Runs every rule, in order, against the credential pair.
    pub fn evaluate(&self, username: &str, password: &SecretString) -> EvaluationResult {
        let input = RuleInput::new(username, password, &self.thresholds, self.blocklist.as_ref());

        let outcomes = self
            .rules
            .rules()
            .iter()
            .map(|rule| run_rule(rule, &input))
            .collect();

        self.finish(outcomes)
    }

    fn finish(&self, outcomes: Vec<RuleOutcome>) -> EvaluationResult {
        let result = EvaluationResult::from_outcomes(outcomes, self.unavailable_policy);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Policy evaluation finished: {}/{} rules passed, {} unavailable",
            result.passed_count,
            result.total_count,
            result.unavailable_count()
        );

        result
    }

    /// Runs each rule on its own blocking task and joins them in rule order.
    ///
    /// Returns `None` if `token` is cancelled before every rule finished.
    #[cfg(feature = "async")]
    pub async fn evaluate_concurrent(
        self: &Arc<Self>,
        username: &str,
        password: &SecretString,
        token: CancellationToken,
    ) -> Option<EvaluationResult> {
        if token.is_cancelled() {
            return None;
        }

        let shared_username: Arc<str> = Arc::from(username);
        let shared_password = Arc::new(SecretString::new(Box::from(password.expose_secret())));

        let mut tasks = tokio::task::JoinSet::new();
        for (index, rule) in self.rules.rules().iter().copied().enumerate() {
            let engine = Arc::clone(self);
            let username = Arc::clone(&shared_username);
            let password = Arc::clone(&shared_password);

            tasks.spawn_blocking(move || {
                let input = RuleInput::new(
                    &username,
                    &password,
                    &engine.thresholds,
                    engine.blocklist.as_ref(),
                );
                (index, run_rule(&rule, &input))
            });
        }

        let mut slots: Vec<Option<RuleOutcome>> = vec![None; self.rules.len()];
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tasks.abort_all();
                    return None;
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok((index, outcome))) => slots[index] = Some(outcome),
                    Some(Err(_e)) => {
                        #[cfg(feature = "tracing")]
                        tracing::error!("Rule task did not complete: {}", _e);
                    }
                    None => break,
                },
            }
        }

        let input = RuleInput::new(
            username,
            password,
            &self.thresholds,
            self.blocklist.as_ref(),
        );
        let outcomes = slots
            .into_iter()
            .zip(self.rules.rules())
            .map(|(slot, rule)| {
                slot.unwrap_or_else(|| {
                    unavailable(rule, &input, "rule task did not complete".to_string())
                })
            })
            .collect();

        Some(self.finish(outcomes))
    }
}

fn run_rule(rule: &Rule, input: &RuleInput<'_>) -> RuleOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.test(input))) {
        Ok(Ok(passed)) => RuleOutcome {
            rule: rule.kind(),
            status: if passed {
                RuleStatus::Passed
            } else {
                RuleStatus::Failed
            },
            passed,
            message: rule.message(input),
        },
        Ok(Err(e)) => unavailable(rule, input, e.to_string()),
        Err(payload) => unavailable(rule, input, panic_message(payload.as_ref())),
    }
}

fn unavailable(rule: &Rule, input: &RuleInput<'_>, cause: String) -> RuleOutcome {
    #[cfg(feature = "tracing")]
    tracing::warn!("Rule {} unavailable: {}", rule.name(), cause);

    let message = format!("{} (unavailable: {})", rule.message(input), cause);
    RuleOutcome {
        rule: rule.kind(),
        status: RuleStatus::Unavailable { cause },
        passed: false,
        message,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("rule panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("rule panicked: {}", s)
    } else {
        "rule panicked".to_string()
    }
}

/// Async version that sends the evaluation result via channel.
///
/// Nothing is sent if `token` is cancelled first.
#[cfg(feature = "async")]
pub async fn evaluate_credentials_tx(
    engine: Arc<PolicyEngine>,
    username: &str,
    password: &SecretString,
    token: CancellationToken,
    tx: mpsc::Sender<EvaluationResult>,
) {
    #[cfg(feature = "tracing")]
    tracing::info!("evaluation is about to start...");

    let Some(evaluation) = engine.evaluate_concurrent(username, password, token).await else {
        #[cfg(feature = "tracing")]
        tracing::info!("evaluation cancelled");
        return;
    };

    if let Err(_e) = tx.send(evaluation).await {
        #[cfg(feature = "tracing")]
        tracing::error!("Failed to send policy evaluation result: {}", _e);
    }
}


#[cfg(all(test, feature = "async"))]
mod async_tests {
    use super::tests::{engine_with, secret, Panicking, Unreadable, STRONG};
    use super::*;

    async fn assert_concurrent_blocklist_unavailable(engine: PolicyEngine) -> String {
        let engine = Arc::new(engine);
        let pwd = secret(STRONG);

        let result = engine
            .evaluate_concurrent("alice", &pwd, CancellationToken::new())
            .await
            .expect("not cancelled");

        let blocklist = result
            .outcomes
            .iter()
            .find(|o| o.rule == RuleKind::Blocklist)
            .expect("rule present in result");
        assert!(!blocklist.passed);
        assert_eq!(result.passed_count, 10);
        assert_eq!(result.total_count, 11);
        assert_eq!(result, engine.evaluate("alice", &pwd));

        match &blocklist.status {
            RuleStatus::Unavailable { cause } => cause.clone(),
            other => panic!("Expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_evaluate_concurrent_unreadable_blocklist() {
        let engine =
            PolicyEngine::new(PolicyThresholds::default(), Arc::new(Unreadable)).expect("engine");

        let cause = assert_concurrent_blocklist_unavailable(engine).await;
        assert!(cause.contains("empty"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_evaluate_concurrent_panicking_blocklist() {
        let engine =
            PolicyEngine::new(PolicyThresholds::default(), Arc::new(Panicking)).expect("engine");

        let cause = assert_concurrent_blocklist_unavailable(engine).await;
        assert!(cause.contains("corpus exploded"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_evaluate_concurrent_matches_sequential() {
        let engine = Arc::new(engine_with(&["password123"]));

        for password in ["", "password123", "alice", STRONG, "line\nbreak"] {
            let pwd = secret(password);
            let concurrent = engine
                .evaluate_concurrent("alice", &pwd, CancellationToken::new())
                .await
                .expect("not cancelled");
            assert_eq!(concurrent, engine.evaluate("alice", &pwd));
        }
    }

    #[tokio::test]
    async fn test_evaluate_concurrent_cancelled() {
        let engine = Arc::new(engine_with(&[]));
        let token = CancellationToken::new();
        token.cancel();

        let result = engine
            .evaluate_concurrent("alice", &secret(STRONG), token)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_evaluate_credentials_tx() {
        let engine = Arc::new(engine_with(&[]));
        let (tx, mut rx) = mpsc::channel(1);

        evaluate_credentials_tx(engine, "alice", &secret(STRONG), CancellationToken::new(), tx)
            .await;

        let evaluation = rx.recv().await.expect("Should receive evaluation");
        assert!(evaluation.all_passed());
    }

    #[tokio::test]
    async fn test_evaluate_credentials_tx_cancelled_sends_nothing() {
        let engine = Arc::new(engine_with(&[]));
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        token.cancel();

        evaluate_credentials_tx(engine, "alice", &secret(STRONG), token, tx).await;

        assert!(rx.recv().await.is_none());
    }
}
