//! Credential policy evaluation library
//!
//! Checks a username/password pair against an ordered set of independent
//! rules and reports, per rule, whether it passed together with a
//! human-readable message.
//!
//! # Features
//!
//! - `async` (default): Enables concurrent evaluation with cancellation support
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PWD_BLOCKLIST_PATH`: Custom path to the leaked password file
//!   (default: `./rockyou.txt`)
//! - `PWD_MIN_LENGTH`, `PWD_MIN_NUMBER_PCT`, `PWD_MIN_SPECIAL_PCT`,
//!   `PWD_MIN_UPPER_PCT`, `PWD_MIN_LOWER_PCT`,
//!   `PWD_MIN_USERNAME_DISTANCE_PCT`, `PWD_DISALLOWED_CHARS`: threshold
//!   overrides read by [`PolicyThresholds::from_env`]
//!
//! # Example
//!
//! ```rust,no_run
//! use pwd_policy::PolicyEngine;
//! use secrecy::SecretString;
//!
//! // Build the engine (call once at startup)
//! let engine = PolicyEngine::from_env().expect("Invalid policy configuration");
//!
//! // Evaluate a credential pair
//! let password = SecretString::new("MyP@ssw0rd!".to_string().into());
//! let evaluation = engine.evaluate("alice", &password);
//!
//! println!("{}", evaluation);
//! println!("Passed: {}/{}", evaluation.passed_count, evaluation.total_count);
//! ```

// Internal modules
mod blocklist;
mod classifier;
mod config;
mod distance;
mod evaluator;
mod rules;

// Public API
pub use blocklist::{
    get_blocklist_path, BlocklistError, BlocklistSource, CorpusProvisioner, FileBlocklist,
    InMemoryBlocklist,
};
pub use classifier::{required_count, CharClassifier, CharacterClass, DisallowedCharacters};
pub use config::{ConfigError, PolicyThresholds, UnavailablePolicy};
pub use distance::distance;
pub use evaluator::{EvaluationResult, PolicyEngine, RuleOutcome, RuleStatus};
pub use rules::{Rule, RuleInput, RuleKind, RuleResult, RuleSet};

#[cfg(feature = "async")]
pub use evaluator::evaluate_credentials_tx;
