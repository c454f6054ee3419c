//! Redeems one product key per run and reports the result.
//!
//! [`KeyActivationWorkflow`] ties the pieces together: it logs the browser
//! in, takes a key from the inventory, submits it on the activation page,
//! classifies the page's answer with [`classify`] and records the outcome
//! remotely.
//!
//! # Example
//!
//! ```ignore
//! let mut workflow = KeyActivationWorkflow::new(authenticator, inventory);
//! match workflow.run_and_quit(&mut browser).await? {
//!     RunReport::Reported { key, status } => println!("{key}: {status}"),
//!     RunReport::RateLimited { key } => println!("{key}: try again later"),
//! }
//! ```

mod activation;
mod error;
mod outcome;

pub use activation::{update_for, ActivationPage, KeyActivationWorkflow, RunReport};
pub use error::{ActivationError, ActivationResult, ActivatorError, ActivatorResult};
pub use outcome::{classify, ActivationOutcome, Locale, OutcomeRule, RULES};
