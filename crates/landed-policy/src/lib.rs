//! Landed Policy: margin rules and the profitability gate
//!
//! ```text
//! DDP scenario → rules → Verdict ─┐
//!                                 ├─ AND → final Verdict
//! DDU scenario → rules → Verdict ─┘
//! ```
//!
//! # Example
//!
//! ```
//! use landed_policy::{MarginGate, Verdict};
//!
//! let gate = MarginGate::default();
//! assert_eq!(gate.rules().len(), 2);
//! assert!(Verdict::allow().combine(Verdict::allow()).is_allowed());
//! ```

pub mod gate;
pub mod rule;
pub mod verdict;

pub use gate::{MarginEvaluation, MarginGate};
pub use rule::{default_rules, MarginCondition, MarginRule};
pub use verdict::{Verdict, Violation};
