//! Insurance plans and the user-policy approval ledger.
//!
//! A purchased policy starts `PENDING` and is reviewed by the admin who owns
//! its plan: `activate` moves it to `ACTIVE`, `reject` to `REJECTED`. Both
//! outcomes are final for the transition operations; `update` is the only
//! way to rewrite a status by hand.

pub mod model;
pub mod service;

pub use service::{LedgerError, PolicyLedger};
