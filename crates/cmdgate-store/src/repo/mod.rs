//! Repository layer
//!
//! Each repo is a stateless set of functions over a `&Connection`. Passing a
//! `&Transaction` works the same way (it derefs to `Connection`), which is
//! how the engine groups ledger, command and audit writes into one commit.

pub mod audit;
pub mod commands;
pub mod ledger;
pub mod principals;
pub mod rules;

pub use audit::AuditRepo;
pub use commands::CommandRepo;
pub use ledger::Ledger;
pub use principals::PrincipalRepo;
pub use rules::RuleRepo;
