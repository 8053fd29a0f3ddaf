// Resource services: typed operations on domains, accounts, aliases and BCC
// rules. Each service owns a shared handle to the transport; none of them
// keeps state of its own between calls.

pub mod accounts;
pub mod aliases;
pub mod auth;
pub mod bccs;
pub mod domains;

pub use accounts::AccountService;
pub use aliases::AliasService;
pub use auth::AuthService;
pub use bccs::{BccKind, BccService};
pub use domains::DomainService;
