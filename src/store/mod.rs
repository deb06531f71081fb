//! Entity store: CRUD primitives over the relational schema.
//!
//! Every operation takes an explicit `&mut SqliteConnection` rather than
//! reaching for shared state, so a handler can run an entity write and its
//! audit-log append on one transaction and commit or roll back both
//! together.

pub mod analytics;
pub mod clients;
pub mod comments;
pub mod routers;
pub mod settings;
pub mod sites;
pub mod tickets;
pub mod users;
