pub mod analytics;
pub mod auth;
pub mod clients;
pub mod payload;
pub mod routers;
pub mod settings;
pub mod sites;
pub mod tickets;
pub mod users;
