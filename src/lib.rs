pub mod configuration;
pub mod consent;
pub mod layout;
pub mod provider;
pub mod routes;
pub mod startup;
pub mod submitter;
pub mod telemetry;
pub mod utils;
pub mod viewport;
