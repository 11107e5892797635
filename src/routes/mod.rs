mod check_health;
mod consent;
mod domain;
mod signup_config;
mod subscriptions;
mod viewport;

pub use check_health::*;
pub use consent::*;
pub use domain::*;
pub use signup_config::*;
pub use subscriptions::*;
pub use viewport::*;
