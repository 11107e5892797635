mod health;
mod helpers;
mod subscriptions;
