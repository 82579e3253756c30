pub mod admin;
pub mod auth;
pub mod cart;
pub mod cashier;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod database_validator;
pub mod export;
pub mod order_events;
pub mod orders;
pub mod payment;
pub mod receipt;
pub mod reports;
pub mod stale_orders;

#[cfg(test)]
pub(crate) mod test_support;
