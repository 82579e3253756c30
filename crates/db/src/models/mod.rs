pub mod cart;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod restaurant;
pub mod sales_log;
pub mod session;
pub mod shift;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;
