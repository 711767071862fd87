// site/src/web/handlers/mod.rs

pub mod account_handlers;
pub mod auth_handlers;
pub mod cart_handlers;
pub mod checkout_handlers;
pub mod contact_handlers;
pub mod portfolio_handlers;
pub mod shop_handlers;
