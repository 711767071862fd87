// site/src/services/mod.rs

pub mod accounts;
pub mod auth_service;
pub mod mailer;
pub mod media;
pub mod payments;

pub use mailer::Mailer;
pub use media::MediaClient;
pub use payments::StripeClient;
