// kihoko/src/cart/mod.rs

pub mod outcome;
pub mod service;

pub use outcome::{CartOutcome, CartRejection, Release, Reservation};
pub use service::CartService;
