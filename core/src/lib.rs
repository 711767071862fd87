// src/lib.rs

//! Kihoko: the cart and inventory core of a tattoo studio storefront.
//!
//! Stock is reserved the moment a shopper puts merchandise in their cart, not
//! at checkout. This crate owns that bookkeeping:
//!  - Resolving (and lazily creating) a user's cart.
//!  - Add, update and remove operations that move units between the
//!    merchandise stock counter and cart items inside one transaction.
//!  - Passive expiry of idle carts, checked per request against a
//!    session-scoped "cart last updated" stamp.
//!
//! Storage is abstracted behind [`ShopStore`] / [`ShopTx`]. [`MemoryStore`]
//! ships with the crate; the web application provides a PostgreSQL one.

pub mod cart;
pub mod error;
pub mod expiry;
pub mod model;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::cart::{CartOutcome, CartRejection, CartService, Release, Reservation};
pub use crate::error::{ShopError, ShopResult};
pub use crate::expiry::{CartActivity, ExpirySweeper, MemoryActivity, SweepReport, DEFAULT_CART_EXPIRY_HOURS};
pub use crate::model::{Cart, CartContents, CartItem, CartLine, Merchandise, Viewer};
pub use crate::store::{MemoryStore, ShopStore, ShopTx};

/*
    Request flow in the web application:
    1. Middleware builds a `Viewer` and a session-backed `CartActivity`.
    2. `ExpirySweeper::sweep_if_expired` runs before the handler.
    3. The handler calls a `CartService` operation, which answers with
       `CartOutcome::Applied` or `CartOutcome::Rejected(reason)`.
    4. On success the operation stamps the session with the current time.
*/
