// kihoko/src/model/mod.rs

//! Records the cart core reads and writes.

pub mod cart;
pub mod merchandise;
pub mod viewer;

pub use cart::{Cart, CartContents, CartItem, CartLine};
pub use merchandise::Merchandise;
pub use viewer::Viewer;
