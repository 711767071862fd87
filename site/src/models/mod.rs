// site/src/models/mod.rs

//! Database entities of the site. Shop entities live in the `kihoko` crate.

pub mod email_verification;
pub mod flash_design;
pub mod merchandise_image;
pub mod project;
pub mod user;

pub use email_verification::EmailVerification;
pub use flash_design::{FlashDesign, FlashSummary};
pub use merchandise_image::MerchandiseImage;
pub use project::{Neighbours, Project, ProjectImage};
pub use user::User;
