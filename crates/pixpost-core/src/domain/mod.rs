//! Domain entities - the core business objects.

mod media;
mod post;
mod user;

pub use media::{MediaFile, UploadedMedia};
pub use post::Post;
pub use user::{ROLE_SUPERUSER, ROLE_USER, User};
