pub mod comment;
pub mod review;
pub mod taxonomy;
pub mod title;
pub mod user;

pub use comment::Comment;
pub use review::Review;
pub use taxonomy::NamedSlug;
pub use title::TitleDetail;
pub use user::User;
