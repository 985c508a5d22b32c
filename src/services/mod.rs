/// Backend resources used by the account, feed and reverse screens.
/// All calls go through the authenticated API client.

mod posts;
mod reverse;
mod user;

pub use posts::{Post, PostService, POSTS_PATH};
pub use reverse::{ReverseService, REVERSE_PATH};
pub use user::{PasswordChange, Profile, UserService, PASSWORD_PATH, PROFILE_PATH};
