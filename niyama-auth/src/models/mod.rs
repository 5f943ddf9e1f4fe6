pub mod organization;
pub mod refresh_token;
pub mod user;

pub use organization::{OrgSettings, Organization};
pub use refresh_token::RefreshToken;
pub use user::{Role, User, UserResponse};
