pub mod duration;
pub mod password;
pub mod validation;

pub use duration::parse_duration_seconds;
pub use password::{hash_password, verify_password, Password, PasswordHashString};
pub use validation::ValidatedJson;
