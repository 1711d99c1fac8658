mod middleware;
mod password;
mod token;

pub use middleware::{AuthError, RequireAdmin, RequireUser};
pub use password::PasswordHasher;
pub use token::{Claims, DEFAULT_TOKEN_TTL_HOURS, TokenSigner};
