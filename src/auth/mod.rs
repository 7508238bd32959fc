pub mod credentials;
pub mod password;
pub mod token;

pub use credentials::{AuthError, Credentials, User};
pub use password::PasswordHasher;
pub use token::{TokenError, TokenService};
