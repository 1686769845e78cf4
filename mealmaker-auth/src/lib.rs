pub mod error;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use models::{Address, Role, User, DEFAULT_PARTNER_ID, USERS};
pub use password::PasswordScheme;
pub use service::{PasswordChange, Session, SignIn, SignUp, UserService};
pub use token::{extract_bearer, Claims, TokenIssuer, ISSUER};
