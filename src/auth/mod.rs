//! Authentication primitives: password hashing and the signed session cookie.

mod password;
mod session;

pub use password::{hash_password, verify_password, PasswordError};
pub use session::{parse_same_site, Session, SessionCodec, DEFAULT_COOKIE_NAME};
