//! Authentication and authorization
//!
//! - `jwt`: token issuing and verification
//! - `password`: Argon2id hashing
//! - `middleware`: identity extractors, revocation check and admin gate

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{issue_token, verify_token, Claims, JwtConfig, JwtError};
pub use middleware::{
    authenticate, require_admin, AdminIdentity, AuthError, Identity, TOKEN_HEADER,
};
pub use password::{hash_password, verify_password, PasswordConfig, PasswordError};
