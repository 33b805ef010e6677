//! Authentication and route authorization

pub mod issuer;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

pub use issuer::{bearer, SessionIssuer};
pub use middleware::{authorize, require_auth, AuthUser};
pub use models::{Account, Claims, LoginRequest, LoginResponse, NewAccount, RegisterRequest, Role};
pub use service::AuthService;
pub use token::TokenKey;
