pub mod claims;
pub mod middleware;
pub mod tokens;

pub use claims::AdminClaims;
pub use middleware::RequireAdmin;
pub use tokens::AdminAuth;
