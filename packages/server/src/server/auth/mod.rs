// Caller identity for HTTP handlers
pub mod jwt;

pub use jwt::{Claims, JwtService};
