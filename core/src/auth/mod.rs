pub mod jwt;
pub mod policy;

pub use jwt::{JwtPayload, TokenVerifier, extract_bearer_token, user_id_from_token};
pub use policy::{AuthorizerRequest, AuthorizerResponse, Effect, authorize};
