pub mod claims;
pub mod errors;
pub mod handler;
pub mod ttl;

pub use claims::Claims;
pub use errors::JwtError;
pub use errors::TtlError;
pub use handler::JwtHandler;
pub use ttl::parse_ttl;
