pub mod security_headers;
pub mod staff;

pub use security_headers::security_headers;
pub use staff::require_staff;
