//! HTTP request handlers.

mod api_auth;
mod connection;
mod landing;
mod messages;

pub use api_auth::require_api_key;
pub use connection::{get_qr, get_status};
pub use landing::landing;
pub use messages::send_message;
