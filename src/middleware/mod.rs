pub mod request_id;
pub mod session;

pub use request_id::{request_id_layer, X_REQUEST_ID};
pub use session::ensure_session;
