pub mod api_error;
pub mod routes;

pub use api_error::ApiError;
pub use routes::build_router;
