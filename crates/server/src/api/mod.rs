pub mod catalog;
pub mod handlers;
pub mod routes;
pub mod updates;

pub use routes::create_router;
