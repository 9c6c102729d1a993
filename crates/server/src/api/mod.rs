pub mod discover;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod mood;
pub mod routes;

pub use routes::create_router;
