pub mod content;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod pipeline;
pub mod routes;

pub use routes::create_router;
