pub mod handlers;
pub mod ingress;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
