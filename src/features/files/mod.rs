pub mod dtos;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod routes;
pub mod services;

pub use routes::{public_routes, routes};
pub use services::FileService;
