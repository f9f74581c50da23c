pub mod routes;
pub mod service;

pub use routes::{router, AppState};
pub use service::AudioMatchService;
