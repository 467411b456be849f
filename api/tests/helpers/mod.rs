pub mod app;
pub mod ws;

pub use app::{Seed, make_test_app, seed, send};
pub use ws::{connect_ws, spawn_server};
