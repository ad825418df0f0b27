// Application layer: wires the pipeline to the HTTP surface.

pub mod server;

pub use server::{build_router, serve, AppState};
