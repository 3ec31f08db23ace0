pub mod auth;
pub mod calls;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod txs;

pub use routes::router;
pub use state::{AppState, AppStateInner};
