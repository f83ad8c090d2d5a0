//! Yatube content API
//!
//! Posts, thematic groups, comments and follow edges behind token
//! authentication and an ownership policy.
//!
//! # Example
//!
//! ```no_run
//! use api::{AppState, create_router, pagination::Pagination};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let app = create_router(AppState::in_memory(Pagination::new(10, 100)));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod policy;
pub mod repositories;
pub mod routes;
pub mod serializers;
pub mod settings;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
