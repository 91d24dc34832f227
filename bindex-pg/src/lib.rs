//! bindex PostgreSQL source
//!
//! [`PgQueryRunner`] implements `bindex_core::QueryRunner` on top of
//! tokio-postgres: one connection per parameter tuple, parameters bound as
//! text, every column rendered back to text.

pub mod bind;
pub mod cell;
pub mod connection;
pub mod runner;

pub use bind::{text_params, TextParam};
pub use cell::{numeric_text, render, CellText};
pub use connection::{describe_target, ConnectionSpec, Driver};
pub use runner::PgQueryRunner;
