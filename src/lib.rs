//! lexdrift - longitudinal word-frequency trends in journal articles
//!
//! Takes a snapshot of scraped journal articles and finds the stems whose
//! relative frequency rises with publication year:
//!
//! ```text
//! snapshot -> corpus (normalize) -> frequency tables -> prevalence filter
//!          -> trend test (Spearman + BH) -> bootstrap SE + inflections
//! ```
//!
//! The [`pipeline::Pipeline`] runs every stage; the modules can also be used
//! on their own.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod frequency;
pub mod inflection;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod sentences;
pub mod stats;
pub mod text;
pub mod trend;

pub use error::{LexError, LexResult};
pub use pipeline::{Analysis, Pipeline};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
