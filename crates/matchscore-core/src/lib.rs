#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod scorer;
pub mod similarity;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use scorer::Scorer;
pub use traits::Embedder;
