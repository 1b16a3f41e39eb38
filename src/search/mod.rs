pub mod alphabeta;
pub mod eval;
pub mod tt;

pub use alphabeta::{SearchParams, SearchResult, Searcher};
