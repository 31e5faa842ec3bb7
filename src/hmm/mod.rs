pub mod counts;
pub mod model;
pub mod tagger;
pub mod trainer;
pub mod vocab;
mod context;
