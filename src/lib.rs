pub mod discover;
pub mod error;
pub mod export;
pub mod fetch;
pub mod normalize;
