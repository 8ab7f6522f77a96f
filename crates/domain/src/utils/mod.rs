//! Pure helpers shared across crates

pub mod dates;
pub mod title;
