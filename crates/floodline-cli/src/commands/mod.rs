pub mod data;
pub mod prompt;
pub mod simulate;
