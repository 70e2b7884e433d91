//! # Blueprint Output Generation
//!
//! Markdown pseudo-code generation for analyzed Blueprint graphs.

mod markdown;

pub use markdown::*;
