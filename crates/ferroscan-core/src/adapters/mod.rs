//! Provider endpoint builders and response parsers.

pub mod yahoo;
