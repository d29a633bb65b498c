//! Stores over the account databases and the record parser.

pub mod group;
pub mod parse;
pub mod passwd;
