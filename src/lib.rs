//! Migrates a legacy line-record blog dump (texts, articles, crash reports)
//! into the compact line format and content-addressed blob trees.

pub mod build_info;
pub mod commands;
pub mod content_hash;
pub mod crash_line;
pub mod error;
pub mod model;
pub mod output;
pub mod parse;
pub mod redirect;
pub mod renumber;
pub mod serialize;
pub mod slug;
pub mod store;
pub mod verify;
