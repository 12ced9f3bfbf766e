//! Integration test modules

mod content;
mod persistence;
mod scenarios;
