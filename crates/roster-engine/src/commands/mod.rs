//! Command handlers with boundary logging

pub mod project;
