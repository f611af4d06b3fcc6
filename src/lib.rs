//! srview: decode DICOM Structured Report content trees and query them.
//!
//! Layers, innermost first:
//! - `domain`: dataset model, content item decoding, tree building, search
//! - `application`: report loading service
//! - `infrastructure`: DICOM JSON loader, filesystem, DI container
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
