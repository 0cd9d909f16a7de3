//! clustermap: turns a directory tree of keyword cluster CSV exports into a
//! squarified-treemap JSON document.
//!
//! Layers, innermost first:
//! - `domain`: tree model, CSV parsing, rollup arithmetic, run statistics
//! - `application`: extraction, assembly and rename services
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
