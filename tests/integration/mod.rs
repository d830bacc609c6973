//! Integration tests for ids-render.
//!
//! - `pipeline` - build, expand, materialise and flatten through the public API
//! - `assets` - bundle declarations through graph resolution and page collection
//! - `cli` - the `ids-render` binary against temporary projects

mod assets;
mod cli;
mod pipeline;
