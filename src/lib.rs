//! # barrelgen
//!
//! A library and CLI tool that generates barrel (re-export) files by
//! discovering source-tree entries and rendering them through variable
//! templates. A template like `export * from './handlers/{name}/index.js'`
//! binds `{name}` to each discovered subdirectory, applies per-placeholder
//! transform chains, verifies the referenced artifact exists on disk, and
//! emits one export line per surviving candidate.
//!
//! ## Features
//!
//! - `{name}` / `{name:chain}` placeholders with chained string transforms
//!   (case conversion, affixes, literal replace, singular/plural)
//! - File-oriented and directory-oriented discovery (directories are matched
//!   via a required index file)
//! - Filesystem-existence verification of every rendered import path
//! - Replace and partial-replace (marker block) output modes
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```no_run
//! use barrelgen::{generate_barrel, load_config};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("barrel.config.json"))?;
//! for definition in &config.barrels {
//!     let result = generate_barrel(definition, config.global_options.as_ref())?;
//!     print!("{}", result.content);
//! }
//! # Ok::<(), barrelgen::BarrelError>(())
//! ```
//!
//! ### As a CLI Tool
//!
//! ```bash
//! # Create a starting-point configuration
//! barrelgen init
//!
//! # Generate all configured barrels
//! barrelgen generate
//!
//! # Preview without writing
//! barrelgen generate --dry-run
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod template;
pub mod transform;

// Re-export main types and functions for convenience
pub use config::{
    BarrelConfig, BarrelDefinition, OutputMode, ProcessingOptions, SourceRule, TemplateSpec,
    load_config, sample_config, validate_config,
};
pub use error::{BarrelError, Result};
pub use output::write_output;
pub use scanner::{DiscoveryRecord, FileScanner};
pub use template::{
    GenerationResult, PathMatch, Placeholder, VariableBinding, extract_variables, filter_existing,
    generate_barrel, is_file_oriented, parse_placeholders, render, resolve_base_directory,
};
pub use transform::{apply_chain, apply_transform};
