//! nextkit is a scaffolding tool that generates a pre-wired Next.js workspace
//! (API routes, theming components, Playwright end-to-end tests) from
//! bundled templates.

/// Command-line interface module for nextkit
pub mod cli;

/// Common constants
pub mod constants;

/// Error types and handling
pub mod error;

/// One generation run from request to report
pub mod generate;

/// Logger setup
pub mod logger;

/// Template manifest parsing and entry resolution
pub mod manifest;

/// Staged writing of generated files with rollback
pub mod materializer;

/// Rendering of manifest entries into an in-memory plan
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// Placeholder substitution
pub mod renderer;

/// Bundled and on-disk template stores
pub mod store;

/// Variable collection and validation
pub mod variables;
