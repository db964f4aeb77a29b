//! core
//!
//! Core domain types, schemas, and path routing for gallerist.
//!
//! # Modules
//!
//! - [`types`] - Strong types: GalleryName, ImageFilename, Revision, BranchName
//! - [`naming`] - Album name normalization
//! - [`paths`] - Centralized path routing for the site layout
//! - [`document`] - Front-matter documents and their metadata schema
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing keeps unvalidated names out of store paths
//! - Schemas are strict and self-describing
//! - Nothing here performs network I/O

pub mod config;
pub mod document;
pub mod naming;
pub mod paths;
pub mod types;
