//!
//! fat12_inspect: A library and CLI for inspecting FAT12 disk images.
//!
//! This crate provides tools for:
//! - Decoding the BIOS Parameter Block, the FAT and the root directory of a FAT12 volume
//! - Extracting files by following their cluster chains
//! - Handling user commands of the interactive front-end
//!
//! The library only reads images, it never writes to them.
//!
//! # Re-exports
//! - [`VolumeSession`]: Decoded FAT12 volume
//! - [`FATError`]: Errors of every decoding step
//! - [`ExtractMode`]: How much of a file's last cluster is produced

pub mod commands;
pub mod filesystem;
pub mod traits;
pub mod utils;

/// Decoded FAT12 volume (see [`filesystem::volume::VolumeSession`]).
pub use crate::filesystem::volume::VolumeSession;
/// Errors of every decoding step (see [`filesystem::fat_error::FATError`]).
pub use crate::filesystem::fat_error::FATError;
/// Extraction mode of a file (see [`filesystem::cluster_chain::ExtractMode`]).
pub use crate::filesystem::cluster_chain::ExtractMode;
