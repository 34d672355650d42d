//! FAT12 filesystem structures and parsing.
//!
//! The modules below decode, leaves first:
//! - the BIOS Parameter Block ([`bpb`])
//! - the 12-bit allocation table ([`fat_table`])
//! - the fixed-size root directory ([`root_dir`], [`dir_entry`])
//! - the cluster chains holding file data ([`cluster_chain`])
//!
//! [`volume::VolumeSession`] ties them together.

pub mod bpb;
pub mod cluster_chain;
pub mod dir_entry;
pub mod fat_error;
pub mod fat_table;
pub mod fat_type;
pub mod root_dir;
pub mod volume;
