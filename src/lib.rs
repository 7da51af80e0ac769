//! # Data File
//!
//! `data-file` wraps the file records of a remote file-storage service.
//!
//! - [`FileHandle`] is a read-only view of a server-side [`proto::File`],
//!   with [`FileHandle::delete`] delegated to a [`FileClient`].
//! - [`to_file_data`] turns every accepted way of referring to uploaded
//!   data ([`FileDataType`]) into one canonical [`proto::FileData`].

use std::sync::Once;

pub mod client;
mod errors;
pub mod file;
pub mod file_data;
pub mod proto;

pub use client::{
    default_file_client, set_default_file_client, ClientConfig, ClientError,
    FileClient, HttpFileClient,
};
pub use errors::{FileError, Result};
pub use file::FileHandle;
pub use file_data::{to_file_data, FileDataType};
pub use proto::{FileData, State};

pub static INIT: Once = Once::new();

/// Install the `env_logger` backend, honouring `RUST_LOG`.
///
/// Safe to call any number of times, only the first call has an effect.
pub fn initialize() {
    INIT.call_once(|| {
        let _ = env_logger::builder().try_init();
        log::info!("Initializing data-file");
    });
}
