//! Data transfer objects for the HTTP API.

mod request;
mod response;

pub use request::{CredentialsRequest, FilenameQuery};
pub use response::{DeleteResponse, FileEntry, MessageResponse, UploadResponse};
