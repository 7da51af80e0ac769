use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::client::{default_file_client, ClientError, FileClient};
use crate::file_data::json_type_name;
use crate::proto::{self, State};
use crate::{FileError, Result};

/// Read-only view of a file stored on the server.
///
/// The record is shared, never copied: cloning a handle or building one
/// from another handle points at the same [`proto::File`]. Nothing on the
/// handle changes after construction; [`FileHandle::delete`] only affects
/// the server, after which the handle simply describes a file that no
/// longer exists.
#[derive(Clone)]
pub struct FileHandle {
    proto: Arc<proto::File>,
    client: Option<Arc<dyn FileClient>>,
}

impl FileHandle {
    pub fn new(proto: impl Into<Arc<proto::File>>) -> Self {
        Self {
            proto: proto.into(),
            client: None,
        }
    }

    /// Share the record, and the injected client, of another handle.
    pub fn from_handle(other: &FileHandle) -> Self {
        other.clone()
    }

    /// Build the record from its field values.
    ///
    /// `null` values leave the field unset. Field names the wire schema
    /// does not know fail with [`FileError::Field`].
    pub fn from_mapping(fields: Map<String, Value>) -> Result<Self> {
        let proto: proto::File = proto::from_fields(fields)?;
        Ok(Self::new(proto))
    }

    /// Use `client` instead of the process-wide default for [`delete`].
    ///
    /// [`delete`]: FileHandle::delete
    pub fn with_client(mut self, client: Arc<dyn FileClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// The underlying record, as the same reference the handle holds.
    pub fn to_proto(&self) -> &Arc<proto::File> {
        &self.proto
    }

    pub fn name(&self) -> &str {
        &self.proto.name
    }

    pub fn display_name(&self) -> &str {
        &self.proto.display_name
    }

    pub fn mime_type(&self) -> &str {
        &self.proto.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.proto.size_bytes
    }

    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.proto.create_time
    }

    pub fn update_time(&self) -> Option<DateTime<Utc>> {
        self.proto.update_time
    }

    pub fn expiration_time(&self) -> Option<DateTime<Utc>> {
        self.proto.expiration_time
    }

    pub fn sha256_hash(&self) -> &[u8] {
        &self.proto.sha256_hash
    }

    pub fn uri(&self) -> &str {
        &self.proto.uri
    }

    pub fn state(&self) -> State {
        self.proto.state
    }

    /// Delete this file on the server.
    ///
    /// Errors of the client are returned as they are, there is no retry.
    pub fn delete(&self) -> std::result::Result<(), ClientError> {
        let client = match &self.client {
            Some(client) => Arc::clone(client),
            None => default_file_client()?,
        };
        log::debug!("Deleting file {}", self.name());
        client.delete_file(self.name())
    }
}

impl From<proto::File> for FileHandle {
    fn from(proto: proto::File) -> Self {
        Self::new(proto)
    }
}

impl From<Arc<proto::File>> for FileHandle {
    fn from(proto: Arc<proto::File>) -> Self {
        Self::new(proto)
    }
}

impl TryFrom<Map<String, Value>> for FileHandle {
    type Error = FileError;

    fn try_from(fields: Map<String, Value>) -> Result<Self> {
        Self::from_mapping(fields)
    }
}

impl TryFrom<Value> for FileHandle {
    type Error = FileError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Self::from_mapping(fields),
            other => {
                Err(FileError::shape(json_type_name(&other), "FileHandle"))
            }
        }
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.proto == other.proto
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileHandle").field(&self.proto).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::TimeZone;
    use quickcheck_macros::quickcheck;
    use serde_json::json;

    /// Records every deletion and answers with a canned result.
    #[derive(Default)]
    struct RecordingClient {
        deleted: Mutex<Vec<String>>,
        missing: bool,
    }

    impl FileClient for RecordingClient {
        fn delete_file(
            &self,
            name: &str,
        ) -> std::result::Result<(), ClientError> {
            self.deleted.lock().unwrap().push(name.to_owned());
            if self.missing {
                Err(ClientError::NotFound(name.to_owned()))
            } else {
                Ok(())
            }
        }
    }

    fn sample() -> proto::File {
        proto::File {
            name: "files/abc".to_owned(),
            display_name: "Quarterly report".to_owned(),
            mime_type: "application/pdf".to_owned(),
            size_bytes: 4096,
            create_time: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).single(),
            update_time: Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).single(),
            expiration_time: Utc
                .with_ymd_and_hms(2024, 3, 3, 10, 0, 0)
                .single(),
            sha256_hash: vec![0xde, 0xad, 0xbe, 0xef],
            uri: "https://example.com/v1beta/files/abc".to_owned(),
            state: State::new(2),
        }
    }

    #[quickcheck]
    fn accessors_read_the_record(file: proto::File) -> bool {
        let handle = FileHandle::new(file.clone());

        handle.name() == file.name
            && handle.display_name() == file.display_name
            && handle.mime_type() == file.mime_type
            && handle.size_bytes() == file.size_bytes
            && handle.create_time() == file.create_time
            && handle.update_time() == file.update_time
            && handle.expiration_time() == file.expiration_time
            && handle.sha256_hash() == file.sha256_hash.as_slice()
            && handle.uri() == file.uri
            && handle.state() == file.state
    }

    #[test]
    fn to_proto_is_the_same_record() {
        let proto = Arc::new(sample());
        let handle = FileHandle::from(Arc::clone(&proto));

        assert!(Arc::ptr_eq(handle.to_proto(), &proto));
        assert_eq!(**handle.to_proto(), sample());
    }

    #[test]
    fn handle_from_handle_shares_the_record() {
        let first = FileHandle::new(sample());
        let second = FileHandle::from_handle(&first);

        assert!(Arc::ptr_eq(first.to_proto(), second.to_proto()));
        assert_eq!(first, second);
    }

    #[test]
    fn handle_from_mapping() {
        let value = json!({
            "name": "files/1",
            "mime_type": "text/plain",
            "uri": "gs://x",
            "state": 1,
        });
        let handle = FileHandle::try_from(value).unwrap();

        assert_eq!(handle.name(), "files/1");
        assert_eq!(handle.mime_type(), "text/plain");
        assert_eq!(handle.uri(), "gs://x");
        assert_eq!(handle.state().value(), 1);
        assert_eq!(handle.size_bytes(), 0);
    }

    #[test]
    fn null_in_mapping_leaves_field_unset() {
        let value = json!({ "name": "files/1", "size_bytes": null });
        let handle = FileHandle::try_from(value).unwrap();

        assert_eq!(handle.name(), "files/1");
        assert_eq!(handle.size_bytes(), 0);
    }

    #[test]
    fn unknown_field_in_mapping() {
        let value = json!({ "name": "files/1", "colour": "blue" });
        let err = FileHandle::try_from(value).unwrap_err();
        assert!(matches!(err, FileError::Field(_)));
    }

    #[test]
    fn mapping_must_be_an_object() {
        let err = FileHandle::try_from(json!(["files/1"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not convert value of type array to `FileHandle`"
        );
    }

    #[test_log::test]
    fn delete_calls_the_client_once() {
        let client = Arc::new(RecordingClient::default());
        let handle = FileHandle::new(sample()).with_client(client.clone());

        handle.delete().unwrap();

        assert_eq!(*client.deleted.lock().unwrap(), vec!["files/abc"]);
        // The handle still describes the deleted file.
        assert_eq!(handle.name(), "files/abc");
    }

    #[test]
    fn handle_from_handle_deletes_through_the_same_client() {
        let client = Arc::new(RecordingClient::default());
        let first = FileHandle::new(sample()).with_client(client.clone());
        let second = FileHandle::from_handle(&first);

        second.delete().unwrap();

        assert_eq!(*client.deleted.lock().unwrap(), vec!["files/abc"]);
    }

    #[test]
    fn delete_error_is_passed_through() {
        let client = Arc::new(RecordingClient {
            missing: true,
            ..Default::default()
        });
        let handle = FileHandle::new(sample()).with_client(client.clone());

        let err = handle.delete().unwrap_err();

        assert!(matches!(
            err,
            ClientError::NotFound(ref name) if name == "files/abc"
        ));
        assert_eq!(client.deleted.lock().unwrap().len(), 1);
    }
}
