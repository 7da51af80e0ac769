#[cfg(test)]
mod tests {
    use data_file::{
        proto, set_default_file_client, to_file_data, ClientError,
        FileClient, FileData, FileHandle,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct RecordingClient {
        deleted: Mutex<Vec<String>>,
    }

    impl FileClient for RecordingClient {
        fn delete_file(&self, name: &str) -> Result<(), ClientError> {
            self.deleted.lock().unwrap().push(name.to_owned());
            match name {
                "files/gone" => Err(ClientError::NotFound(name.to_owned())),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_file_handle_integration() -> anyhow::Result<()> {
        data_file::initialize();

        let client = Arc::new(RecordingClient {
            deleted: Mutex::new(Vec::new()),
        });
        assert!(set_default_file_client(client.clone()));
        assert!(!set_default_file_client(client.clone()));

        let handle = FileHandle::try_from(json!({
            "name": "files/abc",
            "display_name": "Holiday photo",
            "mime_type": "image/jpeg",
            "size_bytes": 524288,
            "create_time": "2024-05-01T08:30:00Z",
            "sha256_hash": "3q2+7w==",
            "uri": "https://example.com/v1beta/files/abc",
            "state": 2,
        }))?;

        let file_data = to_file_data(&handle)?;
        assert_eq!(
            file_data,
            FileData::new("image/jpeg", "https://example.com/v1beta/files/abc")
        );

        let copy = FileHandle::from_handle(&handle);
        assert_eq!(to_file_data(copy)?, file_data);

        handle.delete()?;
        assert_eq!(*client.deleted.lock().unwrap(), vec!["files/abc"]);

        let gone = FileHandle::new(proto::File {
            name: "files/gone".to_owned(),
            ..Default::default()
        });
        let err = gone.delete().unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(client.deleted.lock().unwrap().len(), 2);

        Ok(())
    }
}
