//! Wire-form messages of the file service.
//!
//! These mirror the generated schema: every field is optional on the
//! wire and falls back to its zero value, and field names the schema
//! does not know are rejected.

use chrono::{DateTime, Utc};
use serde::{de, de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// A file record as reported by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct File {
    /// Server-assigned unique identifier, e.g. `files/abc-123`.
    pub name: String,
    /// User-assigned label.
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub expiration_time: Option<DateTime<Utc>>,
    #[serde(with = "base64_bytes")]
    pub sha256_hash: Vec<u8>,
    /// Canonical retrieval address of the file contents.
    pub uri: String,
    pub state: State,
}

/// Reference to uploaded file data, without any of its metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

impl FileData {
    pub fn new(
        mime_type: impl Into<String>,
        file_uri: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            file_uri: file_uri.into(),
        }
    }
}

/// Processing state of a file.
///
/// The numeric tag is passed through exactly as the server sent it;
/// `0` is the unspecified state.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct State(i32);

impl State {
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for State {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Build a message from untyped field values.
///
/// A `null` value means the field is unset, so it keeps its zero value.
/// The field name must still be known to the message.
pub(crate) fn from_fields<T>(
    fields: Map<String, Value>,
) -> serde_json::Result<T>
where
    T: DeserializeOwned + Serialize + Default,
{
    let (unset, set): (Map<String, Value>, Map<String, Value>) =
        fields.into_iter().partition(|(_, value)| value.is_null());

    if !unset.is_empty() {
        let known = serde_json::to_value(T::default())?;
        let unknown =
            unset.keys().find(|key| known.get(key.as_str()).is_none());
        if let Some(key) = unknown {
            return Err(de::Error::custom(format!("unknown field `{}`", key)));
        }
    }

    serde_json::from_value(Value::Object(set))
}

/// Bytes fields travel as standard base64 strings in JSON.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &[u8],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(de::Error::custom)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for File {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        use chrono::TimeZone;
        use quickcheck::Arbitrary;

        // Keep timestamps inside the range RFC 3339 can express.
        let time = |g: &mut quickcheck::Gen| {
            Option::<u32>::arbitrary(g)
                .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single())
        };

        Self {
            name: String::arbitrary(g),
            display_name: String::arbitrary(g),
            mime_type: String::arbitrary(g),
            size_bytes: u64::arbitrary(g),
            create_time: time(g),
            update_time: time(g),
            expiration_time: time(g),
            sha256_hash: Vec::arbitrary(g),
            uri: String::arbitrary(g),
            state: State(i32::arbitrary(g)),
        }
    }
}
