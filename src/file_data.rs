//! Normalization of the different ways a caller can point at uploaded
//! file data.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::file::FileHandle;
use crate::proto::{self, FileData};
use crate::{FileError, Result};

/// Key that marks a mapping as an already reference-shaped value.
const FILE_URI_KEY: &str = "file_uri";

/// Anything [`to_file_data`] accepts.
#[derive(Clone, Debug)]
pub enum FileDataType {
    /// Untyped field values: a [`FileData`] if they contain `file_uri`,
    /// a full [`proto::File`] otherwise.
    Mapping(Map<String, Value>),
    Handle(FileHandle),
    File(Arc<proto::File>),
    FileData(FileData),
    /// A dynamic value of no accepted shape.
    Unsupported(Value),
}

impl From<Map<String, Value>> for FileDataType {
    fn from(fields: Map<String, Value>) -> Self {
        Self::Mapping(fields)
    }
}

impl From<Value> for FileDataType {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::Mapping(fields),
            other => Self::Unsupported(other),
        }
    }
}

impl From<FileHandle> for FileDataType {
    fn from(handle: FileHandle) -> Self {
        Self::Handle(handle)
    }
}

impl From<&FileHandle> for FileDataType {
    fn from(handle: &FileHandle) -> Self {
        Self::Handle(handle.clone())
    }
}

impl From<proto::File> for FileDataType {
    fn from(file: proto::File) -> Self {
        Self::File(Arc::new(file))
    }
}

impl From<Arc<proto::File>> for FileDataType {
    fn from(file: Arc<proto::File>) -> Self {
        Self::File(file)
    }
}

impl From<FileData> for FileDataType {
    fn from(file_data: FileData) -> Self {
        Self::FileData(file_data)
    }
}

/// Turn any accepted shape into a [`FileData`].
///
/// Shapes are narrowed one step at a time: a mapping becomes a
/// [`FileData`] or a [`proto::File`], a handle becomes its record, and a
/// record is projected to its MIME type and URI. Everything else about
/// the record is dropped.
pub fn to_file_data(file_data: impl Into<FileDataType>) -> Result<FileData> {
    let mut shape = file_data.into();
    loop {
        shape = match shape {
            FileDataType::Mapping(fields) => {
                let reference = fields.contains_key(FILE_URI_KEY);
                log::trace!(
                    "Mapping with {} fields, reference: {}",
                    fields.len(),
                    reference
                );
                if reference {
                    FileDataType::FileData(proto::from_fields(fields)?)
                } else {
                    let file: proto::File = proto::from_fields(fields)?;
                    FileDataType::File(Arc::new(file))
                }
            }
            FileDataType::Handle(handle) => {
                log::trace!("Unwrapping handle of {}", handle.name());
                FileDataType::File(Arc::clone(handle.to_proto()))
            }
            FileDataType::File(file) => {
                log::trace!("Projecting record {}", file.name);
                FileDataType::FileData(FileData {
                    mime_type: file.mime_type.clone(),
                    file_uri: file.uri.clone(),
                })
            }
            FileDataType::FileData(file_data) => return Ok(file_data),
            FileDataType::Unsupported(value) => {
                return Err(FileError::shape(
                    json_type_name(&value),
                    "FileData",
                ))
            }
        }
    }
}

/// Name of the runtime type of a JSON value, as reported in shape errors.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
