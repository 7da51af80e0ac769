use thiserror::Error;

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Error, Debug)]
pub enum FileError {
    /// The value is none of the shapes `to_file_data` accepts.
    #[error("Could not convert value of type {type_name} to `{target}`")]
    Shape {
        type_name: String,
        target: &'static str,
    },
    /// Raised by the wire schema while building a record from a mapping,
    /// e.g. for a field name it does not know.
    #[error(transparent)]
    Field(#[from] serde_json::Error),
}

impl FileError {
    pub fn shape(type_name: impl Into<String>, target: &'static str) -> Self {
        Self::Shape {
            type_name: type_name.into(),
            target,
        }
    }
}
