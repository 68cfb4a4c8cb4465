//! Error types for imscc2md operations.

use thiserror::Error;

/// Errors that can occur while unpacking or converting a package.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Missing required attribute `{attribute}` on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    #[error("Cannot decode document as {0}")]
    Decode(String),
}

impl Error {
    pub(crate) fn missing_element(name: impl Into<String>) -> Self {
        Error::MissingElement(name.into())
    }

    pub(crate) fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
