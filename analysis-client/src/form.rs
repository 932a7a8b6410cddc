use crate::error::{Result, SubmitError};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::fs;
use std::path::Path;

/// One named entry of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Bytes,
    },
}

impl FormField {
    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }

    /// Parse a command line field, `name=value` or `name=@path`.
    pub fn from_arg(arg: &str) -> Result<FormField> {
        let (name, value) = arg
            .split_once('=')
            .ok_or_else(|| SubmitError::InvalidField(arg.to_owned()))?;
        if name.is_empty() {
            return Err(SubmitError::InvalidField(arg.to_owned()));
        }
        match value.strip_prefix('@') {
            Some(path) if !path.is_empty() => FormField::file_from_path(name, Path::new(path)),
            Some(_) => Err(SubmitError::InvalidField(arg.to_owned())),
            None => Ok(FormField::Text {
                name: name.to_owned(),
                value: value.to_owned(),
            }),
        }
    }

    pub fn file_from_path(name: &str, path: &Path) -> Result<FormField> {
        let bytes = fs::read(path).map_err(|source| SubmitError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // Get filename, ex: prices.csv
        let file_name = path
            .file_name()
            .map(|file_name| file_name.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_owned());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        Ok(FormField::File {
            name: name.to_owned(),
            file_name,
            content_type,
            bytes: Bytes::from(bytes),
        })
    }
}

/// Snapshot of every field of a form at the moment it was submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<FormField>,
}

impl FormData {
    pub fn new() -> FormData {
        FormData::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> FormData {
        self.fields.push(FormField::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> FormData {
        self.fields.push(FormField::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        });
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn from_args<I, S>(args: I) -> Result<FormData>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = args
            .into_iter()
            .map(|arg| FormField::from_arg(arg.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(FormData { fields })
    }

    /// Encode as a multipart body, one part per field in form order.
    pub fn into_multipart(self) -> Result<Form> {
        let mut request = Form::new();
        for field in self.fields {
            request = match field {
                FormField::Text { name, value } => request.text(name, value),
                FormField::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let native_bytes: &[u8] = bytes.as_ref();
                    let part: Part = Part::bytes(native_bytes.to_owned())
                        .file_name(file_name)
                        .mime_str(&content_type)?;
                    request.part(name, part)
                }
            };
        }
        Ok(request)
    }
}
