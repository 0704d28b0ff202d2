#![deny(missing_docs)]

//! # Loading and Saving
//!
//! Every loader decodes, then resolves local references, as one step. YAML is a
//! front end only: the text is read into a YAML tree, converted to a JSON value
//! and then decoded exactly like JSON input, so both formats share the strict
//! member checks of the model.
//!
//! Validation is never run by the loaders. Call
//! [`Validate::validate`](crate::oas::Validate::validate) on the result.

use crate::error::{AppError, AppResult};
use crate::oas::Document;
use crate::resolver::registry::Registry;
use crate::resolver::resolve_document;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Input format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON text.
    Json,
    /// YAML text.
    Yaml,
}

impl Format {
    /// Guesses the format from the first non-whitespace byte: `{` is JSON,
    /// anything else YAML. `None` when there is no such byte.
    pub fn detect(data: &[u8]) -> Option<Format> {
        data.iter()
            .find(|b| !b.is_ascii_whitespace())
            .map(|b| Format::from_first_byte(*b))
    }

    fn from_first_byte(byte: u8) -> Format {
        if byte == b'{' {
            Format::Json
        } else {
            Format::Yaml
        }
    }

    /// Format implied by a file name (`.json`, `.yaml`, `.yml`).
    pub fn from_path(path: &Path) -> AppResult<Format> {
        match extension(path).as_str() {
            ".json" => Ok(Format::Json),
            ".yaml" | ".yml" => Ok(Format::Yaml),
            other => Err(AppError::UnknownExtension(other.to_string())),
        }
    }
}

/// Output settings for the JSON savers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    /// Spaces per nesting level. `0` writes compact JSON on one line.
    pub indent: usize,
    /// Whether to end the output with `\n`.
    pub trailing_newline: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            trailing_newline: false,
        }
    }
}

/// Extension including the dot (`.json`), or an empty string.
fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn finish(mut doc: Document) -> AppResult<(Document, Registry)> {
    let registry = resolve_document(&mut doc).map_err(AppError::Resolve)?;
    Ok((doc, registry))
}

/// Converts a YAML tree to the JSON value model. Scalar keys are stringified so
/// unquoted status codes (`200:`) keep working.
fn yaml_to_json(value: serde_yaml::Value) -> AppResult<Value> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => yaml_number(&n)?,
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<AppResult<Vec<_>>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> AppResult<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| AppError::General(format!("YAML number {n} has no JSON representation")))
}

fn yaml_key(key: serde_yaml::Value) -> AppResult<String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(AppError::General(format!(
            "unsupported YAML mapping key: {other:?}"
        ))),
    }
}

fn decode_json_value(value: Value) -> AppResult<Document> {
    if value.is_null() {
        return Err(AppError::EmptyInput);
    }
    Ok(serde_json::from_value(value)?)
}

/// Decodes and resolves a JSON document, returning the reference registry too.
pub fn load_from_json_with_registry(data: &[u8]) -> AppResult<(Document, Registry)> {
    log::debug!("decoding JSON document ({} bytes)", data.len());
    let doc: Document = serde_json::from_slice(data)?;
    finish(doc)
}

/// Decodes and resolves a YAML document, returning the reference registry too.
pub fn load_from_yaml_with_registry(data: &[u8]) -> AppResult<(Document, Registry)> {
    log::debug!("decoding YAML document ({} bytes)", data.len());
    let tree: serde_yaml::Value = serde_yaml::from_slice(data)?;
    finish(decode_json_value(yaml_to_json(tree)?)?)
}

/// Detects the format of `data`, then decodes and resolves it.
pub fn load_from_data_with_registry(data: &[u8]) -> AppResult<(Document, Registry)> {
    match Format::detect(data).ok_or(AppError::EmptyInput)? {
        Format::Json => load_from_json_with_registry(data),
        Format::Yaml => load_from_yaml_with_registry(data),
    }
}

/// Reads up to and including the first non-whitespace byte.
fn read_prefix<R: Read>(reader: &mut R) -> AppResult<(Vec<u8>, Format)> {
    let mut prefix = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Err(AppError::EmptyInput),
            Ok(_) => {
                prefix.push(byte[0]);
                if !byte[0].is_ascii_whitespace() {
                    return Ok((prefix, Format::from_first_byte(byte[0])));
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Detects the format from the head of the stream, then decodes the buffered
/// head followed by the rest of the stream.
pub fn load_from_reader_with_registry<R: Read>(mut reader: R) -> AppResult<(Document, Registry)> {
    let (prefix, format) = read_prefix(&mut reader)?;
    let replay = io::Cursor::new(prefix).chain(reader);

    let doc = match format {
        Format::Json => {
            log::debug!("decoding JSON document from stream");
            serde_json::from_reader::<_, Document>(replay)?
        }
        Format::Yaml => {
            log::debug!("decoding YAML document from stream");
            let tree: serde_yaml::Value = serde_yaml::from_reader(replay)?;
            decode_json_value(yaml_to_json(tree)?)?
        }
    };
    finish(doc)
}

/// Opens `path` and loads it according to its extension.
pub fn load_from_file_with_registry(path: impl AsRef<Path>) -> AppResult<(Document, Registry)> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let format = Format::from_path(path)?;
    log::debug!("loading {}", path.display());

    let mut data = Vec::new();
    BufReader::new(file).read_to_end(&mut data)?;
    match format {
        Format::Json => load_from_json_with_registry(&data),
        Format::Yaml => load_from_yaml_with_registry(&data),
    }
}

/// Decodes and resolves a JSON document.
pub fn load_from_json(data: &[u8]) -> AppResult<Document> {
    load_from_json_with_registry(data).map(|(doc, _)| doc)
}

/// Decodes and resolves a YAML document.
pub fn load_from_yaml(data: &[u8]) -> AppResult<Document> {
    load_from_yaml_with_registry(data).map(|(doc, _)| doc)
}

/// Decodes and resolves a JSON or YAML document, detecting the format.
pub fn load_from_data(data: &[u8]) -> AppResult<Document> {
    load_from_data_with_registry(data).map(|(doc, _)| doc)
}

/// Decodes and resolves a JSON or YAML document read from a stream.
pub fn load_from_reader<R: Read>(reader: R) -> AppResult<Document> {
    load_from_reader_with_registry(reader).map(|(doc, _)| doc)
}

/// Loads a `.json`, `.yaml` or `.yml` file.
pub fn load_from_file(path: impl AsRef<Path>) -> AppResult<Document> {
    load_from_file_with_registry(path).map(|(doc, _)| doc)
}

impl Document {
    /// Writes the document as JSON. References are written as `$ref` objects.
    pub fn write_json<W: Write>(&self, mut writer: W, options: &CodecOptions) -> AppResult<()> {
        if options.indent == 0 {
            serde_json::to_writer(&mut writer, self)?;
        } else {
            let indent = vec![b' '; options.indent];
            let mut ser =
                serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(&indent));
            self.serialize(&mut ser)?;
        }
        if options.trailing_newline {
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// The document as JSON text.
    pub fn to_json(&self, options: &CodecOptions) -> AppResult<String> {
        let mut out = Vec::new();
        self.write_json(&mut out, options)?;
        String::from_utf8(out).map_err(|e| AppError::General(e.to_string()))
    }

    /// The document as YAML text.
    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Saves the document as JSON, creating missing parent directories. Only the
    /// `.json` extension is accepted.
    pub fn write_to_file(&self, path: impl AsRef<Path>, options: &CodecOptions) -> AppResult<()> {
        let path = path.as_ref();
        let ext = extension(path);
        if ext != ".json" {
            return Err(AppError::UnsupportedExtension(ext));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer, options)?;
        writer.flush()?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}
