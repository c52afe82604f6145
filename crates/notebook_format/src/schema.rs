use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Major format version this crate reads and writes.
pub const NBFORMAT: u32 = 4;
/// Minor format version written on new notebooks (cell ids are required from 4.5).
pub const NBFORMAT_MINOR: u32 = 5;

pub type Metadata = Map<String, Value>;

/// Text stored either as one string or as a list of lines.
///
/// Reads both shapes; always writes a list of lines that keep their `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultilineString(String);

impl MultilineString {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MultilineString {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for MultilineString {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl Serialize for MultilineString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.split_inclusive('\n'))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MultilineRepr {
    Single(String),
    Lines(Vec<String>),
}

impl<'de> Deserialize<'de> for MultilineString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match MultilineRepr::deserialize(deserializer)? {
            MultilineRepr::Single(text) => Self(text),
            MultilineRepr::Lines(lines) => Self(lines.concat()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Metadata,
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
}

impl Notebook {
    /// Empty notebook at the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            metadata: Metadata::new(),
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
        }
    }

    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "snake_case")]
pub enum Cell {
    Markdown(TextCell),
    Code(CodeCell),
    Raw(TextCell),
}

impl Cell {
    /// New markdown cell with a fresh id.
    #[must_use]
    pub fn markdown(source: impl Into<String>) -> Self {
        Self::Markdown(TextCell {
            id: Some(new_cell_id()),
            metadata: Metadata::new(),
            source: MultilineString::new(source),
            attachments: None,
        })
    }

    /// New code cell with a fresh id and no execution count.
    #[must_use]
    pub fn code(source: impl Into<String>, outputs: Vec<Output>) -> Self {
        Self::Code(CodeCell {
            id: Some(new_cell_id()),
            metadata: Metadata::new(),
            source: MultilineString::new(source),
            execution_count: None,
            outputs,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Markdown(cell) | Self::Raw(cell) => cell.source.as_str(),
            Self::Code(cell) => cell.source.as_str(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Markdown(cell) | Self::Raw(cell) => cell.id.as_deref(),
            Self::Code(cell) => cell.id.as_deref(),
        }
    }

    #[must_use]
    pub fn cell_type(&self) -> &'static str {
        match self {
            Self::Markdown(_) => "markdown",
            Self::Code(_) => "code",
            Self::Raw(_) => "raw",
        }
    }
}

/// Markdown or raw cell body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub source: MultilineString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub source: MultilineString,
    #[serde(default)]
    pub execution_count: Option<u32>,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamName {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        name: StreamName,
        text: MultilineString,
    },
    ExecuteResult {
        #[serde(default)]
        execution_count: Option<u32>,
        #[serde(default)]
        data: Metadata,
        #[serde(default)]
        metadata: Metadata,
    },
    DisplayData {
        #[serde(default)]
        data: Metadata,
        #[serde(default)]
        metadata: Metadata,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

impl Output {
    #[must_use]
    pub fn stdout(text: impl Into<String>) -> Self {
        Self::Stream {
            name: StreamName::Stdout,
            text: MultilineString::new(text),
        }
    }

    /// Raw text of a stream output.
    #[must_use]
    pub fn stream_text(&self) -> Option<&str> {
        match self {
            Self::Stream { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Fresh 8-hex-digit cell id.
#[must_use]
pub fn new_cell_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
