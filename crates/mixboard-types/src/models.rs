use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// -- Roles --

/// Role stored on a collaborator grant. Ownership is never a grant; it lives
/// on the board row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaboratorRole {
    Editor,
    Viewer,
}

impl CollaboratorRole {
    pub const ALL: [CollaboratorRole; 2] = [CollaboratorRole::Editor, CollaboratorRole::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editor => "EDITOR",
            Self::Viewer => "VIEWER",
        }
    }
}

impl fmt::Display for CollaboratorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollaboratorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown collaborator role '{}'", s))
    }
}

/// Effective role of a caller against one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Editor,
    Viewer,
    None,
}

impl From<CollaboratorRole> for Role {
    fn from(role: CollaboratorRole) -> Self {
        match role {
            CollaboratorRole::Editor => Role::Editor,
            CollaboratorRole::Viewer => Role::Viewer,
        }
    }
}

// -- Elements --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementKind {
    Note,
    Todo,
    Image,
    Pdf,
    Link,
    CommentPin,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Note,
        ElementKind::Todo,
        ElementKind::Image,
        ElementKind::Pdf,
        ElementKind::Link,
        ElementKind::CommentPin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "NOTE",
            Self::Todo => "TODO",
            Self::Image => "IMAGE",
            Self::Pdf => "PDF",
            Self::Link => "LINK",
            Self::CommentPin => "COMMENT_PIN",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown element type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    Yellow,
    Blue,
    Pink,
    Green,
    Orange,
}

impl NoteColor {
    pub const ALL: [NoteColor; 5] = [
        NoteColor::Yellow,
        NoteColor::Blue,
        NoteColor::Pink,
        NoteColor::Green,
        NoteColor::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Pink => "pink",
            Self::Green => "green",
            Self::Orange => "orange",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteData {
    pub text: String,
    pub color: NoteColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<TodoItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub url: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfData {
    pub url: String,
    pub file_name: String,
    pub page_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPinData {
    pub thread_id: String,
    pub user_initial: String,
}

/// Element payload. The variant always agrees with the element's `type`
/// column; the `type` itself travels next to the payload, not inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ElementData {
    Note(NoteData),
    Todo(TodoData),
    Image(ImageData),
    Pdf(PdfData),
    Link(LinkData),
    CommentPin(CommentPinData),
}

impl ElementData {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Note(_) => ElementKind::Note,
            Self::Todo(_) => ElementKind::Todo,
            Self::Image(_) => ElementKind::Image,
            Self::Pdf(_) => ElementKind::Pdf,
            Self::Link(_) => ElementKind::Link,
            Self::CommentPin(_) => ElementKind::CommentPin,
        }
    }

    /// Decode a stored payload whose kind is already known.
    pub fn from_stored(kind: ElementKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            ElementKind::Note => Self::Note(serde_json::from_value(value)?),
            ElementKind::Todo => Self::Todo(serde_json::from_value(value)?),
            ElementKind::Image => Self::Image(serde_json::from_value(value)?),
            ElementKind::Pdf => Self::Pdf(serde_json::from_value(value)?),
            ElementKind::Link => Self::Link(serde_json::from_value(value)?),
            ElementKind::CommentPin => Self::CommentPin(serde_json::from_value(value)?),
        })
    }
}

// -- Audio analysis --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBands {
    pub sub_bass: f64,
    pub bass: f64,
    pub low_mids: f64,
    pub mids: f64,
    pub high_mids: f64,
    pub highs: f64,
}

/// Pre-computed loudness and spectral summary of a reference track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceAnalysis {
    pub filename: String,
    pub lufs_integrated: f64,
    pub true_peak: f64,
    pub frequency_bands: FrequencyBands,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum_data: Option<Vec<f64>>,
}
