use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdeaError;

/// Output shape requested by the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 5-10 numbered ideas on a topic.
    #[default]
    List,
    /// One idea with three implementation steps.
    Single,
    /// One idea from a random (or category-constrained) domain.
    Random,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::List => "list",
            Mode::Single => "single",
            Mode::Random => "random",
        }
    }

    /// Heading shown above a finished result.
    pub fn result_title(&self) -> &'static str {
        match self {
            Mode::List => "Ваши идеи",
            Mode::Single | Mode::Random => "Ваша идея",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = IdeaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(Mode::List),
            "single" => Ok(Mode::Single),
            "random" => Ok(Mode::Random),
            other => Err(IdeaError::InvalidRequest(format!("unknown mode: {other}"))),
        }
    }
}

/// Optional domain hint for random-mode generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tech,
    Business,
    Creative,
    Science,
    Lifestyle,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Tech,
        Category::Business,
        Category::Creative,
        Category::Science,
        Category::Lifestyle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tech => "tech",
            Category::Business => "business",
            Category::Creative => "creative",
            Category::Science => "science",
            Category::Lifestyle => "lifestyle",
        }
    }

    /// Localized domain name used in prompts and history labels.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Tech => "технологии",
            Category::Business => "бизнес",
            Category::Creative => "творчество",
            Category::Science => "наука",
            Category::Lifestyle => "повседневная жизнь",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = IdeaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| IdeaError::InvalidRequest(format!("unknown category: {s}")))
    }
}

/// Body of a generation request, as sent by the client and read by the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GenerationRequest {
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl GenerationRequest {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            topic: None,
            category: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Topic with surrounding whitespace removed, if any remains.
    pub fn trimmed_topic(&self) -> Option<&str> {
        self.topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Non-random requests need a non-blank topic.
    pub fn validate(&self) -> Result<(), IdeaError> {
        if self.mode != Mode::Random && self.trimmed_topic().is_none() {
            return Err(IdeaError::EmptyTopic);
        }
        Ok(())
    }

    /// The wire form: random mode carries only its category, the other modes
    /// only their trimmed topic.
    pub fn normalized(&self) -> Self {
        match self.mode {
            Mode::Random => Self {
                mode: Mode::Random,
                topic: None,
                category: self.category,
            },
            mode => Self {
                mode,
                topic: self.trimmed_topic().map(str::to_string),
                category: None,
            },
        }
    }
}

/// A finished generation kept in the session history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub topic: String,
    pub mode: Mode,
    pub result: String,
    pub category: Option<Category>,
}

impl HistoryEntry {
    /// Build an entry for a completed request. Random requests without a topic
    /// are labelled by their category, or generically.
    pub fn from_request(request: &GenerationRequest, result: impl Into<String>) -> Self {
        let topic = match (request.trimmed_topic(), request.category) {
            (Some(topic), _) => topic.to_string(),
            (None, Some(category)) => format!("Случайная идея: {}", category.label()),
            (None, None) => "Случайная идея".to_string(),
        };
        Self {
            topic,
            mode: request.mode,
            result: result.into(),
            category: request.category,
        }
    }
}
