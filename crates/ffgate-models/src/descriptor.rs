//! Pipeline descriptors: declarative description of one job kind.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::MediaRole;

/// Processing strategy a descriptor dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// One input through the descriptor's option vector
    Transcode,
    /// Two role-resolved inputs combined into one output
    Compose,
    /// Letterboxed normalize of every clip, then concatenation
    SimpleCompilation,
    /// Blur-padded normalize of every clip, then concatenation
    BlurCompilation,
    /// Probe every input and report cumulative chapter timestamps
    Timestamps,
    /// Probe one input and report its duration
    Probe,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Transcode => "transcode",
            JobKind::Compose => "compose",
            JobKind::SimpleCompilation => "simple_compilation",
            JobKind::BlurCompilation => "blur_compilation",
            JobKind::Timestamps => "timestamps",
            JobKind::Probe => "probe",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many inputs a job kind accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "roles", rename_all = "snake_case")]
pub enum Arity {
    ExactlyOne,
    /// One input per listed role
    ExactlyN(Vec<MediaRole>),
    AtLeastTwo,
    /// Any non-zero count
    Unbounded,
}

impl Arity {
    /// Check whether `count` inputs satisfy this arity.
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::ExactlyOne => count == 1,
            Arity::ExactlyN(roles) => count == roles.len(),
            Arity::AtLeastTwo => count >= 2,
            Arity::Unbounded => count >= 1,
        }
    }

    /// Upper bound on files accepted during ingestion.
    pub fn max_files(&self, unbounded_cap: usize) -> usize {
        match self {
            Arity::ExactlyOne => 1,
            Arity::ExactlyN(roles) => roles.len(),
            Arity::AtLeastTwo | Arity::Unbounded => unbounded_cap,
        }
    }

    pub fn required_roles(&self) -> &[MediaRole] {
        match self {
            Arity::ExactlyN(roles) => roles,
            _ => &[],
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::ExactlyOne => write!(f, "exactly 1"),
            Arity::ExactlyN(roles) => {
                let names: Vec<&str> = roles.iter().map(MediaRole::as_str).collect();
                write!(f, "exactly {} ({})", roles.len(), names.join(", "))
            }
            Arity::AtLeastTwo => write!(f, "at least 2"),
            Arity::Unbounded => write!(f, "at least 1"),
        }
    }
}

/// Declarative specification of how a job kind transforms its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDescriptor {
    /// Endpoint id (e.g. `mp4`, `audio-image-mp4`)
    pub id: String,
    /// Extension of the produced artifact, without the dot
    pub output_extension: String,
    /// Ordered engine options, each `"-flag value"` or a bare `"-flag"`
    pub engine_options: Vec<String>,
    pub arity: Arity,
    pub kind: JobKind,
    /// Whether inputs may be fetched by URL instead of uploaded
    pub url_input_allowed: bool,
}

impl PipelineDescriptor {
    pub fn new(id: impl Into<String>, output_extension: impl Into<String>, kind: JobKind, arity: Arity) -> Self {
        Self {
            id: id.into(),
            output_extension: output_extension.into(),
            engine_options: Vec::new(),
            arity,
            kind,
            url_input_allowed: false,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engine_options.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn allow_url_input(mut self) -> Self {
        self.url_input_allowed = true;
        self
    }
}
