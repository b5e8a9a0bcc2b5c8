use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of artifact an addon or project contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Component,
    RoutePath,
    Helper,
    Modifier,
    Model,
    Service,
    Transform,
}

/// Editor-facing classification attached to a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionKind {
    Class,
    Function,
    File,
}

/// Record emitted for every artifact a scan discovers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    pub kind: CompletionKind,
    pub label: String,
    pub detail: String,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 7] = [
        ArtifactKind::Component,
        ArtifactKind::RoutePath,
        ArtifactKind::Helper,
        ArtifactKind::Modifier,
        ArtifactKind::Model,
        ArtifactKind::Service,
        ArtifactKind::Transform,
    ];

    /// Label used as the descriptor `detail`
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Component => "component",
            ArtifactKind::RoutePath => "route",
            ArtifactKind::Helper => "helper",
            ArtifactKind::Modifier => "modifier",
            ArtifactKind::Model => "model",
            ArtifactKind::Service => "service",
            ArtifactKind::Transform => "transform",
        }
    }

    /// Stable identifier, also accepted by `FromStr`
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Component => "component",
            ArtifactKind::RoutePath => "route-path",
            ArtifactKind::Helper => "helper",
            ArtifactKind::Modifier => "modifier",
            ArtifactKind::Model => "model",
            ArtifactKind::Service => "service",
            ArtifactKind::Transform => "transform",
        }
    }

    /// Conventional top-level folder (`app/<folder>`, `addon/<folder>`).
    ///
    /// Route paths are spread over several folders and have none.
    pub fn folder(&self) -> Option<&'static str> {
        match self {
            ArtifactKind::Component => Some("components"),
            ArtifactKind::RoutePath => None,
            ArtifactKind::Helper => Some("helpers"),
            ArtifactKind::Modifier => Some("modifiers"),
            ArtifactKind::Model => Some("models"),
            ArtifactKind::Service => Some("services"),
            ArtifactKind::Transform => Some("transforms"),
        }
    }

    pub fn completion_kind(&self) -> CompletionKind {
        match self {
            ArtifactKind::Component | ArtifactKind::Model | ArtifactKind::Service => {
                CompletionKind::Class
            }
            ArtifactKind::Helper | ArtifactKind::Modifier | ArtifactKind::Transform => {
                CompletionKind::Function
            }
            ArtifactKind::RoutePath => CompletionKind::File,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "component" => Ok(ArtifactKind::Component),
            "route-path" | "routePath" | "route" => Ok(ArtifactKind::RoutePath),
            "helper" => Ok(ArtifactKind::Helper),
            "modifier" => Ok(ArtifactKind::Modifier),
            "model" => Ok(ArtifactKind::Model),
            "service" => Ok(ArtifactKind::Service),
            "transform" => Ok(ArtifactKind::Transform),
            _ => Err("Unknown artifact kind"),
        }
    }
}

impl Descriptor {
    pub fn new(kind: ArtifactKind, label: impl Into<String>) -> Self {
        Self {
            kind: kind.completion_kind(),
            label: label.into(),
            detail: kind.label().to_string(),
        }
    }
}
