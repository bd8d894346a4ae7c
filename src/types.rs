use serde::{Deserialize, Serialize};

/// Opaque reference to a catalog image, typically its file path.
pub type ImageId = String;

/// A fixed-length feature vector produced by the upstream extractor.
pub type Embedding = Vec<f32>;

/// What to do when a query asks for more neighbors than the reference set holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KPolicy {
    /// Fail with `InsufficientData`.
    #[default]
    Reject,
    /// Return every reference item instead.
    Clamp,
}

impl std::fmt::Display for KPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KPolicy::Reject => write!(f, "reject"),
            KPolicy::Clamp => write!(f, "clamp"),
        }
    }
}

impl std::str::FromStr for KPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(KPolicy::Reject),
            "clamp" => Ok(KPolicy::Clamp),
            other => Err(format!("unknown k policy '{other}' (expected 'reject' or 'clamp')")),
        }
    }
}

/// One entry of a ranking result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: ImageId,
    /// Position of the matched item in the reference set.
    pub position: usize,
    /// Euclidean distance to the query.
    pub distance: f32,
}
