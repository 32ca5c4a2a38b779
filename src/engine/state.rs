use serde::{Deserialize, Serialize};

/// Lifecycle of one node instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Created,
    Negotiated,
    Open,
    /// The node asked to be retired; only `close` remains.
    Stopped,
    Failed,
    Closed,
}

impl NodeState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &NodeState) -> bool {
        use NodeState::*;

        matches!(
            (self, target),
            (Created, Negotiated) |
            (Created, Failed) |

            (Negotiated, Open) |
            (Negotiated, Failed) |
            (Negotiated, Closed) |

            (Open, Stopped) |
            (Open, Failed) |
            (Open, Closed) |

            (Stopped, Closed) |
            (Failed, Closed)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Negotiated => "Negotiated",
            Self::Open => "Open",
            Self::Stopped => "Stopped",
            Self::Failed => "Failed",
            Self::Closed => "Closed",
        }
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::Created
    }
}
