use crate::host::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while building anchors or loading configuration.
pub enum AnchorError {
    #[error("node {0:?} is not known to the host")]
    /// The host has no layout information for this node (it was removed or never existed).
    NodeNotFound(NodeId),

    #[error("node {node:?} is not inside editor root {root:?}")]
    /// An ancestor walk started from a node outside the editor root.
    NotInsideRoot {
        /// The node the walk started from.
        node: NodeId,
        /// The editor root it was expected to live under.
        root: NodeId,
    },

    #[error("invalid anchor configuration: {0}")]
    /// Configuration JSON could not be parsed.
    InvalidConfig(#[from] serde_json::Error),
}
