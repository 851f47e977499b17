/// Graph <-> canonical JSON text
///
/// Independent of storage and encryption. Decoding requires both the `nodes`
/// and `edges` arrays; unknown extra fields are ignored.

use crate::workflow::types::Graph;

#[derive(Debug, thiserror::Error)]
pub enum GraphCodecError {
    #[error("graph is not serializable: {0}")]
    Serialization(String),

    #[error("graph text could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encode a graph to its canonical text form
pub fn encode(graph: &Graph) -> Result<String, GraphCodecError> {
    // serde_json writes NaN/inf as `null`, which would not decode again
    if let Some(node) = graph.nodes.iter().find(|n| !n.position.is_finite()) {
        return Err(GraphCodecError::Serialization(format!(
            "node {} has a non-finite position",
            node.id
        )));
    }

    serde_json::to_string(graph).map_err(|e| GraphCodecError::Serialization(e.to_string()))
}

/// Decode text produced by [`encode`]
pub fn decode(text: &str) -> Result<Graph, GraphCodecError> {
    serde_json::from_str(text).map_err(GraphCodecError::Decode)
}
