/// Session-held graph editing state
///
/// One editor owns one mutable `Graph` for the lifetime of an editing session.
/// Change lists are applied in order; `save` pushes the whole current graph
/// back through the service as a full replacement.

use crate::{
    error::ServiceResult,
    workflow::{
        Edge, Graph, GraphPayload, Node, NodeKind, Position, UpdateWorkflow, WorkflowService,
        WorkflowView,
    },
};
use serde::Deserialize;
use std::collections::HashSet;

/// Id given to the node seeded into an empty graph
pub const SEED_NODE_ID: &str = "1";

/// Label of the seeded trigger node
pub const SEED_NODE_LABEL: &str = "Start";

/// Canvas position of the seeded trigger node
pub const SEED_NODE_POSITION: Position = Position { x: 250.0, y: 5.0 };

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("workflow {0} has no readable graph")]
    UnreadableGraph(String),

    #[error("cannot connect: node {0} does not exist")]
    UnknownNode(String),
}

/// A delta against the node list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    Position { id: String, position: Position },
    Remove { id: String },
    Select { id: String, selected: bool },
}

/// A delta against the edge list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    Remove { id: String },
    Select { id: String, selected: bool },
}

#[derive(Debug, Clone)]
pub struct GraphEditor {
    workflow_id: String,
    name: String,
    graph: Graph,
    selected_nodes: HashSet<String>,
    selected_edges: HashSet<String>,
}

impl GraphEditor {
    /// Start editing a loaded workflow
    pub fn open(view: WorkflowView) -> Result<Self, EditorError> {
        match view.graph {
            GraphPayload::Decoded(graph) => Ok(Self::new(view.id, view.name, graph)),
            GraphPayload::Failed(_) => Err(EditorError::UnreadableGraph(view.id)),
        }
    }

    /// Editor over `graph`; an empty graph gets a single trigger node
    pub fn new(workflow_id: impl Into<String>, name: impl Into<String>, mut graph: Graph) -> Self {
        if graph.nodes.is_empty() {
            graph.nodes.push(Node {
                id: SEED_NODE_ID.to_string(),
                kind: NodeKind::Trigger,
                position: SEED_NODE_POSITION,
                label: SEED_NODE_LABEL.to_string(),
            });
        }

        Self {
            workflow_id: workflow_id.into(),
            name: name.into(),
            graph,
            selected_nodes: HashSet::new(),
            selected_edges: HashSet::new(),
        }
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn is_node_selected(&self, id: &str) -> bool {
        self.selected_nodes.contains(id)
    }

    pub fn is_edge_selected(&self, id: &str) -> bool {
        self.selected_edges.contains(id)
    }

    /// Apply node deltas in order; changes naming unknown nodes are skipped
    ///
    /// Removing a node also drops every edge touching it.
    pub fn apply_node_changes(&mut self, changes: impl IntoIterator<Item = NodeChange>) {
        for change in changes {
            match change {
                NodeChange::Position { id, position } => {
                    if let Some(node) = self.graph.nodes.iter_mut().find(|n| n.id == id) {
                        node.position = position;
                    }
                }
                NodeChange::Remove { id } => {
                    self.graph.nodes.retain(|n| n.id != id);
                    self.selected_nodes.remove(&id);
                    let dropped: Vec<String> = self
                        .graph
                        .edges
                        .iter()
                        .filter(|e| e.source == id || e.target == id)
                        .map(|e| e.id.clone())
                        .collect();
                    self.apply_edge_changes(dropped.into_iter().map(|id| EdgeChange::Remove { id }));
                }
                NodeChange::Select { id, selected } => {
                    if self.graph.node(&id).is_some() {
                        set_selected(&mut self.selected_nodes, id, selected);
                    }
                }
            }
        }
    }

    /// Apply edge deltas in order; changes naming unknown edges are skipped
    pub fn apply_edge_changes(&mut self, changes: impl IntoIterator<Item = EdgeChange>) {
        for change in changes {
            match change {
                EdgeChange::Remove { id } => {
                    self.graph.edges.retain(|e| e.id != id);
                    self.selected_edges.remove(&id);
                }
                EdgeChange::Select { id, selected } => {
                    if self.graph.edges.iter().any(|e| e.id == id) {
                        set_selected(&mut self.selected_edges, id, selected);
                    }
                }
            }
        }
    }

    /// Append an edge from `source` to `target`
    ///
    /// Returns `false` when the same connection already exists.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<bool, EditorError> {
        for endpoint in [source, target] {
            if self.graph.node(endpoint).is_none() {
                return Err(EditorError::UnknownNode(endpoint.to_string()));
            }
        }

        if self
            .graph
            .edges
            .iter()
            .any(|e| e.source == source && e.target == target)
        {
            return Ok(false);
        }

        self.graph.edges.push(Edge {
            id: uuid::Uuid::new_v4().to_string(),
            source: source.to_string(),
            target: target.to_string(),
        });
        Ok(true)
    }

    /// Append a node with a fresh id and return that id
    pub fn add_node(&mut self, kind: NodeKind, position: Position, label: impl Into<String>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.graph.nodes.push(Node {
            id: id.clone(),
            kind,
            position,
            label: label.into(),
        });
        id
    }

    /// Submit the name and the entire current graph as a full replacement
    pub async fn save(&self, service: &WorkflowService, caller_id: &str) -> ServiceResult<WorkflowView> {
        tracing::debug!(
            workflow_id = %self.workflow_id,
            nodes = self.graph.nodes.len(),
            edges = self.graph.edges.len(),
            "saving editor graph"
        );
        service
            .update_workflow(
                caller_id,
                &self.workflow_id,
                UpdateWorkflow {
                    name: Some(self.name.clone()),
                    graph: Some(self.graph.clone()),
                },
            )
            .await
    }
}

fn set_selected(set: &mut HashSet<String>, id: String, selected: bool) {
    if selected {
        set.insert(id);
    } else {
        set.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::workflow::service::tests::service;
    use assert_matches::assert_matches;

    fn editor() -> GraphEditor {
        GraphEditor::new("w1", "Flow", Graph::default())
    }

    #[test]
    fn empty_graph_is_seeded_with_one_trigger() {
        let ed = editor();
        assert_eq!(ed.graph().nodes.len(), 1);
        let seed = &ed.graph().nodes[0];
        assert_eq!(seed.id, SEED_NODE_ID);
        assert_eq!(seed.kind, NodeKind::Trigger);
        assert_eq!(seed.position, SEED_NODE_POSITION);
        assert_eq!(seed.label, "Start");
    }

    #[test]
    fn non_empty_graph_is_left_alone() {
        let mut ed = editor();
        let id = ed.add_node(NodeKind::Output, Position::new(1.0, 2.0), "Out");
        let graph = ed.graph().clone();

        let reopened = GraphEditor::new("w1", "Flow", graph.clone());
        assert_eq!(reopened.graph(), &graph);
        assert!(reopened.graph().node(&id).is_some());
    }

    #[test]
    fn add_node_generates_unique_ids() {
        let mut ed = editor();
        let a = ed.add_node(NodeKind::Action, Position::new(10.0, 10.0), "New Action");
        ed.apply_node_changes([NodeChange::Remove { id: a.clone() }]);
        let b = ed.add_node(NodeKind::Action, Position::new(10.0, 10.0), "New Action");

        assert_ne!(a, b);
        assert_eq!(ed.graph().nodes.len(), 2);
    }

    #[test]
    fn position_change_moves_node() {
        let mut ed = editor();
        ed.apply_node_changes([NodeChange::Position {
            id: SEED_NODE_ID.into(),
            position: Position::new(-3.0, 42.0),
        }]);
        assert_eq!(ed.graph().nodes[0].position, Position::new(-3.0, 42.0));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut ed = editor();
        let before = ed.graph().clone();
        ed.apply_node_changes([
            NodeChange::Position {
                id: "ghost".into(),
                position: Position::new(0.0, 0.0),
            },
            NodeChange::Remove { id: "ghost".into() },
            NodeChange::Select {
                id: "ghost".into(),
                selected: true,
            },
        ]);
        ed.apply_edge_changes([EdgeChange::Remove { id: "ghost".into() }]);

        assert_eq!(ed.graph(), &before);
        assert!(!ed.is_node_selected("ghost"));
    }

    #[test]
    fn selection_is_tracked_outside_the_graph() {
        let mut ed = editor();
        let before = ed.graph().clone();
        ed.apply_node_changes([NodeChange::Select {
            id: SEED_NODE_ID.into(),
            selected: true,
        }]);
        assert!(ed.is_node_selected(SEED_NODE_ID));
        assert_eq!(ed.graph(), &before);

        ed.apply_node_changes([NodeChange::Select {
            id: SEED_NODE_ID.into(),
            selected: false,
        }]);
        assert!(!ed.is_node_selected(SEED_NODE_ID));
    }

    #[test]
    fn connect_appends_once() {
        let mut ed = editor();
        let action = ed.add_node(NodeKind::Action, Position::new(0.0, 100.0), "Act");

        assert!(ed.connect(SEED_NODE_ID, &action).unwrap());
        assert!(!ed.connect(SEED_NODE_ID, &action).unwrap());
        assert_eq!(ed.graph().edges.len(), 1);
        assert_eq!(ed.graph().edges[0].source, SEED_NODE_ID);
        assert_eq!(ed.graph().edges[0].target, action);
    }

    #[test]
    fn edge_ids_stay_distinct_for_dashed_node_ids() {
        let nodes = ["a", "a-b", "b-c", "c"]
            .into_iter()
            .map(|id| Node {
                id: id.into(),
                kind: NodeKind::Action,
                position: Position::new(0.0, 0.0),
                label: id.into(),
            })
            .collect();
        let mut ed = GraphEditor::new("w1", "Flow", Graph { nodes, edges: Vec::new() });

        assert!(ed.connect("a-b", "c").unwrap());
        assert!(ed.connect("a", "b-c").unwrap());
        let first = ed.graph().edges[0].id.clone();
        assert_ne!(first, ed.graph().edges[1].id);

        ed.apply_edge_changes([EdgeChange::Remove { id: first }]);
        assert_eq!(ed.graph().edges.len(), 1);
        assert_eq!(ed.graph().edges[0].source, "a");
        assert_eq!(ed.graph().edges[0].target, "b-c");
    }

    #[test]
    fn connect_rejects_unknown_nodes() {
        let mut ed = editor();
        assert_matches!(
            ed.connect(SEED_NODE_ID, "ghost"),
            Err(EditorError::UnknownNode(id)) if id == "ghost"
        );
        assert!(ed.graph().edges.is_empty());
    }

    #[test]
    fn removing_node_drops_incident_edges() {
        let mut ed = editor();
        let a = ed.add_node(NodeKind::Action, Position::new(0.0, 100.0), "A");
        let out = ed.add_node(NodeKind::Output, Position::new(0.0, 200.0), "Out");
        ed.connect(SEED_NODE_ID, &a).unwrap();
        ed.connect(&a, &out).unwrap();
        ed.connect(SEED_NODE_ID, &out).unwrap();

        ed.apply_node_changes([NodeChange::Remove { id: a }]);

        assert_eq!(ed.graph().nodes.len(), 2);
        assert_eq!(ed.graph().edges.len(), 1);
        assert!(ed.graph().dangling_edges().is_empty());
    }

    #[test]
    fn edge_changes_remove_and_select() {
        let mut ed = editor();
        let a = ed.add_node(NodeKind::Action, Position::new(0.0, 100.0), "A");
        ed.connect(SEED_NODE_ID, &a).unwrap();
        let edge_id = ed.graph().edges[0].id.clone();

        ed.apply_edge_changes([EdgeChange::Select {
            id: edge_id.clone(),
            selected: true,
        }]);
        assert!(ed.is_edge_selected(&edge_id));

        ed.apply_edge_changes([EdgeChange::Remove { id: edge_id.clone() }]);
        assert!(ed.graph().edges.is_empty());
        assert!(!ed.is_edge_selected(&edge_id));
    }

    #[test]
    fn changes_deserialize_from_tagged_json() {
        let changes: Vec<NodeChange> = serde_json::from_str(
            r#"[{"type":"position","id":"1","position":{"x":5,"y":6}},
                {"type":"remove","id":"2"},
                {"type":"select","id":"3","selected":true}]"#,
        )
        .unwrap();
        assert_eq!(
            changes[0],
            NodeChange::Position {
                id: "1".into(),
                position: Position::new(5.0, 6.0)
            }
        );
        assert_eq!(changes[1], NodeChange::Remove { id: "2".into() });
    }

    #[tokio::test]
    async fn open_and_save_replace_the_stored_graph() {
        let svc = service().await;
        let created = svc
            .create_workflow("alice", "Untitled Workflow", Graph::default())
            .await
            .unwrap();

        let mut ed = GraphEditor::open(created).unwrap();
        let action = ed.add_node(NodeKind::Action, Position::new(100.0, 100.0), "New Action");
        ed.connect(SEED_NODE_ID, &action).unwrap();
        ed.set_name("Wired");

        let saved = ed.save(&svc, "alice").await.unwrap();
        assert_eq!(saved.name, "Wired");
        assert_eq!(saved.decoded_graph(), Some(ed.graph()));

        let reloaded = svc.get_workflow("alice", ed.workflow_id()).await.unwrap();
        assert_eq!(reloaded.decoded_graph(), Some(ed.graph()));
    }

    #[tokio::test]
    async fn save_overwrites_other_sessions() {
        let svc = service().await;
        let created = svc
            .create_workflow("alice", "Shared", Graph::default())
            .await
            .unwrap();

        let mut first = GraphEditor::open(created.clone()).unwrap();
        let mut second = GraphEditor::open(created).unwrap();
        first.add_node(NodeKind::Action, Position::new(0.0, 0.0), "from first");
        second.add_node(NodeKind::Output, Position::new(0.0, 0.0), "from second");

        first.save(&svc, "alice").await.unwrap();
        second.save(&svc, "alice").await.unwrap();

        let stored = svc.get_workflow("alice", second.workflow_id()).await.unwrap();
        assert_eq!(stored.decoded_graph(), Some(second.graph()));
    }

    #[tokio::test]
    async fn save_by_non_owner_is_rejected() {
        let svc = service().await;
        let created = svc
            .create_workflow("alice", "Mine", Graph::default())
            .await
            .unwrap();

        let ed = GraphEditor::open(created).unwrap();
        assert_matches!(ed.save(&svc, "bob").await, Err(ServiceError::Unauthorized(_)));
    }

    #[test]
    fn unreadable_workflow_cannot_be_opened() {
        let view = WorkflowView {
            id: "w9".into(),
            owner_id: "alice".into(),
            name: "Broken".into(),
            graph: GraphPayload::Failed("decode failed".into()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_matches!(GraphEditor::open(view), Err(EditorError::UnreadableGraph(id)) if id == "w9");
    }
}
