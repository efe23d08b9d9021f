//! Left-to-right layered layout of a BPMN flow graph.
//!
//! The pipeline is the classic layered (Sugiyama) approach:
//! 1. sequence flows referencing undeclared ids get placeholder nodes;
//! 2. back edges found by depth-first search are reversed so the graph is acyclic;
//! 3. nodes are assigned to columns by longest path, with dummy vertices on long edges;
//! 4. barycenter sweeps reduce edge crossings;
//! 5. rows are assigned by median alignment and order-preserving packing;
//! 6. edges are routed as polylines through their dummies and clipped to node outlines.
//!
//! The result is fully deterministic for a given document.
use std::collections::HashMap;

use tracing::debug;

use crate::core::style::{
    self, BOX_MIN_HEIGHT, BOX_MIN_WIDTH, BOX_PADDING_X, BOX_PADDING_Y, EVENT_DIAMETER,
    GATEWAY_SIZE, LINE_HEIGHT, NodeStyle, Shape,
};
use crate::io::bpmn::BpmnDocument;
use crate::types::NodeKind;

pub(crate) mod graph;
mod ordering;
mod placement;

/// Vertical space between a shape and a label drawn beneath it.
pub const LABEL_GAP: f32 = 4.0;
const SELF_LOOP_RISE: f32 = 22.0;
const BACK_EDGE_BOW: f32 = 24.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal space between columns.
    pub rank_gap: f32,
    /// Minimum vertical space between nodes in a column.
    pub node_gap: f32,
    pub margin: f32,
    pub max_label_chars: usize,
    /// Barycenter sweeps used for crossing reduction.
    pub sweeps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rank_gap: 60.0,
            node_gap: 30.0,
            margin: 32.0,
            max_label_chars: 22,
            sweeps: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone)]
pub struct NodeBox {
    pub id: String,
    pub kind: NodeKind,
    pub style: NodeStyle,
    pub lines: Vec<String>,
    pub label_inside: bool,
    /// Center of the shape (not of the shape plus its label).
    pub center: Point,
    pub width: f32,
    pub height: f32,
    pub column: usize,
}

impl NodeBox {
    /// Point where the outline meets the ray from the center towards `toward`.
    pub fn boundary_point(&self, toward: Point) -> Point {
        let dx = toward.x - self.center.x;
        let dy = toward.y - self.center.y;
        if dx == 0.0 && dy == 0.0 {
            return self.center;
        }
        let (a, b) = (self.width / 2.0, self.height / 2.0);
        let t = match self.style.shape {
            Shape::RoundedBox => {
                let tx = if dx == 0.0 { f32::INFINITY } else { a / dx.abs() };
                let ty = if dy == 0.0 { f32::INFINITY } else { b / dy.abs() };
                tx.min(ty)
            }
            Shape::Diamond => 1.0 / (dx.abs() / a + dy.abs() / b),
            Shape::Circle | Shape::DoubleCircle | Shape::Ellipse => {
                1.0 / ((dx / a).powi(2) + (dy / b).powi(2)).sqrt()
            }
        };
        let t = t.min(1.0);
        Point::new(self.center.x + dx * t, self.center.y + dy * t)
    }

    /// Baseline of the first label line when it is drawn beneath the shape.
    pub fn label_top(&self) -> f32 {
        self.center.y + self.height / 2.0 + LABEL_GAP
    }
}

#[derive(Debug, Clone)]
pub struct EdgePath {
    pub source: String,
    pub target: String,
    pub points: Vec<Point>,
    pub label: Option<String>,
    pub label_at: Option<Point>,
    pub conditional: bool,
    /// Drawn against the column direction because it closes a cycle.
    pub back_edge: bool,
}

#[derive(Debug, Clone)]
pub struct DiagramLayout {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeBox>,
    pub edges: Vec<EdgePath>,
}

struct NodeSpec {
    id: String,
    kind: NodeKind,
    style: NodeStyle,
    lines: Vec<String>,
    label_inside: bool,
    shape: (f32, f32),
    footprint: (f32, f32),
}

impl NodeSpec {
    fn new(id: &str, kind: NodeKind, label: &str, max_chars: usize) -> Self {
        let style = NodeStyle::for_kind(kind);
        let label_inside = style.label_inside(label);
        let lines = style::wrap_label(label, max_chars);
        let text_w = lines
            .iter()
            .map(|l| style::text_width(l))
            .fold(0.0f32, f32::max);
        let text_h = lines.len() as f32 * LINE_HEIGHT;

        let shape = match style.shape {
            Shape::Circle | Shape::DoubleCircle => (EVENT_DIAMETER, EVENT_DIAMETER),
            Shape::Diamond => (GATEWAY_SIZE, GATEWAY_SIZE),
            Shape::RoundedBox => (
                BOX_MIN_WIDTH.max(text_w + 2.0 * BOX_PADDING_X),
                BOX_MIN_HEIGHT.max(text_h + 2.0 * BOX_PADDING_Y),
            ),
            Shape::Ellipse => (text_w + 30.0, 36.0f32.max(text_h + 16.0)),
        };
        let footprint = if label_inside {
            shape
        } else {
            (shape.0.max(text_w), shape.1 + LABEL_GAP + text_h)
        };

        Self {
            id: id.to_string(),
            kind,
            style,
            lines,
            label_inside,
            shape,
            footprint,
        }
    }
}

/// Lay out every flow node and sequence flow of `doc`.
pub fn layout_document(doc: &BpmnDocument, config: &LayoutConfig) -> DiagramLayout {
    let mut specs: Vec<NodeSpec> = Vec::with_capacity(doc.nodes.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for node in &doc.nodes {
        if index.contains_key(&node.id) {
            debug!("Duplicate node id {}, keeping the first", node.id);
            continue;
        }
        index.insert(node.id.clone(), specs.len());
        specs.push(NodeSpec::new(
            &node.id,
            node.kind,
            node.label(),
            config.max_label_chars,
        ));
    }

    let mut edges: Vec<(usize, usize)> = Vec::new();
    let mut flows = Vec::new();
    for (flow, label) in doc.flows.iter().zip(doc.flow_labels()) {
        if flow.source.is_empty() || flow.target.is_empty() {
            debug!("Sequence flow {} has a missing endpoint, skipping", flow.id);
            continue;
        }
        let mut resolve = |id: &str| -> usize {
            if let Some(&idx) = index.get(id) {
                return idx;
            }
            let idx = specs.len();
            specs.push(NodeSpec::new(
                id,
                NodeKind::Placeholder,
                id,
                config.max_label_chars,
            ));
            index.insert(id.to_string(), idx);
            idx
        };
        let source = resolve(&flow.source);
        let target = resolve(&flow.target);
        edges.push((source, target));
        flows.push((flow, label));
    }

    let footprints: Vec<(f32, f32)> = specs.iter().map(|s| s.footprint).collect();
    let graph = graph::build(&footprints, &edges);
    let layers = ordering::order_layers(&graph, config.sweeps);
    let placed = placement::assign_coordinates(&graph, &layers, config);

    let nodes: Vec<NodeBox> = specs
        .into_iter()
        .enumerate()
        .map(|(idx, spec)| {
            let foot = placed.centers[idx];
            let center = Point::new(foot.x, foot.y - spec.footprint.1 / 2.0 + spec.shape.1 / 2.0);
            NodeBox {
                id: spec.id,
                kind: spec.kind,
                style: spec.style,
                lines: spec.lines,
                label_inside: spec.label_inside,
                center,
                width: spec.shape.0,
                height: spec.shape.1,
                column: graph.vertices[idx].layer,
            }
        })
        .collect();

    let edges = graph
        .chains
        .iter()
        .zip(flows)
        .map(|(chain, (flow, label))| {
            let points = if chain.self_loop {
                self_loop(&nodes[chain.vertices[0]])
            } else {
                let mut points: Vec<Point> = chain
                    .vertices
                    .iter()
                    .map(|&v| {
                        if v < graph.real_count {
                            nodes[v].center
                        } else {
                            placed.centers[v]
                        }
                    })
                    .collect();
                if chain.reversed {
                    points.reverse();
                    if points.len() == 2 {
                        // keep it apart from a forward edge between the same pair
                        let mid = Point::new(
                            (points[0].x + points[1].x) / 2.0,
                            (points[0].y + points[1].y) / 2.0 + BACK_EDGE_BOW,
                        );
                        points.insert(1, mid);
                    }
                }
                let (first, last) = (chain.vertices[0], chain.vertices[chain.vertices.len() - 1]);
                let (from, to) = if chain.reversed { (last, first) } else { (first, last) };
                let end = points.len() - 1;
                points[0] = nodes[from].boundary_point(points[1]);
                points[end] = nodes[to].boundary_point(points[end - 1]);
                points
            };
            let label_at = label.as_ref().map(|_| label_anchor(&points, chain.self_loop));
            EdgePath {
                source: flow.source.clone(),
                target: flow.target.clone(),
                points,
                label,
                label_at,
                conditional: flow.condition.is_some(),
                back_edge: chain.reversed,
            }
        })
        .collect();

    DiagramLayout {
        width: placed.width,
        height: placed.height,
        nodes,
        edges,
    }
}

fn self_loop(node: &NodeBox) -> Vec<Point> {
    let dx = (node.width / 4.0).max(10.0);
    let top = node.center.y - node.height / 2.0 - SELF_LOOP_RISE;
    let right = Point::new(node.center.x + dx, top);
    let left = Point::new(node.center.x - dx, top);
    vec![
        node.boundary_point(right),
        right,
        left,
        node.boundary_point(left),
    ]
}

/// Midpoint of the polyline by length; above the loop for self loops.
fn label_anchor(points: &[Point], self_loop: bool) -> Point {
    if self_loop {
        let top = points[1];
        let other = points[2];
        return Point::new((top.x + other.x) / 2.0, top.y - LABEL_GAP);
    }
    let total: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    let mut remaining = total / 2.0;
    for w in points.windows(2) {
        let seg = w[0].distance(w[1]);
        if seg > 0.0 && remaining <= seg {
            let t = remaining / seg;
            return Point::new(
                w[0].x + (w[1].x - w[0].x) * t,
                w[0].y + (w[1].y - w[0].y) * t,
            );
        }
        remaining -= seg;
    }
    points[points.len() - 1]
}
