//! Visual style for diagram nodes and edges, plus the approximate text
//! metrics the layout uses to size nodes before anything is rasterized.
use crate::types::NodeKind;

pub const FONT_FAMILY: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";
pub const FONT_SIZE: f32 = 12.0;
pub const LINE_HEIGHT: f32 = 15.0;
/// Average advance of a sans-serif glyph at `FONT_SIZE`.
pub const CHAR_WIDTH: f32 = 7.0;

pub const EVENT_DIAMETER: f32 = 44.0;
pub const GATEWAY_SIZE: f32 = 50.0;
pub const BOX_MIN_WIDTH: f32 = 90.0;
pub const BOX_MIN_HEIGHT: f32 = 40.0;
pub const BOX_PADDING_X: f32 = 12.0;
pub const BOX_PADDING_Y: f32 = 8.0;
pub const BOX_CORNER_RADIUS: f32 = 8.0;

pub const CONDITION_FONT_SIZE: f32 = 11.0;
pub const CONDITION_FONT_COLOR: &str = "red";
pub const FLOW_NAME_FONT_SIZE: f32 = 10.0;
pub const EDGE_COLOR: &str = "black";
pub const EDGE_WIDTH: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    DoubleCircle,
    RoundedBox,
    Diamond,
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub shape: Shape,
    pub fill: &'static str,
    pub stroke_width: f32,
}

impl NodeStyle {
    pub fn for_kind(kind: NodeKind) -> Self {
        let (shape, fill, stroke_width) = match kind {
            NodeKind::StartEvent => (Shape::Circle, "lightgreen", 1.0),
            NodeKind::EndEvent => (Shape::DoubleCircle, "lightcoral", 1.0),
            NodeKind::IntermediateEvent | NodeKind::BoundaryEvent => {
                (Shape::Circle, "lightgoldenrodyellow", 1.0)
            }
            NodeKind::ServiceTask => (Shape::RoundedBox, "lightblue", 2.0),
            NodeKind::CallActivity | NodeKind::SubProcess => (Shape::RoundedBox, "wheat", 3.0),
            NodeKind::Task
            | NodeKind::UserTask
            | NodeKind::ScriptTask
            | NodeKind::SendTask
            | NodeKind::ReceiveTask
            | NodeKind::ManualTask
            | NodeKind::BusinessRuleTask => (Shape::RoundedBox, "lightyellow", 1.0),
            NodeKind::ExclusiveGateway => (Shape::Diamond, "yellow", 1.0),
            NodeKind::ParallelGateway => (Shape::Diamond, "orange", 1.0),
            NodeKind::InclusiveGateway | NodeKind::EventBasedGateway | NodeKind::ComplexGateway => {
                (Shape::Diamond, "khaki", 1.0)
            }
            NodeKind::Placeholder => (Shape::Ellipse, "white", 1.0),
        };
        Self {
            shape,
            fill,
            stroke_width,
        }
    }

    /// Events and gateways have a fixed size; their label goes underneath
    /// unless it is a one- or two-character marker.
    pub fn label_inside(&self, label: &str) -> bool {
        match self.shape {
            Shape::Circle | Shape::DoubleCircle => false,
            Shape::Diamond => label.chars().count() <= 2,
            Shape::RoundedBox | Shape::Ellipse => true,
        }
    }
}

/// Estimated rendered width of a single line at `FONT_SIZE`.
pub fn text_width(line: &str) -> f32 {
    line.chars().count() as f32 * CHAR_WIDTH
}

/// Greedy word wrap; words longer than `max_chars` are split.
pub fn wrap_label(label: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in label.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_label("Check customer credit limit", 14),
            vec!["Check customer", "credit limit"]
        );
        assert_eq!(wrap_label("short", 14), vec!["short"]);
    }

    #[test]
    fn splits_words_longer_than_a_line() {
        assert_eq!(
            wrap_label("a validateInvoiceTotals b", 8),
            vec!["a", "validate", "InvoiceT", "otals b"]
        );
    }

    #[test]
    fn empty_label_yields_one_empty_line() {
        assert_eq!(wrap_label("   ", 10), vec![String::new()]);
    }

    #[test]
    fn styles_match_element_kinds() {
        let service = NodeStyle::for_kind(NodeKind::ServiceTask);
        assert_eq!(service.shape, Shape::RoundedBox);
        assert_eq!(service.fill, "lightblue");
        assert_eq!(service.stroke_width, 2.0);

        let end = NodeStyle::for_kind(NodeKind::EndEvent);
        assert_eq!(end.shape, Shape::DoubleCircle);
        assert!(!end.label_inside("End"));

        let gateway = NodeStyle::for_kind(NodeKind::ExclusiveGateway);
        assert!(gateway.label_inside("X"));
        assert!(!gateway.label_inside("Approved?"));
    }
}
