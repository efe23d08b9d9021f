//! In-memory model of a parsed BPMN document: the flow graph that gets drawn
//! and the detail tables (activities, input parameters, scripts) printed
//! beneath the diagram.
use std::collections::HashMap;

use crate::types::NodeKind;

/// Value shown for input parameters whose content lives in the scripts table.
pub const SCRIPT_PLACEHOLDER: &str = "[See JEXL Scripts]";

/// Owner name used when no enclosing element carries an `id`.
pub const UNKNOWN_OWNER: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    pub id: String,
    pub name: Option<String>,
    pub kind: NodeKind,
}

impl FlowNode {
    /// Text drawn inside (or under) the node.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.kind.default_label())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFlow {
    pub id: String,
    pub source: String,
    pub target: String,
    pub name: Option<String>,
    /// Trimmed `conditionExpression` text; never empty.
    pub condition: Option<String>,
}

/// Row of the "Nodes" table: call activities and service tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub name: String,
    pub kind: NodeKind,
    /// `calledElement` for call activities, simple class name for service tasks.
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub node_name: String,
    pub param_name: String,
    pub value: String,
    pub has_script: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub text: String,
    pub node_name: String,
    pub param_name: String,
}

/// A numbered conditional branch, as labelled on the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub number: usize,
    pub source_name: String,
    pub target_name: String,
    pub expression: String,
}

#[derive(Debug, Clone, Default)]
pub struct BpmnDocument {
    pub nodes: Vec<FlowNode>,
    pub flows: Vec<SequenceFlow>,
    /// Every element id mapped to its `name`, or to the id itself.
    pub names: HashMap<String, String>,
    pub activities: Vec<Activity>,
    pub parameters: Vec<Parameter>,
    pub scripts: Vec<Script>,
}

impl BpmnDocument {
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Conditional flows numbered from 1 in document order.
    pub fn conditions(&self) -> Vec<Condition> {
        self.flows
            .iter()
            .filter_map(|flow| flow.condition.as_ref().map(|expr| (flow, expr)))
            .enumerate()
            .map(|(idx, (flow, expression))| Condition {
                number: idx + 1,
                source_name: self.display_name(&flow.source).to_string(),
                target_name: self.display_name(&flow.target).to_string(),
                expression: expression.clone(),
            })
            .collect()
    }

    /// Edge label for a flow: `[n]` for the n-th conditional flow, else its name.
    pub fn flow_labels(&self) -> Vec<Option<String>> {
        let mut counter = 0;
        self.flows
            .iter()
            .map(|flow| {
                if flow.condition.is_some() {
                    counter += 1;
                    Some(format!("[{counter}]"))
                } else {
                    flow.name.clone()
                }
            })
            .collect()
    }
}

/// Whether an input parameter's text is a JEXL expression.
pub fn is_jexl_expression(text: &str) -> bool {
    text.contains("#{ ") || text.contains("${ ")
}

/// Last segment of a fully qualified Java class name.
pub fn simple_class_name(class_name: &str) -> &str {
    class_name.rsplit('.').next().unwrap_or(class_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(id: &str, source: &str, target: &str, condition: Option<&str>) -> SequenceFlow {
        SequenceFlow {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            name: None,
            condition: condition.map(Into::into),
        }
    }

    #[test]
    fn conditions_are_numbered_in_flow_order() {
        let mut doc = BpmnDocument::default();
        doc.names.insert("gw".into(), "Approved?".into());
        doc.names.insert("yes".into(), "Ship".into());
        doc.flows = vec![
            flow("f1", "start", "gw", None),
            flow("f2", "gw", "yes", Some("${approved}")),
            flow("f3", "gw", "no", Some("${!approved}")),
        ];

        let conditions = doc.conditions();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].number, 1);
        assert_eq!(conditions[0].source_name, "Approved?");
        assert_eq!(conditions[0].target_name, "Ship");
        assert_eq!(conditions[1].number, 2);
        // ids without a recorded name fall back to the id
        assert_eq!(conditions[1].target_name, "no");

        assert_eq!(
            doc.flow_labels(),
            vec![None, Some("[1]".to_string()), Some("[2]".to_string())]
        );
    }

    #[test]
    fn labels_prefer_name_then_kind_default_then_id() {
        let named = FlowNode {
            id: "t1".into(),
            name: Some("Check stock".into()),
            kind: NodeKind::Task,
        };
        let start = FlowNode {
            id: "s1".into(),
            name: None,
            kind: NodeKind::StartEvent,
        };
        let task = FlowNode {
            id: "t2".into(),
            name: None,
            kind: NodeKind::ServiceTask,
        };
        assert_eq!(named.label(), "Check stock");
        assert_eq!(start.label(), "Start");
        assert_eq!(task.label(), "t2");
    }

    #[test]
    fn jexl_detection_needs_the_space() {
        assert!(is_jexl_expression("${ order.total > 10 }"));
        assert!(is_jexl_expression("#{ x }"));
        assert!(!is_jexl_expression("${order}"));
        assert!(!is_jexl_expression("plain value"));
    }

    #[test]
    fn class_names_are_shortened() {
        assert_eq!(simple_class_name("com.acme.billing.ChargeCard"), "ChargeCard");
        assert_eq!(simple_class_name("Standalone"), "Standalone");
    }
}
