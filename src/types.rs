//! Shared types and enums used across bpmn-print.
//! Includes the BPMN element kinds (`NodeKind`) recognised by the reader and
//! the page `Orientation` used by the PDF writer.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// BPMN flow-node kinds that are drawn as diagram nodes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NodeKind {
    StartEvent,
    EndEvent,
    IntermediateEvent,
    BoundaryEvent,
    Task,
    UserTask,
    ScriptTask,
    ServiceTask,
    SendTask,
    ReceiveTask,
    ManualTask,
    BusinessRuleTask,
    CallActivity,
    SubProcess,
    ExclusiveGateway,
    ParallelGateway,
    InclusiveGateway,
    EventBasedGateway,
    ComplexGateway,
    /// Referenced by a sequence flow but never declared.
    Placeholder,
}

impl NodeKind {
    /// Map a BPMN element local name to a node kind.
    pub fn from_tag(local_name: &[u8]) -> Option<Self> {
        Some(match local_name {
            b"startEvent" => NodeKind::StartEvent,
            b"endEvent" => NodeKind::EndEvent,
            b"intermediateCatchEvent" | b"intermediateThrowEvent" => NodeKind::IntermediateEvent,
            b"boundaryEvent" => NodeKind::BoundaryEvent,
            b"task" => NodeKind::Task,
            b"userTask" => NodeKind::UserTask,
            b"scriptTask" => NodeKind::ScriptTask,
            b"serviceTask" => NodeKind::ServiceTask,
            b"sendTask" => NodeKind::SendTask,
            b"receiveTask" => NodeKind::ReceiveTask,
            b"manualTask" => NodeKind::ManualTask,
            b"businessRuleTask" => NodeKind::BusinessRuleTask,
            b"callActivity" => NodeKind::CallActivity,
            b"subProcess" | b"transaction" | b"adHocSubProcess" => NodeKind::SubProcess,
            b"exclusiveGateway" => NodeKind::ExclusiveGateway,
            b"parallelGateway" => NodeKind::ParallelGateway,
            b"inclusiveGateway" => NodeKind::InclusiveGateway,
            b"eventBasedGateway" => NodeKind::EventBasedGateway,
            b"complexGateway" => NodeKind::ComplexGateway,
            _ => return None,
        })
    }

    /// Label used when the element has no `name`.
    pub fn default_label(&self) -> Option<&'static str> {
        match self {
            NodeKind::StartEvent => Some("Start"),
            NodeKind::EndEvent => Some("End"),
            NodeKind::ExclusiveGateway => Some("X"),
            NodeKind::ParallelGateway => Some("+"),
            NodeKind::InclusiveGateway => Some("O"),
            NodeKind::EventBasedGateway => Some("E"),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeKind::StartEvent => "startEvent",
            NodeKind::EndEvent => "endEvent",
            NodeKind::IntermediateEvent => "intermediateEvent",
            NodeKind::BoundaryEvent => "boundaryEvent",
            NodeKind::Task => "task",
            NodeKind::UserTask => "userTask",
            NodeKind::ScriptTask => "scriptTask",
            NodeKind::ServiceTask => "serviceTask",
            NodeKind::SendTask => "sendTask",
            NodeKind::ReceiveTask => "receiveTask",
            NodeKind::ManualTask => "manualTask",
            NodeKind::BusinessRuleTask => "businessRuleTask",
            NodeKind::CallActivity => "callActivity",
            NodeKind::SubProcess => "subProcess",
            NodeKind::ExclusiveGateway => "exclusiveGateway",
            NodeKind::ParallelGateway => "parallelGateway",
            NodeKind::InclusiveGateway => "inclusiveGateway",
            NodeKind::EventBasedGateway => "eventBasedGateway",
            NodeKind::ComplexGateway => "complexGateway",
            NodeKind::Placeholder => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// PDF page orientation.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Landscape when the diagram is wider than the landscape threshold
    #[default]
    Auto,
    Portrait,
    Landscape,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Auto => write!(f, "auto"),
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_display() {
        for tag in ["startEvent", "serviceTask", "callActivity", "parallelGateway"] {
            let kind = NodeKind::from_tag(tag.as_bytes()).unwrap();
            assert_eq!(kind.to_string(), tag);
        }
        assert_eq!(
            NodeKind::from_tag(b"intermediateThrowEvent"),
            Some(NodeKind::IntermediateEvent)
        );
        assert_eq!(NodeKind::from_tag(b"sequenceFlow"), None);
    }

    #[test]
    fn default_labels_follow_element_kind() {
        assert_eq!(NodeKind::StartEvent.default_label(), Some("Start"));
        assert_eq!(NodeKind::ExclusiveGateway.default_label(), Some("X"));
        assert_eq!(NodeKind::ServiceTask.default_label(), None);
    }

    #[test]
    fn orientation_serializes_lowercase() {
        let json = serde_json::to_string(&Orientation::Landscape).unwrap();
        assert_eq!(json, "\"landscape\"");
    }
}
