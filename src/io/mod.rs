//! I/O layer: the BPMN reader and the SVG/PNG/PDF `writers`.
pub mod bpmn;
pub use bpmn::{BpmnDocument, BpmnError, read_bpmn_file, read_bpmn_str};

pub mod writers;
