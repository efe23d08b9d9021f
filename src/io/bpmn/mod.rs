//! Streaming BPMN 2.0 reader built on quick-xml's namespace-aware reader.
//!
//! The reader walks the document once, keeping a stack of open elements so
//! that nested constructs (condition expressions inside sequence flows,
//! Camunda scripts inside input parameters) can be attributed to the nearest
//! enclosing element that carries an `id`.
pub mod model;

use std::fs;
use std::path::Path;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use thiserror::Error;
use tracing::debug;

use crate::types::NodeKind;
pub use model::{
    Activity, BpmnDocument, Condition, FlowNode, Parameter, SCRIPT_PLACEHOLDER, Script,
    SequenceFlow,
};
use model::{UNKNOWN_OWNER, is_jexl_expression, simple_class_name};

pub const BPMN_MODEL_NS: &[u8] = b"http://www.omg.org/spec/BPMN/20100524/MODEL";
pub const CAMUNDA_NS: &[u8] = b"http://camunda.org/schema/1.0/bpmn";

/// Errors encountered when reading BPMN documents
#[derive(Debug, Error)]
pub enum BpmnError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse error at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
    #[error("document has no root element")]
    Empty,
    #[error("root element `{0}` is not a BPMN `definitions` element")]
    NotBpmn(String),
    #[error("root element `{0}` is not in the BPMN 2.0 model namespace")]
    WrongNamespace(String),
    #[error("document ends inside unclosed element `{0}`")]
    Unterminated(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    Bpmn,
    Camunda,
    Other,
}

impl Space {
    fn of(resolved: ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Bound(Namespace(ns)) if ns == BPMN_MODEL_NS => Space::Bpmn,
            ResolveResult::Bound(Namespace(ns)) if ns == CAMUNDA_NS => Space::Camunda,
            _ => Space::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Definitions,
    FlowNode(NodeKind),
    SequenceFlow,
    ConditionExpression,
    CamundaScript,
    InputParameter,
    Other,
}

impl Tag {
    fn classify(space: Space, local_name: &[u8]) -> Self {
        match (space, local_name) {
            (Space::Bpmn, b"definitions") => Tag::Definitions,
            (Space::Bpmn, b"sequenceFlow") => Tag::SequenceFlow,
            (Space::Bpmn, b"conditionExpression") => Tag::ConditionExpression,
            (Space::Bpmn, name) => NodeKind::from_tag(name).map_or(Tag::Other, Tag::FlowNode),
            (Space::Camunda, b"script") => Tag::CamundaScript,
            (Space::Camunda, b"inputParameter") => Tag::InputParameter,
            _ => Tag::Other,
        }
    }
}

/// Attributes the reader cares about, already unescaped.
#[derive(Debug, Default)]
struct Attrs {
    id: Option<String>,
    name: Option<String>,
    source_ref: Option<String>,
    target_ref: Option<String>,
    called_element: Option<String>,
    camunda_class: Option<String>,
}

#[derive(Debug)]
struct Frame {
    tag: Tag,
    qname: String,
    attrs: Attrs,
    /// Text seen before the first child element.
    text: String,
    has_children: bool,
    contains_script: bool,
    condition: Option<String>,
}

#[derive(Default)]
struct DocumentBuilder {
    doc: BpmnDocument,
    stack: Vec<Frame>,
    seen_root: bool,
    call_activities: Vec<Activity>,
    service_tasks: Vec<Activity>,
    inline_scripts: Vec<Script>,
}

impl DocumentBuilder {
    fn open(&mut self, tag: Tag, qname: String, attrs: Attrs) -> Result<(), BpmnError> {
        if !self.seen_root {
            if tag != Tag::Definitions {
                let local = qname.rsplit(':').next().unwrap_or_default();
                return Err(if local == "definitions" {
                    BpmnError::WrongNamespace(qname)
                } else {
                    BpmnError::NotBpmn(qname)
                });
            }
            self.seen_root = true;
        }

        if let Some(parent) = self.stack.last_mut() {
            parent.has_children = true;
        }

        if let Some(id) = &attrs.id {
            let name = attrs.name.clone().unwrap_or_else(|| id.clone());
            self.doc.names.insert(id.clone(), name);
        }

        if let Tag::FlowNode(kind) = tag {
            let id = attrs.id.clone().unwrap_or_else(|| UNKNOWN_OWNER.to_string());
            let display = attrs.name.clone().unwrap_or_else(|| id.clone());
            match kind {
                NodeKind::CallActivity => self.call_activities.push(Activity {
                    name: display,
                    kind,
                    target: attrs.called_element.clone().unwrap_or_default(),
                }),
                NodeKind::ServiceTask => self.service_tasks.push(Activity {
                    name: display,
                    kind,
                    target: attrs
                        .camunda_class
                        .as_deref()
                        .map(simple_class_name)
                        .unwrap_or_default()
                        .to_string(),
                }),
                _ => {}
            }
            self.doc.nodes.push(FlowNode {
                id,
                name: attrs.name.clone(),
                kind,
            });
        }

        self.stack.push(Frame {
            tag,
            qname,
            attrs,
            text: String::new(),
            has_children: false,
            contains_script: false,
            condition: None,
        });
        Ok(())
    }

    fn text(&mut self, value: &str) {
        if let Some(frame) = self.stack.last_mut() {
            if !frame.has_children {
                frame.text.push_str(value);
            }
        }
    }

    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };

        match frame.tag {
            Tag::SequenceFlow => {
                let id = frame.attrs.id.unwrap_or_default();
                self.doc.flows.push(SequenceFlow {
                    id,
                    source: frame.attrs.source_ref.unwrap_or_default(),
                    target: frame.attrs.target_ref.unwrap_or_default(),
                    name: frame.attrs.name,
                    condition: frame.condition,
                });
            }
            Tag::ConditionExpression => {
                let expression = frame.text.trim();
                if !expression.is_empty() {
                    let flow = self
                        .stack
                        .iter_mut()
                        .rev()
                        .find(|f| f.tag == Tag::SequenceFlow);
                    if let Some(flow) = flow {
                        if flow.condition.is_none() {
                            flow.condition = Some(expression.to_string());
                        }
                    }
                }
            }
            Tag::CamundaScript => {
                let node_name = self.owner_name(&frame);
                let param_name = self
                    .stack
                    .last()
                    .and_then(|parent| parent.attrs.name.clone())
                    .unwrap_or_else(|| "script".to_string());
                for ancestor in self.stack.iter_mut() {
                    if ancestor.tag == Tag::InputParameter {
                        ancestor.contains_script = true;
                    }
                }
                self.doc.scripts.push(Script {
                    text: frame.text,
                    node_name,
                    param_name,
                });
            }
            Tag::InputParameter => {
                let node_name = self.owner_name(&frame);
                let param_name = frame
                    .attrs
                    .name
                    .clone()
                    .unwrap_or_else(|| "inputParameter".to_string());
                let text = frame.text.trim();
                let (value, has_script) = if frame.contains_script {
                    (SCRIPT_PLACEHOLDER.to_string(), true)
                } else if is_jexl_expression(text) {
                    self.inline_scripts.push(Script {
                        text: text.to_string(),
                        node_name: node_name.clone(),
                        param_name: param_name.clone(),
                    });
                    (SCRIPT_PLACEHOLDER.to_string(), true)
                } else {
                    (text.to_string(), false)
                };
                self.doc.parameters.push(Parameter {
                    node_name,
                    param_name,
                    value,
                    has_script,
                });
            }
            _ => {}
        }
    }

    /// Display name of the nearest element (self first, then ancestors) with an id.
    fn owner_name(&self, frame: &Frame) -> String {
        std::iter::once(frame)
            .chain(self.stack.iter().rev())
            .find_map(|f| f.attrs.id.as_deref())
            .map(|id| self.doc.display_name(id).to_string())
            .unwrap_or_else(|| UNKNOWN_OWNER.to_string())
    }

    fn finish(mut self) -> Result<BpmnDocument, BpmnError> {
        if let Some(open) = self.stack.last() {
            return Err(BpmnError::Unterminated(open.qname.clone()));
        }
        if !self.seen_root {
            return Err(BpmnError::Empty);
        }
        self.doc.activities = self.call_activities;
        self.doc.activities.extend(self.service_tasks);
        self.doc.scripts.extend(self.inline_scripts);
        Ok(self.doc)
    }
}

fn read_attrs(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<Attrs, quick_xml::Error> {
    let mut attrs = Attrs::default();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let space = Space::of(resolved);
        let slot = match (space, local.as_ref()) {
            (Space::Camunda, b"class") => &mut attrs.camunda_class,
            (Space::Other | Space::Bpmn, b"id") => &mut attrs.id,
            (Space::Other | Space::Bpmn, b"name") => &mut attrs.name,
            (Space::Other | Space::Bpmn, b"sourceRef") => &mut attrs.source_ref,
            (Space::Other | Space::Bpmn, b"targetRef") => &mut attrs.target_ref,
            (Space::Other | Space::Bpmn, b"calledElement") => &mut attrs.called_element,
            _ => continue,
        };
        let value = attr.unescape_value()?;
        if !value.is_empty() {
            *slot = Some(value.into_owned());
        }
    }
    Ok(attrs)
}

/// Parse a BPMN document from a string.
pub fn read_bpmn_str(xml: &str) -> Result<BpmnDocument, BpmnError> {
    let mut reader = NsReader::from_str(xml);
    let mut builder = DocumentBuilder::default();

    let xml_error = |reader: &NsReader<&[u8]>, source| BpmnError::Xml {
        position: reader.buffer_position(),
        source,
    };

    loop {
        let (resolved, event) = match reader.read_resolved_event() {
            Ok(pair) => pair,
            Err(source) => return Err(xml_error(&reader, source)),
        };
        let space = Space::of(resolved);

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let tag = Tag::classify(space, e.local_name().as_ref());
                let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let attrs = read_attrs(&reader, e).map_err(|source| xml_error(&reader, source))?;
                builder.open(tag, qname, attrs)?;
                if matches!(event, Event::Empty(_)) {
                    builder.close();
                }
            }
            Event::End(_) => builder.close(),
            Event::Text(e) => {
                let text = e.unescape().map_err(|source| xml_error(&reader, source))?;
                builder.text(&text);
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                builder.text(&String::from_utf8_lossy(&raw));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let doc = builder.finish()?;
    debug!(
        "read BPMN document: {} nodes, {} flows, {} parameters, {} scripts",
        doc.nodes.len(),
        doc.flows.len(),
        doc.parameters.len(),
        doc.scripts.len()
    );
    Ok(doc)
}

/// Read and parse a BPMN file.
pub fn read_bpmn_file(path: &Path) -> Result<BpmnDocument, BpmnError> {
    let xml = fs::read_to_string(path)?;
    read_bpmn_str(&xml)
}
