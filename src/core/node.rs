//! Craft file node tree with diagnostic parse errors
//!
//! Craft files are a brace-delimited tree of named nodes holding `key = value`
//! lines:
//!
//! ```text
//! ship = Kerbal X
//! type = VAB
//! PART
//! {
//!     part = liquidEngine_4294
//!     istg = 2
//! }
//! ```

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A parsed node: ordered values plus ordered child nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CraftNode {
    pub name: String,
    values: Vec<(String, String)>,
    nodes: Vec<CraftNode>,
}

/// Craft syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("craft syntax error on line {line}: {message}")]
#[diagnostic(code(craftdex::craft::syntax))]
pub struct NodeSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// 1-based line the error was detected on
    pub line: usize,

    /// What went wrong
    pub message: String,
}

impl NodeSyntaxError {
    fn at(source: &str, filename: &str, line: usize, offset: usize, message: &str) -> Self {
        let message = message.to_string();
        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            help: generate_help(&message),
            line,
            message,
        }
    }
}

impl CraftNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// First value stored under `key`
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn nodes(&self) -> &[CraftNode] {
        &self.nodes
    }

    /// Child nodes with the given name, in file order
    pub fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CraftNode> + 'a {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push((key.into(), value.into()));
    }

    pub fn add_node(&mut self, node: CraftNode) {
        self.nodes.push(node);
    }

    /// Parse craft text into an unnamed root node
    ///
    /// `filename` is only used to label diagnostics.
    pub fn parse(source: &str, filename: &str) -> Result<Self, NodeSyntaxError> {
        // (node, line it opened on, byte offset of that line)
        let mut stack: Vec<(CraftNode, usize, usize)> = vec![(CraftNode::default(), 0, 0)];
        let mut pending: Option<(String, usize, usize)> = None;
        let mut offset = 0usize;

        for (index, raw_line) in source.split_inclusive('\n').enumerate() {
            let line_no = index + 1;
            let line_offset = offset;
            offset += raw_line.len();

            let content = match raw_line.find("//") {
                Some(pos) => &raw_line[..pos],
                None => raw_line,
            };
            let line = content.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
            if line.is_empty() {
                continue;
            }

            let err = |message: &str| {
                NodeSyntaxError::at(source, filename, line_no, line_offset, message)
            };

            if line == "}" {
                if pending.is_some() {
                    return Err(err("expected '{' after node name"));
                }
                if stack.len() == 1 {
                    return Err(err("unmatched '}'"));
                }
                if let Some((node, _, _)) = stack.pop() {
                    if let Some((parent, _, _)) = stack.last_mut() {
                        parent.add_node(node);
                    }
                }
                continue;
            }

            if let Some(head) = line.strip_suffix('{') {
                let head = head.trim();
                let name = if head.is_empty() {
                    match pending.take() {
                        Some((name, _, _)) => name,
                        None => return Err(err("'{' without a node name")),
                    }
                } else if pending.is_some() {
                    return Err(err("expected '{' after node name"));
                } else if head.contains('=') {
                    return Err(err("node name cannot contain '='"));
                } else {
                    head.to_string()
                };
                stack.push((CraftNode::new(name), line_no, line_offset));
                continue;
            }

            if pending.is_some() {
                return Err(err("expected '{' after node name"));
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if key.is_empty() {
                    return Err(err("value without a key"));
                }
                if let Some((node, _, _)) = stack.last_mut() {
                    node.add_value(key, value.trim());
                }
                continue;
            }

            if line.contains('{') || line.contains('}') {
                return Err(err("unexpected brace"));
            }
            pending = Some((line.to_string(), line_no, line_offset));
        }

        if let Some((name, line_no, line_offset)) = pending {
            return Err(NodeSyntaxError::at(
                source,
                filename,
                line_no,
                line_offset,
                &format!("node '{}' has no body", name),
            ));
        }

        if stack.len() > 1 {
            if let Some((node, line_no, line_offset)) = stack.pop() {
                return Err(NodeSyntaxError::at(
                    source,
                    filename,
                    line_no,
                    line_offset,
                    &format!("node '{}' is never closed", node.name),
                ));
            }
        }

        Ok(stack
            .pop()
            .map(|(root, _, _)| root)
            .unwrap_or_default())
    }
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    if message.contains("never closed") {
        return Some("Add a closing '}' for this node.".to_string());
    }
    if message.contains("unmatched") {
        return Some("Remove the extra '}' or add the missing node header above it.".to_string());
    }
    if message.contains("expected '{'") || message.contains("has no body") {
        return Some("A node name must be followed by a '{' line.".to_string());
    }
    if message.contains("without a key") {
        return Some("Values are written as `key = value`.".to_string());
    }
    None
}
