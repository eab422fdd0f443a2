use crate::Node;
use std::fmt::{self, Write};

/// Deterministic, indented DOM serialization for tests and diagnostics.
///
/// One line per node; attribute order is kept; ids are omitted so that
/// snapshots do not depend on key allocation.
#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    pub fn new(root: &Node) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(root, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for DomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn walk_snapshot(node: &Node, depth: usize, out: &mut Vec<String>) {
    const INDENT_STEP: usize = 2;
    let mut line = " ".repeat(depth * INDENT_STEP);
    write_node_line(&mut line, node);
    out.push(line);
    for child in node.children() {
        walk_snapshot(child, depth + 1, out);
    }
}

fn write_node_line(out: &mut String, node: &Node) {
    match node {
        Node::Document { doctype, .. } => {
            out.push_str("#document");
            if let Some(dt) = doctype {
                let _ = write!(out, " doctype=\"{}\"", escape(dt));
            }
        }
        Node::Element {
            name, attributes, ..
        } => {
            out.push('<');
            out.push_str(name);
            for (attr, value) in attributes {
                out.push(' ');
                out.push_str(attr);
                if let Some(value) = value {
                    let _ = write!(out, "=\"{}\"", escape(value));
                }
            }
            out.push('>');
        }
        Node::Text { text, .. } => {
            let _ = write!(out, "\"{}\"", escape(text));
        }
        Node::Comment { text, .. } => {
            let _ = write!(out, "<!-- {} -->", escape(text));
        }
    }
}

fn escape(s: &str) -> String {
    s.escape_debug().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Id;
    use std::sync::Arc;

    #[test]
    fn renders_nested_nodes_with_escaped_text() {
        let dom = Node::Document {
            id: Id(1),
            doctype: None,
            children: vec![Node::Element {
                id: Id(2),
                name: Arc::from("p"),
                attributes: vec![(Arc::from("hidden"), None), (Arc::from("class"), Some("a".into()))],
                children: vec![Node::Text {
                    id: Id(3),
                    text: "x\ny".into(),
                }],
            }],
        };
        assert_eq!(
            DomSnapshot::new(&dom).render(),
            "#document\n  <p hidden class=\"a\">\n    \"x\\ny\""
        );
    }
}
