//! Serializes a parse tree into DOT text for offline rendering.

use crate::tree::ParseNode;

/// Walks the tree in depth-first preorder, assigning dense node ids from
/// 0, and emits one labeled-node line plus one edge line per child.
pub fn to_dot(root: &ParseNode) -> String {
    let mut out = String::from("digraph ParseTree {\n");
    out.push_str("  node [shape=box, fontname=\"Arial\", fontsize=10];\n");
    let mut next_id = 0;
    write_node(root, &mut out, &mut next_id);
    out.push_str("}\n");
    out
}

fn write_node(node: &ParseNode, out: &mut String, next_id: &mut usize) -> usize {
    let my_id = *next_id;
    *next_id += 1;

    let mut label = node.label.name().to_string();
    if !node.value.is_empty() {
        label.push_str(": ");
        label.push_str(&node.value);
    }
    let label = label.replace('"', "\\\"");
    out.push_str(&format!("  node{my_id} [label=\"{label}\"];\n"));

    for child in &node.children {
        let child_id = write_node(child, out, next_id);
        out.push_str(&format!("  node{my_id} -> node{child_id};\n"));
    }
    my_id
}
