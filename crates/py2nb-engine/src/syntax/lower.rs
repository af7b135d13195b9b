//! Lowering from the tree-sitter CST to [`SyntaxNode`]s.

use tree_sitter::Node;

use super::{OperatorClass, ParseError, SyntaxNode};

/// Grammar kinds that never carry a source line.
const LINELESS_KINDS: &[&str] = &["module", "block"];

/// Deepest nesting of named nodes accepted below the module.
///
/// Lowering and tagging both recurse once per level, so a long operator
/// chain such as `1+1+...+1` has to be rejected before it exhausts the stack.
pub const MAX_NESTING: usize = 500;

/// Lower a tree-sitter subtree.
///
/// Named, non-extra nodes become [`SyntaxNode`]s in source order. Anonymous
/// tokens are dropped except below operator-bearing kinds, where they are
/// kept as operator symbols. The header of a function or class definition
/// (everything but its body) is lowered without lines so it inherits the
/// definition's line.
///
/// Fails with [`ParseError::TooDeep`] past [`MAX_NESTING`] levels.
pub fn lower(root: Node<'_>) -> Result<SyntaxNode, ParseError> {
    lower_node(root, true, 0)
}

fn lower_node(node: Node<'_>, annotate: bool, depth: usize) -> Result<SyntaxNode, ParseError> {
    if depth > MAX_NESTING {
        return Err(ParseError::TooDeep {
            line: node.start_position().row + 1,
        });
    }

    let kind = node.kind();
    let line = (annotate && !LINELESS_KINDS.contains(&kind)).then(|| node.start_position().row + 1);
    let mut lowered = SyntaxNode::new(kind, line);

    let is_definition = matches!(kind, "function_definition" | "class_definition");
    let keeps_operators = OperatorClass::of_grammar(kind).is_some();

    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return Ok(lowered);
    }

    loop {
        let child = cursor.node();

        if child.is_extra() {
            // comments and line continuations
        } else if child.is_named() {
            let in_header = is_definition && cursor.field_name() != Some("body");
            lowered
                .children
                .push(lower_node(child, annotate && !in_header, depth + 1)?);
        } else if keeps_operators {
            lowered.operators.push(child.kind());
        }

        if !cursor.goto_next_sibling() {
            break;
        }
    }

    Ok(lowered)
}

/// 1-based `(line, column)` of the first error or missing node, in source order.
///
/// Walks with a cursor instead of recursing, since an erroneous tree can be
/// arbitrarily deep. Subtrees without errors are skipped.
pub fn first_error_position(root: Node<'_>) -> Option<(usize, usize)> {
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return Some((pos.row + 1, pos.column + 1));
        }

        if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}
