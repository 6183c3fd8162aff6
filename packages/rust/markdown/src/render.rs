//! Content nodes back to markdown.

use worklog_shared::ContentNode;

/// Render nodes as markdown.
///
/// Consecutive list items of the same kind stay on adjacent lines and
/// numbered items are renumbered from 1; every other transition is
/// separated by a blank line.
pub fn render(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    let mut prev: Option<&ContentNode> = None;
    let mut number = 0usize;

    for node in nodes {
        let same_list = matches!(
            (prev, node),
            (Some(ContentNode::BulletItem { .. }), ContentNode::BulletItem { .. })
                | (Some(ContentNode::NumberedItem { .. }), ContentNode::NumberedItem { .. })
        );

        if prev.is_some() {
            out.push_str(if same_list { "\n" } else { "\n\n" });
        }
        if !same_list {
            number = 0;
        }

        match node {
            ContentNode::Heading { level, text } => {
                out.push_str(&"#".repeat(usize::from(*level)));
                out.push(' ');
                out.push_str(text);
            }
            ContentNode::BulletItem { text } => {
                out.push_str("- ");
                out.push_str(text);
            }
            ContentNode::NumberedItem { text } => {
                number += 1;
                out.push_str(&format!("{number}. {text}"));
            }
            ContentNode::Paragraph { text } => out.push_str(text),
        }

        prev = Some(node);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_lists_tightly_and_blocks_loosely() {
        let nodes = vec![
            ContentNode::heading(2, "📝 상세 컨텍스트"),
            ContentNode::paragraph("Cache misses\non cold start"),
            ContentNode::bullet("a"),
            ContentNode::bullet("b"),
            ContentNode::numbered("x"),
            ContentNode::numbered("y"),
        ];
        assert_eq!(
            render(&nodes),
            "## 📝 상세 컨텍스트\n\nCache misses\non cold start\n\n- a\n- b\n\n1. x\n2. y"
        );
    }

    #[test]
    fn rendered_markdown_parses_back() {
        let nodes = vec![
            ContentNode::heading(3, "Result"),
            ContentNode::paragraph("p95 down 40%"),
            ContentNode::numbered("first"),
            ContentNode::numbered("second"),
        ];
        assert_eq!(crate::parse(&render(&nodes)), nodes);
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(render(&[]), "");
    }
}
