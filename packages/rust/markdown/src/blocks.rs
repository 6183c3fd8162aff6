//! Line-oriented block scanner.
//!
//! Single forward pass. Headings and list items consume one line; anything
//! else opens a paragraph run that swallows following lines until a blank
//! line or a line that looks like the start of another block.

use worklog_shared::ContentNode;

/// Width of the window searched for a numbered-list `". "` marker.
const NUMBERED_WINDOW: usize = 4;

pub(crate) fn parse_blocks(text: &str) -> Vec<ContentNode> {
    let lines: Vec<&str> = text.lines().collect();
    let mut nodes = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        // Heading prefixes are matched on the raw line: indented `##` is text.
        if let Some(rest) = line.strip_prefix("### ") {
            push_unless_blank(&mut nodes, rest, |t| ContentNode::heading(3, t));
        } else if let Some(rest) = line.strip_prefix("## ") {
            push_unless_blank(&mut nodes, rest, |t| ContentNode::heading(2, t));
        } else if let Some(rest) = trimmed.strip_prefix("- ") {
            push_unless_blank(&mut nodes, rest, ContentNode::bullet);
        } else if let Some(rest) = numbered_item(trimmed) {
            push_unless_blank(&mut nodes, rest, ContentNode::numbered);
        } else {
            let end = paragraph_end(&lines, i);
            nodes.push(ContentNode::paragraph(lines[i..end].join("\n")));
            i = end;
            continue;
        }

        i += 1;
    }

    nodes
}

fn push_unless_blank(
    nodes: &mut Vec<ContentNode>,
    text: &str,
    make: impl FnOnce(String) -> ContentNode,
) {
    let text = text.trim();
    if !text.is_empty() {
        nodes.push(make(text.to_string()));
    }
}

/// `"1. foo"` → `Some("foo")`.
///
/// The line must start with a digit and contain `". "` within its first
/// four characters, so `"10. foo"` matches and `"100. foo"` does not.
fn numbered_item(trimmed: &str) -> Option<&str> {
    if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let window_end = trimmed
        .char_indices()
        .nth(NUMBERED_WINDOW)
        .map_or(trimmed.len(), |(idx, _)| idx);

    if !trimmed[..window_end].contains(". ") {
        return None;
    }

    trimmed.split_once(". ").map(|(_, rest)| rest)
}

/// Index one past the last line of the paragraph run starting at `start`.
fn paragraph_end(lines: &[&str], start: usize) -> usize {
    let mut end = start + 1;
    while end < lines.len() && continues_paragraph(lines[end]) {
        end += 1;
    }
    end
}

/// Continuation lines are checked unindented against block openers:
/// `#`, `-`, or a single digit followed by `.`.
fn continues_paragraph(line: &str) -> bool {
    if line.trim().is_empty() || line.starts_with('#') || line.starts_with('-') {
        return false;
    }

    let mut chars = line.chars();
    let digit_dot = matches!(
        (chars.next(), chars.next()),
        (Some(d), Some('.')) if d.is_ascii_digit()
    );
    !digit_dot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(level: u8, t: &str) -> ContentNode {
        ContentNode::heading(level, t)
    }

    #[test]
    fn headings_and_bullets() {
        let nodes = parse_blocks("### A\n\n- b\n- c\n");
        assert_eq!(
            nodes,
            vec![h(3, "A"), ContentNode::bullet("b"), ContentNode::bullet("c")]
        );
    }

    #[test]
    fn consecutive_lines_coalesce_into_one_paragraph() {
        let nodes = parse_blocks("line1\nline2\n\n## H\n");
        assert_eq!(
            nodes,
            vec![ContentNode::paragraph("line1\nline2"), h(2, "H")]
        );
    }

    #[test]
    fn paragraph_stops_at_block_opener() {
        let nodes = parse_blocks("intro\n- first\n1. one\nplain\n## Next");
        assert_eq!(
            nodes,
            vec![
                ContentNode::paragraph("intro"),
                ContentNode::bullet("first"),
                ContentNode::numbered("one"),
                ContentNode::paragraph("plain"),
                h(2, "Next"),
            ]
        );
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        assert_eq!(parse_blocks("#tag"), vec![ContentNode::paragraph("#tag")]);
        assert_eq!(
            parse_blocks("# Title"),
            vec![ContentNode::paragraph("# Title")]
        );
        assert_eq!(
            parse_blocks("####  deep"),
            vec![ContentNode::paragraph("####  deep")]
        );
    }

    #[test]
    fn indented_heading_is_paragraph_but_indented_bullet_is_bullet() {
        assert_eq!(
            parse_blocks("  ## not heading"),
            vec![ContentNode::paragraph("  ## not heading")]
        );
        assert_eq!(
            parse_blocks("   - nested"),
            vec![ContentNode::bullet("nested")]
        );
    }

    #[test]
    fn numbered_list_window() {
        assert_eq!(parse_blocks("1. one"), vec![ContentNode::numbered("one")]);
        assert_eq!(parse_blocks("10. ten"), vec![ContentNode::numbered("ten")]);
        assert_eq!(
            parse_blocks("100. hundred"),
            vec![ContentNode::paragraph("100. hundred")]
        );
        // A digit without the `. ` marker is plain text.
        assert_eq!(
            parse_blocks("2025 was busy"),
            vec![ContentNode::paragraph("2025 was busy")]
        );
    }

    #[test]
    fn numbered_item_keeps_text_after_first_marker() {
        assert_eq!(
            parse_blocks("3. Ship v1. Then iterate"),
            vec![ContentNode::numbered("Ship v1. Then iterate")]
        );
    }

    #[test]
    fn two_digit_number_continues_a_paragraph() {
        // Continuation only stops on a single digit followed by `.`.
        let nodes = parse_blocks("summary\n10. still summary");
        assert_eq!(
            nodes,
            vec![ContentNode::paragraph("summary\n10. still summary")]
        );
    }

    #[test]
    fn indented_bullet_is_absorbed_by_paragraph() {
        let nodes = parse_blocks("• Situation\n  - detail");
        assert_eq!(
            nodes,
            vec![ContentNode::paragraph("• Situation\n  - detail")]
        );
    }

    #[test]
    fn blank_markers_produce_no_nodes() {
        assert!(parse_blocks("").is_empty());
        assert!(parse_blocks("\n  \n\t\n").is_empty());
        assert!(parse_blocks("### \n##   ").is_empty());
    }

    #[test]
    fn multibyte_text_is_handled() {
        let nodes = parse_blocks("## 🎯 주간 성과\n응답시간 50% 단축\n캐시 도입");
        assert_eq!(
            nodes,
            vec![
                h(2, "🎯 주간 성과"),
                ContentNode::paragraph("응답시간 50% 단축\n캐시 도입"),
            ]
        );
        assert_eq!(
            parse_blocks("가. 항목"),
            vec![ContentNode::paragraph("가. 항목")]
        );
    }

    #[test]
    fn crlf_line_endings() {
        let nodes = parse_blocks("## H\r\n- a\r\ntext\r\n");
        assert_eq!(
            nodes,
            vec![h(2, "H"), ContentNode::bullet("a"), ContentNode::paragraph("text")]
        );
    }

    #[test]
    fn order_and_non_empty_invariants() {
        let input = "a\n\n### b\n- c\n\n2. d\ne\nf\n\n## g";
        let nodes = parse_blocks(input);
        let texts: Vec<&str> = nodes.iter().map(ContentNode::text).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d", "e\nf", "g"]);
        assert!(nodes.iter().all(|n| !n.text().trim().is_empty()));
    }
}
