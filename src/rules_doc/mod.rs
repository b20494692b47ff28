//! Rules document rendering
//!
//! Architecture: Presentation Layer - The rules document is shown, never interpreted
//! - Text is split line by line into headings, lists, code blocks and paragraphs
//! - Inline bold, italic and code spans become styled segments
//! - Rendering to the terminal is separate from parsing so both can be tested

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INLINE_SPAN: Regex =
        Regex::new(r"\*\*(.*?)\*\*|\*(.*?)\*|`(.*?)`").expect("inline span pattern compiles");
}

/// Styled segment of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
}

/// One block of the rules document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(Vec<Inline>),
    List(Vec<Vec<Inline>>),
    CodeBlock(Vec<String>),
    Blank,
}

/// Split a line into styled segments
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE_SPAN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };

        if whole.start() > last {
            spans.push(Inline::Text(text[last..whole.start()].to_string()));
        }

        let span = if let Some(bold) = caps.get(1) {
            Inline::Bold(bold.as_str().to_string())
        } else if let Some(italic) = caps.get(2) {
            Inline::Italic(italic.as_str().to_string())
        } else if let Some(code) = caps.get(3) {
            Inline::Code(code.as_str().to_string())
        } else {
            Inline::Text(whole.as_str().to_string())
        };
        spans.push(span);
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Inline::Text(text[last..].to_string()));
    }

    spans
}

fn heading(line: &str) -> Option<(u8, &str)> {
    [("# ", 1), ("## ", 2), ("### ", 3)]
        .into_iter()
        .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|text| (level, text)))
}

/// Parse the document into blocks
pub fn parse(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut list: Vec<Vec<Inline>> = Vec::new();
    let mut code: Option<Vec<String>> = None;

    let flush_list = |list: &mut Vec<Vec<Inline>>, blocks: &mut Vec<Block>| {
        if !list.is_empty() {
            blocks.push(Block::List(std::mem::take(list)));
        }
    };

    for line in text.lines() {
        if line.starts_with("```") {
            match code.take() {
                Some(lines) => blocks.push(Block::CodeBlock(lines)),
                None => {
                    flush_list(&mut list, &mut blocks);
                    code = Some(Vec::new());
                }
            }
            continue;
        }

        if let Some(lines) = code.as_mut() {
            lines.push(line.to_string());
            continue;
        }

        let trimmed = line.trim();
        if let Some(item) = trimmed.strip_prefix('-') {
            list.push(parse_inline(item.trim()));
            continue;
        }

        flush_list(&mut list, &mut blocks);

        if let Some((level, text)) = heading(line) {
            blocks.push(Block::Heading { level, text: text.to_string() });
        } else if !trimmed.is_empty() {
            blocks.push(Block::Paragraph(parse_inline(line)));
        } else {
            blocks.push(Block::Blank);
        }
    }

    flush_list(&mut list, &mut blocks);
    // an unterminated fence still shows its content
    if let Some(lines) = code {
        blocks.push(Block::CodeBlock(lines));
    }

    blocks
}

#[cfg(feature = "colors")]
fn style_inline(span: &Inline, use_colors: bool) -> String {
    use colored::Colorize;

    match span {
        Inline::Text(text) => text.clone(),
        Inline::Bold(text) if use_colors => text.bold().to_string(),
        Inline::Italic(text) if use_colors => text.italic().to_string(),
        Inline::Code(text) if use_colors => text.cyan().to_string(),
        Inline::Bold(text) | Inline::Italic(text) => text.clone(),
        Inline::Code(text) => format!("`{text}`"),
    }
}

#[cfg(not(feature = "colors"))]
fn style_inline(span: &Inline, _use_colors: bool) -> String {
    match span {
        Inline::Text(text) | Inline::Bold(text) | Inline::Italic(text) => text.clone(),
        Inline::Code(text) => format!("`{text}`"),
    }
}

#[cfg(feature = "colors")]
fn style_heading(text: &str, level: u8, use_colors: bool) -> String {
    use colored::Colorize;

    if !use_colors {
        return text.to_string();
    }
    match level {
        1 => text.bold().underline().to_string(),
        2 => text.bold().to_string(),
        _ => text.bold().dimmed().to_string(),
    }
}

#[cfg(not(feature = "colors"))]
fn style_heading(text: &str, _level: u8, _use_colors: bool) -> String {
    text.to_string()
}

fn render_line(spans: &[Inline], use_colors: bool) -> String {
    spans.iter().map(|span| style_inline(span, use_colors)).collect()
}

/// Render blocks for a terminal
pub fn render_terminal(blocks: &[Block], use_colors: bool) -> String {
    let mut output = String::new();

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                output.push_str(&style_heading(text, *level, use_colors));
                output.push('\n');
                if *level == 1 {
                    output.push_str(&"=".repeat(text.chars().count()));
                    output.push('\n');
                }
            }
            Block::Paragraph(spans) => {
                output.push_str(&render_line(spans, use_colors));
                output.push('\n');
            }
            Block::List(items) => {
                for item in items {
                    output.push_str("  • ");
                    output.push_str(&render_line(item, use_colors));
                    output.push('\n');
                }
            }
            Block::CodeBlock(lines) => {
                for line in lines {
                    output.push_str("    ");
                    output.push_str(line);
                    output.push('\n');
                }
            }
            Block::Blank => output.push('\n'),
        }
    }

    output
}

/// Parse and render a document in one step
pub fn render_document(text: &str, use_colors: bool) -> String {
    render_terminal(&parse(text), use_colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_inline_spans() {
        assert_eq!(
            parse_inline("Use **short** *plain* `words` here"),
            vec![
                text("Use "),
                Inline::Bold("short".to_string()),
                text(" "),
                Inline::Italic("plain".to_string()),
                text(" "),
                Inline::Code("words".to_string()),
                text(" here"),
            ]
        );
        assert_eq!(parse_inline("no markup"), vec![text("no markup")]);
        assert!(parse_inline("").is_empty());
    }

    #[rstest]
    #[case("# Title", 1, "Title")]
    #[case("## Section", 2, "Section")]
    #[case("### Detail", 3, "Detail")]
    fn test_headings(#[case] line: &str, #[case] level: u8, #[case] expected: &str) {
        assert_eq!(parse(line), vec![Block::Heading { level, text: expected.to_string() }]);
    }

    #[test]
    fn test_deeper_heading_is_paragraph() {
        assert!(matches!(parse("#### Deep")[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_document_structure() {
        let doc = "# Rules\n\nIntro **text**\n- one\n  - two\nAfter\n```\ncode line\n```";
        let blocks = parse(doc);

        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, text: "Rules".to_string() },
                Block::Blank,
                Block::Paragraph(vec![text("Intro "), Inline::Bold("text".to_string())]),
                Block::List(vec![vec![text("one")], vec![text("two")]]),
                Block::Paragraph(vec![text("After")]),
                Block::CodeBlock(vec!["code line".to_string()]),
            ]
        );
    }

    #[test]
    fn test_list_closed_by_code_fence_and_eof() {
        let blocks = parse("- item\n```\n- not a list\n```\n- last");

        assert_eq!(
            blocks,
            vec![
                Block::List(vec![vec![text("item")]]),
                Block::CodeBlock(vec!["- not a list".to_string()]),
                Block::List(vec![vec![text("last")]]),
            ]
        );
    }

    #[test]
    fn test_unterminated_code_block_is_kept() {
        assert_eq!(parse("```\nabc"), vec![Block::CodeBlock(vec!["abc".to_string()])]);
    }

    #[test]
    fn test_render_plain() {
        let output = render_document("# Rules\n- Use `FX` only\n```\nraw\n```", false);

        assert_eq!(output, "Rules\n=====\n  • Use `FX` only\n    raw\n");
    }
}
