use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// HTML produced from markdown, plus which downstream passes the page
/// needs (syntax highlighting for code blocks, math typesetting).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    pub has_code: bool,
    pub has_math: bool,
}

/// Render a raw Markdown string to HTML.
///
/// Supports GitHub Flavored Markdown (GFM) features: tables, footnotes,
/// strikethrough, task lists, and smart punctuation. `$...$` and
/// `$$...$$` math spans are passed through unmodified as literal text so
/// the downstream typesetting pass can recognize them.
pub fn render_markdown(raw: &str) -> RenderedMarkdown {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_MATH;

    let mut has_code = false;
    let mut has_math = false;

    let parser = Parser::new_ext(raw, options).map(|event| {
        if let Event::Start(Tag::CodeBlock(_)) = &event {
            has_code = true;
        }
        match event {
            Event::InlineMath(math) => {
                has_math = true;
                Event::Text(format!("${math}$").into())
            }
            Event::DisplayMath(math) => {
                has_math = true;
                Event::Text(format!("$${math}$$").into())
            }
            other => other,
        }
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    RenderedMarkdown {
        html: html_output,
        has_code,
        has_math,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_paragraph() {
        let result = render_markdown("Hello, world!");
        assert_eq!(result.html.trim(), "<p>Hello, world!</p>");
        assert!(!result.has_code);
        assert!(!result.has_math);
    }

    #[test]
    fn heading() {
        let result = render_markdown("# Title");
        assert_eq!(result.html.trim(), "<h1>Title</h1>");
    }

    #[test]
    fn bold_and_italic() {
        let result = render_markdown("**bold** and *italic*");
        assert!(result.html.contains("<strong>bold</strong>"));
        assert!(result.html.contains("<em>italic</em>"));
    }

    #[test]
    fn code_block_sets_highlight_flag() {
        let result = render_markdown("```rust\nfn main() {}\n```");
        assert!(result.html.contains("<code"));
        assert!(result.html.contains("language-rust"));
        assert!(result.has_code);
    }

    #[test]
    fn inline_math_passes_through() {
        let result = render_markdown("Euler: $e^{i\\pi} + 1 = 0$ holds.");
        assert!(result.html.contains("$e^{i\\pi} + 1 = 0$"));
        assert!(result.has_math);
    }

    #[test]
    fn display_math_passes_through() {
        let result = render_markdown("$$\\int_0^1 x^2 dx$$");
        assert!(result.html.contains("$$"));
        assert!(result.html.contains("\\int_0^1 x^2 dx"));
        assert!(result.has_math);
    }

    #[test]
    fn math_delimiters_survive_inside_lists() {
        let result = render_markdown("- item with $a_1$\n- plain item");
        assert!(result.html.contains("$a_1$"));
    }

    #[test]
    fn table() {
        let result = render_markdown("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(result.html.contains("<table>"));
        assert!(result.html.contains("<td>1</td>"));
    }

    #[test]
    fn strikethrough() {
        let result = render_markdown("~~deleted~~");
        assert!(result.html.contains("<del>deleted</del>"));
    }

    #[test]
    fn task_list() {
        let result = render_markdown("- [x] done\n- [ ] not done");
        assert!(result.html.contains("checked"));
        assert!(result.html.contains("type=\"checkbox\""));
    }

    #[test]
    fn empty_input() {
        let result = render_markdown("");
        assert_eq!(result.html, "");
    }
}
