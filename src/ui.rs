//! Terminal styling: colours for each speaker and a small Markdown renderer.

use colored::*;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Kai's own voice (banners, prompt).
pub fn kai_says(msg: &str) -> ColoredString {
    msg.bright_green().bold()
}

/// Error voice.
pub fn error_text(msg: &str) -> ColoredString {
    msg.bright_red().bold()
}

/// Print a fatal error as a single red line on stderr.
pub fn print_error(msg: &str) {
    eprintln!("{}", error_text(&format!("kai: {msg}")));
}

/// Model output: Markdown rendered to ANSI, behind the robot marker.
pub fn llm_says(msg: &str) -> String {
    format!("{} {}", "🤖:".yellow(), render_markdown(msg))
}

#[derive(Default)]
struct SpanStyle {
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    heading: bool,
}

impl SpanStyle {
    fn paint(&self, text: &str) -> String {
        let mut styled = text.yellow();
        if self.heading {
            styled = styled.bold().underline();
        }
        if self.strong > 0 {
            styled = styled.bold();
        }
        if self.emphasis > 0 {
            styled = styled.italic();
        }
        if self.strikethrough > 0 {
            styled = styled.strikethrough();
        }
        styled.to_string()
    }
}

/// Render Markdown as ANSI-styled terminal text.
///
/// Handles headings, emphasis, inline code, fenced/indented code blocks,
/// ordered and unordered (nested) lists, links and rules. Anything else is
/// passed through as text.
pub fn render_markdown(source: &str) -> String {
    let mut out = String::new();
    let mut style = SpanStyle::default();
    let mut in_code_block = false;
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut link: Option<String> = None;

    for event in Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { .. }) => style.heading = true,
            Event::End(TagEnd::Heading(_)) => {
                style.heading = false;
                out.push_str("\n\n");
            }
            Event::End(TagEnd::Paragraph) => {
                out.push_str(if lists.is_empty() { "\n\n" } else { "\n" });
            }
            Event::Start(Tag::Strong) => style.strong += 1,
            Event::End(TagEnd::Strong) => style.strong = style.strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => style.emphasis += 1,
            Event::End(TagEnd::Emphasis) => style.emphasis = style.emphasis.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => style.strikethrough += 1,
            Event::End(TagEnd::Strikethrough) => {
                style.strikethrough = style.strikethrough.saturating_sub(1)
            }
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                out.push('\n');
            }
            Event::Start(Tag::List(start)) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                let depth = lists.len().saturating_sub(1);
                let bullet = match lists.last_mut() {
                    Some(Some(n)) => {
                        let bullet = format!("{n}. ");
                        *n += 1;
                        bullet
                    }
                    _ => "• ".to_string(),
                };
                out.push_str(&"  ".repeat(depth));
                out.push_str(&bullet.yellow().bold().to_string());
            }
            Event::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Link { dest_url, .. }) => link = Some(dest_url.to_string()),
            Event::End(TagEnd::Link) => {
                if let Some(url) = link.take() {
                    out.push_str(&format!(" ({url})").dimmed().to_string());
                }
            }
            Event::Text(text) if in_code_block => {
                for line in text.lines() {
                    out.push_str("    ");
                    out.push_str(&line.green().to_string());
                    out.push('\n');
                }
            }
            Event::Text(text) => out.push_str(&style.paint(&text)),
            Event::Code(code) => out.push_str(&code.cyan().to_string()),
            Event::Html(html) | Event::InlineHtml(html) => out.push_str(&style.paint(&html)),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                out.push_str(&"─".repeat(40).dimmed().to_string());
                out.push_str("\n\n");
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}
