//! Parsing Markdown sources into addressable documents.
//!
//! A document's sections are delimited by headings. Each section is
//! addressable by a page-unique id: an explicit `{#id}` heading attribute
//! when present, otherwise a slug derived from the heading text and
//! deduplicated document-wide. Section contents run from the heading up to
//! the next heading of the same or higher rank, so subsections render as
//! part of their parent.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::domain::model::{Document, Range, Section};

static PARSER_OPTIONS: Lazy<Options> = Lazy::new(|| {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
});

/// Read and parse a Markdown document from disk.
pub fn load(path: &Path) -> Result<Document> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    Ok(parse(&source))
}

/// Parse a Markdown source into a [`Document`].
pub fn parse(source: &str) -> Document {
    let raw = collect_raw_sections(source);
    assemble(raw)
}

struct RawSection {
    heading: String,
    level: u8,
    explicit_id: Option<String>,
    content: String,
}

struct RawDocument {
    preamble: String,
    sections: Vec<RawSection>,
}

fn collect_raw_sections(source: &str) -> RawDocument {
    let mut preamble = String::new();
    let mut sections: Vec<RawSection> = Vec::new();
    let mut in_heading = false;

    for event in Parser::new_ext(source, *PARSER_OPTIONS) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                in_heading = true;
                sections.push(RawSection {
                    heading: String::new(),
                    level: heading_rank(level),
                    explicit_id: id.map(|value| value.to_string()),
                    content: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
            }
            Event::Text(text) | Event::Code(text) => {
                buffer_for(&mut preamble, &mut sections, in_heading).push_str(&text);
            }
            Event::SoftBreak | Event::HardBreak => {
                let buffer = buffer_for(&mut preamble, &mut sections, in_heading);
                if in_heading {
                    buffer.push(' ');
                } else {
                    buffer.push('\n');
                }
            }
            Event::End(end) if is_block_end(&end) => {
                let buffer = buffer_for(&mut preamble, &mut sections, false);
                if !buffer.is_empty() && !buffer.ends_with('\n') {
                    buffer.push('\n');
                }
            }
            Event::End(TagEnd::TableCell) => {
                buffer_for(&mut preamble, &mut sections, false).push('\t');
            }
            _ => {}
        }
    }

    RawDocument { preamble, sections }
}

fn buffer_for<'a>(
    preamble: &'a mut String,
    sections: &'a mut [RawSection],
    in_heading: bool,
) -> &'a mut String {
    match sections.last_mut() {
        Some(section) if in_heading => &mut section.heading,
        Some(section) => &mut section.content,
        None => preamble,
    }
}

fn is_block_end(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Paragraph
            | TagEnd::Item
            | TagEnd::CodeBlock
            | TagEnd::TableHead
            | TagEnd::TableRow
    )
}

fn heading_rank(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn assemble(raw: RawDocument) -> Document {
    let mut body = String::new();
    let preamble = raw.preamble.trim_matches('\n');
    if !preamble.is_empty() {
        body.push_str(preamble);
    }

    // Own contents of each section, before nesting extends them.
    let mut spans: Vec<Range> = Vec::with_capacity(raw.sections.len());
    for section in &raw.sections {
        if !body.is_empty() {
            body.push_str("\n\n");
        }
        body.push_str(section.heading.trim());
        body.push('\n');
        let start = body.len();
        body.push_str(section.content.trim_matches('\n'));
        spans.push(Range {
            start,
            end: body.len(),
        });
    }

    let mut used_ids: HashMap<String, usize> = HashMap::new();
    let mut sections = Vec::with_capacity(raw.sections.len());
    for (index, section) in raw.sections.iter().enumerate() {
        let mut end = spans[index].end;
        for (next, span) in raw.sections.iter().zip(&spans).skip(index + 1) {
            if next.level <= section.level {
                break;
            }
            end = span.end;
        }

        let span = Range {
            start: spans[index].start,
            end,
        };
        sections.push(Section {
            id: unique_id(&mut used_ids, section),
            heading: section.heading.trim().to_string(),
            level: section.level,
            text: body[span.start..span.end].to_string(),
            span,
        });
    }

    Document::from_parts(sections, body)
}

fn unique_id(used: &mut HashMap<String, usize>, section: &RawSection) -> String {
    let base = section
        .explicit_id
        .clone()
        .unwrap_or_else(|| slugify(&section.heading));

    let seen = used.entry(base.clone()).or_insert(0);
    let id = if *seen == 0 {
        base
    } else {
        format!("{base}-{seen}")
    };
    *seen += 1;
    id
}

fn slugify(heading: &str) -> String {
    let mut slug = String::new();
    for ch in heading.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            slug.push('-');
        }
    }
    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_addressable_by_slug() {
        let doc = parse("# Getting Started\n\nRead this first.\n\n# Reference\n\nDetails.\n");

        let first = doc.section("getting-started").expect("slug id");
        assert_eq!(first.heading, "Getting Started");
        assert_eq!(first.text, "Read this first.");

        let second = doc.section("reference").expect("slug id");
        assert_eq!(second.text, "Details.");
    }

    #[test]
    fn explicit_heading_attribute_wins_over_slug() {
        let doc = parse("## Demo {#custom-id}\n\nHello\n");

        assert!(doc.section("demo").is_none());
        let section = doc.section("custom-id").expect("explicit id");
        assert_eq!(section.text, "Hello");
    }

    #[test]
    fn duplicate_headings_get_deduplicated_ids() {
        let doc = parse("## Box\n\none\n\n## Box\n\ntwo\n");

        assert_eq!(doc.section("box").unwrap().text, "one");
        assert_eq!(doc.section("box-1").unwrap().text, "two");
    }

    #[test]
    fn section_contents_include_subsections() {
        let doc = parse("# A\n\ncontent a\n\n## B\n\ncontent b\n\n# C\n\ncontent c\n");

        let parent = doc.section("a").expect("parent section");
        assert_eq!(parent.text, "content a\n\nB\ncontent b");
        assert_eq!(doc.section("b").unwrap().text, "content b");
        assert_eq!(doc.section("c").unwrap().text, "content c");
    }

    #[test]
    fn inline_formatting_is_stripped_from_rendered_text() {
        let doc = parse("## Demo\n\nSome **bold** text and `code`.\n");

        assert_eq!(doc.section("demo").unwrap().text, "Some bold text and code.");
    }

    #[test]
    fn missing_section_resolves_to_none() {
        let doc = parse("## Box\n\nHello\n");
        assert!(doc.section("nope").is_none());
    }

    #[test]
    fn preamble_is_part_of_the_body_but_not_addressable() {
        let doc = parse("intro text\n\n## Box\n\nHello\n");

        assert!(doc.body().starts_with("intro text"));
        assert_eq!(doc.sections().len(), 1);
    }

    #[test]
    fn heading_only_section_has_empty_text() {
        let doc = parse("## Empty\n\n## Next\n\nbody\n");

        let empty = doc.section("empty").unwrap();
        assert_eq!(empty.text, "");
        assert!(empty.span.is_empty());
    }

    #[test]
    fn span_matches_rendered_text() {
        let doc = parse("## Box\n\nHello\n\nWorld\n");
        let section = doc.section("box").unwrap();

        assert_eq!(doc.slice(section.span), section.text);
    }
}
