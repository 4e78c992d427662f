//! # Reply Parsing
//!
//! Helpers for cleaning up completion replies. The structured JSON path in
//! [`crate::completion`] is the primary one; the free-text parser here is the
//! last-resort fallback for models that ignore the JSON instruction.

use crate::models::{SectionOutline, SiteOutline};

/// Remove a surrounding markdown code fence (```html ... ```), if present.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("html", "json", ...) on the opening fence line.
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Cheap check that a reply is an HTML document rather than prose.
pub fn looks_like_html(reply: &str) -> bool {
    let lower = reply.trim_start().to_lowercase();
    lower.starts_with("<!doctype") || lower.contains("<html")
}

/// Recover a title/tagline/sections structure from a free-text reply.
///
/// First non-empty line is the title, the next one the tagline. A section
/// starts at a `##` heading, a `Section:`-style label, or a short line ending
/// in a colon; everything under it is the body. Returns `None` when not even
/// a title can be found.
pub fn parse_free_text(reply: &str) -> Option<SiteOutline> {
    let text = strip_code_fences(reply);
    let mut lines = text.lines().map(str::trim);

    let title = lines
        .by_ref()
        .find(|l| !l.is_empty())
        .map(clean_heading)
        .filter(|t| !t.is_empty())?;

    let mut tagline = String::new();
    let mut sections: Vec<SectionOutline> = Vec::new();
    let mut current: Option<SectionOutline> = None;

    for line in lines {
        if line.is_empty() {
            continue;
        }
        if let Some(heading) = section_heading(line) {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            current = Some(SectionOutline {
                heading,
                body: String::new(),
            });
        } else if let Some(section) = current.as_mut() {
            if !section.body.is_empty() {
                section.body.push(' ');
            }
            section.body.push_str(line);
        } else if tagline.is_empty() {
            tagline = clean_heading(line);
        } else {
            // Prose before any heading: fold it into a leading About section.
            current = Some(SectionOutline {
                heading: "About".to_string(),
                body: line.to_string(),
            });
        }
    }
    if let Some(done) = current.take() {
        sections.push(done);
    }

    Some(SiteOutline {
        title,
        tagline,
        sections,
    })
}

/// Does this line introduce a new section?
fn section_heading(line: &str) -> Option<String> {
    if let Some(rest) = line.strip_prefix("##") {
        let heading = clean_heading(rest);
        return (!heading.is_empty()).then_some(heading);
    }
    for label in ["Section:", "SECTION:"] {
        if let Some(rest) = line.strip_prefix(label) {
            let heading = clean_heading(rest);
            return (!heading.is_empty()).then_some(heading);
        }
    }
    // "Services:" style labels; keep the bar low to avoid eating body text.
    if line.len() < 40 && line.ends_with(':') && !line.contains('.') {
        let heading = clean_heading(line.trim_end_matches(':'));
        return (!heading.is_empty()).then_some(heading);
    }
    None
}

/// Strip markdown/label noise from a heading or title line.
fn clean_heading(line: &str) -> String {
    let mut s = line.trim();
    for prefix in ["Title:", "TITLE:", "Tagline:", "TAGLINE:"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim();
        }
    }
    s.trim_start_matches(['#', '*', '-'])
        .trim_end_matches('*')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_html() {
        let reply = "```html\n<html><body></body></html>\n```";
        assert_eq!(strip_code_fences(reply), "<html><body></body></html>");
    }

    #[test]
    fn leaves_unfenced_replies_alone() {
        assert_eq!(strip_code_fences("  <html></html>  "), "<html></html>");
    }

    #[test]
    fn detects_html_documents() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("\n<html lang=\"en\">"));
        assert!(!looks_like_html("Sure! Here is your website plan:"));
    }

    #[test]
    fn parses_markdown_style_reply() {
        let reply = "\
# Sunset Surf School
Ride your first wave with us.

## About
Family-run school on the north shore.

## Lessons
Beginner and intermediate group lessons.
Private coaching available.";
        let outline = parse_free_text(reply).unwrap();
        assert_eq!(outline.title, "Sunset Surf School");
        assert_eq!(outline.tagline, "Ride your first wave with us.");
        assert_eq!(outline.sections.len(), 2);
        assert_eq!(outline.sections[1].heading, "Lessons");
        assert!(outline.sections[1].body.contains("Private coaching"));
    }

    #[test]
    fn parses_label_style_reply() {
        let reply = "\
Title: Bean There Cafe
Tagline: Coffee worth crossing town for
Services:
Espresso, pour-over, and pastries.";
        let outline = parse_free_text(reply).unwrap();
        assert_eq!(outline.title, "Bean There Cafe");
        assert_eq!(outline.tagline, "Coffee worth crossing town for");
        assert_eq!(outline.sections[0].heading, "Services");
    }

    #[test]
    fn prose_without_headings_becomes_about() {
        let reply = "Acme Consulting\nStrategy for small teams\nWe help founders ship.";
        let outline = parse_free_text(reply).unwrap();
        assert_eq!(outline.sections.len(), 1);
        assert_eq!(outline.sections[0].heading, "About");
    }

    #[test]
    fn empty_reply_is_rejected() {
        assert!(parse_free_text("").is_none());
        assert!(parse_free_text("```\n\n```").is_none());
    }
}
