//! # Templates
//!
//! Template selection, prompt construction and the deterministic HTML
//! renderer. Selection is a keyword-containment heuristic over the user's
//! prompt; rendering turns a [`SiteOutline`] into a complete one-page HTML
//! document with embedded CSS, so page structure never depends on how the
//! model formatted its reply.

mod prompts;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SiteOutline;

/// The site archetypes SiteCraft knows how to prompt for and render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Landing,
    Portfolio,
    Restaurant,
    Store,
    Blog,
}

impl TemplateKind {
    pub fn all() -> [TemplateKind; 5] {
        [
            TemplateKind::Landing,
            TemplateKind::Portfolio,
            TemplateKind::Restaurant,
            TemplateKind::Store,
            TemplateKind::Blog,
        ]
    }

    /// Pick a template from the user's prompt. First match wins, in the
    /// order of [`TemplateKind::all`]; no match falls back to `Landing`.
    pub fn detect(prompt: &str) -> TemplateKind {
        let lower = prompt.to_lowercase();
        for kind in [
            TemplateKind::Portfolio,
            TemplateKind::Restaurant,
            TemplateKind::Store,
            TemplateKind::Blog,
        ] {
            if kind.keywords().iter().any(|k| lower.contains(k)) {
                return kind;
            }
        }
        TemplateKind::Landing
    }

    /// Parse a template slug from an API request or CLI flag.
    pub fn from_slug(slug: &str) -> Option<TemplateKind> {
        TemplateKind::all()
            .into_iter()
            .find(|k| k.slug() == slug.to_lowercase())
    }

    pub fn slug(&self) -> &'static str {
        match self {
            TemplateKind::Landing => "landing",
            TemplateKind::Portfolio => "portfolio",
            TemplateKind::Restaurant => "restaurant",
            TemplateKind::Store => "store",
            TemplateKind::Blog => "blog",
        }
    }

    /// Keywords that select this template.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            TemplateKind::Landing => &[],
            TemplateKind::Portfolio => &["portfolio", "photographer", "designer", "resume", "cv"],
            TemplateKind::Restaurant => &["restaurant", "cafe", "bakery", "bistro", "menu"],
            TemplateKind::Store => &["store", "shop", "boutique", "e-commerce", "ecommerce"],
            TemplateKind::Blog => &["blog", "magazine", "newsletter", "journal"],
        }
    }

    /// System prompt for the completion call.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            TemplateKind::Landing => prompts::LANDING,
            TemplateKind::Portfolio => prompts::PORTFOLIO,
            TemplateKind::Restaurant => prompts::RESTAURANT,
            TemplateKind::Store => prompts::STORE,
            TemplateKind::Blog => prompts::BLOG,
        }
    }

    /// User message asking for a structured outline as a JSON object.
    pub fn outline_prompt(&self, user_prompt: &str) -> String {
        format!(
            "Plan a one-page website inspired by: \"{user_prompt}\"\n\n\
             Respond with a single JSON object, no prose, in this exact shape:\n\
             {{\"title\": string, \"tagline\": string, \"sections\": \
             [{{\"heading\": string, \"body\": string}}]}}\n\n\
             Provide 5 visually distinct sections with 2-3 sentences of body \
             copy each. The title must be bold and catchy, the tagline \
             professional."
        )
    }

    /// User message asking for a complete HTML document in one shot.
    pub fn page_prompt(&self, user_prompt: &str, image_url: &str) -> String {
        format!(
            "Create a beautiful one-page responsive website using only HTML \
             and embedded CSS.\n\n\
             The site should include:\n\
             - A full-width hero image using this image URL: {image_url}\n\
             - A bold and catchy H1 website title inspired by: \"{user_prompt}\"\n\
             - A professional tagline under the title\n\
             - 5 visually distinct, well-structured content sections\n\
             - A clean footer with copyright\n\
             Use elegant formatting, soft section background colors, good \
             spacing, and smooth layout. Return only valid HTML, nothing else."
        )
    }

    /// Accent and soft section background colors for the renderer.
    fn palette(&self) -> (&'static str, &'static str) {
        match self {
            TemplateKind::Landing => ("#2563eb", "#eff6ff"),
            TemplateKind::Portfolio => ("#0f766e", "#f0fdfa"),
            TemplateKind::Restaurant => ("#b45309", "#fffbeb"),
            TemplateKind::Store => ("#7c3aed", "#f5f3ff"),
            TemplateKind::Blog => ("#334155", "#f8fafc"),
        }
    }
}

/// Render an outline into a complete HTML document.
///
/// All model-supplied text is escaped; the only markup on the page is ours.
pub fn render(outline: &SiteOutline, image_url: Option<&str>, template: TemplateKind) -> String {
    let (accent, soft_bg) = template.palette();
    let title = escape_html(&outline.title);
    let tagline = escape_html(&outline.tagline);
    let year = Utc::now().year();

    let hero = match image_url {
        Some(url) => format!(
            "  <div class=\"hero\" style=\"background-image:url('{}')\"></div>\n",
            escape_html(url)
        ),
        None => String::new(),
    };

    let mut sections = String::new();
    for (i, section) in outline.sections.iter().enumerate() {
        let bg = if i % 2 == 0 { soft_bg } else { "#ffffff" };
        sections.push_str(&format!(
            "  <section style=\"background:{bg}\">\n    <h2>{}</h2>\n    <p>{}</p>\n  </section>\n",
            escape_html(&section.heading),
            escape_html(&section.body),
        ));
    }

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <style>\n\
         body {{ margin: 0; font-family: 'Segoe UI', system-ui, sans-serif; color: #1f2937; }}\n\
         .hero {{ height: 60vh; background-size: cover; background-position: center; }}\n\
         header {{ text-align: center; padding: 3rem 1.5rem; }}\n\
         header h1 {{ font-size: 2.75rem; margin: 0 0 .5rem; color: {accent}; }}\n\
         header p {{ font-size: 1.25rem; color: #4b5563; margin: 0; }}\n\
         section {{ padding: 3rem 1.5rem; }}\n\
         section h2 {{ color: {accent}; margin-top: 0; }}\n\
         section p {{ max-width: 46rem; line-height: 1.7; }}\n\
         footer {{ text-align: center; padding: 1.5rem; background: #111827; color: #e5e7eb; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         {hero}\
         \x20 <header>\n    <h1>{title}</h1>\n    <p>{tagline}</p>\n  </header>\n\
         {sections}\
         \x20 <footer>&copy; {year} {title}. All rights reserved.</footer>\n\
         </body>\n\
         </html>\n"
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionOutline;

    #[test]
    fn detects_templates_from_keywords() {
        assert_eq!(
            TemplateKind::detect("A portfolio for a wedding photographer"),
            TemplateKind::Portfolio
        );
        assert_eq!(
            TemplateKind::detect("Cozy CAFE in Lisbon"),
            TemplateKind::Restaurant
        );
        assert_eq!(
            TemplateKind::detect("an e-commerce shop for sneakers"),
            TemplateKind::Store
        );
        assert_eq!(
            TemplateKind::detect("my travel blog"),
            TemplateKind::Blog
        );
        assert_eq!(
            TemplateKind::detect("a SaaS for dog walkers"),
            TemplateKind::Landing
        );
    }

    #[test]
    fn slug_round_trips() {
        for kind in TemplateKind::all() {
            assert_eq!(TemplateKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(TemplateKind::from_slug("brochure"), None);
    }

    fn sample_outline() -> SiteOutline {
        SiteOutline {
            title: "Bits & Bobs".to_string(),
            tagline: "Odd parts, found fast".to_string(),
            sections: vec![
                SectionOutline {
                    heading: "About".to_string(),
                    body: "We stock <everything>.".to_string(),
                },
                SectionOutline {
                    heading: "Contact".to_string(),
                    body: "Drop by any time.".to_string(),
                },
            ],
        }
    }

    #[test]
    fn renders_complete_document() {
        let html = render(&sample_outline(), Some("https://img.example/x.png"), TemplateKind::Store);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Bits &amp; Bobs</h1>"));
        assert!(html.contains("Odd parts, found fast"));
        assert!(html.contains("background-image:url('https://img.example/x.png')"));
        assert!(html.contains("<h2>Contact</h2>"));
        assert!(html.contains("All rights reserved"));
    }

    #[test]
    fn escapes_model_supplied_markup() {
        let html = render(&sample_outline(), None, TemplateKind::Landing);
        assert!(html.contains("We stock &lt;everything&gt;."));
        assert!(!html.contains("<everything>"));
        // No image requested, no hero block.
        assert!(!html.contains("class=\"hero\""));
    }

    #[test]
    fn page_prompt_embeds_image_and_subject() {
        let prompt = TemplateKind::Landing.page_prompt("a surf school", "https://img/x");
        assert!(prompt.contains("https://img/x"));
        assert!(prompt.contains("a surf school"));
        assert!(prompt.contains("Return only valid HTML"));
    }

    #[test]
    fn outline_prompt_requests_json() {
        let prompt = TemplateKind::Blog.outline_prompt("a cooking blog");
        assert!(prompt.contains("JSON object"));
        assert!(prompt.contains("\"sections\""));
    }
}
