use scraper::{Html, Selector};
use url::Url;

/// Content pulled out of one HTML page.
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    pub title: String,
    pub body_text: String,
    pub links: Vec<String>,
}

/// Best-effort HTML extraction: missing title or body become empty strings,
/// unresolvable hrefs are skipped.
pub struct ContentExtractor {
    title_selector: Selector,
    body_selector: Selector,
    link_selector: Selector,
}

impl ContentExtractor {
    pub fn new() -> Self {
        // Static selectors, parse cannot fail.
        ContentExtractor {
            title_selector: Selector::parse("title").expect("valid selector"),
            body_selector: Selector::parse("body").expect("valid selector"),
            link_selector: Selector::parse("a[href]").expect("valid selector"),
        }
    }

    pub fn extract(&self, html: &str, base_url: &str) -> ExtractedPage {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title_selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
            .unwrap_or_default();

        let body_text = document
            .select(&self.body_selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
            .unwrap_or_default();

        let base = Url::parse(base_url).ok();
        let mut links = Vec::new();
        if let Some(base) = base {
            for element in document.select(&self.link_selector) {
                if let Some(href) = element.value().attr("href") {
                    if let Some(link) = resolve_link(&base, href) {
                        links.push(link);
                    }
                }
            }
        }

        ExtractedPage {
            title,
            body_text,
            links,
        }
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        ContentExtractor::new()
    }
}

/// Absolutizes `href` against `base`, dropping fragments and non-http(s)
/// schemes.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
