// src/fetch/html.rs
// =============================================================================
// Pulls the bits we care about out of an HTML page:
// - the <title> text
// - every <a href> link, resolved to an absolute http(s) URL
//
// `scraper` gives us a DOM and CSS selectors, `url` resolves relative hrefs
// against the page URL (the final URL after redirects, so relative links
// point where a browser would send them).
// =============================================================================

use crate::error::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// What a page contributes to the crawl besides its status and size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub title: Option<String>,
    pub links: Vec<Url>,
}

// Parses a selector, turning a bad one into a ParseError instead of a panic
fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}

// Extracts the title and absolute links from an HTML document
//
// Example:
//   html = "<title>Home</title><a href='/docs'>Docs</a>"
//   base = "https://example.com/"
//   -> title Some("Home"), links ["https://example.com/docs"]
pub fn extract_page(html: &str, base: &Url) -> Result<PageContent, ParseError> {
    let document = Html::parse_document(html);
    let title_selector = selector("title")?;
    let link_selector = selector("a[href]")?;

    let title = document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());

    let links = document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .collect();

    Ok(PageContent { title, links })
}

// Resolves an href against the page URL, keeping only http(s) results
//
//   base = "https://example.com/page/"
//   "/docs"              -> Some("https://example.com/docs")
//   "../other"           -> Some("https://example.com/other")
//   "mailto:a@b.c"       -> None
//   "javascript:void(0)" -> None
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    // join() also handles hrefs that are already absolute
    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

// Decides whether a response body should be parsed as HTML.
// Servers that send no content type get the benefit of the doubt.
pub fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(value) => {
            let value = value.to_ascii_lowercase();
            value.contains("text/html") || value.contains("application/xhtml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    #[test]
    fn test_extract_title() {
        let page = extract_page("<html><head><title> Home </title></head></html>", &base()).unwrap();
        assert_eq!(page.title.as_deref(), Some("Home"));
    }

    #[test]
    fn test_missing_or_empty_title() {
        let page = extract_page("<p>no title here</p>", &base()).unwrap();
        assert_eq!(page.title, None);

        let page = extract_page("<title>   </title>", &base()).unwrap();
        assert_eq!(page.title, None);
    }

    #[test]
    fn test_resolves_relative_and_absolute_links() {
        let html = r#"
            <a href="https://rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <a href="child">Child</a>
        "#;
        let page = extract_page(html, &base()).unwrap();
        let links: Vec<&str> = page.links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://rust-lang.org/",
                "https://example.com/docs",
                "https://example.com/about",
                "https://example.com/page/child",
            ]
        );
    }

    #[test]
    fn test_skips_non_http_links() {
        let html = r#"
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+123">Call</a>
            <a href="javascript:void(0)">Nothing</a>
            <a href="">Empty</a>
        "#;
        let page = extract_page(html, &base()).unwrap();
        assert!(page.links.is_empty());
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(None));
        assert!(is_html(Some("text/html; charset=utf-8")));
        assert!(is_html(Some("application/xhtml+xml")));
        assert!(!is_html(Some("image/png")));
        assert!(!is_html(Some("application/json")));
    }
}
