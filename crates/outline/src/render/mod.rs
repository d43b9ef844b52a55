// ABOUTME: Static site rendering: one page per content item plus home, search and page-index pages.
// ABOUTME: Pages are plain HTML strings written under an output directory as <path>/index.html.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::debug;

use crate::dom::serialize::{escape_attr, escape_text};
use crate::error::OutlineError;
use crate::fragment::join_html;
use crate::hierarchy::{ContentItem, PageIndex};
use crate::outliner::Outline;

/// Shared rendering context, built once per outline.
#[derive(Debug, Clone, Default)]
pub struct SiteContext {
    pub path_prefix: String,
    /// URL path of every item, in item order.
    pub paths: Vec<String>,
    /// Indexes of chapter items.
    pub chapters: Vec<usize>,
    pub page_index: PageIndex,
}

impl SiteContext {
    pub fn home_path(&self) -> String {
        format!("{}/", self.path_prefix)
    }

    pub fn search_path(&self) -> String {
        format!("{}/search/", self.path_prefix)
    }

    pub fn page_index_path(&self) -> String {
        format!("{}/page-index/", self.path_prefix)
    }

    fn path(&self, idx: usize) -> &str {
        self.paths.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// A rendered page and the URL path it is served at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub path: String,
    pub title: String,
    pub html: String,
}

fn link(href: &str, label: &str) -> String {
    format!(r#"<a href="{}">{}</a>"#, escape_attr(href), escape_text(label))
}

fn layout(ctx: &SiteContext, title: &str, body: &str) -> String {
    let mut doc = String::new();
    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\"/>\n  <title>");
    doc.push_str(&escape_text(title));
    doc.push_str("</title>\n</head>\n<body>\n<nav class=\"site\">");
    doc.push_str(&link(&ctx.home_path(), "Home"));
    doc.push(' ');
    doc.push_str(&link(&ctx.search_path(), "Search"));
    doc.push(' ');
    doc.push_str(&link(&ctx.page_index_path(), "Page Index"));
    doc.push_str("</nav>\n<main>\n");
    doc.push_str(body);
    doc.push_str("\n</main>\n</body>\n</html>\n");
    doc
}

fn breadcrumb(items: &[ContentItem], ctx: &SiteContext, idx: usize) -> String {
    let mut trail = Vec::new();
    let mut current = items.get(idx).and_then(|item| item.parent);
    while let Some(parent) = current {
        trail.push(link(ctx.path(parent), &items[parent].title));
        current = items[parent].parent;
    }
    trail.reverse();
    format!(r#"<nav class="breadcrumb">{}</nav>"#, trail.join(" / "))
}

fn render_item(items: &[ContentItem], ctx: &SiteContext, idx: usize) -> Page {
    let item = &items[idx];
    let mut body = breadcrumb(items, ctx, idx);
    body.push_str(&format!(
        "\n<article class=\"{}\">\n<h1>{}</h1>\n",
        item.kind,
        escape_text(&item.title)
    ));
    if let Some(page) = item.page_number {
        body.push_str(&format!(
            "<p class=\"page_number\">{}</p>\n",
            link(&format!("{}#page_{}", ctx.page_index_path(), page), &format!("Page {}", page))
        ));
    }
    body.push_str(&join_html(&item.content));
    body.push_str("\n</article>\n");

    if !item.children.is_empty() {
        body.push_str("<ul class=\"children\">");
        for child in &item.children {
            body.push_str(&format!("<li>{}</li>", link(ctx.path(*child), &items[*child].title)));
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<nav class=\"pager\">");
    if let Some(prev) = item.prev {
        body.push_str(&link(ctx.path(prev), &format!("Previous: {}", items[prev].title)));
    }
    if let Some(next) = item.next {
        body.push_str(&link(ctx.path(next), &format!("Next: {}", items[next].title)));
    }
    body.push_str("</nav>");

    Page {
        path: ctx.path(idx).to_string(),
        title: item.title.clone(),
        html: layout(ctx, &item.title, &body),
    }
}

fn render_home(items: &[ContentItem], ctx: &SiteContext) -> Page {
    let mut body = String::from("<h1>Home</h1>\n<ul class=\"chapters\">");
    for idx in &ctx.chapters {
        if let Some(item) = items.get(*idx) {
            body.push_str(&format!("<li>{}</li>", link(ctx.path(*idx), &item.title)));
        }
    }
    body.push_str("</ul>");
    Page {
        path: ctx.home_path(),
        title: "Home".to_string(),
        html: layout(ctx, "Home", &body),
    }
}

fn render_search(ctx: &SiteContext) -> Page {
    let body = format!(
        concat!(
            "<h1>Search</h1>\n",
            r#"<form class="search" action="{}" method="get">"#,
            r#"<input type="search" name="q"/><button type="submit">Search</button></form>"#,
        ),
        escape_attr(&ctx.search_path())
    );
    Page {
        path: ctx.search_path(),
        title: "Search".to_string(),
        html: layout(ctx, "Search", &body),
    }
}

fn render_page_index(items: &[ContentItem], ctx: &SiteContext) -> Page {
    let mut body = String::from("<h1>Page Index</h1>\n");
    for (page, listed) in ctx.page_index.iter() {
        body.push_str(&format!(
            "<section id=\"page_{page}\"><h2>Page {page}</h2><ul>"
        ));
        for idx in listed {
            if let Some(item) = items.get(*idx) {
                body.push_str(&format!("<li>{}</li>", link(ctx.path(*idx), &item.title)));
            }
        }
        body.push_str("</ul></section>\n");
    }
    Page {
        path: ctx.page_index_path(),
        title: "Page Index".to_string(),
        html: layout(ctx, "Page Index", &body),
    }
}

/// Render every item page followed by the home, search and page-index pages.
pub fn render_site(outline: &Outline, ctx: &SiteContext) -> Vec<Page> {
    let items = &outline.items;
    let mut pages: Vec<Page> = (0..items.len())
        .map(|idx| render_item(items, ctx, idx))
        .collect();
    pages.push(render_home(items, ctx));
    pages.push(render_search(ctx));
    pages.push(render_page_index(items, ctx));
    pages
}

/// Write each page to `out/<path>/index.html` and return the written files.
pub fn write_site(pages: &[Page], out: &Path) -> Result<Vec<PathBuf>, OutlineError> {
    let mut written = Vec::with_capacity(pages.len());
    for page in pages {
        let relative = page.path.trim_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            return Err(OutlineError::render(
                &page.path,
                "write_site",
                Some(anyhow!("page path leaves the output directory")),
            ));
        }
        let dir = if relative.is_empty() {
            out.to_path_buf()
        } else {
            out.join(relative)
        };
        fs::create_dir_all(&dir).map_err(|e| {
            OutlineError::io(dir.display().to_string(), "write_site", Some(e.into()))
        })?;
        let file = dir.join("index.html");
        fs::write(&file, &page.html).map_err(|e| {
            OutlineError::io(file.display().to_string(), "write_site", Some(e.into()))
        })?;
        debug!(path = %file.display(), "wrote page");
        written.push(file);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::outliner::Outliner;

    fn outline() -> Outline {
        let opts = Options {
            path_prefix: "/guide".to_string(),
            ..Options::default()
        };
        Outliner::new(opts)
            .outline_html(concat!(
                "<p><strong>MASTER TABLE OF CONTENTS</strong></p>",
                "<p>CHAPTER 1 Money 4</p>",
                "<p>CHAPTER 2 Health 9</p>",
                "<h1>Money</h1><p>Budget first, see PG 9.</p><p>a</p><p>b</p>",
                "<h1>Health</h1><p>Rest.</p>",
            ))
            .unwrap()
    }

    #[test]
    fn site_has_item_and_auxiliary_pages() {
        let outline = outline();
        let ctx = outline.site_context();
        let pages = render_site(&outline, &ctx);
        let paths: Vec<_> = pages.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/guide/money", "/guide/health", "/guide/", "/guide/search/", "/guide/page-index/"]
        );

        let money = &pages[0].html;
        assert!(money.contains("<title>Money</title>"));
        assert!(money.contains(r#"href="/guide/page-index/#page_9""#));
        assert!(money.contains("Next: Health"));

        let index = &pages[4].html;
        assert!(index.contains(r#"<section id="page_4">"#));
        assert!(index.contains(r#"<a href="/guide/health">Health</a>"#));
    }

    #[test]
    fn pages_are_written_as_index_files() {
        let outline = outline();
        let pages = render_site(&outline, &outline.site_context());
        let dir = tempfile::tempdir().unwrap();
        let written = write_site(&pages, dir.path()).unwrap();
        assert_eq!(written.len(), pages.len());
        assert!(dir.path().join("guide/money/index.html").is_file());
        assert!(dir.path().join("guide/index.html").is_file());
        assert!(dir.path().join("guide/page-index/index.html").is_file());
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let page = Page {
            path: "/../etc".to_string(),
            title: "x".to_string(),
            html: String::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let err = write_site(&[page], dir.path()).unwrap_err();
        assert!(err.is_render());
    }
}
