use crate::auth::models::AccessLevel;
use crate::db::models::{FileEntry, Page, PageBody};
use crate::rendering::markdown::render_markdown;
use crate::search::index::TreeNode;

/// Escape user-controlled text for interpolation into markup.
fn escape(text: &str) -> String {
    ammonia::clean_text(text)
}

/// Where a redirect page sends the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub location: String,
    /// Absolute destinations (beginning with `http`) replace history;
    /// everything else is site-relative.
    pub external: bool,
}

/// Renderable outcome of dispatching on a page's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    Content {
        html: String,
        /// A downstream pass should run syntax highlighting.
        needs_highlight: bool,
        /// A downstream pass should run math typesetting.
        needs_math: bool,
    },
    Redirect(RedirectTarget),
}

/// Pure view model for one page, independent of HTTP and DOM concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub title: String,
    pub full_path: String,
    pub body: RenderedBody,
    /// Whether the edit flow applies (markdown and raw HTML pages only).
    pub editable: bool,
}

/// Dispatch on the page body and produce its view model.
pub fn render_page(page: &Page) -> PageView {
    let body = match &page.body {
        PageBody::Markdown(source) => {
            let rendered = render_markdown(source);
            RenderedBody::Content {
                html: rendered.html,
                needs_highlight: rendered.has_code,
                needs_math: rendered.has_math,
            }
        }
        // Verbatim by design of the trusted-author model; see the access
        // gate for who can author this.
        PageBody::Html(source) => RenderedBody::Content {
            html: source.clone(),
            needs_highlight: true,
            needs_math: false,
        },
        PageBody::Files(files) => RenderedBody::Content {
            html: files_html(&page.title, files),
            needs_highlight: false,
            needs_math: false,
        },
        PageBody::Redirection(target) => RenderedBody::Redirect(redirect_target(target)),
    };

    PageView {
        title: page.title.clone(),
        full_path: page.full_path.clone(),
        editable: page.body.is_text(),
        body,
    }
}

fn redirect_target(raw: &str) -> RedirectTarget {
    let raw = raw.trim();
    if raw.starts_with("http") {
        RedirectTarget {
            location: raw.to_string(),
            external: true,
        }
    } else {
        let location = if raw.starts_with('/') {
            raw.to_string()
        } else {
            format!("/{raw}")
        };
        RedirectTarget {
            location,
            external: false,
        }
    }
}

/// Human-readable file size: MB with two decimals from 1 MiB up,
/// whole KB below.
pub fn format_file_size(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    let bytes = bytes as f64;
    if bytes >= MIB {
        format!("{:.2} MB", bytes / MIB)
    } else {
        format!("{:.0} KB", bytes / 1024.0)
    }
}

fn files_html(title: &str, files: &[FileEntry]) -> String {
    let items: String = files
        .iter()
        .map(|file| {
            format!(
                "<li><a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">{name}</a> \
                 <span class=\"file-size\">{size}</span></li>\n",
                url = escape(&file.url),
                name = escape(&file.name),
                size = format_file_size(file.bytes),
            )
        })
        .collect();

    format!(
        "<h1>{title}</h1>\n<p>Files available for download:</p>\n<ul class=\"file-list\">\n{items}</ul>",
        title = escape(title),
    )
}

/// Assemble the full HTML document for a content page.
///
/// Only meaningful for `RenderedBody::Content`; redirects are turned into
/// HTTP responses by the caller.
pub fn page_document(view: &PageView, viewer_is_admin: bool) -> String {
    let (content, needs_highlight, needs_math) = match &view.body {
        RenderedBody::Content {
            html,
            needs_highlight,
            needs_math,
        } => (html.as_str(), *needs_highlight, *needs_math),
        RenderedBody::Redirect(target) => {
            // Fallback document for clients that ignore the HTTP redirect.
            return format!(
                "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
                 <meta http-equiv=\"refresh\" content=\"0; url={url}\"></head><body></body></html>",
                url = escape(&target.location)
            );
        }
    };

    let admin_bar = if viewer_is_admin {
        admin_bar_html(&view.full_path, view.editable)
    } else {
        String::new()
    };

    format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"/assets/site.css\">\n\
         </head>\n\
         <body>\n\
         <div id=\"admin-bar\">{admin_bar}</div>\n\
         <main id=\"wiki-content\" data-highlight=\"{needs_highlight}\" data-math=\"{needs_math}\">\n\
         {content}\n\
         </main>\n\
         </body>\n\
         </html>\n",
        title = escape(&view.title),
    )
}

fn admin_bar_html(full_path: &str, editable: bool) -> String {
    let path = escape(full_path);
    let edit_link = if editable {
        format!("<a href=\"/admin/edit?path={path}\" id=\"edit-button\">Edit Page</a>\n")
    } else {
        String::new()
    };
    format!(
        "<div class=\"admin-controls\">\n\
         {edit_link}\
         <button id=\"delete-button\" data-path=\"{path}\">Delete Page</button>\n\
         <a href=\"/admin/dashboard\">Admin Panel</a>\n\
         </div>"
    )
}

/// The 404 document shown when no page matches a path.
pub fn not_found_document(full_path: &str) -> String {
    format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>404 - Page not found</title></head>\n\
         <body>\n\
         <h1>404 - Page not found</h1>\n\
         <hr>\n\
         <p>No page exists at \"<code>{slug}</code>\".</p>\n\
         <a href=\"/\">Back to the home page</a>\n\
         </body>\n\
         </html>\n",
        slug = escape(full_path),
    )
}

/// Render a search/browse tree as nested lists.
pub fn tree_html(nodes: &[TreeNode]) -> String {
    if nodes.is_empty() {
        return "<h3>No results found.</h3>".to_string();
    }
    let mut out = String::from("<ul class=\"page-tree\">\n");
    for node in nodes {
        tree_node_html(node, &mut out);
    }
    out.push_str("</ul>\n");
    out
}

fn tree_node_html(node: &TreeNode, out: &mut String) {
    out.push_str("<li>");
    match &node.page {
        Some(hit) => {
            out.push_str(&format!(
                "<a href=\"/{path}\" class=\"page-link\">{title}</a>",
                path = escape(&hit.path),
                title = escape(&hit.title),
            ));
            if hit.access_level == AccessLevel::Admin {
                out.push_str(" <span class=\"admin-marker\">(Admin)</span>");
            }
        }
        None => {
            out.push_str(&format!(
                "<span class=\"page-folder\">{}</span>",
                escape(&node.name)
            ));
        }
    }
    if !node.children.is_empty() {
        out.push_str("\n<ul>\n");
        for child in &node.children {
            tree_node_html(child, out);
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</li>\n");
}

/// The home document: site title plus the browse tree of everything the
/// viewer may see.
pub fn home_document(tree: &[TreeNode]) -> String {
    format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Waypost</title>\n\
         <link rel=\"stylesheet\" href=\"/assets/site.css\">\n\
         </head>\n\
         <body>\n\
         <h1>Waypost</h1>\n\
         <div id=\"search-results\">\n{tree}</div>\n\
         </body>\n\
         </html>\n",
        tree = tree_html(tree),
    )
}
