//! Generated site artifacts: the XML sitemap and the robots file.
//!
//! Both are static derivations of the route list, which combines the fixed
//! public pages with one route per content file.

use std::fmt::Write as _;

use crate::content::ContentEntry;

/// Sitemap XML namespace.
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Public pages that always exist.
pub const STATIC_ROUTES: &[&str] = &["/", "/about", "/competitions", "/news", "/contact"];

/// Routes crawlers must not index.
pub const DISALLOWED_ROUTES: &[&str] = &["/admin", "/dashboard", "/api", "/auth"];

/// One public route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Path starting with `/`.
    pub path: String,
    /// Last modification date (`YYYY-MM-DD`), if known.
    pub lastmod: Option<String>,
}

/// The full route list of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteList {
    pub public: Vec<Route>,
    pub disallowed: Vec<String>,
}

impl RouteList {
    /// Build the route list from the content entries.
    pub fn from_content(entries: &[ContentEntry]) -> Self {
        let mut public: Vec<Route> = STATIC_ROUTES
            .iter()
            .map(|path| Route {
                path: (*path).to_string(),
                lastmod: None,
            })
            .collect();

        public.extend(entries.iter().map(|entry| Route {
            path: entry.route(),
            lastmod: entry.date().map(str::to_string),
        }));

        Self {
            public,
            disallowed: DISALLOWED_ROUTES.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Render the XML sitemap.
pub fn sitemap(base_url: &str, routes: &RouteList) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{}\">", SITEMAP_NS);

    for route in &routes.public {
        xml.push_str("  <url>\n");
        let _ = writeln!(
            xml,
            "    <loc>{}</loc>",
            escape_xml(&format!("{}{}", base, encode_path(&route.path)))
        );
        if let Some(lastmod) = &route.lastmod {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", escape_xml(lastmod));
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Render the robots file.
pub fn robots(base_url: &str, routes: &RouteList) -> String {
    let base = base_url.trim_end_matches('/');
    let mut text = String::from("User-agent: *\nAllow: /\n");
    for path in &routes.disallowed {
        let _ = writeln!(text, "Disallow: {}", path);
    }
    let _ = write!(text, "\nSitemap: {}/sitemap.xml\n", base);
    text
}

/// Percent-encode each segment of `path`, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
