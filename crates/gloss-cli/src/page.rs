//! Page content extraction
//!
//! Deliberately crude: gloss treats extraction as a black box that yields
//! `{url, title, text}`. Files are taken as-is; URLs get a minimal HTML
//! strip, nothing resembling real content heuristics.

use anyhow::{Context, Result};
use gloss_stream::PageContent;
use std::path::{Path, PathBuf};

/// Where the page comes from.
#[derive(Debug, Clone)]
pub enum PageSource {
    Url(String),
    File(PathBuf),
}

impl PageSource {
    /// Classify a CLI argument as URL or file path.
    pub fn parse(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            PageSource::Url(arg.to_string())
        } else {
            PageSource::File(PathBuf::from(arg))
        }
    }
}

/// Extract content for the given source.
pub async fn extract_page_content(source: &PageSource) -> Result<PageContent> {
    match source {
        PageSource::File(path) => extract_file(path),
        PageSource::Url(url) => extract_url(url).await,
    }
}

fn extract_file(path: &Path) -> Result<PageContent> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let title = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim_start_matches('#').trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_default();
    let url = format!("file://{}", path.display());
    Ok(PageContent::new(url, title, text))
}

async fn extract_url(url: &str) -> Result<PageContent> {
    let html = reqwest::get(url)
        .await
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()?
        .text()
        .await?;
    let title = html_title(&html).unwrap_or_else(|| url.to_string());
    let text = strip_html(&html);
    Ok(PageContent::new(url, title, text))
}

fn html_title(html: &str) -> Option<String> {
    let lower = html.to_lowercase();
    let start = lower.find("<title")?;
    let open_end = html[start..].find('>')? + start + 1;
    let close = lower[open_end..].find("</title>")? + open_end;
    let title = html[open_end..close].trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Drop tags plus script/style bodies, collapse whitespace runs.
fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        rest = &rest[lt..];

        let lower = rest.to_lowercase();
        let skip_to = if lower.starts_with("<script") {
            lower.find("</script>").map(|i| i + "</script>".len())
        } else if lower.starts_with("<style") {
            lower.find("</style>").map(|i| i + "</style>".len())
        } else if lower.starts_with("<!--") {
            lower.find("-->").map(|i| i + "-->".len())
        } else {
            rest.find('>').map(|i| i + 1)
        };

        match skip_to {
            Some(end) => {
                // Tags become whitespace so words don't fuse together.
                out.push(' ');
                rest = &rest[end..];
            }
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);

    let mut text = String::with_capacity(out.len());
    let mut last_blank = true;
    for line in out.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !last_blank {
                text.push('\n');
                last_blank = true;
            }
        } else {
            text.push_str(&collapsed);
            text.push('\n');
            last_blank = false;
        }
    }
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_classification() {
        assert!(matches!(
            PageSource::parse("https://docs.example.com/guide"),
            PageSource::Url(_)
        ));
        assert!(matches!(
            PageSource::parse("notes/guide.md"),
            PageSource::File(_)
        ));
    }

    #[test]
    fn test_strip_html_basic() {
        let html = "<html><body><h1>Guide</h1><p>Hello <b>world</b></p></body></html>";
        let text = strip_html(html);
        assert!(text.contains("Guide"));
        assert!(text.contains("Hello world"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_strip_html_drops_script_and_style() {
        let html = "<p>keep</p><script>var x = 'gone';</script><style>.a{}</style><p>also</p>";
        let text = strip_html(html);
        assert!(text.contains("keep"));
        assert!(text.contains("also"));
        assert!(!text.contains("gone"));
        assert!(!text.contains(".a{}"));
    }

    #[test]
    fn test_html_title() {
        assert_eq!(
            html_title("<head><TITLE>My Page</TITLE></head>"),
            Some("My Page".to_string())
        );
        assert_eq!(html_title("<p>no title</p>"), None);
    }
}
