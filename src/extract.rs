//! Post extraction from raw page markup.
//!
//! Parsing is lenient: html5ever recovers whatever structure it can from
//! broken markup, so extraction never fails. An empty result is the only
//! signal that the page did not look as expected.

use crate::error::ConfigError;
use crate::post::Post;
use scraper::{Html, Selector};
use tracing::debug;

/// Two-step matching rule: post containers, then the title link inside each.
#[derive(Debug, Clone)]
pub struct PostRule {
    container: Selector,
    entry: Selector,
}

impl PostRule {
    pub fn new(container: &str, entry: &str) -> Result<Self, ConfigError> {
        let container = Selector::parse(container).map_err(|e| ConfigError::Invalid {
            name: "extraction.container",
            message: e.to_string(),
        })?;
        let entry = Selector::parse(entry).map_err(|e| ConfigError::Invalid {
            name: "extraction.entry",
            message: e.to_string(),
        })?;
        Ok(Self { container, entry })
    }
}

/// Posts in page order. Containers without a usable title link are skipped.
pub fn extract_posts(html: &str, rule: &PostRule) -> Vec<Post> {
    let document = Html::parse_document(html);
    let mut posts = Vec::new();

    for container in document.select(&rule.container) {
        let Some(anchor) = container.select(&rule.entry).next() else {
            continue;
        };
        let Some(link) = anchor.value().attr("href") else {
            debug!("Skipping entry without href");
            continue;
        };
        let title = anchor
            .text()
            .collect::<String>()
            .trim_matches(is_layout_space)
            .to_string();
        if title.is_empty() {
            debug!(link, "Skipping entry with empty title");
            continue;
        }
        posts.push(Post::new(title, link));
    }

    posts
}

// ASCII layout whitespace only; a non-breaking space is part of the title.
fn is_layout_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B')
}
