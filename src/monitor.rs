//! One pass of the watcher: fetch, extract, diff against the saved
//! snapshot, notify, persist.

use crate::error::{NotifyError, RunError};
use crate::extract::{extract_posts, PostRule};
use crate::page::PageSource;
use crate::post::Post;
use crate::state;
use crate::telegram::{format_post_message, Notifier};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

pub struct Watch<'a> {
    pub rule: &'a PostRule,
    pub state_file: &'a Path,
    pub site_label: &'a str,
}

#[derive(Debug)]
pub struct Delivery {
    pub post: Post,
    pub result: Result<(), NotifyError>,
}

#[derive(Debug)]
pub enum RunReport {
    NoNewPosts,
    Notified { deliveries: Vec<Delivery> },
}

impl RunReport {
    fn deliveries(&self) -> &[Delivery] {
        match self {
            RunReport::NoNewPosts => &[],
            RunReport::Notified { deliveries } => deliveries,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries().iter().filter(|d| d.result.is_err())
    }

    pub fn sent(&self) -> usize {
        self.deliveries().iter().filter(|d| d.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }
}

/// Posts in `current` whose link is not among the links of `prior`, in
/// `current` order.
pub fn new_posts<'a>(current: &'a [Post], prior: &[Post]) -> Vec<&'a Post> {
    let known: HashSet<&str> = prior.iter().map(|p| p.link.as_str()).collect();
    current
        .iter()
        .filter(|p| !known.contains(p.link.as_str()))
        .collect()
}

pub async fn run<S, N>(watch: &Watch<'_>, source: &S, notifier: &N) -> Result<RunReport, RunError>
where
    S: PageSource + ?Sized,
    N: Notifier + ?Sized,
{
    let html = source.fetch().await?;

    let current = extract_posts(&html, watch.rule);
    if current.is_empty() {
        return Err(RunError::EmptyExtraction);
    }
    info!(count = current.len(), "Extracted posts");

    let prior = state::load(watch.state_file);
    let fresh = new_posts(&current, &prior);
    if fresh.is_empty() {
        info!("No new posts detected.");
        return Ok(RunReport::NoNewPosts);
    }

    let mut deliveries = Vec::with_capacity(fresh.len());
    for post in fresh {
        let text = format_post_message(watch.site_label, post);
        let result = notifier.send(&text).await;
        match &result {
            Ok(()) => info!(
                title = %post.title,
                link = %post.link,
                "Sent message for post"
            ),
            Err(e) => warn!(
                title = %post.title,
                link = %post.link,
                error = %e,
                "Failed to send message for post"
            ),
        }
        deliveries.push(Delivery {
            post: post.clone(),
            result,
        });
    }

    // The baseline advances even when some sends failed.
    state::save(watch.state_file, &current)?;
    Ok(RunReport::Notified { deliveries })
}
