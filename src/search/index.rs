use std::collections::BTreeMap;

use serde::Serialize;

use crate::auth::models::{AccessLevel, Identity};
use crate::db::models::{Page, PageBody};

/// One page as seen by the search scan.
#[derive(Debug, Clone)]
pub struct SearchEntry {
    pub title: String,
    /// Normalized full path.
    pub path: String,
    pub access: AccessLevel,
}

/// A node of the result tree, keyed by path segment.
///
/// Folder nodes that are themselves pages carry a hit and link through;
/// folders that only exist as prefixes render as plain labels.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TreeNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageHit>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageHit {
    pub title: String,
    pub path: String,
    pub access_level: AccessLevel,
}

/// Result of a search query.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SearchOutcome {
    /// Term too short to filter on; the UI shows its idle state.
    Placeholder,
    Results { tree: Vec<TreeNode> },
}

/// Linear scan over the visible page set.
///
/// Built fresh from a snapshot of all pages; there is deliberately no
/// persistent index behind this.
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Build the scan set from a page snapshot. Redirect pages are not
    /// searchable.
    pub fn build(pages: &[Page]) -> Self {
        let entries = pages
            .iter()
            .filter(|page| !matches!(page.body, PageBody::Redirection(_)))
            .map(|page| SearchEntry {
                title: page.title.clone(),
                path: page.full_path.clone(),
                access: page.access(),
            })
            .collect();
        Self { entries }
    }

    /// Run a query for the given viewer.
    ///
    /// Empty query: the full accessible tree. One character: placeholder.
    /// Two or more: a page matches when its path or title contains the
    /// term, or when it descends from a page whose title matched.
    pub fn query(&self, term: &str, viewer: Option<&Identity>) -> SearchOutcome {
        let term = term.trim().to_lowercase();

        let visible: Vec<&SearchEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.access != AccessLevel::Admin || viewer.is_some())
            .collect();

        if term.is_empty() {
            return SearchOutcome::Results {
                tree: build_tree(&visible, &visible),
            };
        }
        if term.chars().count() < 2 {
            return SearchOutcome::Placeholder;
        }

        // Paths of pages whose title matches; their descendants are
        // included even when they do not match on their own.
        let matched_title_paths: Vec<&str> = visible
            .iter()
            .filter(|entry| entry.title.to_lowercase().contains(&term))
            .map(|entry| entry.path.as_str())
            .collect();

        let results: Vec<&SearchEntry> = visible
            .iter()
            .filter(|entry| {
                let matches_path = entry.path.to_lowercase().contains(&term);
                let matches_title = entry.title.to_lowercase().contains(&term);
                let descends_from_match = matched_title_paths
                    .iter()
                    .any(|parent| is_descendant(&entry.path, parent));
                matches_path || matches_title || descends_from_match
            })
            .copied()
            .collect();

        SearchOutcome::Results {
            tree: build_tree(&results, &visible),
        }
    }
}

/// Whether `path` is `parent` itself or lies underneath it.
fn is_descendant(path: &str, parent: &str) -> bool {
    path == parent || path.starts_with(&format!("{parent}/"))
}

#[derive(Default)]
struct Node {
    page: Option<PageHit>,
    children: BTreeMap<String, Node>,
}

fn hit(entry: &SearchEntry) -> PageHit {
    PageHit {
        title: entry.title.clone(),
        path: entry.path.clone(),
        access_level: entry.access,
    }
}

/// Build the segment tree for `results`, consulting the full visible set
/// so intermediate folders that are pages in their own right still link
/// through.
fn build_tree(results: &[&SearchEntry], visible: &[&SearchEntry]) -> Vec<TreeNode> {
    let mut root: BTreeMap<String, Node> = BTreeMap::new();

    for entry in results {
        let parts: Vec<&str> = entry.path.split('/').filter(|p| !p.is_empty()).collect();
        let mut level = &mut root;
        let mut accumulated = String::new();

        for (index, part) in parts.iter().enumerate() {
            if index > 0 {
                accumulated.push('/');
            }
            accumulated.push_str(part);

            let node = level.entry(part.to_string()).or_default();
            if node.page.is_none() {
                if let Some(folder) = visible.iter().find(|p| p.path == accumulated) {
                    node.page = Some(hit(folder));
                }
            }
            if index == parts.len() - 1 {
                node.page = Some(hit(entry));
            }
            level = &mut node.children;
        }
    }

    into_nodes(root)
}

fn into_nodes(map: BTreeMap<String, Node>) -> Vec<TreeNode> {
    map.into_iter()
        .map(|(name, node)| TreeNode {
            name,
            page: node.page,
            children: into_nodes(node.children),
        })
        .collect()
}
