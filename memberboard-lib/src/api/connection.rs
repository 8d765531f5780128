//! Cursor-based GraphQL connections and the pagination loop that drains them.

use super::FetchError;
use serde::Deserialize;
use std::collections::HashSet;

const LOG_TARGET: &str = "    paging";

/// The `pageInfo` block of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// An edge wrapping a single node.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: Option<T>,
}

/// A GraphQL connection as returned by the API.
///
/// The API may populate `nodes`, `edges`, or both; `nodes` wins when present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub nodes: Option<Vec<Option<T>>>,
    pub edges: Option<Vec<Edge<T>>>,
    pub page_info: Option<PageInfo>,
}

/// One page of records plus the information needed to fetch the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl<T> Connection<T> {
    /// Flatten the connection into a [`Page`].
    pub fn into_page(self) -> Result<Page<T>, FetchError> {
        let page_info = self
            .page_info
            .ok_or_else(|| FetchError::malformed("connection is missing pageInfo"))?;

        let items = match (self.nodes, self.edges) {
            (Some(nodes), _) => nodes.into_iter().flatten().collect(),
            (None, Some(edges)) => edges.into_iter().filter_map(|edge| edge.node).collect(),
            (None, None) => return Err(FetchError::malformed("connection has neither nodes nor edges")),
        };

        Ok(Page {
            items,
            has_next_page: page_info.has_next_page,
            end_cursor: page_info.end_cursor,
        })
    }
}

/// Repeatedly call `fetch_page`, advancing the cursor, until the API reports no more pages.
///
/// Pages are requested strictly one after another, starting with no cursor. All items are
/// accumulated in the order received. A page that claims more data but supplies no cursor, or a
/// cursor already handed out earlier in the same fetch, is a malformed response.
pub async fn paginate<T, F, Fut>(what: &str, mut fetch_page: F) -> Result<Vec<T>, FetchError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut seen_cursors: HashSet<String> = HashSet::new();
    let mut page_count = 0u32;

    loop {
        let page = fetch_page(cursor.clone()).await?;
        page_count += 1;

        log::debug!(
            target: LOG_TARGET,
            "Fetched page {page_count} of {what} with {} record(s), more pages: {}",
            page.items.len(),
            page.has_next_page
        );

        items.extend(page.items);

        if !page.has_next_page {
            break;
        }

        match page.end_cursor {
            None => {
                return Err(FetchError::malformed(format!(
                    "page {page_count} of {what} reports more data but has no end cursor"
                )));
            }
            Some(next) if seen_cursors.contains(&next) => {
                return Err(FetchError::malformed(format!(
                    "page {page_count} of {what} repeated cursor '{next}'"
                )));
            }
            Some(next) => {
                let _ = seen_cursors.insert(next.clone());
                cursor = Some(next);
            }
        }
    }

    log::info!(target: LOG_TARGET, "Fetched {} {what} across {page_count} page(s)", items.len());
    Ok(items)
}
