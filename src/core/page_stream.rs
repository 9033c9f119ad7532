use crate::core::client::OcpiClient;
use crate::core::routing::RoutingParties;
use crate::domain::model::{ModuleId, PageCursor, Record};
use crate::domain::ports::{OcpiRequest, RoutingHeaders, Transport};
use crate::utils::error::{OcpiError, Result};
use crate::utils::validation::validate_positive_number;
use futures::stream::{self, Stream, TryStreamExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    NotStarted,
    AtCursor(PageCursor),
    Exhausted,
}

/// One fetched page, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBatch {
    pub items: Vec<Record>,
    /// Set on the final page; the next pull returns `None`.
    pub last: bool,
    pub total_count: Option<u64>,
}

#[derive(Debug, Clone)]
struct PageTarget {
    url: String,
    routing: RoutingHeaders,
}

/// 拉取式分頁：每次 `pull` 最多抓一頁，不預取
pub struct PageStream<'c, T: Transport> {
    client: &'c OcpiClient<T>,
    module: ModuleId,
    routing: RoutingParties,
    state: StreamState,
    target: Option<PageTarget>,
    pages_fetched: usize,
}

impl<'c, T: Transport> PageStream<'c, T> {
    pub fn new(client: &'c OcpiClient<T>, module: ModuleId, routing: RoutingParties) -> Self {
        Self {
            client,
            module,
            routing,
            state: StreamState::NotStarted,
            target: None,
            pages_fetched: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == StreamState::Exhausted
    }

    /// Fetches the next page. `batch_size` is only used for the first page;
    /// later pages follow the cursor the platform handed out.
    ///
    /// A failed fetch leaves the cursor where it was. A module the session
    /// does not serve ends the stream.
    pub async fn pull(&mut self, batch_size: u32) -> Result<Option<PageBatch>> {
        let cursor = match self.state {
            StreamState::Exhausted => return Ok(None),
            StreamState::NotStarted => {
                validate_positive_number("limit", u64::from(batch_size), 1)?;
                PageCursor::first(batch_size)
            }
            StreamState::AtCursor(cursor) => cursor,
        };

        let target = self.target()?.clone();
        let request = OcpiRequest::get(target.url)
            .with_routing(target.routing)
            .with_cursor(cursor);

        let response = self.client.request(&request).await?;
        self.pages_fetched += 1;

        let total_count = response.total_count;
        let next = match response.next {
            // offset 沒有前進（重複或倒退）會造成無限迴圈
            Some(next) if next.offset <= cursor.offset => {
                tracing::warn!(
                    module = %self.module,
                    offset = cursor.offset,
                    next_offset = next.offset,
                    "Platform returned a next page that does not advance, stopping"
                );
                None
            }
            other => other,
        };
        let items = response.into_items();

        tracing::debug!(
            module = %self.module,
            offset = cursor.offset,
            limit = cursor.limit,
            items = items.len(),
            has_next = next.is_some(),
            "📄 Page fetched"
        );

        self.state = match next {
            Some(next) => StreamState::AtCursor(next),
            None => StreamState::Exhausted,
        };

        Ok(Some(PageBatch {
            items,
            last: next.is_none(),
            total_count,
        }))
    }

    /// Adapts the stream into individual records. The next page is only
    /// requested once every record of the previous one has been consumed.
    pub fn into_items(self, batch_size: u32) -> impl Stream<Item = Result<Record>> + 'c {
        stream::try_unfold(self, move |mut pages| async move {
            let batch = pages.pull(batch_size).await?;
            Ok::<_, OcpiError>(batch.map(|batch| {
                let items = stream::iter(batch.items.into_iter().map(Ok::<Record, OcpiError>));
                (items, pages)
            }))
        })
        .try_flatten()
    }

    fn target(&mut self) -> Result<&PageTarget> {
        if self.target.is_none() {
            let routing = self.routing.headers()?;
            let url = match self.client.resolve(self.module) {
                Ok(endpoint) => endpoint.url.clone(),
                Err(e) => {
                    self.state = StreamState::Exhausted;
                    return Err(e);
                }
            };
            tracing::debug!(module = %self.module, url = %url, "Resolved module endpoint");
            self.target = Some(PageTarget { url, routing });
        }

        match &self.target {
            Some(target) => Ok(target),
            None => Err(OcpiError::ModuleNotServed {
                module: self.module,
            }),
        }
    }
}
