use std::future::Future;

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::model::Page;

/// Walk a paginated collection from page 1 until the API signals the end.
///
/// When the API reports `totalPages`, that alone decides: the server may cap
/// `limit` below `page_size`, so a short page proves nothing. Without it, the
/// walk ends on a short page, once `total` records are in, or when the server
/// answers with a different page than the one asked for.
///
/// Any page failure aborts the walk; pages already read are dropped so callers
/// never see a silently truncated collection.
pub async fn fetch_all<T, F, Fut>(mut fetch_page: F, page_size: u32) -> Result<Vec<T>, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    let page_size = page_size.max(1);
    let mut records = Vec::new();
    let mut page = 1u32;

    loop {
        let Page {
            data,
            total,
            page: echoed,
            total_pages,
            ..
        } = fetch_page(page).await?;

        if total_pages == 0 && echoed != 0 && echoed != page {
            warn!(requested = page, echoed, "upstream ignores the page parameter");
            break;
        }

        let received = data.len();
        records.extend(data);

        debug!(page, received, total_pages, "page fetched");

        let done = if total_pages > 0 {
            page >= total_pages || received == 0
        } else {
            received < page_size as usize || (total > 0 && records.len() as u64 >= total)
        };
        if done {
            break;
        }
        page += 1;
    }

    Ok(records)
}
