//! Bridge from the synchronous pipeline to async client libraries.

use std::future::Future;
use tokio::runtime::Builder;

/// Drive `future` to completion on a fresh current-thread runtime.
///
/// Must not be called from inside another tokio runtime.
pub(crate) fn block_on<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
