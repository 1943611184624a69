//! Sync/async bridge
//!
//! Tool servers are driven through async connectors, but the gateway and the
//! estimation engine expose a synchronous API. [`block_on_isolated`] runs one
//! async body to completion on a fresh current-thread runtime. When the
//! caller is itself inside a tokio runtime, the private runtime is hosted on
//! a scoped worker thread, since a runtime cannot be entered re-entrantly.

use std::future::Future;
use thiserror::Error;
use tokio::runtime::{Builder, Handle};

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Failed to create runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("Runtime worker thread panicked")]
    WorkerPanicked,
}

/// Run `future` to completion on a private runtime and return its output.
pub fn block_on_isolated<F>(future: F) -> Result<F::Output, BridgeError>
where
    F: Future + Send,
    F::Output: Send,
{
    if Handle::try_current().is_err() {
        return run_to_completion(future);
    }

    std::thread::scope(|scope| {
        scope
            .spawn(|| run_to_completion(future))
            .join()
            .map_err(|_| BridgeError::WorkerPanicked)
            .and_then(|result| result)
    })
}

fn run_to_completion<F: Future>(future: F) -> Result<F::Output, BridgeError> {
    let rt = Builder::new_current_thread().enable_all().build()?;
    Ok(rt.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_runs_outside_a_runtime() {
        let value = block_on_isolated(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            21 * 2
        })
        .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_runs_inside_a_runtime() {
        let value = block_on_isolated(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            "done"
        })
        .unwrap();
        assert_eq!(value, "done");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_borrows_from_the_caller() {
        let names = vec!["pricing".to_string(), "docs".to_string()];
        let joined = block_on_isolated(async { names.join(",") }).unwrap();
        assert_eq!(joined, "pricing,docs");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_timeouts_fire_on_the_private_runtime() {
        let result = block_on_isolated(async {
            tokio::time::timeout(Duration::from_millis(10), std::future::pending::<()>()).await
        })
        .unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_panicking_body_is_reported() {
        let result = block_on_isolated(async {
            panic!("connector exploded");
        });
        assert!(matches!(result, Err(BridgeError::WorkerPanicked)));
    }
}
