use std::future::Future;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Error;

pub fn progress_bar(len: usize, msg: &'static str) -> ProgressBar {
    let style = ProgressStyle::with_template("{msg:>12} [{bar:30}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    ProgressBar::new(len as u64).with_style(style).with_message(msg)
}

/// Spawn every future as its own task and wait for all of them.
///
/// Returns as soon as one task fails. Tasks that are still running at that
/// point are detached, not aborted: they keep going until they finish on
/// their own or the runtime shuts down.
pub async fn run_all<I, F, T>(tasks: I, progress: &ProgressBar) -> Result<Vec<T>, Error>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, Error>> + Send + 'static,
    T: Send + 'static,
{
    let mut pending = tasks
        .into_iter()
        .map(tokio::spawn)
        .collect::<FuturesUnordered<_>>();

    let result = async {
        let mut done = Vec::with_capacity(pending.len());
        while let Some(joined) = pending.next().await {
            done.push(joined??);
            progress.inc(1);
        }
        Ok::<_, Error>(done)
    }
    .await;
    progress.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    async fn explode() -> Result<(), Error> {
        panic!("task blew up")
    }

    #[tokio::test]
    async fn collects_every_result() {
        let bar = ProgressBar::hidden();
        let mut results = run_all((0..5).map(|i| async move { Ok(i * 2) }), &bar)
            .await
            .unwrap();
        results.sort_unstable();
        assert_eq!(results, vec![0, 2, 4, 6, 8]);
        assert_eq!(bar.position(), 5);
    }

    #[tokio::test]
    async fn first_failure_wins_without_waiting_for_slow_siblings() {
        let finished = Arc::new(AtomicUsize::new(0));
        let tasks = (0..3).map(|i| {
            let finished = finished.clone();
            async move {
                if i == 1 {
                    return Err(Error::MalformedInput("boom".to_string()));
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let err = run_all(tasks, &ProgressBar::hidden()).await.unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        // The detached siblings still run to completion.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn tasks_can_log_above_the_bar() {
        let bar = ProgressBar::hidden();
        let tasks = (0..3).map(|i| {
            let bar = bar.clone();
            async move {
                bar.suspend(|| log::info!("   >> task {i}"));
                Ok(i)
            }
        });
        let results = run_all(tasks, &bar).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(bar.position(), 3);
    }

    #[tokio::test]
    async fn panicking_task_is_reported() {
        let err = run_all([explode()], &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Task(_)));
    }
}
