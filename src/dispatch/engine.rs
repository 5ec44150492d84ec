// src/dispatch/engine.rs
// =============================================================================
// The dispatch engine: runs every candidate through the executor and the
// classifier with bounded concurrency, and backs off when the target starts
// blocking us.
//
// How a run works:
// 1. Candidates are turned into a stream of spawned worker tasks, buffered
//    to `threads` at a time (the pool bound)
// 2. Each worker takes a semaphore permit (the admission bound, same size)
// 3. It sends the request and classifies the response
// 4. Blocking? That worker alone sleeps, holding its permit, and drops the
//    candidate. The rest of the pool keeps going.
//    Otherwise it reports the finding (unless the status is silenced)
// 5. Whatever happened, a drop guard bumps the progress counter
//
// The run only returns once every worker has finished. Nothing a single
// candidate does can stop the run.
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;

use super::state::{BlockingState, Progress, RunSummary, Tally};
use crate::probe::{
    Classifier, Execute, TargetRequest, TransportErrorKind, UrlTemplate, DEFAULT_BLOCK_THRESHOLD,
};
use crate::report::{Hit, Reporter};

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum number of requests in flight, clamped to what a semaphore holds
    pub threads: usize,
    /// How long to back off after blocking is detected
    pub wait: Duration,
    /// Consecutive 403s that count as blocking
    pub block_threshold: usize,
    /// Statuses that are never printed
    pub silent_codes: HashSet<u16>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            threads: 50,
            wait: Duration::from_secs(320),
            block_threshold: DEFAULT_BLOCK_THRESHOLD,
            silent_codes: HashSet::new(),
        }
    }
}

/// How one candidate ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        status: u16,
        title: String,
        content_length: usize,
    },
    Suppressed {
        status: u16,
    },
    TransportError {
        kind: TransportErrorKind,
    },
    /// The response looked like blocking; the candidate was dropped
    Blocked,
}

pub struct Engine<E> {
    executor: Arc<E>,
    reporter: Arc<dyn Reporter>,
    config: DispatchConfig,
}

impl<E: Execute + 'static> Engine<E> {
    pub fn new(executor: Arc<E>, reporter: Arc<dyn Reporter>, config: DispatchConfig) -> Self {
        Self {
            executor,
            reporter,
            config,
        }
    }

    /// Probes every candidate and returns once all of them have finished
    pub async fn run(&self, template: &UrlTemplate, candidates: Vec<String>) -> RunSummary {
        let threads = self.config.threads.clamp(1, Semaphore::MAX_PERMITS);
        let run = Arc::new(Run {
            executor: Arc::clone(&self.executor),
            reporter: Arc::clone(&self.reporter),
            classifier: Classifier::new(
                self.config.block_threshold,
                self.config.silent_codes.clone(),
            ),
            template: template.clone(),
            wait: self.config.wait,
            permits: Semaphore::new(threads),
            blocking: BlockingState::new(),
            progress: Progress::new(candidates.len()),
            tally: Tally::default(),
        });

        tracing::info!(
            "Probing {} candidates against {} with {} workers",
            candidates.len(),
            template.as_str(),
            threads
        );

        // spawn() is only called as buffer_unordered pulls from the stream,
        // so no more than `threads` tasks exist at once
        stream::iter(candidates)
            .map(|candidate| tokio::spawn(Arc::clone(&run).process(candidate)))
            .buffer_unordered(threads)
            .for_each(|joined| async move {
                if let Err(e) = joined {
                    tracing::error!("Worker task failed: {}", e);
                }
            })
            .await;

        let summary = run.tally.summarize(&run.progress);
        tracing::info!(
            "Run finished: {} found, {} silenced, {} transport errors, {} dropped while blocked",
            summary.hits,
            summary.suppressed,
            summary.transport_errors,
            summary.blocked
        );
        self.reporter.finish(&summary);
        summary
    }
}

// Everything a worker needs, shared for the lifetime of one run
struct Run<E> {
    executor: Arc<E>,
    reporter: Arc<dyn Reporter>,
    classifier: Classifier,
    template: UrlTemplate,
    wait: Duration,
    permits: Semaphore,
    blocking: BlockingState,
    progress: Progress,
    tally: Tally,
}

impl<E: Execute> Run<E> {
    async fn process(self: Arc<Self>, candidate: String) -> Outcome {
        // Counts this candidate on every exit path, panics included
        let _tick = ProgressTick {
            progress: &self.progress,
            reporter: self.reporter.as_ref(),
        };

        let target = self.template.resolve(&candidate);

        // Released when this function returns, however it returns. The
        // semaphore is never closed, so this always holds a permit.
        let _permit = self.permits.acquire().await.ok();

        let outcome = self.attempt(&target).await;
        self.tally.record(&outcome);
        outcome
    }

    async fn attempt(&self, target: &TargetRequest) -> Outcome {
        let response = match self.executor.execute(target).await {
            Ok(response) => response,
            Err(e) => {
                if e.kind.is_ignored() {
                    tracing::debug!("{}", e);
                } else {
                    tracing::warn!("{}", e);
                }
                return Outcome::TransportError { kind: e.kind };
            }
        };

        let verdict = self
            .classifier
            .classify(&response, self.blocking.streak());
        tracing::trace!(
            "{} -> {} (blocklike: {}, silenced: {}, 403 streak: {})",
            target.candidate(),
            response.status,
            verdict.is_blocklike(),
            verdict.suppress,
            self.blocking.streak().current()
        );

        if let Some(reason) = verdict.blocked {
            tracing::warn!(
                "WAF or blocking detected ({}) at {}. Waiting {} seconds before continuing",
                reason,
                target.url(),
                self.wait.as_secs()
            );
            if let Some(until) = self.blocking.begin_backoff(self.wait) {
                tracing::debug!(
                    "Another worker is already backing off for {:?}",
                    until.saturating_duration_since(tokio::time::Instant::now())
                );
            }
            tokio::time::sleep(self.wait).await;
            return Outcome::Blocked;
        }

        if verdict.suppress {
            return Outcome::Suppressed {
                status: response.status,
            };
        }

        let hit = Hit {
            status: response.status,
            url: target.url().to_string(),
            title: response.title(),
            content_length: response.content_length,
            category: verdict.category,
        };
        self.reporter.result(&hit);

        Outcome::Success {
            status: hit.status,
            title: hit.title,
            content_length: hit.content_length,
        }
    }
}

struct ProgressTick<'a> {
    progress: &'a Progress,
    reporter: &'a dyn Reporter,
}

impl Drop for ProgressTick<'_> {
    fn drop(&mut self) {
        let completed = self.progress.tick();
        self.reporter.progress(completed, self.progress.total());
    }
}
