// ThreadedBackend - 요청마다 작업 스레드를 띄우고 메인 루프에서 결과를 수거한다

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::backend::{ArchiveBackend, BackendEvent, Ticket};
use crate::models::archive_entry::{ArchiveEntry, TreeNode};
use crate::system::archive::{
    extract_archive, read_listing, ArchiveExtractRequest, ArchiveProgressEvent, ArchiveSummary,
};
use crate::utils::error::{ArcpeekError, OperationError, Result};

type ListHandle = JoinHandle<Result<Vec<TreeNode<ArchiveEntry>>>>;
type ExtractHandle = JoinHandle<Result<ArchiveSummary>>;

#[derive(Debug)]
enum JobKind {
    List(ListHandle),
    Extract {
        handle: ExtractHandle,
        progress_rx: Receiver<ArchiveProgressEvent>,
    },
}

#[derive(Debug)]
struct Job {
    ticket: Ticket,
    path: PathBuf,
    kind: JobKind,
}

/// 빈 문자열은 비밀번호 없음으로 취급
fn credential(password: &str) -> Option<String> {
    if password.is_empty() {
        None
    } else {
        Some(password.to_string())
    }
}

#[derive(Debug)]
pub struct ThreadedBackend {
    jobs: Vec<Job>,
    extract_delay: Duration,
    cancel_flag: Arc<AtomicBool>,
}

impl ThreadedBackend {
    pub fn new(extract_delay: Duration) -> Self {
        Self {
            jobs: Vec::new(),
            extract_delay,
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    fn drain_progress(job: &Job, events: &mut Vec<BackendEvent>) {
        let JobKind::Extract { progress_rx, .. } = &job.kind else {
            return;
        };
        let paths: Vec<String> = progress_rx.try_iter().map(|e| e.entry).collect();
        if !paths.is_empty() {
            events.push(BackendEvent::Progress {
                ticket: job.ticket,
                path: job.path.clone(),
                paths,
            });
        }
    }

    fn is_finished(job: &Job) -> bool {
        match &job.kind {
            JobKind::List(handle) => handle.is_finished(),
            JobKind::Extract { handle, .. } => handle.is_finished(),
        }
    }

    fn complete(job: Job, events: &mut Vec<BackendEvent>) {
        let Job { ticket, path, kind } = job;
        match kind {
            JobKind::List(handle) => {
                let result = join_worker(handle, &path)
                    .and_then(|r| r)
                    .map_err(OperationError::from);
                debug!(ticket = ticket.0, archive = %path.display(), ok = result.is_ok(), "list completed");
                events.push(BackendEvent::Listed {
                    ticket,
                    path,
                    result,
                });
            }
            JobKind::Extract {
                handle,
                progress_rx,
            } => {
                let result = join_worker(handle, &path).and_then(|r| r);
                // 스레드 종료 직전에 보낸 진행 이벤트
                let paths: Vec<String> = progress_rx.try_iter().map(|e| e.entry).collect();
                if !paths.is_empty() {
                    events.push(BackendEvent::Progress {
                        ticket,
                        path: path.clone(),
                        paths,
                    });
                }
                let result = summarize_extract(&path, result);
                debug!(ticket = ticket.0, archive = %path.display(), ok = result.is_ok(), "extract completed");
                events.push(BackendEvent::Extracted {
                    ticket,
                    path,
                    result,
                });
            }
        }
    }
}

impl Default for ThreadedBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl Drop for ThreadedBackend {
    fn drop(&mut self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }
}

fn join_worker<T>(handle: JoinHandle<T>, path: &Path) -> Result<T> {
    handle
        .join()
        .map_err(|_| ArcpeekError::WorkerPanicked(path.display().to_string()))
}

fn summarize_extract(
    path: &Path,
    result: Result<ArchiveSummary>,
) -> std::result::Result<(), OperationError> {
    let summary = result.map_err(OperationError::from)?;
    if summary.cancelled {
        return Err(OperationError::failed(format!(
            "Extraction cancelled ({}/{})",
            summary.items_processed, summary.total_files
        )));
    }
    if !summary.errors.is_empty() {
        warn!(
            archive = %path.display(),
            failed = summary.items_failed,
            "extraction completed with errors"
        );
        return Err(OperationError::failed(format!(
            "Extraction completed with errors ({} failed): {}",
            summary.items_failed,
            summary.errors.join("; ")
        )));
    }
    info!(
        archive = %path.display(),
        items = summary.items_processed,
        "extraction completed"
    );
    Ok(())
}

impl ArchiveBackend for ThreadedBackend {
    fn list(&mut self, ticket: Ticket, path: &Path, password: &str) {
        debug!(ticket = ticket.0, archive = %path.display(), "list dispatched");
        let archive_path = path.to_path_buf();
        let password = credential(password);
        let handle = std::thread::spawn(move || read_listing(&archive_path, password.as_deref()));
        self.jobs.push(Job {
            ticket,
            path: path.to_path_buf(),
            kind: JobKind::List(handle),
        });
    }

    fn extract(&mut self, ticket: Ticket, path: &Path, target: &Path, password: &str) {
        debug!(
            ticket = ticket.0,
            archive = %path.display(),
            target = %target.display(),
            "extract dispatched"
        );
        let request = ArchiveExtractRequest {
            archive_path: path.to_path_buf(),
            dest_dir: target.to_path_buf(),
            password: credential(password),
        };
        let (progress_tx, progress_rx) = mpsc::channel::<ArchiveProgressEvent>();
        let cancel_for_worker = Arc::clone(&self.cancel_flag);
        let delay = self.extract_delay;
        let handle = std::thread::spawn(move || {
            // 진행 표시가 먼저 그려지도록
            std::thread::sleep(delay);
            extract_archive(&request, progress_tx, cancel_for_worker)
        });
        self.jobs.push(Job {
            ticket,
            path: path.to_path_buf(),
            kind: JobKind::Extract {
                handle,
                progress_rx,
            },
        });
    }

    fn poll_events(&mut self) -> Vec<BackendEvent> {
        let mut events = Vec::new();
        let mut running = Vec::with_capacity(self.jobs.len());
        for job in std::mem::take(&mut self.jobs) {
            if Self::is_finished(&job) {
                Self::complete(job, &mut events);
            } else {
                Self::drain_progress(&job, &mut events);
                running.push(job);
            }
        }
        self.jobs = running;
        events
    }

    fn has_pending(&self) -> bool {
        !self.jobs.is_empty()
    }
}
