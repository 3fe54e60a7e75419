// Archive session - 목록/압축 해제 비밀번호 재시도 상태 머신
//
// Idle -> Listing -> Listed -> Extracting -> Listed
// AwaitingPassword(op) 는 Listing/Extracting 에서 비밀번호 오류로 진입한다.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::backend::{ArchiveBackend, BackendEvent, Ticket};
use crate::core::normalize::normalize;
use crate::models::archive_entry::{ArchiveEntry, FileNode, TreeNode};
use crate::utils::error::{ErrorKind, OperationError};

/// 비밀번호로 막힐 수 있는 두 작업
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Extract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Listing,
    Listed,
    Extracting,
    AwaitingPassword(Operation),
}

/// 세션이 단독으로 소유하고 변경하는 작업 상태
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    pub current_path: Option<PathBuf>,
    /// 현재 아카이브에 대해 마지막으로 입력된 비밀번호
    pub credential: Option<String>,
    pub pending_auth: Option<Operation>,
    pub extract_target: Option<PathBuf>,
    /// 압축 해제 진행 중 여부
    pub busy: bool,
}

/// 화면 계층으로 전달되는 결과
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// 새 경로 수신 확인 (호스트 셸로 전달)
    Acknowledged(PathBuf),
    TreeCleared,
    TreePublished(Vec<FileNode>),
    PasswordRequested {
        operation: Operation,
        /// 비밀번호를 넣고도 실패한 경우
        retry: bool,
    },
    ExtractionStarted {
        target: PathBuf,
    },
    ExtractionProgress(Vec<String>),
    ExtractionFinished {
        target: PathBuf,
    },
    Notice {
        kind: ErrorKind,
        message: String,
    },
}

/// 현재 상태에서 받아들일 수 없는 요청
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("No archive is loaded")]
    NothingLoaded,
    #[error("Archive contents are not listed yet")]
    NotListed,
    #[error("An extraction is already running")]
    ExtractInFlight,
    #[error("The previous extraction is still finishing")]
    PreviousExtractDraining,
    #[error("No password prompt is pending")]
    NoPromptPending,
}

#[derive(Debug, Clone)]
struct InFlight {
    ticket: Ticket,
    path: PathBuf,
    with_password: bool,
}

impl InFlight {
    fn matches(&self, ticket: Ticket, path: &Path) -> bool {
        self.ticket == ticket && self.path == path
    }
}

pub struct ArchiveSession {
    state: OperationState,
    phase: Phase,
    backend: Box<dyn ArchiveBackend>,
    next_ticket: u64,
    list_in_flight: Option<InFlight>,
    extract_in_flight: Option<InFlight>,
    /// 새 경로 수신으로 대체됐지만 아직 끝나지 않은 압축 해제
    draining: Vec<Ticket>,
    tree: Vec<TreeNode<ArchiveEntry>>,
    outbox: VecDeque<SessionEvent>,
}

impl ArchiveSession {
    pub fn new(backend: Box<dyn ArchiveBackend>) -> Self {
        Self {
            state: OperationState::default(),
            phase: Phase::Idle,
            backend,
            next_ticket: 0,
            list_in_flight: None,
            extract_in_flight: None,
            draining: Vec::new(),
            tree: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &OperationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.state.current_path.as_deref()
    }

    /// 마지막으로 게시된 원본 트리
    #[cfg(test)]
    pub fn raw_tree(&self) -> &[TreeNode<ArchiveEntry>] {
        &self.tree
    }

    /// 백엔드에 아직 끝나지 않은 요청이 있는지
    pub fn has_pending_work(&self) -> bool {
        self.backend.has_pending()
    }

    /// 새 아카이브 경로 수신. 진행 중인 요청은 취소하지 않고 결과만 버린다.
    pub fn ingest_path(&mut self, path: PathBuf) {
        info!(path = %path.display(), "ingesting archive path");

        if self.list_in_flight.take().is_some() {
            debug!("superseding in-flight listing");
        }
        if let Some(extract) = self.extract_in_flight.take() {
            warn!(
                archive = %extract.path.display(),
                "superseding in-flight extraction, result will be discarded"
            );
            self.draining.push(extract.ticket);
        }

        self.state = OperationState {
            current_path: Some(path.clone()),
            ..OperationState::default()
        };
        self.tree.clear();
        self.outbox.push_back(SessionEvent::TreeCleared);
        self.outbox.push_back(SessionEvent::Acknowledged(path));
        self.dispatch_list();
    }

    /// 같은 아카이브를 현재 비밀번호로 다시 나열
    pub fn reload(&mut self) -> Result<(), Rejection> {
        if self.state.current_path.is_none() {
            return Err(Rejection::NothingLoaded);
        }
        match self.phase {
            Phase::Idle | Phase::Listed => {
                self.dispatch_list();
                Ok(())
            }
            Phase::Listing => Ok(()),
            Phase::Extracting => Err(Rejection::ExtractInFlight),
            Phase::AwaitingPassword(_) => Err(Rejection::NotListed),
        }
    }

    /// 비밀번호 대화상자 확인
    pub fn submit_password(&mut self, password: &str) -> Result<(), Rejection> {
        let Phase::AwaitingPassword(operation) = self.phase else {
            return Err(Rejection::NoPromptPending);
        };

        self.state.credential = if password.is_empty() {
            None
        } else {
            Some(password.to_string())
        };

        match operation {
            Operation::List => self.dispatch_list(),
            Operation::Extract => {
                let Some(target) = self.state.extract_target.clone() else {
                    self.phase = Phase::Listed;
                    return Err(Rejection::NotListed);
                };
                self.dispatch_extract(target);
            }
        }
        Ok(())
    }

    /// 비밀번호 대화상자 취소: 목록은 Idle, 압축 해제는 Listed 로 복귀
    pub fn cancel_password(&mut self) -> Result<(), Rejection> {
        let Phase::AwaitingPassword(operation) = self.phase else {
            return Err(Rejection::NoPromptPending);
        };
        self.state.pending_auth = None;
        self.phase = match operation {
            Operation::List => Phase::Idle,
            Operation::Extract => {
                self.state.extract_target = None;
                Phase::Listed
            }
        };
        debug!(?operation, "password prompt cancelled");
        Ok(())
    }

    /// 압축 해제 요청 (Listed 상태에서만 허용)
    pub fn request_extract(&mut self, target: PathBuf) -> Result<(), Rejection> {
        if self.state.current_path.is_none() {
            return Err(Rejection::NothingLoaded);
        }
        if self.extract_in_flight.is_some() {
            return Err(Rejection::ExtractInFlight);
        }
        if !self.draining.is_empty() {
            return Err(Rejection::PreviousExtractDraining);
        }
        if self.phase != Phase::Listed {
            return Err(Rejection::NotListed);
        }

        self.state.extract_target = Some(target.clone());
        self.dispatch_extract(target);
        Ok(())
    }

    /// 백엔드 이벤트를 모두 가져와 적용
    pub fn pump(&mut self) {
        for event in self.backend.poll_events() {
            self.apply(event);
        }
    }

    /// 쌓인 화면 이벤트 반환
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.outbox.drain(..).collect()
    }

    fn allocate_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    fn dispatch_list(&mut self) {
        let Some(path) = self.state.current_path.clone() else {
            return;
        };
        let ticket = self.allocate_ticket();
        let password = self.state.credential.clone().unwrap_or_default();
        debug!(?ticket, path = %path.display(), "dispatching list");

        self.list_in_flight = Some(InFlight {
            ticket,
            path: path.clone(),
            with_password: !password.is_empty(),
        });
        self.phase = Phase::Listing;
        self.backend.list(ticket, &path, &password);
    }

    fn dispatch_extract(&mut self, target: PathBuf) {
        let Some(path) = self.state.current_path.clone() else {
            return;
        };
        let ticket = self.allocate_ticket();
        let password = self.state.credential.clone().unwrap_or_default();
        debug!(?ticket, path = %path.display(), target = %target.display(), "dispatching extract");

        self.extract_in_flight = Some(InFlight {
            ticket,
            path: path.clone(),
            with_password: !password.is_empty(),
        });
        self.phase = Phase::Extracting;
        self.state.busy = true;
        self.outbox.push_back(SessionEvent::ExtractionStarted {
            target: target.clone(),
        });
        self.backend.extract(ticket, &path, &target, &password);
    }

    fn apply(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Listed {
                ticket,
                path,
                result,
            } => self.on_listed(ticket, &path, result),
            BackendEvent::Extracted {
                ticket,
                path,
                result,
            } => self.on_extracted(ticket, &path, result),
            BackendEvent::Progress {
                ticket,
                path,
                paths,
            } => {
                let live = self
                    .extract_in_flight
                    .as_ref()
                    .is_some_and(|f| f.matches(ticket, &path));
                if live {
                    self.outbox.push_back(SessionEvent::ExtractionProgress(paths));
                }
            }
        }
    }

    fn on_listed(
        &mut self,
        ticket: Ticket,
        path: &Path,
        result: Result<Vec<TreeNode<ArchiveEntry>>, OperationError>,
    ) {
        let live = self
            .list_in_flight
            .as_ref()
            .is_some_and(|f| f.matches(ticket, path));
        if !live {
            debug!(?ticket, path = %path.display(), "discarding stale listing");
            return;
        }
        let Some(request) = self.list_in_flight.take() else {
            return;
        };

        match result {
            Ok(tree) => {
                let published = normalize(&tree);
                info!(
                    path = %path.display(),
                    entries = tree.iter().map(TreeNode::count).sum::<usize>(),
                    "archive listed"
                );
                self.tree = tree;
                self.state.pending_auth = None;
                self.phase = Phase::Listed;
                self.outbox.push_back(SessionEvent::TreePublished(published));
            }
            Err(err) if err.is_password_required() => {
                info!(path = %path.display(), "listing needs a password");
                self.state.pending_auth = Some(Operation::List);
                self.phase = Phase::AwaitingPassword(Operation::List);
                self.outbox.push_back(SessionEvent::PasswordRequested {
                    operation: Operation::List,
                    retry: request.with_password,
                });
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "listing failed");
                self.phase = Phase::Idle;
                self.outbox.push_back(SessionEvent::Notice {
                    kind: err.kind,
                    message: err.message,
                });
            }
        }
    }

    fn on_extracted(&mut self, ticket: Ticket, path: &Path, result: Result<(), OperationError>) {
        if let Some(pos) = self.draining.iter().position(|t| *t == ticket) {
            self.draining.remove(pos);
            info!(?ticket, "superseded extraction finished, result discarded");
            return;
        }
        let live = self
            .extract_in_flight
            .as_ref()
            .is_some_and(|f| f.matches(ticket, path));
        if !live {
            debug!(?ticket, path = %path.display(), "discarding stale extraction result");
            return;
        }
        let Some(request) = self.extract_in_flight.take() else {
            return;
        };
        self.state.busy = false;

        match result {
            Ok(()) => {
                let target = self.state.extract_target.clone().unwrap_or_default();
                info!(path = %path.display(), target = %target.display(), "extraction finished");
                self.state.pending_auth = None;
                self.phase = Phase::Listed;
                self.outbox
                    .push_back(SessionEvent::ExtractionFinished { target });
            }
            Err(err) if err.is_password_required() => {
                info!(path = %path.display(), "extraction needs a password");
                self.state.pending_auth = Some(Operation::Extract);
                self.phase = Phase::AwaitingPassword(Operation::Extract);
                self.outbox.push_back(SessionEvent::PasswordRequested {
                    operation: Operation::Extract,
                    retry: request.with_password,
                });
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "extraction failed");
                self.phase = Phase::Listed;
                self.outbox.push_back(SessionEvent::Notice {
                    kind: err.kind,
                    message: err.message,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::testing::{Call, ScriptedBackend};

    fn session() -> (ArchiveSession, ScriptedBackend) {
        let backend = ScriptedBackend::new();
        (ArchiveSession::new(Box::new(backend.clone())), backend)
    }

    fn sample_tree() -> Vec<TreeNode<ArchiveEntry>> {
        vec![
            TreeNode::leaf(ArchiveEntry::file("b.txt", 3, None)),
            TreeNode::branch(ArchiveEntry::directory("a/", None), Vec::new()),
        ]
    }

    fn wrong_password() -> OperationError {
        OperationError::password_required("Password required")
    }

    fn last(backend: &ScriptedBackend) -> Call {
        backend.last_call().expect("backend was called")
    }

    fn list_call(path: &str, password: &str, call: &Call) -> bool {
        matches!(call, Call::List { path: p, password: pw, .. }
            if p == Path::new(path) && pw == password)
    }

    fn published(events: &[SessionEvent]) -> Option<&Vec<FileNode>> {
        events.iter().find_map(|e| match e {
            SessionEvent::TreePublished(tree) => Some(tree),
            _ => None,
        })
    }

    /// 비밀번호가 걸린 아카이브를 "secret"으로 Listed 상태까지 진행
    fn listed_with_secret(session: &mut ArchiveSession, backend: &ScriptedBackend, path: &str) {
        session.ingest_path(PathBuf::from(path));
        backend.complete_list(&last(backend), Err(wrong_password()));
        session.pump();
        session
            .submit_password("secret")
            .expect("prompt should be pending");
        backend.complete_list(&last(backend), Ok(sample_tree()));
        session.pump();
        assert_eq!(session.phase(), Phase::Listed);
    }

    #[test]
    fn test_ingest_lists_with_empty_password_and_acknowledges() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("/data/a.zip"));

        assert_eq!(session.phase(), Phase::Listing);
        assert!(list_call("/data/a.zip", "", &last(&backend)));
        let events = session.drain_events();
        assert!(events.contains(&SessionEvent::Acknowledged(PathBuf::from("/data/a.zip"))));
        assert!(events.contains(&SessionEvent::TreeCleared));
    }

    #[test]
    fn test_successful_listing_publishes_normalized_tree() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("a.zip"));
        backend.complete_list(&last(&backend), Ok(sample_tree()));
        session.pump();

        assert_eq!(session.phase(), Phase::Listed);
        let events = session.drain_events();
        let tree = published(&events).expect("tree published");
        let names: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b.txt"]);
        assert_eq!(session.raw_tree().len(), 2);
    }

    #[test]
    fn test_password_flow_reuses_credential_for_extract() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("arch.zip"));
        assert!(list_call("arch.zip", "", &last(&backend)));

        backend.complete_list(&last(&backend), Err(wrong_password()));
        session.pump();
        assert_eq!(session.phase(), Phase::AwaitingPassword(Operation::List));
        assert_eq!(session.state().pending_auth, Some(Operation::List));
        assert!(session.drain_events().contains(&SessionEvent::PasswordRequested {
            operation: Operation::List,
            retry: false,
        }));

        session.submit_password("secret").expect("prompt pending");
        assert!(list_call("arch.zip", "secret", &last(&backend)));
        backend.complete_list(&last(&backend), Ok(sample_tree()));
        session.pump();
        assert_eq!(session.phase(), Phase::Listed);
        assert_eq!(session.state().pending_auth, None);

        session
            .request_extract(PathBuf::from("/out"))
            .expect("extract allowed when listed");
        match last(&backend) {
            Call::Extract {
                path,
                target,
                password,
                ..
            } => {
                assert_eq!(path, PathBuf::from("arch.zip"));
                assert_eq!(target, PathBuf::from("/out"));
                assert_eq!(password, "secret");
            }
            other => panic!("expected extract call, got {other:?}"),
        }
        assert!(session.is_busy());
        let prompts = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::PasswordRequested { .. }))
            .count();
        assert_eq!(prompts, 0);
    }

    #[test]
    fn test_pending_auth_survives_until_retry_succeeds() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("arch.zip"));
        backend.complete_list(&last(&backend), Err(wrong_password()));
        session.pump();

        session.submit_password("guess").expect("prompt pending");
        assert_eq!(session.phase(), Phase::Listing);
        assert_eq!(session.state().pending_auth, Some(Operation::List));

        backend.complete_list(&last(&backend), Err(wrong_password()));
        session.pump();
        session.submit_password("secret").expect("prompt pending");
        assert_eq!(session.state().pending_auth, Some(Operation::List));

        backend.complete_list(&last(&backend), Ok(sample_tree()));
        session.pump();
        assert_eq!(session.state().pending_auth, None);

        session
            .request_extract(PathBuf::from("/out"))
            .expect("extract allowed when listed");
        backend.complete_extract(&last(&backend), Err(wrong_password()));
        session.pump();
        session.submit_password("secret").expect("prompt pending");
        assert_eq!(session.state().pending_auth, Some(Operation::Extract));
        backend.complete_extract(&last(&backend), Ok(()));
        session.pump();
        assert_eq!(session.state().pending_auth, None);
    }

    #[test]
    fn test_credential_isolation_between_archives() {
        let (mut session, backend) = session();
        listed_with_secret(&mut session, &backend, "A.zip");
        assert_eq!(session.state().credential.as_deref(), Some("secret"));

        session.ingest_path(PathBuf::from("B.zip"));
        assert!(list_call("B.zip", "", &last(&backend)));
        assert_eq!(session.state().credential, None);
    }

    #[test]
    fn test_repeated_wrong_passwords_never_exhaust() {
        let (mut session, backend) = session();
        listed_with_secret(&mut session, &backend, "arch.zip");
        session
            .request_extract(PathBuf::from("/out"))
            .expect("extract allowed");

        for attempt in 0..25 {
            backend.complete_extract(&last(&backend), Err(wrong_password()));
            session.pump();
            assert_eq!(session.phase(), Phase::AwaitingPassword(Operation::Extract));
            assert!(!session.is_busy());
            assert_eq!(session.current_path(), Some(Path::new("arch.zip")));
            assert_eq!(session.state().extract_target, Some(PathBuf::from("/out")));

            session
                .submit_password(&format!("guess-{attempt}"))
                .expect("prompt pending");
            match last(&backend) {
                Call::Extract { target, .. } => assert_eq!(target, PathBuf::from("/out")),
                other => panic!("expected extract retry, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_list_retry_flag_reports_failed_attempt() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("arch.zip"));
        backend.complete_list(&last(&backend), Err(wrong_password()));
        session.pump();
        session.submit_password("nope").expect("prompt pending");
        session.drain_events();

        backend.complete_list(&last(&backend), Err(wrong_password()));
        session.pump();
        assert!(session.drain_events().contains(&SessionEvent::PasswordRequested {
            operation: Operation::List,
            retry: true,
        }));
    }

    #[test]
    fn test_stale_listing_is_discarded() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("A.zip"));
        let call_a = last(&backend);
        session.ingest_path(PathBuf::from("B.zip"));
        let call_b = last(&backend);
        session.drain_events();

        backend.complete_list(&call_b, Ok(sample_tree()));
        backend.complete_list(
            &call_a,
            Ok(vec![TreeNode::leaf(ArchiveEntry::file("stale.txt", 1, None))]),
        );
        session.pump();

        let events = session.drain_events();
        let trees: Vec<&Vec<FileNode>> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::TreePublished(tree) => Some(tree),
                _ => None,
            })
            .collect();
        assert_eq!(trees.len(), 1);
        assert!(trees[0].iter().all(|n| n.name != "stale.txt"));
        assert_eq!(session.current_path(), Some(Path::new("B.zip")));
    }

    #[test]
    fn test_stale_listing_arriving_first_is_discarded() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("A.zip"));
        let call_a = last(&backend);
        session.ingest_path(PathBuf::from("B.zip"));
        session.drain_events();

        backend.complete_list(&call_a, Err(wrong_password()));
        session.pump();
        assert_eq!(session.phase(), Phase::Listing);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_same_path_with_old_ticket_is_stale() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("A.zip"));
        let first = last(&backend);
        session.ingest_path(PathBuf::from("A.zip"));
        let second = last(&backend);
        assert_ne!(first.ticket(), second.ticket());

        backend.complete_list(&first, Ok(sample_tree()));
        session.pump();
        assert_eq!(session.phase(), Phase::Listing);

        backend.complete_list(&second, Ok(sample_tree()));
        session.pump();
        assert_eq!(session.phase(), Phase::Listed);
    }

    #[test]
    fn test_cancel_list_prompt_returns_to_idle() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("arch.zip"));
        backend.complete_list(&last(&backend), Err(wrong_password()));
        session.pump();

        session.cancel_password().expect("prompt pending");
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.state().pending_auth, None);
        assert_eq!(
            session.cancel_password(),
            Err(Rejection::NoPromptPending)
        );
    }

    #[test]
    fn test_cancel_extract_prompt_returns_to_listed() {
        let (mut session, backend) = session();
        listed_with_secret(&mut session, &backend, "arch.zip");
        session
            .request_extract(PathBuf::from("/out"))
            .expect("extract allowed");
        backend.complete_extract(&last(&backend), Err(wrong_password()));
        session.pump();

        session.cancel_password().expect("prompt pending");
        assert_eq!(session.phase(), Phase::Listed);
        assert_eq!(session.state().pending_auth, None);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_non_password_list_failure_goes_idle_with_notice() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("broken.zip"));
        session.drain_events();
        backend.complete_list(&last(&backend), Err(OperationError::failed("corrupt")));
        session.pump();

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::Notice {
                kind: ErrorKind::OperationFailed,
                message: "corrupt".to_string(),
            }]
        );
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn test_non_password_extract_failure_returns_to_listed() {
        let (mut session, backend) = session();
        listed_with_secret(&mut session, &backend, "arch.zip");
        session
            .request_extract(PathBuf::from("/readonly"))
            .expect("extract allowed");
        backend.complete_extract(&last(&backend), Err(OperationError::failed("denied")));
        session.pump();

        assert_eq!(session.phase(), Phase::Listed);
        assert!(!session.is_busy());
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::Notice { .. })));
    }

    #[test]
    fn test_extract_success_clears_busy() {
        let (mut session, backend) = session();
        listed_with_secret(&mut session, &backend, "arch.zip");
        session.drain_events();
        session
            .request_extract(PathBuf::from("/out"))
            .expect("extract allowed");
        assert!(session.is_busy());

        backend.complete_extract(&last(&backend), Ok(()));
        session.pump();
        assert!(!session.is_busy());
        assert_eq!(session.phase(), Phase::Listed);
        assert_eq!(
            session.drain_events(),
            vec![
                SessionEvent::ExtractionStarted {
                    target: PathBuf::from("/out")
                },
                SessionEvent::ExtractionFinished {
                    target: PathBuf::from("/out")
                },
            ]
        );
    }

    #[test]
    fn test_extract_rejected_unless_listed() {
        let (mut session, backend) = session();
        assert_eq!(
            session.request_extract(PathBuf::from("/out")),
            Err(Rejection::NothingLoaded)
        );

        session.ingest_path(PathBuf::from("arch.zip"));
        assert_eq!(
            session.request_extract(PathBuf::from("/out")),
            Err(Rejection::NotListed)
        );

        backend.complete_list(&last(&backend), Ok(sample_tree()));
        session.pump();
        session
            .request_extract(PathBuf::from("/out"))
            .expect("extract allowed");
        assert_eq!(
            session.request_extract(PathBuf::from("/other")),
            Err(Rejection::ExtractInFlight)
        );
        let extracts = backend
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Extract { .. }))
            .count();
        assert_eq!(extracts, 1);
    }

    #[test]
    fn test_superseded_extract_drains_before_next_extract() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("A.zip"));
        backend.complete_list(&last(&backend), Ok(sample_tree()));
        session.pump();
        session
            .request_extract(PathBuf::from("/out"))
            .expect("extract allowed");
        let old_extract = last(&backend);

        session.ingest_path(PathBuf::from("B.zip"));
        assert!(!session.is_busy());
        backend.complete_list(&last(&backend), Ok(sample_tree()));
        session.pump();
        assert_eq!(
            session.request_extract(PathBuf::from("/out2")),
            Err(Rejection::PreviousExtractDraining)
        );

        backend.progress(&old_extract, &["stale.txt"]);
        backend.complete_extract(&old_extract, Err(OperationError::failed("late")));
        session.pump();
        let events = session.drain_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::Notice { .. } | SessionEvent::ExtractionProgress(_))));

        session
            .request_extract(PathBuf::from("/out2"))
            .expect("extract allowed after drain");
    }

    #[test]
    fn test_progress_is_forwarded_verbatim() {
        let (mut session, backend) = session();
        listed_with_secret(&mut session, &backend, "arch.zip");
        session
            .request_extract(PathBuf::from("/out"))
            .expect("extract allowed");
        session.drain_events();

        let call = last(&backend);
        backend.progress(&call, &["a/", "a/b.txt"]);
        session.pump();
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::ExtractionProgress(vec![
                "a/".to_string(),
                "a/b.txt".to_string()
            ])]
        );
    }

    #[test]
    fn test_empty_password_clears_credential() {
        let (mut session, backend) = session();
        session.ingest_path(PathBuf::from("arch.zip"));
        backend.complete_list(&last(&backend), Err(wrong_password()));
        session.pump();
        session.submit_password("").expect("prompt pending");
        assert_eq!(session.state().credential, None);
        assert!(list_call("arch.zip", "", &last(&backend)));
    }

    #[test]
    fn test_submit_without_prompt_is_rejected() {
        let (mut session, _backend) = session();
        assert_eq!(
            session.submit_password("x"),
            Err(Rejection::NoPromptPending)
        );
    }

    #[test]
    fn test_reload_keeps_credential() {
        let (mut session, backend) = session();
        listed_with_secret(&mut session, &backend, "arch.zip");
        session.reload().expect("reload allowed");
        assert!(list_call("arch.zip", "secret", &last(&backend)));
        assert_eq!(session.phase(), Phase::Listing);
    }
}
