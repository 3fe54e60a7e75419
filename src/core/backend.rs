// Backend seam - 오케스트레이터가 사용하는 비동기 요청/응답 인터페이스

use std::path::{Path, PathBuf};

use crate::models::archive_entry::{ArchiveEntry, TreeNode};
use crate::utils::error::OperationError;

/// 요청 식별자 (단조 증가)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// 백엔드 완료/진행 이벤트. 모두 요청 시의 ticket과 경로를 그대로 돌려준다.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Listed {
        ticket: Ticket,
        path: PathBuf,
        result: Result<Vec<TreeNode<ArchiveEntry>>, OperationError>,
    },
    Extracted {
        ticket: Ticket,
        path: PathBuf,
        result: Result<(), OperationError>,
    },
    /// 방금 기록된 엔트리 경로들
    Progress {
        ticket: Ticket,
        path: PathBuf,
        paths: Vec<String>,
    },
}

/// 논블로킹 아카이브 백엔드
///
/// `list`/`extract`는 즉시 반환하고 결과는 `poll_events`로 나중에 전달된다.
/// 취소 API는 없다. 오래된 결과는 호출 측에서 버린다.
pub trait ArchiveBackend {
    fn list(&mut self, ticket: Ticket, path: &Path, password: &str);

    fn extract(&mut self, ticket: Ticket, path: &Path, target: &Path, password: &str);

    /// 도착한 이벤트를 도착 순서대로 반환
    fn poll_events(&mut self) -> Vec<BackendEvent>;

    /// 아직 완료되지 않은 요청이 있는지
    fn has_pending(&self) -> bool;
}
