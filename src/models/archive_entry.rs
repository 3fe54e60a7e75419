use chrono::NaiveDateTime;

/// 백엔드가 보고하는 아카이브 엔트리 (파일 또는 디렉토리)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// 표시 이름 (비어 있을 수 있음, 이 경우 경로에서 유도)
    pub name: String,
    /// 아카이브 내부 전체 경로 (디렉토리는 '/'로 끝날 수 있음)
    pub path: String,
    /// 상위 디렉토리 경로 (루트 엔트리는 None)
    pub parent_path: Option<String>,
    /// 바이트 단위 크기 (디렉토리는 0)
    pub size: u64,
    pub is_dir: bool,
    /// 수정 시각 (알 수 없으면 None)
    pub modified: Option<NaiveDateTime>,
}

impl ArchiveEntry {
    pub fn file(path: impl Into<String>, size: u64, modified: Option<NaiveDateTime>) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_string(),
            parent_path: parent_of(&path),
            path,
            size,
            is_dir: false,
            modified,
        }
    }

    pub fn directory(path: impl Into<String>, modified: Option<NaiveDateTime>) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_string(),
            parent_path: parent_of(&path),
            path,
            size: 0,
            is_dir: true,
            modified,
        }
    }

    /// 트리 조립용 키 (끝의 '/' 제거)
    pub fn key(&self) -> &str {
        trim_dir_suffix(&self.path)
    }
}

/// 계층 노드. 리프는 `children == None`, 디렉토리는 빈 벡터라도 `Some`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T> {
    pub item: T,
    pub children: Option<Vec<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
    #[cfg(test)]
    pub fn leaf(item: T) -> Self {
        Self {
            item,
            children: None,
        }
    }

    #[cfg(test)]
    pub fn branch(item: T, children: Vec<TreeNode<T>>) -> Self {
        Self {
            item,
            children: Some(children),
        }
    }

    /// 서브트리의 전체 노드 수
    pub fn count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map(|kids| kids.iter().map(TreeNode::count).sum())
            .unwrap_or(0)
    }
}

/// 화면 표시용 노드 (정규화 결과)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// 경로와 동일
    pub id: String,
    /// 해석된 표시 이름
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    pub modified: Option<NaiveDateTime>,
    pub children: Option<Vec<FileNode>>,
}

impl FileNode {
    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|kids| !kids.is_empty())
    }

    /// 펼칠 수 있는 노드 (디렉토리이거나 자식이 붙은 파일)
    pub fn is_expandable(&self) -> bool {
        self.is_dir || self.has_children()
    }
}

/// 디렉토리 경로의 끝 '/' 제거
pub fn trim_dir_suffix(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// 마지막 '/' 뒤의 조각. 디렉토리 경로("a/b/")는 빈 문자열이 된다.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// 비어 있지 않은 마지막 경로 조각
pub fn last_non_empty_segment(path: &str) -> Option<&str> {
    path.split('/').rev().find(|segment| !segment.is_empty())
}

/// 상위 디렉토리 경로 ("a/b/c.txt" -> "a/b/"), 루트 엔트리는 None
pub fn parent_of(path: &str) -> Option<String> {
    let trimmed = trim_dir_suffix(path);
    trimmed
        .rfind('/')
        .map(|idx| &trimmed[..idx])
        .filter(|parent| !parent.is_empty())
        .map(|parent| format!("{}/", parent))
}
