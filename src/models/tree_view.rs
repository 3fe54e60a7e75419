// Tree view state - 펼침/접힘, 선택, 스크롤 (오케스트레이터와 무관한 로컬 UI 상태)

use crate::models::archive_entry::FileNode;
use chrono::NaiveDateTime;
use std::collections::HashSet;

/// 평탄화된 화면 행
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: String,
    pub name: String,
    pub depth: usize,
    pub is_dir: bool,
    pub expandable: bool,
    pub expanded: bool,
    pub size: u64,
    pub modified: Option<NaiveDateTime>,
    /// 부모 행 인덱스 (루트는 None)
    pub parent_row: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct TreeViewState {
    roots: Vec<FileNode>,
    expanded: HashSet<String>,
    rows: Vec<VisibleRow>,
    /// 선택된 행 인덱스
    pub selected_index: usize,
    /// 스크롤 오프셋
    pub scroll_offset: usize,
}

impl TreeViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 트리 게시 (펼침 상태와 선택은 초기화)
    pub fn set_tree(&mut self, roots: Vec<FileNode>) {
        self.roots = roots;
        self.expanded.clear();
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.rebuild_rows();
    }

    pub fn clear(&mut self) {
        self.set_tree(Vec::new());
    }

    pub fn rows(&self) -> &[VisibleRow] {
        &self.rows
    }

    pub fn selected_row(&self) -> Option<&VisibleRow> {
        self.rows.get(self.selected_index)
    }

    /// 선택 행 펼침/접힘 전환
    pub fn toggle_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.expandable {
            return;
        }
        let id = row.id.clone();
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
        self.rebuild_rows();
    }

    /// 선택 행 펼치기, 이미 펼쳐져 있으면 첫 자식으로 이동
    pub fn expand_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.expandable {
            return;
        }
        if row.expanded {
            let next = self.selected_index + 1;
            if self
                .rows
                .get(next)
                .is_some_and(|r| r.parent_row == Some(self.selected_index))
            {
                self.selected_index = next;
            }
            return;
        }
        self.expanded.insert(row.id.clone());
        self.rebuild_rows();
    }

    /// 선택 행 접기, 이미 접혀 있으면 부모로 이동
    pub fn collapse_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.expanded {
            let id = row.id.clone();
            self.expanded.remove(&id);
            self.rebuild_rows();
        } else if let Some(parent) = row.parent_row {
            self.selected_index = parent;
        }
    }

    pub fn expand_all(&mut self) {
        fn collect(nodes: &[FileNode], out: &mut HashSet<String>) {
            for node in nodes {
                if node.is_expandable() {
                    out.insert(node.id.clone());
                }
                if let Some(children) = &node.children {
                    collect(children, out);
                }
            }
        }
        collect(&self.roots, &mut self.expanded);
        self.rebuild_rows();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.rebuild_rows();
    }

    pub fn move_up(&mut self, count: usize) {
        self.selected_index = self.selected_index.saturating_sub(count);
    }

    pub fn move_down(&mut self, count: usize) {
        if self.rows.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + count).min(self.rows.len() - 1);
    }

    pub fn go_to_top(&mut self) {
        self.selected_index = 0;
    }

    pub fn go_to_bottom(&mut self) {
        self.selected_index = self.rows.len().saturating_sub(1);
    }

    /// 선택 행이 보이도록 스크롤 조정
    pub fn adjust_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index + 1 - visible_height;
        }
        let max_offset = self.rows.len().saturating_sub(visible_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// 전체 트리 기준 파일 개수
    pub fn file_count(&self) -> usize {
        self.fold(0, |acc, node| acc + usize::from(!node.is_dir))
    }

    /// 전체 트리 기준 디렉토리 개수
    pub fn dir_count(&self) -> usize {
        self.fold(0, |acc, node| acc + usize::from(node.is_dir))
    }

    /// 전체 크기 반환 (바이트)
    pub fn total_size(&self) -> u64 {
        self.fold(0, |acc, node| if node.is_dir { acc } else { acc + node.size })
    }

    fn fold<A>(&self, init: A, f: impl Fn(A, &FileNode) -> A + Copy) -> A {
        fn walk<A>(nodes: &[FileNode], acc: A, f: impl Fn(A, &FileNode) -> A + Copy) -> A {
            nodes.iter().fold(acc, |acc, node| {
                let acc = f(acc, node);
                match &node.children {
                    Some(children) => walk(children, acc, f),
                    None => acc,
                }
            })
        }
        walk(&self.roots, init, f)
    }

    fn rebuild_rows(&mut self) {
        let selected_id = self.selected_row().map(|row| row.id.clone());

        let mut rows = Vec::new();
        push_rows(&self.roots, 0, None, &self.expanded, &mut rows);
        self.rows = rows;

        // 같은 노드가 남아 있으면 선택 유지, 아니면 범위 안으로 조정
        if let Some(id) = selected_id {
            if let Some(idx) = self.rows.iter().position(|row| row.id == id) {
                self.selected_index = idx;
                return;
            }
        }
        if self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len().saturating_sub(1);
        }
    }
}

fn push_rows(
    nodes: &[FileNode],
    depth: usize,
    parent_row: Option<usize>,
    expanded: &HashSet<String>,
    rows: &mut Vec<VisibleRow>,
) {
    for node in nodes {
        let is_expanded = node.is_expandable() && expanded.contains(&node.id);
        let index = rows.len();
        rows.push(VisibleRow {
            id: node.id.clone(),
            name: node.name.clone(),
            depth,
            is_dir: node.is_dir,
            expandable: node.is_expandable(),
            expanded: is_expanded,
            size: node.size,
            modified: node.modified,
            parent_row,
        });
        if is_expanded {
            if let Some(children) = &node.children {
                push_rows(children, depth + 1, Some(index), expanded, rows);
            }
        }
    }
}
