// Tree assembly - 평탄한 엔트리 목록을 TreeNode 계층으로 조립
//
// 부모를 찾지 못한 엔트리는 가장 가까운 조상에 붙이고, 조상이 없으면 루트로 올린다.
// 어떤 입력에서도 엔트리를 버리지 않으며 결과는 입력 순서에만 의존한다.

use std::collections::HashMap;

use tracing::warn;

use crate::models::archive_entry::{trim_dir_suffix, ArchiveEntry, TreeNode};
use crate::utils::error::ArcpeekError;

/// 조립 결과 (루트 + 부모 해석 실패 기록)
#[derive(Debug)]
pub struct HierarchyBuild {
    pub roots: Vec<TreeNode<ArchiveEntry>>,
    pub issues: Vec<ArcpeekError>,
}

pub fn build_tree(entries: Vec<ArchiveEntry>) -> HierarchyBuild {
    // 중복 경로는 첫 엔트리만 유지
    let mut index: HashMap<String, usize> = HashMap::with_capacity(entries.len());
    let mut unique: Vec<ArchiveEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = entry.key().to_string();
        if index.contains_key(&key) {
            warn!(path = %entry.path, "duplicate archive entry ignored");
            continue;
        }
        index.insert(key, unique.len());
        unique.push(entry);
    }

    let mut issues = Vec::new();
    let mut parent_of: Vec<Option<usize>> = Vec::with_capacity(unique.len());
    for (idx, entry) in unique.iter().enumerate() {
        let parent = match entry.parent_path.as_deref().map(trim_dir_suffix) {
            None | Some("") => None,
            Some(parent_key) => match index.get(parent_key) {
                Some(&p) if p != idx => Some(p),
                _ => {
                    let fallback = nearest_ancestor(parent_key, &index).filter(|&p| p != idx);
                    let attached_to = fallback.map(|p| unique[p].path.clone());
                    let issue = ArcpeekError::AmbiguousHierarchy {
                        path: entry.path.clone(),
                        parent: parent_key.to_string(),
                        attached_to: attached_to.clone(),
                    };
                    warn!(
                        path = %entry.path,
                        parent = parent_key,
                        attached_to = attached_to.as_deref().unwrap_or("<root>"),
                        "unresolvable parent, using fallback attachment"
                    );
                    issues.push(issue);
                    fallback
                }
            },
        };
        parent_of.push(parent);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); unique.len()];
    let mut root_ids = Vec::new();
    for (idx, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(idx),
            None => root_ids.push(idx),
        }
    }

    // 루트에서 닿지 않는 노드(부모 순환)를 입력 순서대로 루트로 승격
    let mut reachable = vec![false; unique.len()];
    mark_reachable(&root_ids, &children, &mut reachable);
    for idx in 0..unique.len() {
        if reachable[idx] {
            continue;
        }
        if let Some(p) = parent_of[idx] {
            children[p].retain(|&c| c != idx);
        }
        let entry = &unique[idx];
        warn!(path = %entry.path, "entry is part of a parent cycle, promoted to root");
        issues.push(ArcpeekError::AmbiguousHierarchy {
            path: entry.path.clone(),
            parent: entry.parent_path.clone().unwrap_or_default(),
            attached_to: None,
        });
        root_ids.push(idx);
        mark_reachable(&[idx], &children, &mut reachable);
    }

    let mut slots: Vec<Option<ArchiveEntry>> = unique.into_iter().map(Some).collect();
    let roots = root_ids
        .iter()
        .filter_map(|&idx| assemble(idx, &children, &mut slots))
        .collect();

    HierarchyBuild { roots, issues }
}

/// "a/b/c" -> "a/b" -> "a" 순으로 존재하는 조상 탐색
fn nearest_ancestor(parent_key: &str, index: &HashMap<String, usize>) -> Option<usize> {
    let mut current = parent_key;
    while let Some(pos) = current.rfind('/') {
        current = trim_dir_suffix(&current[..pos]);
        if current.is_empty() {
            break;
        }
        if let Some(&idx) = index.get(current) {
            return Some(idx);
        }
    }
    None
}

fn mark_reachable(start: &[usize], children: &[Vec<usize>], reachable: &mut [bool]) {
    let mut stack: Vec<usize> = start.to_vec();
    while let Some(idx) = stack.pop() {
        if reachable[idx] {
            continue;
        }
        reachable[idx] = true;
        stack.extend(children[idx].iter().copied());
    }
}

fn assemble(
    idx: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<ArchiveEntry>],
) -> Option<TreeNode<ArchiveEntry>> {
    let item = slots[idx].take()?;
    let kids: Vec<TreeNode<ArchiveEntry>> = children[idx]
        .iter()
        .filter_map(|&c| assemble(c, children, slots))
        .collect();
    let children = if item.is_dir || !kids.is_empty() {
        Some(kids)
    } else {
        None
    };
    Some(TreeNode { item, children })
}
