// Tree normalizer - 백엔드 트리를 표시용 FileNode 트리로 변환
//
// 형제 단위 정렬 규칙:
// 1. 디렉토리가 파일보다 먼저
// 2. 같은 종류 안에서는 수정 시각이 늦은 항목이 먼저
// 3. 수정 시각이 없는 항목은 자기 자리를 유지 (입력 순서 보존)

use crate::models::archive_entry::{last_non_empty_segment, ArchiveEntry, FileNode, TreeNode};

/// 정규화 (순수 함수, 입력을 변경하지 않고 항상 새 구조를 만든다)
pub fn normalize(raw_tree: &[TreeNode<ArchiveEntry>]) -> Vec<FileNode> {
    let nodes: Vec<FileNode> = raw_tree.iter().map(to_file_node).collect();
    sort_siblings(nodes)
}

/// 비어 있지 않은 이름, 없으면 경로의 마지막 조각, 그것도 없으면 경로 자체
pub fn display_name(entry: &ArchiveEntry) -> String {
    if !entry.name.trim().is_empty() {
        return entry.name.clone();
    }
    last_non_empty_segment(&entry.path)
        .unwrap_or(&entry.path)
        .to_string()
}

fn to_file_node(node: &TreeNode<ArchiveEntry>) -> FileNode {
    let entry = &node.item;
    FileNode {
        id: entry.path.clone(),
        name: display_name(entry),
        size: entry.size,
        is_dir: entry.is_dir,
        modified: entry.modified,
        children: node.children.as_ref().map(|kids| normalize(kids)),
    }
}

fn sort_siblings(nodes: Vec<FileNode>) -> Vec<FileNode> {
    let (dirs, files): (Vec<FileNode>, Vec<FileNode>) =
        nodes.into_iter().partition(|node| node.is_dir);
    let mut sorted = order_by_recency(dirs);
    sorted.extend(order_by_recency(files));
    sorted
}

/// 시각이 있는 항목만 그 항목들이 차지하던 자리 안에서 최신순으로 재배치한다.
/// 시각 없는 항목은 원래 위치 그대로라 상대 순서가 보존된다.
fn order_by_recency(nodes: Vec<FileNode>) -> Vec<FileNode> {
    let slots: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.modified.is_some())
        .map(|(idx, _)| idx)
        .collect();
    if slots.len() < 2 {
        return nodes;
    }

    let mut cells: Vec<Option<FileNode>> = nodes.into_iter().map(Some).collect();
    let mut timed: Vec<FileNode> = slots.iter().filter_map(|&i| cells[i].take()).collect();
    // stable sort: 같은 시각은 입력 순서 유지
    timed.sort_by(|a, b| b.modified.cmp(&a.modified));
    for (slot, node) in slots.into_iter().zip(timed) {
        cells[slot] = Some(node);
    }
    cells.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    fn raw(name: &str, is_dir: bool, modified: Option<NaiveDateTime>) -> TreeNode<ArchiveEntry> {
        let entry = ArchiveEntry {
            name: name.to_string(),
            path: if is_dir {
                format!("{}/", name)
            } else {
                name.to_string()
            },
            parent_path: None,
            size: 0,
            is_dir,
            modified,
        };
        if is_dir {
            TreeNode::branch(entry, Vec::new())
        } else {
            TreeNode::leaf(entry)
        }
    }

    fn names(nodes: &[FileNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    fn to_raw(nodes: &[FileNode]) -> Vec<TreeNode<ArchiveEntry>> {
        nodes
            .iter()
            .map(|n| TreeNode {
                item: ArchiveEntry {
                    name: n.name.clone(),
                    path: n.id.clone(),
                    parent_path: None,
                    size: n.size,
                    is_dir: n.is_dir,
                    modified: n.modified,
                },
                children: n.children.as_ref().map(|kids| to_raw(kids)),
            })
            .collect()
    }

    #[test]
    fn test_mixed_siblings_example() {
        let input = vec![
            raw("b.txt", false, ts(2024, 1, 2)),
            raw("a", true, ts(2023, 12, 1)),
            raw("c.txt", false, None),
        ];
        assert_eq!(names(&normalize(&input)), vec!["a", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_directories_precede_files_regardless_of_time() {
        let input = vec![
            raw("new.txt", false, ts(2030, 1, 1)),
            raw("old", true, ts(1999, 1, 1)),
            raw("undated", true, None),
        ];
        let out = normalize(&input);
        assert_eq!(names(&out), vec!["old", "undated", "new.txt"]);
    }

    #[test]
    fn test_newer_first_within_class() {
        let input = vec![
            raw("jan.txt", false, ts(2024, 1, 1)),
            raw("mar.txt", false, ts(2024, 3, 1)),
            raw("feb.txt", false, ts(2024, 2, 1)),
        ];
        assert_eq!(
            names(&normalize(&input)),
            vec!["mar.txt", "feb.txt", "jan.txt"]
        );
    }

    #[test]
    fn test_missing_timestamps_keep_relative_order() {
        let input = vec![
            raw("x.txt", false, None),
            raw("old.txt", false, ts(2020, 1, 1)),
            raw("y.txt", false, None),
            raw("new.txt", false, ts(2024, 1, 1)),
            raw("z.txt", false, None),
        ];
        let out = normalize(&input);
        assert_eq!(
            names(&out),
            vec!["x.txt", "new.txt", "y.txt", "old.txt", "z.txt"]
        );
    }

    #[test]
    fn test_equal_timestamps_are_stable() {
        let input = vec![
            raw("first.txt", false, ts(2024, 5, 5)),
            raw("second.txt", false, ts(2024, 5, 5)),
        ];
        assert_eq!(
            names(&normalize(&input)),
            vec!["first.txt", "second.txt"]
        );
    }

    #[test]
    fn test_blank_name_falls_back_to_last_segment() {
        let entry = ArchiveEntry {
            name: String::new(),
            path: "docs/guide/".to_string(),
            parent_path: Some("docs/".to_string()),
            size: 0,
            is_dir: true,
            modified: None,
        };
        assert_eq!(display_name(&entry), "guide");

        let odd = ArchiveEntry {
            name: " ".to_string(),
            path: "/".to_string(),
            ..entry
        };
        assert_eq!(display_name(&odd), "/");
    }

    #[test]
    fn test_nested_levels_are_sorted_independently() {
        let mut parent = raw("root", true, None);
        parent.children = Some(vec![
            raw("f.txt", false, None),
            raw("sub", true, None),
        ]);
        let out = normalize(&[parent]);
        let kids = out[0].children.as_ref().expect("dir keeps children");
        assert_eq!(names(kids), vec!["sub", "f.txt"]);
        assert_eq!(kids[1].children, None);
    }

    #[test]
    fn test_normalize_is_idempotent_and_deterministic() {
        let input = vec![
            raw("c.txt", false, None),
            raw("b.txt", false, ts(2024, 1, 2)),
            raw("d", true, None),
            raw("a.txt", false, ts(2024, 6, 1)),
            raw("e", true, ts(2022, 1, 1)),
        ];
        let once = normalize(&input);
        let again = normalize(&input);
        assert_eq!(once, again);

        let twice = normalize(&to_raw(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = vec![raw("b.txt", false, ts(2024, 1, 1)), raw("a", true, None)];
        let snapshot = input.clone();
        let _ = normalize(&input);
        assert_eq!(input, snapshot);
    }
}
