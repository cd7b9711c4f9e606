//! Line diffs between two generations of a payload
//!
//! Both sides are rendered with [`render`](crate::canonical::render) and
//! compared line by line. The result can be printed as a unified patch or
//! turned into side-by-side rows for display.

use crate::canonical::render;
use casewatch_domain::SourcePayload;
use serde::Serialize;
use std::fmt;

/// Context lines kept around each change in a hunk
pub const CONTEXT_LINES: usize = 4;

/// Kind of a line-level edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Line present on both sides
    Equal,
    /// Line only in the old document
    Delete,
    /// Line only in the new document
    Insert,
}

/// One line of the edit script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineOp {
    /// What happened to the line
    pub kind: OpKind,
    /// Line text without its newline
    pub text: String,
}

/// A contiguous region of the edit script with surrounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk {
    /// 1-based first old line (0 when the hunk covers no old lines)
    pub old_start: usize,
    /// Number of old lines covered
    pub old_count: usize,
    /// 1-based first new line (0 when the hunk covers no new lines)
    pub new_start: usize,
    /// Number of new lines covered
    pub new_count: usize,
    /// Lines in this hunk
    pub lines: Vec<LineOp>,
}

/// Row classification in the side-by-side view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTag {
    /// Same text on both sides
    Unchanged,
    /// Only on the right (new) side
    Added,
    /// Only on the left (old) side
    Removed,
    /// Part of a removed block replaced by an added block
    Changed,
}

/// One row of the side-by-side view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinePair {
    /// Old-side text, `None` when this row has no old line
    pub left: Option<String>,
    /// New-side text, `None` when this row has no new line
    pub right: Option<String>,
    /// Row classification
    pub tag: LineTag,
}

/// A non-empty diff between two payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedDiff {
    label: String,
    ops: Vec<LineOp>,
    hunks: Vec<Hunk>,
}

impl UnifiedDiff {
    /// Label shown in the patch header
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Full edit script, including unchanged lines
    pub fn ops(&self) -> &[LineOp] {
        &self.ops
    }

    /// Hunks with context, as printed in the patch
    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// Number of lines only in the new document
    pub fn added_count(&self) -> usize {
        self.ops.iter().filter(|op| op.kind == OpKind::Insert).count()
    }

    /// Number of lines only in the old document
    pub fn removed_count(&self) -> usize {
        self.ops.iter().filter(|op| op.kind == OpKind::Delete).count()
    }

    /// Side-by-side rows for the whole document
    pub fn side_by_side(&self) -> Vec<LinePair> {
        pair_lines(&self.ops)
    }
}

impl fmt::Display for UnifiedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index: {}", self.label)?;
        writeln!(f, "{}", "=".repeat(67))?;
        writeln!(f, "--- {}\tprevious", self.label)?;
        writeln!(f, "+++ {}\tcurrent", self.label)?;
        for hunk in &self.hunks {
            writeln!(
                f,
                "@@ -{},{} +{},{} @@",
                hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
            )?;
            for line in &hunk.lines {
                let marker = match line.kind {
                    OpKind::Equal => ' ',
                    OpKind::Delete => '-',
                    OpKind::Insert => '+',
                };
                writeln!(f, "{}{}", marker, line.text)?;
            }
        }
        Ok(())
    }
}

/// Diff two payloads
///
/// Returns `None` exactly when both render to byte-identical text, which is
/// also exactly when their fingerprints match.
///
/// # Examples
///
/// ```
/// use casewatch_diff::diff;
/// use casewatch_domain::SourcePayload;
/// use serde_json::json;
///
/// let old = SourcePayload::Present(json!({"status": "pending"}));
/// let new = SourcePayload::Present(json!({"status": "approved"}));
/// let patch = diff("Case Status", &old, &new).unwrap().to_string();
/// assert!(patch.contains("-  \"status\": \"pending\""));
/// assert!(patch.contains("+  \"status\": \"approved\""));
/// ```
pub fn diff(label: &str, old: &SourcePayload, new: &SourcePayload) -> Option<UnifiedDiff> {
    let old_text = render(old);
    let new_text = render(new);
    if old_text == new_text {
        return None;
    }

    let ops = line_ops(&old_text, &new_text);
    let hunks = build_hunks(&ops, CONTEXT_LINES);
    Some(UnifiedDiff {
        label: label.to_string(),
        ops,
        hunks,
    })
}

/// Side-by-side rows for two payloads, whether or not they differ
pub fn side_by_side(old: &SourcePayload, new: &SourcePayload) -> Vec<LinePair> {
    pair_lines(&line_ops(&render(old), &render(new)))
}

/// Line edit script, with each replaced region's deletions ahead of its insertions
fn line_ops(old_text: &str, new_text: &str) -> Vec<LineOp> {
    let old: Vec<&str> = old_text.lines().collect();
    let new: Vec<&str> = new_text.lines().collect();

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut ops: Vec<LineOp> = old[..prefix].iter().map(|l| op(OpKind::Equal, l)).collect();
    let mut middle = Vec::new();
    edit_script(
        &old[prefix..old.len() - suffix],
        &new[prefix..new.len() - suffix],
        MAX_TABLE_CELLS,
        &mut middle,
    );
    ops.extend(normalize(middle));
    ops.extend(old[old.len() - suffix..].iter().map(|l| op(OpKind::Equal, l)));
    ops
}

fn op(kind: OpKind, text: &str) -> LineOp {
    LineOp {
        kind,
        text: text.to_string(),
    }
}

/// Largest LCS table built in one piece; bigger regions are split first
const MAX_TABLE_CELLS: usize = 1 << 22;

/// Edit script for a changed region in memory linear in its size
///
/// Regions whose full table would exceed `max_cells` are cut in half on the
/// old side at the column where forward and backward LCS lengths peak
/// (Hirschberg), and each half is solved on its own.
fn edit_script(old: &[&str], new: &[&str], max_cells: usize, ops: &mut Vec<LineOp>) {
    if old.is_empty() || new.is_empty() || old.len() == 1 || (old.len() + 1) * (new.len() + 1) <= max_cells {
        ops.extend(lcs_ops(old, new));
        return;
    }

    let mid = old.len() / 2;
    let forward = lcs_lengths(old[..mid].iter().copied(), new.iter().copied(), new.len());
    let backward = lcs_lengths(old[mid..].iter().rev().copied(), new.iter().rev().copied(), new.len());
    let split = (0..=new.len())
        .max_by_key(|&j| forward[j] + backward[new.len() - j])
        .unwrap_or(0);

    edit_script(&old[..mid], &new[..split], max_cells, ops);
    edit_script(&old[mid..], &new[split..], max_cells, ops);
}

/// Last row of the LCS table: entry `j` is the LCS length of `old` and the first `j` of `new`
fn lcs_lengths<'a, 'b, I, J>(old: I, new: J, new_len: usize) -> Vec<u32>
where
    I: Iterator<Item = &'a str>,
    J: Iterator<Item = &'b str> + Clone,
{
    let mut prev = vec![0u32; new_len + 1];
    let mut cur = vec![0u32; new_len + 1];
    for a in old {
        for (j, b) in new.clone().enumerate() {
            cur[j + 1] = if a == b { prev[j] + 1 } else { prev[j + 1].max(cur[j]) };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev
}

/// Longest-common-subsequence edit script
fn lcs_ops(old: &[&str], new: &[&str]) -> Vec<LineOp> {
    let (n, m) = (old.len(), new.len());
    let width = m + 1;
    // table[i * width + j] = LCS length of old[i..] and new[j..]
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if old[i] == new[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(op(OpKind::Equal, old[i]));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            ops.push(op(OpKind::Delete, old[i]));
            i += 1;
        } else {
            ops.push(op(OpKind::Insert, new[j]));
            j += 1;
        }
    }
    ops.extend(old[i..].iter().map(|l| op(OpKind::Delete, l)));
    ops.extend(new[j..].iter().map(|l| op(OpKind::Insert, l)));
    ops
}

/// Within every run of non-equal lines, move deletions ahead of insertions
fn normalize(ops: Vec<LineOp>) -> Vec<LineOp> {
    let mut out = Vec::with_capacity(ops.len());
    let mut removed = Vec::new();
    let mut added = Vec::new();
    for line in ops {
        match line.kind {
            OpKind::Equal => {
                out.append(&mut removed);
                out.append(&mut added);
                out.push(line);
            }
            OpKind::Delete => removed.push(line),
            OpKind::Insert => added.push(line),
        }
    }
    out.append(&mut removed);
    out.append(&mut added);
    out
}

fn build_hunks(ops: &[LineOp], context: usize) -> Vec<Hunk> {
    // Old/new lines consumed before each op
    let mut old_pos = Vec::with_capacity(ops.len());
    let mut new_pos = Vec::with_capacity(ops.len());
    let (mut o, mut n) = (0, 0);
    for line in ops {
        old_pos.push(o);
        new_pos.push(n);
        match line.kind {
            OpKind::Equal => {
                o += 1;
                n += 1;
            }
            OpKind::Delete => o += 1,
            OpKind::Insert => n += 1,
        }
    }

    let changes: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, line)| line.kind != OpKind::Equal)
        .map(|(idx, _)| idx)
        .collect();
    let Some((&first, rest)) = changes.split_first() else {
        return Vec::new();
    };

    let mut groups = Vec::new();
    let (mut start, mut end) = (first, first);
    for &idx in rest {
        if idx - end - 1 <= 2 * context {
            end = idx;
        } else {
            groups.push((start, end));
            start = idx;
            end = idx;
        }
    }
    groups.push((start, end));

    groups
        .into_iter()
        .map(|(start, end)| {
            let lo = start.saturating_sub(context);
            let hi = (end + context).min(ops.len() - 1);
            let lines = ops[lo..=hi].to_vec();
            let old_count = lines.iter().filter(|l| l.kind != OpKind::Insert).count();
            let new_count = lines.iter().filter(|l| l.kind != OpKind::Delete).count();
            Hunk {
                old_start: if old_count == 0 { old_pos[lo] } else { old_pos[lo] + 1 },
                old_count,
                new_start: if new_count == 0 { new_pos[lo] } else { new_pos[lo] + 1 },
                new_count,
                lines,
            }
        })
        .collect()
}

/// Pair removed and added blocks into side-by-side rows
fn pair_lines(ops: &[LineOp]) -> Vec<LinePair> {
    let mut pairs = Vec::with_capacity(ops.len());
    let mut i = 0;
    while i < ops.len() {
        match ops[i].kind {
            OpKind::Equal => {
                pairs.push(LinePair {
                    left: Some(ops[i].text.clone()),
                    right: Some(ops[i].text.clone()),
                    tag: LineTag::Unchanged,
                });
                i += 1;
            }
            OpKind::Delete => {
                let removed = run(ops, i, OpKind::Delete);
                i += removed.len();
                let added = run(ops, i, OpKind::Insert);
                i += added.len();

                if added.is_empty() {
                    pairs.extend(removed.iter().map(|l| LinePair {
                        left: Some(l.text.clone()),
                        right: None,
                        tag: LineTag::Removed,
                    }));
                } else {
                    let rows = removed.len().max(added.len());
                    pairs.extend((0..rows).map(|row| LinePair {
                        left: removed.get(row).map(|l| l.text.clone()),
                        right: added.get(row).map(|l| l.text.clone()),
                        tag: LineTag::Changed,
                    }));
                }
            }
            OpKind::Insert => {
                let added = run(ops, i, OpKind::Insert);
                i += added.len();
                pairs.extend(added.iter().map(|l| LinePair {
                    left: None,
                    right: Some(l.text.clone()),
                    tag: LineTag::Added,
                }));
            }
        }
    }
    pairs
}

fn run(ops: &[LineOp], from: usize, kind: OpKind) -> &[LineOp] {
    let len = ops[from..].iter().take_while(|l| l.kind == kind).count();
    &ops[from..from + len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn present(value: Value) -> SourcePayload {
        SourcePayload::Present(value)
    }

    fn ops_of(kinds: &[(OpKind, &str)]) -> Vec<LineOp> {
        kinds.iter().map(|(k, t)| op(*k, t)).collect()
    }

    #[test]
    fn test_identical_objects_have_no_diff() {
        let obj = present(json!({"a": 1, "b": "hello"}));
        assert!(diff("test", &obj, &obj).is_none());
    }

    #[test]
    fn test_different_objects_produce_patch() {
        let old = present(json!({"status": "pending", "date": "2026-01-01"}));
        let new = present(json!({"status": "approved", "date": "2026-02-20"}));
        let patch = diff("Case", &old, &new).unwrap().to_string();

        assert!(patch.contains("pending"));
        assert!(patch.contains("approved"));
        assert!(patch.contains("--- Case\tprevious"));
        assert!(patch.contains("+++ Case\tcurrent"));
    }

    #[test]
    fn test_nested_key_order_ignored() {
        let a = present(serde_json::from_str(r#"{"outer":{"b":2,"a":1},"name":"test"}"#).unwrap());
        let b = present(serde_json::from_str(r#"{"name":"test","outer":{"a":1,"b":2}}"#).unwrap());
        assert!(diff("test", &a, &b).is_none());
    }

    #[test]
    fn test_value_change_with_reordered_keys() {
        let a = present(serde_json::from_str(r#"{"statusTitle":"Old Title","code":"IAF"}"#).unwrap());
        let b = present(serde_json::from_str(r#"{"code":"IAF","statusTitle":"New Title"}"#).unwrap());
        let d = diff("test", &a, &b).unwrap();
        let patch = d.to_string();
        assert!(patch.contains("Old Title"));
        assert!(patch.contains("New Title"));
        assert_eq!(d.added_count(), 1);
        assert_eq!(d.removed_count(), 1);
    }

    #[test]
    fn test_exact_patch_text() {
        let old = present(json!({"a": 1, "b": 2}));
        let new = present(json!({"a": 1, "b": 3}));
        let patch = diff("S", &old, &new).unwrap().to_string();
        let expected = "Index: S\n\
            ===================================================================\n\
            --- S\tprevious\n\
            +++ S\tcurrent\n\
            @@ -1,4 +1,4 @@\n \
            {\n   \"a\": 1,\n-  \"b\": 2\n+  \"b\": 3\n \
            }\n";
        assert_eq!(patch, expected);
    }

    #[test]
    fn test_absent_to_present_is_all_additions() {
        let d = diff("S", &SourcePayload::Absent, &present(json!({"a": 1}))).unwrap();
        assert_eq!(d.removed_count(), 0);
        assert_eq!(d.added_count(), 3);
        let hunk = &d.hunks()[0];
        assert_eq!((hunk.old_start, hunk.old_count), (0, 0));
        assert_eq!((hunk.new_start, hunk.new_count), (1, 3));
    }

    #[test]
    fn test_null_and_absent_differ() {
        let d = diff("S", &present(Value::Null), &SourcePayload::Absent).unwrap();
        assert_eq!(d.removed_count(), 1);
        assert_eq!(d.added_count(), 0);
    }

    #[test]
    fn test_far_apart_changes_split_into_hunks() {
        let old: Vec<i64> = (0..30).collect();
        let mut new = old.clone();
        new[1] = 100;
        new[28] = 200;
        let d = diff("S", &present(json!(old)), &present(json!(new))).unwrap();
        assert_eq!(d.hunks().len(), 2);

        let mut close = old.clone();
        close[5] = 100;
        close[10] = 200;
        let d = diff("S", &present(json!(old)), &present(json!(close))).unwrap();
        assert_eq!(d.hunks().len(), 1);
    }

    #[test]
    fn test_hunk_counts_match_lines() {
        let old = present(json!({"k": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]}));
        let new = present(json!({"k": [1, 2, 3, 4, 50, 6, 7, 8, 9, 10], "z": true}));
        let d = diff("S", &old, &new).unwrap();
        for hunk in d.hunks() {
            let old_lines = hunk.lines.iter().filter(|l| l.kind != OpKind::Insert).count();
            let new_lines = hunk.lines.iter().filter(|l| l.kind != OpKind::Delete).count();
            assert_eq!(hunk.old_count, old_lines);
            assert_eq!(hunk.new_count, new_lines);
        }
    }

    #[test]
    fn test_deletions_precede_insertions() {
        let ops = normalize(ops_of(&[
            (OpKind::Insert, "x"),
            (OpKind::Delete, "a"),
            (OpKind::Equal, "="),
            (OpKind::Insert, "y"),
        ]));
        let kinds: Vec<OpKind> = ops.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![OpKind::Delete, OpKind::Insert, OpKind::Equal, OpKind::Insert]
        );
    }

    #[test]
    fn test_pairing_changed_block_uneven() {
        let pairs = pair_lines(&ops_of(&[
            (OpKind::Equal, "{"),
            (OpKind::Delete, "a"),
            (OpKind::Delete, "b"),
            (OpKind::Insert, "c"),
            (OpKind::Equal, "}"),
        ]));
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0].tag, LineTag::Unchanged);
        assert_eq!(pairs[1], LinePair { left: Some("a".into()), right: Some("c".into()), tag: LineTag::Changed });
        assert_eq!(pairs[2], LinePair { left: Some("b".into()), right: None, tag: LineTag::Changed });
        assert_eq!(pairs[3].left.as_deref(), Some("}"));
    }

    #[test]
    fn test_pairing_lone_blocks() {
        let pairs = pair_lines(&ops_of(&[
            (OpKind::Delete, "gone"),
            (OpKind::Equal, "same"),
            (OpKind::Insert, "new1"),
            (OpKind::Insert, "new2"),
        ]));
        let tags: Vec<LineTag> = pairs.iter().map(|p| p.tag).collect();
        assert_eq!(
            tags,
            vec![LineTag::Removed, LineTag::Unchanged, LineTag::Added, LineTag::Added]
        );
        assert_eq!(pairs[0].right, None);
        assert_eq!(pairs[2].left, None);
    }

    #[test]
    fn test_side_by_side_for_equal_payloads() {
        let v = present(json!({"a": 1}));
        let rows = side_by_side(&v, &v);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.tag == LineTag::Unchanged && r.left == r.right));
    }

    #[test]
    fn test_side_by_side_matches_diff_rows() {
        let old = present(json!({"status": "pending", "date": "2026-01-01"}));
        let new = present(json!({"status": "approved", "date": "2026-01-01"}));
        let d = diff("S", &old, &new).unwrap();
        assert_eq!(d.side_by_side(), side_by_side(&old, &new));
        let rows = d.side_by_side();
        let changed: Vec<&LinePair> = rows.iter().filter(|p| p.tag == LineTag::Changed).collect();
        assert_eq!(changed.len(), 1);
        assert!(changed[0].left.as_deref().unwrap().contains("pending"));
        assert!(changed[0].right.as_deref().unwrap().contains("approved"));
    }

    fn sides(ops: &[LineOp]) -> (Vec<&str>, Vec<&str>) {
        let old = ops.iter().filter(|o| o.kind != OpKind::Insert).map(|o| o.text.as_str()).collect();
        let new = ops.iter().filter(|o| o.kind != OpKind::Delete).map(|o| o.text.as_str()).collect();
        (old, new)
    }

    #[test]
    fn test_split_script_keeps_lcs_length() {
        let old: Vec<&str> = "a b c d e f a b c g h i j".split(' ').collect();
        let new: Vec<&str> = "b c x d f a z c g i k j a".split(' ').collect();

        let whole = lcs_ops(&old, &new);
        let mut split = Vec::new();
        edit_script(&old, &new, 8, &mut split);

        let equal = |ops: &[LineOp]| ops.iter().filter(|o| o.kind == OpKind::Equal).count();
        assert_eq!(equal(&split), equal(&whole));
        assert_eq!(sides(&split), (old, new));
    }

    #[test]
    fn test_large_rewrite_uses_bounded_table() {
        let old_items: Vec<String> = (0..3000).map(|i| format!("old-{}", i)).collect();
        let new_items: Vec<String> = (0..3000).map(|i| format!("new-{}", i)).collect();
        let old = present(json!({"events": old_items}));
        let new = present(json!({"events": new_items}));

        let d = diff("Case Details", &old, &new).unwrap();
        assert_eq!(d.removed_count(), 3000);
        assert_eq!(d.added_count(), 3000);

        let (left, right) = sides(d.ops());
        assert_eq!(left.join("\n") + "\n", render(&old));
        assert_eq!(right.join("\n") + "\n", render(&new));
    }
}
