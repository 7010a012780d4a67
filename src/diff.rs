//! Unified diff generation and terminal rendering.
//!
//! Output follows the classic `---`/`+++`/`@@` layout with three lines of
//! context. Lines keep their original endings; a line without a trailing
//! newline stays that way in the generated diff.

use owo_colors::OwoColorize;
use std::collections::HashSet;
use std::ops::{Index, IndexMut};

/// Lines of unchanged context around each change.
const CONTEXT: usize = 3;

/// Presentational category of a diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineKind {
    Header,
    Hunk,
    Deletion,
    Addition,
    Context,
}

/// Result of comparing two texts for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiff {
    pub changed: bool,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Equal,
    Change,
}

/// A run of lines: `old[i1..i2]` corresponds to `new[j1..j2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Opcode {
    tag: Tag,
    i1: usize,
    i2: usize,
    j1: usize,
    j2: usize,
}

/// Generate a unified diff between `old` and `new`. Empty when they are equal.
pub fn generate_diff(old: &str, new: &str, old_label: &str, new_label: &str) -> Vec<String> {
    if old == new {
        return Vec::new();
    }
    let a: Vec<&str> = old.split_inclusive('\n').collect();
    let b: Vec<&str> = new.split_inclusive('\n').collect();

    let groups = grouped_opcodes(&opcodes(&a, &b), CONTEXT);
    if groups.is_empty() {
        return Vec::new();
    }

    let mut out = vec![format!("--- {}\n", old_label), format!("+++ {}\n", new_label)];
    for group in groups {
        let (first, last) = (group[0], group[group.len() - 1]);
        out.push(format!(
            "@@ -{} +{} @@\n",
            format_range(first.i1, last.i2),
            format_range(first.j1, last.j2)
        ));
        for code in group {
            match code.tag {
                Tag::Equal => out.extend(a[code.i1..code.i2].iter().map(|l| format!(" {}", l))),
                Tag::Change => {
                    out.extend(a[code.i1..code.i2].iter().map(|l| format!("-{}", l)));
                    out.extend(b[code.j1..code.j2].iter().map(|l| format!("+{}", l)));
                }
            }
        }
    }
    out
}

/// Compute equal/change runs from a minimal edit script.
///
/// Lines that occur on only one side can never match, so they are marked
/// changed up front and the Myers search runs on what remains.
fn opcodes(a: &[&str], b: &[&str]) -> Vec<Opcode> {
    let in_a: HashSet<&str> = a.iter().copied().collect();
    let in_b: HashSet<&str> = b.iter().copied().collect();
    let old_idx: Vec<usize> = (0..a.len()).filter(|&i| in_b.contains(a[i])).collect();
    let new_idx: Vec<usize> = (0..b.len()).filter(|&j| in_a.contains(b[j])).collect();
    let old: Vec<&str> = old_idx.iter().map(|&i| a[i]).collect();
    let new: Vec<&str> = new_idx.iter().map(|&j| b[j]).collect();

    let mut kept_a = vec![false; a.len()];
    let mut kept_b = vec![false; b.len()];
    for (x, y) in Myers::matches(&old, &new) {
        kept_a[old_idx[x]] = true;
        kept_b[new_idx[y]] = true;
    }

    let mut codes: Vec<Opcode> = Vec::new();
    let mut push = |tag: Tag, i: usize, j: usize, di: usize, dj: usize| match codes.last_mut() {
        Some(last) if last.tag == tag => {
            last.i2 += di;
            last.j2 += dj;
        }
        _ => codes.push(Opcode {
            tag,
            i1: i,
            i2: i + di,
            j1: j,
            j2: j + dj,
        }),
    };

    // Kept lines pair up in order, so both cursors reach them together.
    let (n, m) = (a.len(), b.len());
    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && !kept_a[i] {
            push(Tag::Change, i, j, 1, 0);
            i += 1;
        } else if j < m && !kept_b[j] {
            push(Tag::Change, i, j, 0, 1);
            j += 1;
        } else {
            push(Tag::Equal, i, j, 1, 1);
            i += 1;
            j += 1;
        }
    }
    codes
}

/// Furthest-reaching x per diagonal `k`, indexed from `-max_d` to `max_d`.
struct Frontier {
    offset: isize,
    v: Vec<usize>,
}

impl Frontier {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d + 1],
        }
    }
}

impl Index<isize> for Frontier {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Frontier {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

/// Linear-space Myers diff (divide and conquer on the middle snake).
struct Myers<'s, 'a> {
    old: &'s [&'a str],
    new: &'s [&'a str],
    vf: Frontier,
    vb: Frontier,
    matches: Vec<(usize, usize)>,
}

impl<'s, 'a> Myers<'s, 'a> {
    /// Matched `(old, new)` index pairs of a longest common subsequence, in order.
    fn matches(old: &'s [&'a str], new: &'s [&'a str]) -> Vec<(usize, usize)> {
        let max_d = max_d(old.len(), new.len());
        let mut myers = Myers {
            old,
            new,
            vf: Frontier::new(max_d),
            vb: Frontier::new(max_d),
            matches: Vec::new(),
        };
        myers.conquer(0, old.len(), 0, new.len());
        myers.matches
    }

    fn equal(&mut self, old_start: usize, new_start: usize, len: usize) {
        self.matches
            .extend((0..len).map(|t| (old_start + t, new_start + t)));
    }

    fn conquer(&mut self, mut o1: usize, mut o2: usize, mut n1: usize, mut n2: usize) {
        let prefix = self.old[o1..o2]
            .iter()
            .zip(&self.new[n1..n2])
            .take_while(|(x, y)| x == y)
            .count();
        self.equal(o1, n1, prefix);
        o1 += prefix;
        n1 += prefix;

        let suffix = self.old[o1..o2]
            .iter()
            .rev()
            .zip(self.new[n1..n2].iter().rev())
            .take_while(|(x, y)| x == y)
            .count();
        o2 -= suffix;
        n2 -= suffix;

        if o1 < o2 && n1 < n2 {
            // A split that is not strictly inside the box is treated as one change block.
            if let Some((x, y)) = self.middle_snake(o1, o2, n1, n2) {
                let inside = (o1..=o2).contains(&x) && (n1..=n2).contains(&y);
                if inside && (x, y) != (o1, n1) && (x, y) != (o2, n2) {
                    self.conquer(o1, x, n1, y);
                    self.conquer(x, o2, y, n2);
                }
            }
        }
        self.equal(o2, n2, suffix);
    }

    /// Start of a snake on some shortest edit path through the box.
    fn middle_snake(&mut self, o1: usize, o2: usize, n1: usize, n2: usize) -> Option<(usize, usize)> {
        let (n, m) = (o2 - o1, n2 - n1);
        let delta = n as isize - m as isize;
        let odd = delta & 1 == 1;
        self.vf[1] = 0;
        self.vb[1] = 0;

        for d in 0..max_d(n, m) as isize {
            for k in (-d..=d).rev().step_by(2) {
                let mut x = if k == -d || (k != d && self.vf[k - 1] < self.vf[k + 1]) {
                    self.vf[k + 1]
                } else {
                    self.vf[k - 1] + 1
                };
                let mut y = (x as isize - k) as usize;
                let (x0, y0) = (x, y);
                while x < n && y < m && self.old[o1 + x] == self.new[n1 + y] {
                    x += 1;
                    y += 1;
                }
                self.vf[k] = x;
                if odd && (k - delta).abs() < d && x + self.vb[-(k - delta)] >= n {
                    return Some((o1 + x0, n1 + y0));
                }
            }

            for k in (-d..=d).rev().step_by(2) {
                let mut x = if k == -d || (k != d && self.vb[k - 1] < self.vb[k + 1]) {
                    self.vb[k + 1]
                } else {
                    self.vb[k - 1] + 1
                };
                let mut y = (x as isize - k) as usize;
                while x < n && y < m && self.old[o1 + n - x - 1] == self.new[n1 + m - y - 1] {
                    x += 1;
                    y += 1;
                }
                self.vb[k] = x;
                if !odd && (k - delta).abs() <= d && x + self.vf[-(k - delta)] >= n {
                    if x > n || y > m {
                        return None;
                    }
                    return Some((o1 + n - x, n1 + m - y));
                }
            }
        }
        None
    }
}

/// Split opcodes into hunks with at most `n` lines of context on each side.
fn grouped_opcodes(codes: &[Opcode], n: usize) -> Vec<Vec<Opcode>> {
    if codes.iter().all(|c| c.tag == Tag::Equal) {
        return Vec::new();
    }
    let mut codes = codes.to_vec();
    if let Some(first) = codes.first_mut() {
        if first.tag == Tag::Equal {
            first.i1 = first.i1.max(first.i2.saturating_sub(n));
            first.j1 = first.j1.max(first.j2.saturating_sub(n));
        }
    }
    if let Some(last) = codes.last_mut() {
        if last.tag == Tag::Equal {
            last.i2 = last.i2.min(last.i1 + n);
            last.j2 = last.j2.min(last.j1 + n);
        }
    }

    let mut groups = Vec::new();
    let mut group = Vec::new();
    for code in codes {
        if code.tag == Tag::Equal && code.i2 - code.i1 > 2 * n {
            group.push(Opcode {
                i2: code.i2.min(code.i1 + n),
                j2: code.j2.min(code.j1 + n),
                ..code
            });
            groups.push(std::mem::take(&mut group));
            group.push(Opcode {
                i1: code.i1.max(code.i2 - n),
                j1: code.j1.max(code.j2 - n),
                ..code
            });
            continue;
        }
        group.push(code);
    }
    if !(group.is_empty() || (group.len() == 1 && group[0].tag == Tag::Equal)) {
        groups.push(group);
    }
    groups.retain(|g| g.iter().any(|c| c.tag == Tag::Change));
    groups
}

/// `start,len` in the 1-based form used by hunk headers.
fn format_range(start: usize, stop: usize) -> String {
    let length = stop - start;
    match length {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

/// Category of a single line taken out of context.
pub fn classify_line(line: &str) -> DiffLineKind {
    if line.starts_with("---") || line.starts_with("+++") {
        DiffLineKind::Header
    } else if line.starts_with("@@") {
        DiffLineKind::Hunk
    } else if line.starts_with('-') {
        DiffLineKind::Deletion
    } else if line.starts_with('+') {
        DiffLineKind::Addition
    } else {
        DiffLineKind::Context
    }
}

/// Classify every line of a generated diff.
///
/// Only lines before the first hunk marker are headers, so a removed line
/// whose text starts with `--` is still a deletion.
pub fn classify_diff(lines: &[String]) -> Vec<DiffLineKind> {
    let mut in_header = true;
    lines
        .iter()
        .map(|line| {
            let kind = classify_line(line);
            if kind == DiffLineKind::Hunk {
                in_header = false;
            }
            match kind {
                DiffLineKind::Header if !in_header => {
                    if line.starts_with('-') {
                        DiffLineKind::Deletion
                    } else {
                        DiffLineKind::Addition
                    }
                }
                other => other,
            }
        })
        .collect()
}

/// Join diff lines for the terminal, optionally colored by category.
pub fn render_diff(lines: &[String], color: bool) -> String {
    let mut out = String::new();
    for (line, kind) in lines.iter().zip(classify_diff(lines)) {
        let body = line.strip_suffix('\n').unwrap_or(line);
        if color {
            let styled = match kind {
                DiffLineKind::Header => body.bold().to_string(),
                DiffLineKind::Hunk => body.cyan().to_string(),
                DiffLineKind::Deletion => body.red().to_string(),
                DiffLineKind::Addition => body.green().to_string(),
                DiffLineKind::Context => body.to_string(),
            };
            out.push_str(&styled);
        } else {
            out.push_str(body);
        }
        out.push('\n');
    }
    out
}

/// Diff a local file against its remote copy, labeled `local/<file>` and `remote/<file>`.
pub fn show_diff(local: &str, remote: &str, filename: &str, color: bool) -> RenderedDiff {
    let lines = generate_diff(
        local,
        remote,
        &format!("local/{}", filename),
        &format!("remote/{}", filename),
    );
    RenderedDiff {
        changed: !lines.is_empty(),
        text: render_diff(&lines, color),
    }
}
