//! # Patches
//!
//! A note's content is never stored directly. Each edit is recorded as a
//! unified diff against the previous content, and the current text is the
//! left fold of those diffs over the empty string (see [`reconstruct`]).
//!
//! ## Format
//!
//! ```text
//! --- a
//! +++ b
//! @@ -1,2 +1,2 @@
//!  unchanged line
//! -removed line
//! +added line
//! \ No newline at end of file
//! ```
//!
//! - Lines outside a hunk (file headers, `Index:` banners) are ignored.
//! - Hunk bodies are consumed by the counts in their header, so a body line
//!   such as `---` is never mistaken for a header.
//! - `\ No newline at end of file` strips the line terminator from the body
//!   line right before it.
//! - Hunks must apply exactly at their stated position; there is no fuzzy
//!   matching. Reconstruction has to be deterministic, and a patch that only
//!   applies "somewhere nearby" is a patch against different content.
//!
//! [`make_patch`] produces patches in this format using `similar`.

use similar::TextDiff;
use thiserror::Error;

const NO_NEWLINE_MARKER: char = '\\';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("malformed hunk header: {0:?}")]
    BadHeader(String),

    #[error("unexpected line in hunk {hunk}: {line:?}")]
    BadLine { hunk: usize, line: String },

    #[error("hunk {0} is shorter than its header declares")]
    Truncated(usize),

    #[error("hunk {hunk} does not match the content at line {line}")]
    Mismatch { hunk: usize, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HunkLine {
    Context(String),
    Delete(String),
    Insert(String),
}

impl HunkLine {
    fn text_mut(&mut self) -> &mut String {
        match self {
            HunkLine::Context(t) | HunkLine::Delete(t) | HunkLine::Insert(t) => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Hunk {
    old_start: usize,
    old_len: usize,
    lines: Vec<HunkLine>,
}

impl Hunk {
    /// Index into the old line list where this hunk begins. A pure insertion
    /// (`-k,0`) goes after line `k`.
    fn start_index(&self) -> usize {
        if self.old_len == 0 {
            self.old_start
        } else {
            self.old_start.saturating_sub(1)
        }
    }

    fn old_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            HunkLine::Context(t) | HunkLine::Delete(t) => Some(t.as_str()),
            HunkLine::Insert(_) => None,
        })
    }

    fn new_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            HunkLine::Context(t) | HunkLine::Insert(t) => Some(t.as_str()),
            HunkLine::Delete(_) => None,
        })
    }
}

/// Builds a patch that turns `old` into `new`. Identical inputs give an
/// empty patch.
pub fn make_patch(old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header("a", "b")
        .to_string()
}

/// Applies `patch` to `base`. An empty patch (or one with no hunks) returns
/// `base` unchanged.
pub fn apply(base: &str, patch: &str) -> Result<String, PatchError> {
    let hunks = parse(patch)?;
    if hunks.is_empty() {
        return Ok(base.to_string());
    }

    let old: Vec<&str> = base.split_inclusive('\n').collect();
    let mut out = String::with_capacity(base.len() + patch.len());
    let mut cursor = 0;

    for (n, hunk) in hunks.iter().enumerate() {
        let start = hunk.start_index();
        let mismatch = PatchError::Mismatch {
            hunk: n + 1,
            line: hunk.old_start,
        };
        // header offsets come from the caller and may be arbitrarily large
        let end = match start.checked_add(hunk.old_len) {
            Some(end) if start >= cursor && end <= old.len() => end,
            _ => return Err(mismatch),
        };
        if !hunk.old_lines().eq(old[start..end].iter().copied()) {
            return Err(mismatch);
        }

        old[cursor..start].iter().for_each(|l| out.push_str(l));
        hunk.new_lines().for_each(|l| out.push_str(l));
        cursor = end;
    }

    old[cursor..].iter().for_each(|l| out.push_str(l));
    Ok(out)
}

/// Folds `patches` left to right over the empty string.
pub fn reconstruct<I, P>(patches: I) -> Result<String, PatchError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    patches
        .into_iter()
        .try_fold(String::new(), |content, patch| apply(&content, patch.as_ref()))
}

fn parse(patch: &str) -> Result<Vec<Hunk>, PatchError> {
    let mut hunks = Vec::new();
    let mut lines = patch.split_inclusive('\n').peekable();

    while let Some(line) = lines.next() {
        if !line.starts_with("@@") {
            continue;
        }
        let number = hunks.len() + 1;
        let (old_start, mut old_left, mut new_left) = parse_header(line)?;
        let mut body: Vec<HunkLine> = Vec::new();

        while old_left > 0 || new_left > 0 {
            let raw = lines.next().ok_or(PatchError::Truncated(number))?;
            if raw.starts_with(NO_NEWLINE_MARKER) {
                strip_terminator(&mut body);
                continue;
            }
            let (tag, text) = split_tag(raw);
            let entry = match tag {
                ' ' if old_left > 0 && new_left > 0 => {
                    old_left -= 1;
                    new_left -= 1;
                    HunkLine::Context(text)
                }
                '-' if old_left > 0 => {
                    old_left -= 1;
                    HunkLine::Delete(text)
                }
                '+' if new_left > 0 => {
                    new_left -= 1;
                    HunkLine::Insert(text)
                }
                _ => {
                    return Err(PatchError::BadLine {
                        hunk: number,
                        line: raw.to_string(),
                    })
                }
            };
            body.push(entry);
        }

        if lines
            .peek()
            .is_some_and(|next| next.starts_with(NO_NEWLINE_MARKER))
        {
            lines.next();
            strip_terminator(&mut body);
        }

        let old_len = body
            .iter()
            .filter(|l| !matches!(l, HunkLine::Insert(_)))
            .count();
        hunks.push(Hunk {
            old_start,
            old_len,
            lines: body,
        });
    }

    Ok(hunks)
}

/// Parses `@@ -a[,b] +c[,d] @@ ...` into `(a, b, d)`.
fn parse_header(line: &str) -> Result<(usize, usize, usize), PatchError> {
    let bad = || PatchError::BadHeader(line.trim_end().to_string());
    let inner = line
        .strip_prefix("@@ ")
        .and_then(|rest| rest.split(" @@").next())
        .ok_or_else(bad)?;
    let mut parts = inner.split_whitespace();
    let old = parts
        .next()
        .and_then(|p| p.strip_prefix('-'))
        .ok_or_else(bad)?;
    let new = parts
        .next()
        .and_then(|p| p.strip_prefix('+'))
        .ok_or_else(bad)?;
    let (old_start, old_len) = parse_range(old).ok_or_else(bad)?;
    let (_, new_len) = parse_range(new).ok_or_else(bad)?;
    Ok((old_start, old_len, new_len))
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

/// Splits a body line into its tag and text. Some tools write an empty
/// context line as a bare newline. The final body line may have lost its
/// terminator along with the end of the patch text; only the marker line can
/// say a line has no newline, so it is restored.
fn split_tag(raw: &str) -> (char, String) {
    let mut chars = raw.chars();
    let (tag, rest) = match chars.next() {
        Some('\n') | None => (' ', "\n"),
        Some('\r') if raw == "\r\n" => (' ', "\r\n"),
        Some(c) => (c, chars.as_str()),
    };
    let mut text = rest.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    (tag, text)
}

fn strip_terminator(body: &mut [HunkLine]) {
    if let Some(last) = body.last_mut() {
        let text = last.text_mut();
        if text.ends_with('\n') {
            text.pop();
        }
    }
}
