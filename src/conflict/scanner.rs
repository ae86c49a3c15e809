use tracing::trace;

/// Line positions of one conflict region within a file.
///
/// All fields are 0-based line indices with
/// `start < ancestor (if any) < target < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// The `<<<<<<<` line
    pub start: usize,
    /// The `|||||||` line opening the common-base section (diff3 style)
    pub ancestor: Option<usize>,
    /// The `=======` line separating the two sides
    pub target: usize,
    /// The `>>>>>>>` line
    pub end: usize,
}

impl Conflict {
    #[must_use]
    pub fn has_ancestor(&self) -> bool {
        self.ancestor.is_some()
    }

    /// Whether line `index` is one of this conflict's marker lines
    #[must_use]
    pub fn is_marker(&self, index: usize) -> bool {
        index == self.start
            || index == self.target
            || index == self.end
            || self.ancestor == Some(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Start,
    Ancestor,
    Target,
    End,
}

fn classify(line: &str) -> Option<Marker> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    // Markers shown inside a combined diff carry a "++" prefix
    let line = line.strip_prefix("++").unwrap_or(line);

    if line.starts_with("<<<<<<< ") {
        Some(Marker::Start)
    } else if line == "|||||||" || line.starts_with("||||||| ") {
        Some(Marker::Ancestor)
    } else if line == "=======" {
        Some(Marker::Target)
    } else if line.starts_with(">>>>>>> ") {
        Some(Marker::End)
    } else {
        None
    }
}

#[derive(Debug)]
struct OpenConflict {
    start: usize,
    ancestor: Option<usize>,
    target: Option<usize>,
}

/// Find every complete conflict region in `content`, in file order.
///
/// Markers that appear out of sequence are ignored rather than producing a
/// malformed region: a closing marker with nothing open, a second opening
/// marker (which restarts the region), or a region closed before its
/// `=======` line.
///
/// # Examples
///
/// ```
/// use git_picker::{Conflict, find_conflicts};
///
/// let conflicts = find_conflicts("<<<<<<< HEAD\nfoo\n=======\nbar\n>>>>>>> branch\n");
/// assert_eq!(
///     conflicts,
///     vec![Conflict { start: 0, ancestor: None, target: 2, end: 4 }]
/// );
/// ```
#[must_use]
pub fn find_conflicts(content: &str) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let mut open: Option<OpenConflict> = None;

    for (index, line) in content.split_terminator('\n').enumerate() {
        let Some(marker) = classify(line) else {
            continue;
        };

        match marker {
            Marker::Start => {
                open = Some(OpenConflict {
                    start: index,
                    ancestor: None,
                    target: None,
                });
            }
            Marker::Ancestor => match open.as_mut() {
                Some(current) if current.ancestor.is_none() && current.target.is_none() => {
                    current.ancestor = Some(index);
                }
                _ => trace!(index, ?marker, "ignoring stray conflict marker"),
            },
            Marker::Target => match open.as_mut() {
                Some(current) if current.target.is_none() => current.target = Some(index),
                _ => trace!(index, ?marker, "ignoring stray conflict marker"),
            },
            Marker::End => match open.take() {
                Some(OpenConflict {
                    start,
                    ancestor,
                    target: Some(target),
                }) => conflicts.push(Conflict {
                    start,
                    ancestor,
                    target,
                    end: index,
                }),
                Some(_) => trace!(index, "closing marker before separator"),
                None => trace!(index, ?marker, "ignoring stray conflict marker"),
            },
        }
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn two_way(start: usize, target: usize, end: usize) -> Conflict {
        Conflict {
            start,
            ancestor: None,
            target,
            end,
        }
    }

    #[test]
    fn single_two_way_conflict() {
        let content = "<<<<<<< HEAD\nfoo\n=======\nbar\n>>>>>>> branch\n";
        assert_eq!(find_conflicts(content), vec![two_way(0, 2, 4)]);
    }

    #[test]
    fn empty_content() {
        assert_eq!(find_conflicts(""), vec![]);
        assert_eq!(find_conflicts("no markers\nat all\n"), vec![]);
    }

    #[test]
    fn multiple_conflicts_with_surrounding_lines() {
        let content = "\
intro
<<<<<<< HEAD
ours
=======
theirs
>>>>>>> feature
middle
<<<<<<< Updated upstream
a
b
=======
c
>>>>>>> Stashed changes
outro
";
        assert_eq!(
            find_conflicts(content),
            vec![two_way(1, 3, 5), two_way(7, 10, 12)]
        );
    }

    #[test]
    fn three_way_conflict_records_ancestor() {
        let content = "\
<<<<<<< HEAD
ours
||||||| merged common ancestors
base
=======
theirs
>>>>>>> branch
";
        assert_eq!(
            find_conflicts(content),
            vec![Conflict {
                start: 0,
                ancestor: Some(2),
                target: 4,
                end: 6,
            }]
        );
    }

    #[test]
    fn markers_inside_combined_diff() {
        let content = "++<<<<<<< HEAD\n+ ours\n++=======\n+ theirs\n++>>>>>>> branch\n";
        assert_eq!(find_conflicts(content), vec![two_way(0, 2, 4)]);
    }

    #[test]
    fn crlf_line_endings() {
        let content = "<<<<<<< HEAD\r\nfoo\r\n=======\r\nbar\r\n>>>>>>> branch\r\n";
        assert_eq!(find_conflicts(content), vec![two_way(0, 2, 4)]);
    }

    #[test]
    fn near_miss_markers_are_content() {
        let content = "<<<<<<<HEAD\n========\n>>>>>>>\n== =====\n";
        assert_eq!(find_conflicts(content), vec![]);
    }

    #[test]
    fn stray_markers_are_ignored() {
        // Closing marker with nothing open
        assert_eq!(find_conflicts(">>>>>>> branch\n=======\n"), vec![]);
        // Closed before any separator
        assert_eq!(find_conflicts("<<<<<<< HEAD\nfoo\n>>>>>>> branch\n"), vec![]);
        // Never closed
        assert_eq!(find_conflicts("<<<<<<< HEAD\nfoo\n=======\nbar\n"), vec![]);
    }

    #[test]
    fn second_start_restarts_region() {
        let content = "\
<<<<<<< HEAD
<<<<<<< HEAD
ours
=======
theirs
>>>>>>> branch
>>>>>>> branch
";
        assert_eq!(find_conflicts(content), vec![two_way(1, 3, 5)]);
    }

    #[test]
    fn repeated_separator_keeps_first() {
        let content = "<<<<<<< HEAD\na\n=======\nb\n=======\nc\n>>>>>>> branch\n";
        assert_eq!(find_conflicts(content), vec![two_way(0, 2, 6)]);
    }
}
