use super::scanner::Conflict;
use std::fmt;

/// Which region of a conflict to keep when resolving it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Our side, between `<<<<<<<` and the next marker
    Top,
    /// The common base, between `|||||||` and `=======` (three-way only)
    Middle,
    /// Their side, between `=======` and `>>>>>>>`
    Bottom,
    /// Everything inside the conflict, dropping only the markers
    All,
}

const TWO_WAY: &[Selection] = &[Selection::Top, Selection::Bottom];
const THREE_WAY: &[Selection] = &[Selection::Top, Selection::Middle, Selection::Bottom];

impl Selection {
    /// Selections a user can navigate between for `conflict`
    #[must_use]
    pub fn available(conflict: &Conflict) -> &'static [Selection] {
        if conflict.has_ancestor() {
            THREE_WAY
        } else {
            TWO_WAY
        }
    }

    /// Exclusive line bounds `(lo, hi)` of this region: lines strictly
    /// between them belong to it.
    ///
    /// `Middle` on a two-way conflict is an empty region.
    #[must_use]
    pub fn bounds(self, conflict: &Conflict) -> (usize, usize) {
        match self {
            Selection::Top => (
                conflict.start,
                conflict.ancestor.unwrap_or(conflict.target),
            ),
            Selection::Middle => match conflict.ancestor {
                Some(ancestor) => (ancestor, conflict.target),
                None => (conflict.target, conflict.target),
            },
            Selection::Bottom => (conflict.target, conflict.end),
            Selection::All => (conflict.start, conflict.end),
        }
    }

    /// Whether line `index` survives resolving `conflict` with this selection.
    ///
    /// Lines outside the conflict are always kept and marker lines never are.
    #[must_use]
    pub fn is_index_to_keep(self, conflict: &Conflict, index: usize) -> bool {
        if index < conflict.start || index > conflict.end {
            return true;
        }
        if conflict.is_marker(index) {
            return false;
        }

        let (lo, hi) = self.bounds(conflict);
        lo < index && index < hi
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Selection::Top => "top",
            Selection::Middle => "middle",
            Selection::Bottom => "bottom",
            Selection::All => "all",
        };
        f.write_str(name)
    }
}
