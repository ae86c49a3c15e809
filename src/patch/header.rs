use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{map_res, opt, rest},
    sequence::preceded,
};
use std::fmt;

/// One side of a hunk header, e.g. `136,0` or `137`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRange {
    pub start: u32,
    /// `None` when the count was omitted (git writes `-5` for a one-line range)
    pub count: Option<u32>,
}

impl HunkRange {
    /// Number of lines covered, with an omitted count meaning one line
    #[must_use]
    pub fn len(&self) -> u32 {
        self.count.unwrap_or(1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for HunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            Some(count) => write!(f, "{},{}", self.start, count),
            None => write!(f, "{}", self.start),
        }
    }
}

/// A parsed `@@ -old +new @@ heading` line.
///
/// Rendering a parsed header gives back the original text, so only the
/// fields that were changed differ from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkHeader {
    pub old: HunkRange,
    pub new: HunkRange,
    /// Everything after the closing `@@`, including its leading space
    pub heading: String,
}

impl HunkHeader {
    /// Parse a hunk header line. Returns `None` if the line is not a
    /// well-formed two-way header.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        hunk_header(line).ok().map(|(_, header)| header)
    }
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@@ -{} +{} @@{}", self.old, self.new, self.heading)
    }
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>()).parse(input)
}

fn range(input: &str) -> IResult<&str, HunkRange> {
    (number, opt(preceded(char(','), number)))
        .map(|(start, count)| HunkRange { start, count })
        .parse(input)
}

fn hunk_header(input: &str) -> IResult<&str, HunkHeader> {
    (
        preceded(tag("@@ -"), range),
        preceded(tag(" +"), range),
        preceded(tag(" @@"), rest),
    )
        .map(|(old, new, heading): (HunkRange, HunkRange, &str)| HunkHeader {
            old,
            new,
            heading: heading.to_string(),
        })
        .parse(input)
}
