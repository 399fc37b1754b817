//! Best-effort extraction of annotations from comment lines

use crate::canvas::Coordinate;

const METADATA_PREFIX: &str = "# Metadata:";

/// What a single comment line turned out to contain
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum CommentLine<'l> {
    /// A well-formed `# Metadata: (<x>, <y>) <text>` line
    Annotation(Coordinate, &'l str),
    /// A line shaped like an annotation whose coordinates could not be parsed
    Malformed,
    /// Any other comment, e.g. the banner
    Other,
}

/// Classify a single comment line without its line terminator.
///
/// The text after `# Metadata:` is split into at most three space separated parts.
/// The first one is expected to look like `(<x>,` and the second one like `<y>)`.
/// Everything after the second space belongs to the annotation text verbatim, including any leading or
/// trailing whitespace.
pub(crate) fn parse_comment_line(line: &[u8]) -> CommentLine<'_> {
    let Ok(line) = std::str::from_utf8(line) else {
        return CommentLine::Malformed;
    };
    let Some(body) = line.strip_prefix(METADATA_PREFIX) else {
        return CommentLine::Other;
    };

    let mut parts = body.trim_start().splitn(3, ' ');
    let (Some(x_part), Some(y_part), Some(text)) = (parts.next(), parts.next(), parts.next()) else {
        return CommentLine::Other;
    };
    if !x_part.starts_with('(') || !y_part.ends_with(')') {
        return CommentLine::Other;
    }

    let x = x_part
        .split(',')
        .next()
        .unwrap_or_default()
        .trim_start_matches('(');
    let y = y_part.trim_end_matches(')');
    match (x.parse(), y.parse()) {
        (Ok(x), Ok(y)) if !text.is_empty() => CommentLine::Annotation(Coordinate::new(x, y), text),
        (_, _) => CommentLine::Malformed,
    }
}
