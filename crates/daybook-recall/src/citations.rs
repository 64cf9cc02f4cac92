//! Tolerant parsing of the model's self-reported citations.
//!
//! The `CITATIONS:` line is a best-effort contract with an uncontrolled
//! generative model. A missing marker, junk tokens, or out-of-range
//! ordinals all degrade to "fewer citations", never to an error.

use crate::prompt::CITATION_MARKER;

/// Split a model response at the first `CITATIONS:` marker.
///
/// Returns the trimmed answer text and the raw citation segment, if any.
/// Only the first occurrence is honored; anything after a second marker
/// ends up inside the segment and falls out during ordinal parsing.
pub fn split_answer(response: &str) -> (&str, Option<&str>) {
    match response.split_once(CITATION_MARKER) {
        Some((answer, segment)) => (answer.trim(), Some(segment)),
        None => (response.trim(), None),
    }
}

/// Parse 1-based ordinals out of a citation segment, keeping only those
/// within `offered`. Order is preserved; unparseable and out-of-range
/// tokens are dropped silently.
pub fn parse_ordinals(segment: &str, offered: usize) -> Vec<usize> {
    let segment = segment.trim();
    if segment.is_empty() || segment.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    segment
        .split(',')
        .filter_map(|token| token.trim().parse::<usize>().ok())
        .filter(|&n| n >= 1 && n <= offered)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_answer_from_citations() {
        let (answer, segment) = split_answer("The meeting covered X.\nCITATIONS: 1, 3");
        assert_eq!(answer, "The meeting covered X.");
        assert_eq!(segment, Some(" 1, 3"));
    }

    #[test]
    fn missing_marker_keeps_whole_answer() {
        let (answer, segment) = split_answer("  No sources used here.  ");
        assert_eq!(answer, "No sources used here.");
        assert_eq!(segment, None);
    }

    #[test]
    fn second_marker_is_not_honored() {
        let (answer, segment) = split_answer("A.\nCITATIONS: 1\nCITATIONS: 2");
        assert_eq!(answer, "A.");
        // The stray second marker makes its tokens unparseable, so only the
        // first list survives.
        assert_eq!(parse_ordinals(segment.unwrap(), 3), vec![1]);
    }

    #[test]
    fn parses_valid_ordinals_in_order() {
        assert_eq!(parse_ordinals(" 1, 3", 3), vec![1, 3]);
        assert_eq!(parse_ordinals("3,1,2", 3), vec![3, 1, 2]);
    }

    #[test]
    fn none_and_empty_mean_no_citations() {
        assert_eq!(parse_ordinals(" none ", 3), Vec::<usize>::new());
        assert_eq!(parse_ordinals("NONE", 3), Vec::<usize>::new());
        assert_eq!(parse_ordinals("", 3), Vec::<usize>::new());
        assert_eq!(parse_ordinals("  \n", 3), Vec::<usize>::new());
    }

    #[test]
    fn out_of_range_ordinals_are_dropped() {
        assert_eq!(parse_ordinals("5", 3), Vec::<usize>::new());
        assert_eq!(parse_ordinals("0, 1, 4", 3), vec![1]);
    }

    #[test]
    fn junk_tokens_are_dropped_not_fatal() {
        assert_eq!(parse_ordinals("1, two, 3x, , 2", 3), vec![1, 2]);
        assert_eq!(parse_ordinals("entries 1 and 3", 3), Vec::<usize>::new());
        assert_eq!(parse_ordinals("-1, 2", 3), vec![2]);
    }

    #[test]
    fn whitespace_around_tokens_is_tolerated() {
        assert_eq!(parse_ordinals("\n 2 ,  1 ", 3), vec![2, 1]);
    }
}
