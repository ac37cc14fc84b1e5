use std::iter;

use regex::Regex;

use crate::search::TitleFilter;

/// Matcher for the active filter, `None` when the filter is empty. It runs
/// against the lowercased title, the same text the filter itself tests.
pub fn build_highlight_regex(filter: &TitleFilter) -> Option<Regex> {
    let terms = filter.highlight_terms();
    if terms.is_empty() {
        return None;
    }
    let pattern = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern).ok()
}

/// Splits `text` into `(matched, segment)` runs, in order.
///
/// Matching happens on `text.to_lowercase()`. Titles whose lowercase form
/// does not map one char to one char are returned unmarked.
pub fn segments<'a>(text: &'a str, regex: Option<&Regex>) -> Vec<(bool, &'a str)> {
    let Some(re) = regex else {
        return vec![(false, text)];
    };
    let lowered = text.to_lowercase();
    let starts = char_starts(text);
    let lowered_starts = char_starts(&lowered);
    if starts.len() != lowered_starts.len() {
        return vec![(false, text)];
    }
    let to_text = |offset: usize| {
        lowered_starts
            .binary_search(&offset)
            .ok()
            .map(|index| starts[index])
    };

    let mut out = Vec::new();
    let mut last = 0;
    for mat in re.find_iter(&lowered) {
        let (Some(start), Some(end)) = (to_text(mat.start()), to_text(mat.end())) else {
            continue;
        };
        if start > last {
            out.push((false, &text[last..start]));
        }
        out.push((true, &text[start..end]));
        last = end;
    }
    if last < text.len() {
        out.push((false, &text[last..]));
    }
    if out.is_empty() {
        out.push((false, text));
    }
    out
}

fn char_starts(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(index, _)| index)
        .chain(iter::once(text.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_regex() {
        assert!(build_highlight_regex(&TitleFilter::default()).is_none());
        assert_eq!(segments("Groceries", None), vec![(false, "Groceries")]);
    }

    #[test]
    fn marks_case_insensitive_matches() {
        let regex = build_highlight_regex(&TitleFilter::new("gro")).expect("regex");
        assert_eq!(
            segments("Groceries and grog", Some(&regex)),
            vec![
                (true, "Gro"),
                (false, "ceries and "),
                (true, "gro"),
                (false, "g"),
            ]
        );
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let regex = build_highlight_regex(&TitleFilter::new("c++")).expect("regex");
        assert_eq!(
            segments("learn C++ now", Some(&regex)),
            vec![(false, "learn "), (true, "C++"), (false, " now")]
        );
    }

    #[test]
    fn marks_only_what_the_filter_matches() {
        let sigma = TitleFilter::new("σ");
        let regex = build_highlight_regex(&sigma).expect("regex");
        assert!(!sigma.matches("ΛΟΓΟς"));
        assert_eq!(segments("ΛΟΓΟς", Some(&regex)), vec![(false, "ΛΟΓΟς")]);

        let final_sigma = TitleFilter::new("ς");
        let regex = build_highlight_regex(&final_sigma).expect("regex");
        assert!(final_sigma.matches("ΟΔΟΣ"));
        assert_eq!(
            segments("ΟΔΟΣ", Some(&regex)),
            vec![(false, "ΟΔΟ"), (true, "Σ")]
        );
    }
}
