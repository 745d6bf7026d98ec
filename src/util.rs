//! Suggestion machinery behind "Did you mean" clauses in diagnostics.

use itertools::Itertools as _;

/// Upper bound on suggestions shown in one message.
const MAX_SUGGESTIONS: usize = 5;

/// Given an invalid input and a list of valid options, returns the options
/// close enough to have plausibly been meant, best matches first.
pub(crate) fn suggestion_list<'a, I>(input: &str, options: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let threshold = input.len() * 2 / 5 + 1;

    let mut scored: Vec<(String, usize)> = options
        .into_iter()
        .filter_map(|option| {
            lexical_distance(input, option, threshold).map(|d| (option.to_owned(), d))
        })
        .collect();

    scored.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    scored.into_iter().map(|(option, _)| option).collect()
}

/// Restricted Damerau-Levenshtein distance between `a` and `b`, if it does
/// not exceed `threshold`.
///
/// Counts insertions, deletions, substitutions, and transpositions of
/// adjacent characters. A case-insensitive match counts as distance 1.
fn lexical_distance(a: &str, b: &str, threshold: usize) -> Option<usize> {
    if a == b {
        return Some(0);
    }

    let a_chars: Vec<char> = a.to_lowercase().chars().collect();
    let b_chars: Vec<char> = b.to_lowercase().chars().collect();

    if a_chars == b_chars {
        return Some(1);
    }

    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len.abs_diff(b_len) > threshold {
        return None;
    }

    let mut rows = vec![vec![0usize; b_len + 1]; 3];
    for (j, cell) in rows[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a_len {
        let up_row = (i - 1) % 3;
        let current_row = i % 3;
        let mut smallest = usize::MAX;

        rows[current_row][0] = i;

        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            let mut value = (rows[up_row][j] + 1)
                .min(rows[current_row][j - 1] + 1)
                .min(rows[up_row][j - 1] + cost);

            if i > 1 && j > 1 && a_chars[i - 1] == b_chars[j - 2] && a_chars[i - 2] == b_chars[j - 1]
            {
                let double_diagonal = (i - 2) % 3;
                value = value.min(rows[double_diagonal][j - 2] + 1);
            }

            smallest = smallest.min(value);
            rows[current_row][j] = value;
        }

        if smallest > threshold {
            return None;
        }
    }

    let distance = rows[a_len % 3][b_len];
    (distance <= threshold).then_some(distance)
}

/// Renders a non-empty list of quoted suggestions as an English clause,
/// e.g. `"a", "b", or "c"`, capped at [`MAX_SUGGESTIONS`] entries.
pub(crate) fn quoted_or_list(items: &[String]) -> String {
    or_list(&items.iter().map(|i| format!("\"{i}\"")).collect::<Vec<_>>())
}

/// Renders a non-empty list as an English "or" clause.
pub(crate) fn or_list(items: &[String]) -> String {
    let selected = &items[..items.len().min(MAX_SUGGESTIONS)];

    match selected {
        [single] => single.clone(),
        [first, second] => format!("{first} or {second}"),
        [head @ .., last] => {
            format!("{}, or {last}", head.iter().join(", "))
        }
        [] => String::new(),
    }
}

/// Formats the standard "Did you mean" suffix, or an empty string when
/// there is nothing to suggest.
pub(crate) fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" Did you mean {}?", quoted_or_list(suggestions))
    }
}

#[cfg(test)]
mod tests {
    use super::{lexical_distance, suggestion_list};

    #[test]
    fn distance_counts_transpositions_once() {
        assert_eq!(lexical_distance("teh", "the", 2), Some(1));
    }

    #[test]
    fn distance_rejects_far_options() {
        assert_eq!(lexical_distance("ab", "wxyz", 2), None);
    }

    #[test]
    fn case_variant_is_a_close_match() {
        assert_eq!(lexical_distance("FURcolor", "furColor", 5), Some(1));
    }

    #[test]
    fn suggestions_rank_by_distance_then_name() {
        let suggestions = suggestion_list("bar", ["baz", "bar_", "quux"]);
        assert_eq!(suggestions, vec!["bar_".to_owned(), "baz".to_owned()]);
    }
}
