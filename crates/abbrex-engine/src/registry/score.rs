/// Fuzzy score of how well `abbr` matches `candidate`, in `0.0..=1.0`.
///
/// Case-insensitive. An exact match scores 1 and a different first character
/// scores 0. Otherwise each abbreviation character found in order adds the
/// distance from the end of the candidate, doubled when it directly follows
/// an unmatched `-` (so `bxsh` favors `box-shadow`). The total is scaled by
/// the share of matched abbreviation characters and normalized by the
/// candidate length.
pub fn calculate_score(abbr: &str, candidate: &str) -> f64 {
    let abbr: Vec<char> = abbr.to_lowercase().chars().collect();
    let candidate: Vec<char> = candidate.to_lowercase().chars().collect();

    if abbr == candidate {
        return 1.0;
    }

    if candidate.is_empty() || abbr.is_empty() || abbr[0] != candidate[0] {
        return 0.0;
    }

    let abbr_len = abbr.len();
    let len = candidate.len();
    let mut i = 1;
    let mut j = 1;
    let mut score = len;

    while i < abbr_len {
        let ch = abbr[i];
        let mut found = false;
        let mut acronym = false;

        while j < len {
            if candidate[j] == ch {
                found = true;
                score += (len - j) * if acronym { 2 } else { 1 };
                break;
            }
            acronym = candidate[j] == '-';
            j += 1;
        }

        if !found {
            break;
        }
        i += 1;
    }

    score as f64 * (i as f64 / abbr_len as f64) / sum(len)
}

/// Picks the highest scoring item. Ties go to the later item; an exact hit
/// returns immediately. Nothing is returned below `min_score`.
pub fn find_best_match<'a, T, F>(
    abbr: &str,
    items: impl IntoIterator<Item = &'a T>,
    scoring_part: F,
    min_score: f64,
) -> Option<&'a T>
where
    T: ?Sized + 'a,
    F: Fn(&T) -> &str,
{
    let mut best = None;
    let mut max_score = 0.0;

    for item in items {
        let score = calculate_score(abbr, scoring_part(item));
        if score == 1.0 {
            return Some(item);
        }
        if score > 0.0 && score >= max_score {
            max_score = score;
            best = Some(item);
        }
    }

    if max_score >= min_score { best } else { None }
}

fn sum(n: usize) -> f64 {
    (n * (n + 1)) as f64 / 2.0
}
