//! `$` numbering and `$#` line placeholders.

/// Position of a copy among the copies of its repeater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    /// 1-based.
    pub value: usize,
    pub total: usize,
}

/// Replaces every `$` run with the counter, zero-padded to the run length.
///
/// `$@-` counts down, `$@3` starts from 3 and `$@-3` counts down to 3.
/// `\$` is escaped and runs followed by `{`, `#` or a digit belong to fields
/// or line placeholders, so they are left alone.
pub fn replace_numbering(text: &str, counter: Counter) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            out.push(ch);
            if let Some(&next) = chars.get(i + 1) {
                out.push(next);
            }
            i += 2;
            continue;
        }

        if ch != '$' {
            out.push(ch);
            i += 1;
            continue;
        }

        let start = i;
        while chars.get(i) == Some(&'$') {
            i += 1;
        }
        let size = i - start;

        if chars
            .get(i)
            .is_some_and(|&next| next == '{' || next == '#' || next.is_ascii_digit())
        {
            out.extend(&chars[start..i]);
            continue;
        }

        let mut reverse = false;
        let mut base = 1;
        if chars.get(i) == Some(&'@') {
            i += 1;
            if chars.get(i) == Some(&'-') {
                reverse = true;
                i += 1;
            }
            let digits_start = i;
            while chars.get(i).is_some_and(char::is_ascii_digit) {
                i += 1;
            }
            if i > digits_start {
                base = chars[digits_start..i]
                    .iter()
                    .collect::<String>()
                    .parse()
                    .unwrap_or(1);
            }
        }

        let number = if reverse {
            counter.total.saturating_sub(counter.value) + base
        } else {
            counter.value - 1 + base
        };
        out.push_str(&format!("{number:0size$}"));
    }

    out
}

/// Replaces every `$#` with `value`. Returns `None` when there is none.
pub fn replace_repeater(text: &str, value: &str) -> Option<String> {
    text.contains("$#").then(|| text.replace("$#", value))
}
