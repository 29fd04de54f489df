use std::cmp::Ordering;

const MAX_VALUE_LEN: usize = 60;

/// Compares names so that embedded digit runs order numerically.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let l_trimmed = l_run.trim_start_matches('0');
                let r_trimmed = r_run.trim_start_matches('0');
                let ordering = l_trimmed
                    .len()
                    .cmp(&r_trimmed.len())
                    .then_with(|| l_trimmed.cmp(r_trimmed))
                    .then_with(|| l_run.len().cmp(&r_run.len()));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_ascii_lowercase().cmp(&r.to_ascii_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

/// First component of a multi-valued DICOM string (`"40\\400"` -> `"40"`).
pub fn first_value(raw: &str) -> &str {
    raw.split('\\').next().unwrap_or(raw).trim()
}

pub fn truncate_value(value: &str) -> String {
    if value.chars().count() > MAX_VALUE_LEN {
        let mut truncated = value.chars().take(MAX_VALUE_LEN).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_runs_sort_numerically() {
        let mut names = vec!["IM-10.dcm", "IM-2.dcm", "im-1.dcm", "IM-02.dcm"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["im-1.dcm", "IM-2.dcm", "IM-02.dcm", "IM-10.dcm"]);
    }

    #[test]
    fn first_value_splits_backslash() {
        assert_eq!(first_value("40\\400"), "40");
        assert_eq!(first_value(" 350 "), "350");
    }

    #[test]
    fn long_values_are_truncated() {
        let long = "x".repeat(80);
        assert_eq!(truncate_value(&long).chars().count(), MAX_VALUE_LEN + 1);
        assert_eq!(truncate_value("short"), "short");
    }
}
