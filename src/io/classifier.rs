/// Parsing strategy for an input file, chosen once from the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Every line is a bare number; each line is its own test case.
    SimpleNumeric,
    /// First line holds the number of test cases; test cases may span multiple lines
    /// introduced by a group marker.
    GroupedWithCount,
    /// No count line; each line is its own test case.
    Ungrouped,
}

/// Returns true if `s` is a number that formats back to exactly `s`.
///
/// ```
/// use vpwharness::io::classifier::is_bare_number;
/// assert!(is_bare_number("-2.5"));
/// assert!(!is_bare_number("03"));
/// assert!(!is_bare_number("3.0"));
/// ```
pub fn is_bare_number(s: &str) -> bool {
    s.parse::<f64>()
        .is_ok_and(|v| v.is_finite() && v.to_string() == s)
}

/// Returns the group size if `s` is a positive integer that formats back to exactly `s`.
pub fn group_marker(s: &str) -> Option<usize> {
    s.parse::<usize>()
        .ok()
        .filter(|&size| size > 0 && size.to_string() == s)
}

pub fn classify<S: AsRef<str>>(lines: &[S], leading_count: bool) -> Layout {
    if lines.iter().all(|l| is_bare_number(l.as_ref())) {
        Layout::SimpleNumeric
    } else if leading_count {
        Layout::GroupedWithCount
    } else {
        Layout::Ungrouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_numbers() {
        for s in ["0", "3", "-7", "0.5", "123456789"] {
            assert!(is_bare_number(s), "{s}");
        }

        for s in ["", "03", "3.0", "+3", "1e3", " 3", "NaN", "inf", "3 4", "abc"] {
            assert!(!is_bare_number(s), "{s}");
        }
    }

    #[test]
    fn markers() {
        assert_eq!(group_marker("3"), Some(3));
        assert_eq!(group_marker("12"), Some(12));
        assert_eq!(group_marker("0"), None);
        assert_eq!(group_marker("03"), None);
        assert_eq!(group_marker("3.0"), None);
        assert_eq!(group_marker("-3"), None);
        assert_eq!(group_marker("+3"), None);
        assert_eq!(group_marker("3 4"), None);
    }

    #[test]
    fn layouts() {
        assert_eq!(classify(&["2", "5", "7"], true), Layout::SimpleNumeric);
        assert_eq!(classify(&["5", "7"], false), Layout::SimpleNumeric);
        assert_eq!(classify(&["1", "2", "1 2"], true), Layout::GroupedWithCount);
        assert_eq!(classify(&["1 2", "3 4"], false), Layout::Ungrouped);
        assert_eq!(classify::<&str>(&[], true), Layout::SimpleNumeric);
    }
}
