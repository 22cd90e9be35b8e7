// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use std::env;
use std::ffi::OsStr;

/// Retrieves a boolean value from the given environment variable.
///
/// The following string values are considered true: `true`, `yes` or `1` (case-insensitive).
///
/// Returns `false` if the variable is not defined or contains an invalid value.
pub fn bool_from_env<K: AsRef<OsStr>>(key: K) -> bool {
    env::var(key)
        .map(|v| parse_bool(&v))
        .unwrap_or_default()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::parse_bool;
    use rstest::rstest;

    #[rstest]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("yes", true)]
    #[case(" 1 ", true)]
    #[case("0", false)]
    #[case("false", false)]
    #[case("", false)]
    #[case("on", false)]
    fn parse_bool_values(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(expected, parse_bool(value), "Invalid result for '{value}'");
    }
}
