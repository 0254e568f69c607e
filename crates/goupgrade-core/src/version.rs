use std::cmp::Ordering;
use std::fmt;

use semver::{BuildMetadata, Prerelease, Version};

/// A toolchain release version as it appears in a release folder name.
///
/// Keeps the text it was parsed from so the exact identifier can be put back
/// into download URLs (`1.21` must stay `1.21`, not become `1.21.0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoVersion {
    original: String,
    parsed: Version,
}

impl GoVersion {
    /// Parses release names such as `1.21.0`, `1.21`, `1.21rc2`, `1.9beta1`
    /// or `1.2.3-rc.1`. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let parsed = parse_lenient(input)?;
        Some(Self {
            original: input.to_string(),
            parsed,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed
            .cmp(&other.parsed)
            .then_with(|| self.original.cmp(&other.original))
    }
}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

fn parse_lenient(input: &str) -> Option<Version> {
    let trimmed = input.strip_prefix('v').unwrap_or(input);
    let (rest, build) = match trimmed.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (trimmed, None),
    };

    let core_len = rest
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .unwrap_or(rest.len());
    let (core, suffix) = rest.split_at(core_len);

    let mut numbers = [0_u64; 3];
    let mut count = 0;
    for segment in core.split('.') {
        if segment.is_empty() || count == numbers.len() {
            return None;
        }
        numbers[count] = segment.parse().ok()?;
        count += 1;
    }

    let pre = match suffix.strip_prefix('-') {
        Some("") => return None,
        Some(tag) => Prerelease::new(tag).ok()?,
        None if suffix.is_empty() => Prerelease::EMPTY,
        None => Prerelease::new(suffix).ok()?,
    };
    let build = match build {
        Some(build) => BuildMetadata::new(build).ok()?,
        None => BuildMetadata::EMPTY,
    };

    let mut version = Version::new(numbers[0], numbers[1], numbers[2]);
    version.pre = pre;
    version.build = build;
    Some(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &str) -> Version {
        GoVersion::parse(input).expect("version should parse").parsed
    }

    #[test]
    fn missing_segments_are_zero_padded() {
        assert_eq!(parsed("1.21.0").to_string(), "1.21.0");
        assert_eq!(parsed("1.21").to_string(), "1.21.0");
        assert!(parsed("1.21.0").pre.is_empty());
    }

    #[test]
    fn joined_prerelease_tags_become_semver_prereleases() {
        assert_eq!(parsed("1.21rc2").to_string(), "1.21.0-rc2");
        assert_eq!(parsed("1.9beta1").to_string(), "1.9.0-beta1");
    }

    #[test]
    fn hyphenated_prerelease_and_build_are_kept() {
        let version = parsed("1.2.3-rc.1+build.5");
        assert_eq!(version.pre.as_str(), "rc.1");
        assert_eq!(version.build.as_str(), "build.5");
    }
}
