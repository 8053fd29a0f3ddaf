// Version of the running binary, as printed by `emailctl version`.

use std::fmt;

/// Application version information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Version of this build, taken from the package manifest.
    pub fn current() -> Self {
        Version {
            major: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            minor: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            patch: env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
        }
    }

    /// Complete version banner printed by `emailctl version`.
    pub fn full_version(&self) -> String {
        format!("emailctl version {self}\nPostfix REST Server API V1 Client")
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_version() {
        let v = Version {
            major: 1,
            minor: 2,
            patch: 3,
        };
        assert_eq!(v.to_string(), "1.2.3");
        assert_eq!(
            v.full_version(),
            "emailctl version 1.2.3\nPostfix REST Server API V1 Client"
        );
    }

    #[test]
    fn current_matches_manifest() {
        assert_eq!(Version::current().to_string(), env!("CARGO_PKG_VERSION"));
    }
}
