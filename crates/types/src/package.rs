//! Package specifier types
//!
//! Specifiers follow the usual pip syntax: a bare name, or a name plus a
//! single version constraint (`flask==2.3`, `numpy>=1.26`). Parsing doubles
//! as the allow-list validation for user input: anything that could reach a
//! shell or a URL fetch is rejected here, before a run starts.

use pyforge_errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version constraint operators accepted in package specifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionOp {
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
    Compatible,
    Ne,
}

impl VersionOp {
    /// Operators ordered so two-character forms match before their prefixes.
    const ALL: &'static [(&'static str, Self)] = &[
        ("==", Self::Eq),
        (">=", Self::Ge),
        ("<=", Self::Le),
        ("~=", Self::Compatible),
        ("!=", Self::Ne),
        (">", Self::Gt),
        ("<", Self::Lt),
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Compatible => "~=",
            Self::Ne => "!=",
        }
    }
}

impl fmt::Display for VersionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single version constraint (`==2.0`, `>=1.26`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionConstraint {
    pub op: VersionOp,
    pub version: String,
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// A validated package specifier: name plus optional version constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    pub constraint: Option<VersionConstraint>,
}

impl PackageSpec {
    /// Parse and validate a pip-style package specifier.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPackage` when the specifier is
    /// empty, contains shell metacharacters or whitespace, looks like a
    /// direct URL, or has a malformed name or version.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let spec = input.trim();
        if spec.is_empty() {
            return Err(invalid(input, "specifier cannot be empty"));
        }
        if spec.chars().any(char::is_whitespace) {
            return Err(invalid(input, "specifier cannot contain whitespace"));
        }
        if spec.contains([';', '|', '&', '$', '`', '#', '"', '\'', '\\']) {
            return Err(invalid(input, "specifier contains forbidden characters"));
        }
        for prefix in ["http://", "https://", "git+", "svn+", "file://"] {
            if spec.starts_with(prefix) {
                return Err(invalid(input, "direct URLs are not supported"));
            }
        }

        let (name, constraint) = match find_operator(spec) {
            Some((pos, op)) => {
                let version = &spec[pos + op.as_str().len()..];
                if version.is_empty() {
                    return Err(invalid(input, "missing version after operator"));
                }
                if !version
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '+' | '-' | '!'))
                {
                    return Err(invalid(input, "invalid version string"));
                }
                (&spec[..pos], Some(VersionConstraint { op, version: version.to_string() }))
            }
            None => (spec, None),
        };

        validate_name(input, name)?;
        Ok(Self {
            name: name.to_string(),
            constraint,
        })
    }

    /// Name normalized for de-duplication (PEP 503: lowercase, `-`/`_`/`.`
    /// treated as equivalent).
    #[must_use]
    pub fn normalized_name(&self) -> String {
        self.name
            .chars()
            .map(|c| match c {
                '_' | '.' => '-',
                other => other.to_ascii_lowercase(),
            })
            .collect()
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{}{c}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

fn invalid(spec: &str, message: &str) -> ValidationError {
    ValidationError::InvalidPackage {
        spec: spec.to_string(),
        message: message.to_string(),
    }
}

fn find_operator(spec: &str) -> Option<(usize, VersionOp)> {
    for (pos, _) in spec.char_indices() {
        for (text, op) in VersionOp::ALL {
            if spec[pos..].starts_with(text) {
                return Some((pos, *op));
            }
        }
    }
    None
}

fn validate_name(spec: &str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(invalid(spec, "missing package name"));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or('-');
    let last = name.chars().last().unwrap_or('-');
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(invalid(spec, "name must start and end with a letter or digit"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(invalid(spec, "name contains invalid characters"));
    }
    Ok(())
}

/// Tie-break policy for duplicate package names in a request
///
/// The order-of-occurrence is always preserved; the policy only decides
/// which constraint survives when the same name appears twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// The later occurrence replaces the earlier one (pip-like).
    #[default]
    LastWins,
    /// The first occurrence is kept, later duplicates are dropped.
    FirstWins,
}

/// De-duplicate specifiers by normalized name, preserving first-seen order.
#[must_use]
pub fn dedup_packages(specs: &[PackageSpec], policy: DedupPolicy) -> Vec<PackageSpec> {
    let mut out: Vec<PackageSpec> = Vec::with_capacity(specs.len());
    for spec in specs {
        let key = spec.normalized_name();
        match out.iter().position(|s| s.normalized_name() == key) {
            Some(idx) => {
                if policy == DedupPolicy::LastWins {
                    out[idx] = spec.clone();
                }
            }
            None => out.push(spec.clone()),
        }
    }
    out
}

/// A package as actually installed into the project environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// The specifier the install was requested with (post de-duplication).
    pub spec: PackageSpec,
    /// Exact version reported by the installer, when it could be determined.
    pub resolved_version: Option<String>,
}

impl InstalledPackage {
    /// The line this package contributes to the requirements manifest.
    ///
    /// A resolved version pins exactly; otherwise the requested constraint
    /// is written through verbatim.
    #[must_use]
    pub fn manifest_line(&self) -> String {
        match &self.resolved_version {
            Some(version) => format!("{}=={version}", self.spec.name),
            None => self.spec.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> PackageSpec {
        PackageSpec::parse(s).unwrap()
    }

    #[test]
    fn parses_bare_name() {
        let spec = parse("flask");
        assert_eq!(spec.name, "flask");
        assert!(spec.constraint.is_none());
        assert_eq!(spec.to_string(), "flask");
    }

    #[test]
    fn parses_pinned_version() {
        let spec = parse("requests==2.31.0");
        assert_eq!(spec.name, "requests");
        let constraint = spec.constraint.unwrap();
        assert_eq!(constraint.op, VersionOp::Eq);
        assert_eq!(constraint.version, "2.31.0");
    }

    #[test]
    fn two_char_operators_win_over_prefixes() {
        let spec = parse("numpy>=1.26");
        assert_eq!(spec.constraint.unwrap().op, VersionOp::Ge);
        let spec = parse("numpy>1.26");
        assert_eq!(spec.constraint.unwrap().op, VersionOp::Gt);
    }

    #[test]
    fn rejects_shell_metacharacters() {
        for bad in ["flask; rm -rf /", "a|b", "a&&b", "pkg`id`", "$(x)"] {
            assert!(PackageSpec::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_urls() {
        assert!(PackageSpec::parse("https://evil.example/pkg.whl").is_err());
        assert!(PackageSpec::parse("git+https://example.com/repo").is_err());
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(PackageSpec::parse("").is_err());
        assert!(PackageSpec::parse("-flask").is_err());
        assert!(PackageSpec::parse("flask-").is_err());
        assert!(PackageSpec::parse("fl ask").is_err());
        assert!(PackageSpec::parse("na\u{ef}ve").is_err());
        assert!(PackageSpec::parse("==2.0").is_err());
        assert!(PackageSpec::parse("flask==").is_err());
    }

    #[test]
    fn normalization_folds_separators_and_case() {
        assert_eq!(parse("Flask_Login").normalized_name(), "flask-login");
        assert_eq!(parse("zope.interface").normalized_name(), "zope-interface");
    }

    #[test]
    fn dedup_last_wins_keeps_first_position() {
        let specs = vec![parse("requests"), parse("numpy"), parse("requests==2.0")];
        let deduped = dedup_packages(&specs, DedupPolicy::LastWins);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].to_string(), "requests==2.0");
        assert_eq!(deduped[1].to_string(), "numpy");
    }

    #[test]
    fn dedup_first_wins_drops_later_duplicates() {
        let specs = vec![parse("requests"), parse("requests==2.0")];
        let deduped = dedup_packages(&specs, DedupPolicy::FirstWins);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].to_string(), "requests");
    }

    #[test]
    fn manifest_line_prefers_resolved_version() {
        let installed = InstalledPackage {
            spec: parse("flask>=2.0"),
            resolved_version: Some("2.3.2".to_string()),
        };
        assert_eq!(installed.manifest_line(), "flask==2.3.2");

        let unresolved = InstalledPackage {
            spec: parse("flask>=2.0"),
            resolved_version: None,
        };
        assert_eq!(unresolved.manifest_line(), "flask>=2.0");
    }
}
