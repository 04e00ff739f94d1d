//! Built-in package presets
//!
//! Each preset is a starting set of packages for a common project flavor.
//! User-defined presets from the config file are merged on top by the CLI.

/// Built-in presets, name to package list.
pub const BUILTIN_PRESETS: &[(&str, &[&str])] = &[
    (
        "data-science",
        &["numpy", "pandas", "matplotlib", "seaborn", "scikit-learn", "jupyter", "scipy"],
    ),
    (
        "flask",
        &["flask", "flask-sqlalchemy", "flask-wtf", "flask-login", "flask-migrate", "requests"],
    ),
    (
        "django",
        &["django", "djangorestframework", "django-cors-headers", "psycopg2-binary", "gunicorn"],
    ),
    (
        "automation",
        &["requests", "beautifulsoup4", "selenium", "pyautogui", "pandas", "openpyxl"],
    ),
    ("gui", &["pyqt5", "pyside6", "pyautogui", "pillow", "pyinstaller"]),
    (
        "machine-learning",
        &["torch", "torchvision", "tensorflow", "keras", "scikit-learn", "xgboost"],
    ),
    (
        "api",
        &["fastapi", "uvicorn", "pydantic", "sqlalchemy", "alembic", "python-jose"],
    ),
    (
        "testing",
        &["pytest", "pytest-cov", "pytest-mock", "tox", "hypothesis", "factory-boy"],
    ),
    ("devops", &["docker", "boto3", "paramiko", "fabric", "ansible", "jinja2"]),
    ("minimal", &[]),
];

/// Look up a built-in preset by name (case-insensitive).
#[must_use]
pub fn builtin_preset(name: &str) -> Option<&'static [&'static str]> {
    BUILTIN_PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
        .map(|(_, packages)| *packages)
}

/// Names of all built-in presets, in declaration order.
#[must_use]
pub fn builtin_preset_names() -> Vec<&'static str> {
    BUILTIN_PRESETS.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(builtin_preset("Flask").is_some());
        assert!(builtin_preset("FLASK").is_some());
        assert!(builtin_preset("no-such-preset").is_none());
    }

    #[test]
    fn minimal_preset_is_empty() {
        assert_eq!(builtin_preset("minimal"), Some(&[][..]));
    }

    #[test]
    fn preset_packages_are_valid_specifiers() {
        for (name, packages) in BUILTIN_PRESETS {
            for pkg in *packages {
                assert!(
                    crate::PackageSpec::parse(pkg).is_ok(),
                    "preset {name} contains invalid specifier {pkg}"
                );
            }
        }
    }
}
