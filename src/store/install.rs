// src/store/install.rs

//! Install state machine
//!
//! A template id is either `Available` or `Installed(version)` within a
//! repository. Installing a different version replaces the previous entry in
//! one map update, so at most one version per id is ever recorded.

use std::collections::BTreeMap;
use std::fmt;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TemplateAction {
    Install,
    Uninstall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    Available,
    Installed(String),
}

impl InstallState {
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Available => None,
            Self::Installed(version) => Some(version),
        }
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Installed(version) => write!(f, "installed ({version})"),
        }
    }
}

/// Outcome of one `manage_template` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTransition {
    pub repository: String,
    pub template_id: String,
    pub from: InstallState,
    pub to: InstallState,
}

impl InstallTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// The version superseded by an install of another version
    pub fn replaced(&self) -> Option<&str> {
        match (&self.from, &self.to) {
            (InstallState::Installed(old), InstallState::Installed(new)) if old != new => {
                Some(old)
            }
            _ => None,
        }
    }
}

pub(crate) fn current_state(installed: &BTreeMap<String, String>, template_id: &str) -> InstallState {
    installed
        .get(template_id)
        .map(|version| InstallState::Installed(version.clone()))
        .unwrap_or(InstallState::Available)
}

/// Apply `action` to a repository's installed-templates map
///
/// Uninstalling a version other than the installed one leaves the map alone.
pub(crate) fn apply(
    installed: &mut BTreeMap<String, String>,
    repository: &str,
    action: TemplateAction,
    template_id: &str,
    version: &str,
) -> InstallTransition {
    let from = current_state(installed, template_id);

    match action {
        TemplateAction::Install => {
            installed.insert(template_id.to_string(), version.to_string());
        }
        TemplateAction::Uninstall => {
            if from.version() == Some(version) {
                installed.remove(template_id);
            }
        }
    }

    InstallTransition {
        repository: repository.to_string(),
        template_id: template_id.to_string(),
        from,
        to: current_state(installed, template_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_action_strings() {
        assert_eq!(TemplateAction::Install.to_string(), "install");
        assert_eq!(TemplateAction::from_str("UNINSTALL").unwrap(), TemplateAction::Uninstall);
        assert!(TemplateAction::from_str("upgrade").is_err());
    }

    #[test]
    fn test_install_then_uninstall() {
        let mut map = BTreeMap::new();
        let t = apply(&mut map, "test", TemplateAction::Install, "first", "1.1");
        assert_eq!(t.from, InstallState::Available);
        assert_eq!(t.to, InstallState::Installed("1.1".into()));
        assert!(t.changed());

        let t = apply(&mut map, "test", TemplateAction::Uninstall, "first", "1.1");
        assert_eq!(t.to, InstallState::Available);
        assert!(map.is_empty());
    }

    #[test]
    fn test_install_other_version_replaces() {
        let mut map = BTreeMap::new();
        apply(&mut map, "test", TemplateAction::Install, "first", "1.0");
        let t = apply(&mut map, "test", TemplateAction::Install, "first", "1.1");
        assert_eq!(t.replaced(), Some("1.0"));
        assert_eq!(map.len(), 1);
        assert_eq!(map["first"], "1.1");
    }

    #[test]
    fn test_uninstall_other_version_is_noop() {
        let mut map = BTreeMap::new();
        apply(&mut map, "test", TemplateAction::Install, "first", "1.0");
        let t = apply(&mut map, "test", TemplateAction::Uninstall, "first", "2.0");
        assert!(!t.changed());
        assert_eq!(map["first"], "1.0");
    }
}
