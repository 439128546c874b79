//! Asset access gates.
//!
//! # Responsibilities
//! - Decide whether an asset path may be looked up in archives
//! - Decide whether an asset path may be looked up in raw directories
//!
//! # Design Decisions
//! - The two gates are independent; a store is only consulted if its gate passes
//! - The archive gate supports both polarities as separately named settings:
//!   an allow list (deny unless matched) and a deny list (allow unless matched)
//! - A path rejected by both gates is reported as not found, never forbidden

use regex::Regex;

/// A set of regular expressions; matches if any member matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|r| r.is_match(path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Gate for archive lookups.
#[derive(Debug, Clone, Default)]
pub struct ArchiveGate {
    /// When set, only matching paths pass.
    allow: Option<PatternSet>,
    /// Matching paths never pass.
    deny: PatternSet,
}

impl ArchiveGate {
    pub fn new(allow: Option<PatternSet>, deny: PatternSet) -> Self {
        Self { allow, deny }
    }

    pub fn permits(&self, path: &str) -> bool {
        let allowed = self.allow.as_ref().map_or(true, |set| set.matches(path));
        allowed && !self.deny.matches(path)
    }
}

/// Gate for raw directory lookups. Nothing passes without an allow rule.
#[derive(Debug, Clone, Default)]
pub struct DirectoryGate {
    allow: PatternSet,
}

impl DirectoryGate {
    pub fn new(allow: PatternSet) -> Self {
        Self { allow }
    }

    pub fn permits(&self, path: &str) -> bool {
        self.allow.matches(path)
    }

    /// True if any directory rule exists, which enables directory stores.
    pub fn is_configured(&self) -> bool {
        !self.allow.is_empty()
    }
}

/// Outcome of evaluating both gates for one asset path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub archive: bool,
    pub directory: bool,
}

impl AccessDecision {
    pub fn is_rejected(&self) -> bool {
        !self.archive && !self.directory
    }
}

/// Both access gates together.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    pub archive: ArchiveGate,
    pub directory: DirectoryGate,
}

impl AccessPolicy {
    pub fn new(archive: ArchiveGate, directory: DirectoryGate) -> Self {
        Self { archive, directory }
    }

    pub fn evaluate(&self, asset_path: &str) -> AccessDecision {
        AccessDecision {
            archive: self.archive.permits(asset_path),
            directory: self.directory.permits(asset_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> PatternSet {
        PatternSet::new(patterns).unwrap()
    }

    #[test]
    fn test_default_allow_unless_blocked() {
        let gate = ArchiveGate::new(None, set(&[r"\.cfg$", "^save/"]));
        assert!(gate.permits("maps/q2dm1.bsp"));
        assert!(!gate.permits("config.cfg"));
        assert!(!gate.permits("save/game.ssv"));
    }

    #[test]
    fn test_default_deny_unless_allowed() {
        let gate = ArchiveGate::new(Some(set(&["^maps/", "^textures/"])), PatternSet::default());
        assert!(gate.permits("maps/q2dm1.bsp"));
        assert!(!gate.permits("pics/colormap.pcx"));
    }

    #[test]
    fn test_deny_beats_allow() {
        let gate = ArchiveGate::new(Some(set(&["^maps/"])), set(&["secret"]));
        assert!(!gate.permits("maps/secret.bsp"));
    }

    #[test]
    fn test_empty_allow_list_denies_everything() {
        let gate = ArchiveGate::new(Some(PatternSet::default()), PatternSet::default());
        assert!(!gate.permits("maps/q2dm1.bsp"));
    }

    #[test]
    fn test_directory_gate() {
        let unconfigured = DirectoryGate::default();
        assert!(!unconfigured.is_configured());
        assert!(!unconfigured.permits("maps/q2dm1.bsp"));

        let gate = DirectoryGate::new(set(&[r"^maps/.*\.bsp$"]));
        assert!(gate.is_configured());
        assert!(gate.permits("maps/q2dm1.bsp"));
        assert!(!gate.permits("maps/q2dm1.ent"));
    }

    #[test]
    fn test_policy_rejection() {
        let policy = AccessPolicy::new(
            ArchiveGate::new(None, set(&["^private/"])),
            DirectoryGate::new(set(&["^public/"])),
        );
        assert!(policy.evaluate("private/x").is_rejected());
        let decision = policy.evaluate("public/x");
        assert!(decision.archive && decision.directory);
    }
}
