//! Target classification and profile URL rules.

use std::collections::HashSet;
use std::fmt;

use helmsman_cdp::Target;
use regex::Regex;
use tracing::warn;

/// Which of the two session views a target plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRole {
    /// Page showing the external site.
    Content,
    /// Page hosting the local application shell.
    Control,
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRole::Content => write!(f, "content view"),
            TargetRole::Control => write!(f, "control view"),
        }
    }
}

/// Outcome of matching one discovery snapshot against the rules.
#[derive(Debug, Clone, Default)]
pub struct TargetSelection {
    pub content: Option<Target>,
    pub control: Option<Target>,
    /// Raw number of targets in the snapshot.
    pub observed: usize,
}

impl TargetSelection {
    /// Roles without a matching target.
    pub fn missing(&self) -> Vec<TargetRole> {
        let mut missing = Vec::new();
        if self.content.is_none() {
            missing.push(TargetRole::Content);
        }
        if self.control.is_none() {
            missing.push(TargetRole::Control);
        }
        missing
    }
}

/// URL patterns identifying the content view, the control view and a
/// navigable profile page.
#[derive(Debug, Clone)]
pub struct TargetRules {
    content: Regex,
    control: Regex,
    profile: Regex,
}

impl TargetRules {
    /// Compile the three patterns.
    pub fn new(content: &str, control: &str, profile: &str) -> Result<Self, regex::Error> {
        Ok(Self::from_regexes(
            Regex::new(content)?,
            Regex::new(control)?,
            Regex::new(profile)?,
        ))
    }

    /// Build from already compiled patterns.
    pub fn from_regexes(content: Regex, control: Regex, profile: Regex) -> Self {
        Self {
            content,
            control,
            profile,
        }
    }

    /// Role of `target`, if any. Only `page` targets qualify; the control
    /// pattern wins when both match.
    pub fn role_of(&self, target: &Target) -> Option<TargetRole> {
        if !target.is_page() {
            return None;
        }
        if self.control.is_match(&target.url) {
            Some(TargetRole::Control)
        } else if self.content.is_match(&target.url) {
            Some(TargetRole::Content)
        } else {
            None
        }
    }

    /// Whether `url` has the profile-page shape.
    pub fn is_profile_url(&self, url: &str) -> bool {
        self.profile.is_match(url)
    }

    /// Pick the first content and control targets. Repeated ids are
    /// ignored after their first occurrence.
    pub fn select(&self, targets: &[Target]) -> TargetSelection {
        let mut selection = TargetSelection {
            observed: targets.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for target in targets {
            if !seen.insert(target.id.as_str()) {
                warn!("Ignoring duplicate target id {}", target.id);
                continue;
            }
            let slot = match self.role_of(target) {
                Some(TargetRole::Content) => &mut selection.content,
                Some(TargetRole::Control) => &mut selection.control,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(target.clone());
            }
        }

        selection
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
