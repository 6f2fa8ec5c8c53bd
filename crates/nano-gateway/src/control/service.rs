//! Per-service switches

use dashmap::{DashMap, DashSet};

/// Group id standing for every group
pub const ALL_GROUPS: u64 = 0;

/// Registration options of a service
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Start disabled until a group enables it
    pub disable_on_default: bool,
    /// Text shown by `usage`
    pub help: String,
    /// Data folder shared with other programs; must start upper case
    pub public_data_folder: Option<String>,
    /// Data folder private to the service; must start lower case
    pub private_data_folder: Option<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn disable_on_default(mut self) -> Self {
        self.disable_on_default = true;
        self
    }

    pub fn public_data_folder(mut self, folder: impl Into<String>) -> Self {
        self.public_data_folder = Some(folder.into());
        self
    }

    pub fn private_data_folder(mut self, folder: impl Into<String>) -> Self {
        self.private_data_folder = Some(folder.into());
        self
    }
}

/// Enable state, bans and help of one service
///
/// Group overrides win over the [`ALL_GROUPS`] entry, which wins over the
/// registration default. A ban in [`ALL_GROUPS`] applies everywhere.
#[derive(Debug)]
pub struct Control {
    service: String,
    priority: i32,
    options: Options,
    enabled: DashMap<u64, bool>,
    bans: DashSet<(u64, u64)>,
}

impl Control {
    pub(crate) fn new(service: impl Into<String>, priority: i32, options: Options) -> Self {
        Self {
            service: service.into(),
            priority,
            options,
            enabled: DashMap::new(),
            bans: DashSet::new(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn help(&self) -> &str {
        &self.options.help
    }

    pub fn is_enabled_in(&self, group: u64) -> bool {
        if let Some(enabled) = self.enabled.get(&group) {
            return *enabled;
        }
        if let Some(enabled) = self.enabled.get(&ALL_GROUPS) {
            return *enabled;
        }
        !self.options.disable_on_default
    }

    pub fn enable(&self, group: u64) {
        self.enabled.insert(group, true);
    }

    pub fn disable(&self, group: u64) {
        self.enabled.insert(group, false);
    }

    /// Set the state for every group, dropping group overrides
    pub fn set_all(&self, enabled: bool) {
        self.enabled.clear();
        self.enabled.insert(ALL_GROUPS, enabled);
    }

    pub fn ban(&self, user: u64, group: u64) {
        self.bans.insert((user, group));
    }

    /// Lift a ban; returns whether one existed
    pub fn permit(&self, user: u64, group: u64) -> bool {
        self.bans.remove(&(user, group)).is_some()
    }

    pub fn is_banned_in(&self, user: u64, group: u64) -> bool {
        self.bans.contains(&(user, group)) || self.bans.contains(&(user, ALL_GROUPS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_precedence() {
        let control = Control::new("echo", 10, Options::new());
        assert!(control.is_enabled_in(5));

        control.disable(5);
        assert!(!control.is_enabled_in(5));
        assert!(control.is_enabled_in(6));

        control.set_all(false);
        assert!(!control.is_enabled_in(6));
        assert!(!control.is_enabled_in(5));

        control.enable(5);
        assert!(control.is_enabled_in(5));
        assert!(!control.is_enabled_in(6));
    }

    #[test]
    fn test_disabled_by_default() {
        let control = Control::new("echo", 10, Options::new().disable_on_default());
        assert!(!control.is_enabled_in(1));
        control.enable(1);
        assert!(control.is_enabled_in(1));
    }

    #[test]
    fn test_bans() {
        let control = Control::new("echo", 10, Options::new());
        control.ban(7, 100);
        assert!(control.is_banned_in(7, 100));
        assert!(!control.is_banned_in(7, 101));

        control.ban(8, ALL_GROUPS);
        assert!(control.is_banned_in(8, 101));

        assert!(control.permit(7, 100));
        assert!(!control.permit(7, 100));
        assert!(!control.is_banned_in(7, 100));
    }
}
