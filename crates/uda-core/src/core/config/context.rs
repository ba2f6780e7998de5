use std::sync::Arc;

use anyhow::Result;
use uda_domain::HomeLayout;

use crate::core::config::{Config, GlobalOptions};
use crate::core::runtime::effects::{Downloader, SharedEffects, SystemEffects, ToolRunner};
use crate::core::runtime::CommandGroup;

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    effects: SharedEffects,
}

impl<'a> CommandContext<'a> {
    /// Creates a context from the live process environment and real effects.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be prepared.
    pub fn new(global: &'a GlobalOptions) -> Result<Self> {
        let config = Config::from_env()?;
        let effects: SharedEffects = Arc::new(SystemEffects::new(config.network().keep_proxies));
        Ok(Self::with_parts(global, config, effects))
    }

    #[must_use]
    pub fn with_parts(global: &'a GlobalOptions, config: Config, effects: SharedEffects) -> Self {
        Self {
            global,
            config,
            effects,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &HomeLayout {
        self.config.layout()
    }

    pub fn runner(&self) -> &dyn ToolRunner {
        self.effects.runner()
    }

    pub fn downloader(&self) -> &dyn Downloader {
        self.effects.downloader()
    }
}
