//! Registry of status channels, keyed by name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{MagetabError, Result};

use super::channel::{Channel, ChannelOptions};

/// Name of the channel the pipeline itself records to.
pub const CORE_CHANNEL: &str = "magetab";

/// Counts for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub channel: String,
    pub warnings: usize,
    pub errors: usize,
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} error(s), {} warning(s)",
            self.channel, self.errors, self.warnings
        )
    }
}

/// Channels for one pipeline run.
///
/// Channels are created on first use and looked up by name afterwards.
/// Queries that omit a channel name cover every registered channel; queries
/// naming an unknown channel fail with [`MagetabError::ChannelNotFound`].
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: IndexMap<String, Channel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the named channel, creating it with `options` if it does not exist.
    ///
    /// Options are ignored when the channel already exists.
    pub fn get_or_create(&mut self, name: &str, options: ChannelOptions) -> Result<&mut Channel> {
        if !self.channels.contains_key(name) {
            let channel = Channel::new(name, options)?;
            self.channels.insert(name.to_string(), channel);
        }
        self.get_mut(name)
    }

    pub fn get(&self, name: &str) -> Result<&Channel> {
        self.channels
            .get(name)
            .ok_or_else(|| MagetabError::ChannelNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Channel> {
        self.channels
            .get_mut(name)
            .ok_or_else(|| MagetabError::ChannelNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Registered channel names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(|k| k.as_str())
    }

    fn selected(&self, name: Option<&str>) -> Result<Vec<&Channel>> {
        match name {
            Some(name) => Ok(vec![self.get(name)?]),
            None => Ok(self.channels.values().collect()),
        }
    }

    /// Errors on the named channel, or summed over all channels.
    pub fn error_count(&self, name: Option<&str>) -> Result<usize> {
        Ok(self.selected(name)?.iter().map(|c| c.errors()).sum())
    }

    /// Warnings on the named channel, or summed over all channels.
    pub fn warning_count(&self, name: Option<&str>) -> Result<usize> {
        Ok(self.selected(name)?.iter().map(|c| c.warnings()).sum())
    }

    pub fn has_errors(&self, name: Option<&str>) -> Result<bool> {
        Ok(self.error_count(name)? > 0)
    }

    pub fn has_warnings(&self, name: Option<&str>) -> Result<bool> {
        Ok(self.warning_count(name)? > 0)
    }

    /// Per-channel counts.
    pub fn status(&self, name: Option<&str>) -> Result<Vec<ChannelStatus>> {
        Ok(self
            .selected(name)?
            .into_iter()
            .map(|c| ChannelStatus {
                channel: c.name().to_string(),
                warnings: c.warnings(),
                errors: c.errors(),
            })
            .collect())
    }

    /// Print one status line per selected channel to stdout.
    pub fn print_status(&self, name: Option<&str>) -> Result<()> {
        for status in self.status(name)? {
            println!("{}", status);
        }
        Ok(())
    }

    /// Zero the counters of the named channel, or of every channel.
    pub fn reset(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            Some(name) => self.get_mut(name)?.reset(),
            None => self.channels.values_mut().for_each(|c| c.reset()),
        }
        Ok(())
    }
}
