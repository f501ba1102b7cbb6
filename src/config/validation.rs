use super::defaults::{FORBIDDEN_DEVICE_CHARS, MAX_DEVICE_NAME_CHARS};
use super::AppConfig;
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize the device name.
    pub fn validate(&mut self) -> Result<()> {
        if let Some(device) = &mut self.input_device {
            let trimmed = device.trim();
            if trimmed.is_empty() {
                bail!("--input-device cannot be empty");
            }
            if trimmed.chars().count() > MAX_DEVICE_NAME_CHARS {
                bail!("--input-device must be <={MAX_DEVICE_NAME_CHARS} characters");
            }
            // The name is matched against backend device names; keep it free of
            // control and shell metacharacters.
            if trimmed
                .chars()
                .any(|ch| ch.is_control() || FORBIDDEN_DEVICE_CHARS.contains(&ch))
            {
                bail!("--input-device must not contain control or shell metacharacters");
            }
            *device = trimmed.to_string();
        }
        Ok(())
    }
}
