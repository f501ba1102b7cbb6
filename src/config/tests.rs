use super::AppConfig;
use clap::Parser;

#[test]
fn default_args_validate() {
    let mut config = AppConfig::parse_from(["soundmeter"]);
    config.validate().expect("defaults should validate");
    assert!(config.input_device.is_none());
    assert!(!config.list_input_devices);
}

#[test]
fn trims_device_name() {
    let mut config = AppConfig::parse_from(["soundmeter", "--input-device", "  USB Mic  "]);
    config.validate().expect("padded name should validate");
    assert_eq!(config.input_device.as_deref(), Some("USB Mic"));
}

#[test]
fn rejects_empty_device_name() {
    let mut config = AppConfig::parse_from(["soundmeter", "--input-device", "   "]);
    assert!(config.validate().is_err());
}

#[test]
fn rejects_shell_metacharacters_in_device_name() {
    let mut config = AppConfig::parse_from(["soundmeter", "--input-device", "mic;rm -rf"]);
    assert!(config.validate().is_err());
}

#[test]
fn rejects_control_characters_in_device_name() {
    let mut config = AppConfig::parse_from(["soundmeter", "--input-device", "mic\nname"]);
    assert!(config.validate().is_err());
}

#[test]
fn rejects_oversized_device_name() {
    let long_name = "x".repeat(300);
    let mut config = AppConfig::parse_from(["soundmeter", "--input-device", &long_name]);
    assert!(config.validate().is_err());
}
