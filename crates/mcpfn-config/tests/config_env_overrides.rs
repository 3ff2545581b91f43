use std::env;
use std::fs;

use mcpfn_config::DeploymentFile;

#[test]
fn env_overrides_parameters_but_not_app_settings() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("mcpfn.toml");
    let toml_content = r#"
[parameters]
environment_name = "dev"
location = "eastus"
subscription_id = "sub-from-file"

[app_settings]
MixedCase_Setting = "1"
lower_setting = "2"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) File values load as written
    let file = DeploymentFile::load(Some(&path)).expect("should load deployment file");
    assert_eq!(file.parameters.location, "eastus");
    assert_eq!(file.parameters.subscription_id, "sub-from-file");

    // 2) Env override should win over file
    unsafe {
        env::set_var("MCPFN__PARAMETERS__LOCATION", "westus2");
    }
    let overridden = DeploymentFile::load(Some(&path));
    // cleanup env var before asserting
    unsafe {
        env::remove_var("MCPFN__PARAMETERS__LOCATION");
    }
    let overridden = overridden.expect("should load with env overrides");
    assert_eq!(overridden.parameters.location, "westus2");
    assert_eq!(overridden.parameters.environment_name, "dev");
    assert_eq!(overridden.parameters.subscription_id, "sub-from-file");

    // 3) Setting names keep their case
    assert_eq!(overridden.app_settings.get("MixedCase_Setting").map(String::as_str), Some("1"));
    assert_eq!(overridden.app_settings.get("lower_setting").map(String::as_str), Some("2"));
    assert!(!overridden.app_settings.contains_key("mixedcase_setting"));
    assert_eq!(overridden.app_settings.len(), 2);
}
