use anyhow::{Context, Result};
use mcpfn_config::feature_flags::FeatureFlag;
use mcpfn_config::{DeploymentFile, DeploymentPlan, InMemoryDirectory, ResourceNames};
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::output::{print_pairs, print_success, print_value};

pub fn validate(file: &DeploymentFile) -> Result<()> {
    file.parameters
        .validate()
        .context("deployment parameters are invalid")?;
    print_success(&format!(
        "Parameters for environment '{}' in {} are valid",
        file.parameters.environment_name,
        file.parameters.normalized_location()
    ));
    Ok(())
}

pub fn names(file: &DeploymentFile, format: OutputFormat) -> Result<()> {
    file.parameters.validate()?;
    let names = ResourceNames::derive(&file.parameters);
    print_value(&serde_json::to_value(&names)?, format)
}

pub fn flags(file: &DeploymentFile, format: OutputFormat) -> Result<()> {
    print_value(&flag_rows(file), format)
}

fn flag_rows(file: &DeploymentFile) -> Value {
    let flags = file.parameters.feature_flags();
    FeatureFlag::ALL
        .iter()
        .map(|flag| {
            json!({
                "flag": flag.name(),
                "enabled": flags.is_enabled(*flag),
                "description": flag.description(),
            })
        })
        .collect()
}

pub fn compose(file: &DeploymentFile, format: OutputFormat) -> Result<()> {
    let plan = DeploymentPlan::build(file).context("composition failed")?;
    print_value(&serde_json::to_value(&plan.composition)?, format)
}

pub fn registration(file: &DeploymentFile, format: OutputFormat) -> Result<()> {
    let plan = DeploymentPlan::build(file)?;
    print_value(&serde_json::to_value(&plan.registration_request)?, format)
}

pub async fn plan(file: &DeploymentFile, simulate_registration: bool, format: OutputFormat) -> Result<()> {
    let plan = build(file, simulate_registration).await?;
    print_value(&serde_json::to_value(&plan)?, format)
}

pub async fn outputs(file: &DeploymentFile, simulate_registration: bool, format: OutputFormat) -> Result<()> {
    let plan = build(file, simulate_registration).await?;
    match format {
        OutputFormat::Json => print_value(&serde_json::to_value(&plan.outputs)?, format),
        OutputFormat::Table => print_pairs(&plan.outputs.to_pairs(), format),
    }
}

async fn build(file: &DeploymentFile, simulate_registration: bool) -> Result<DeploymentPlan> {
    if simulate_registration {
        let directory = InMemoryDirectory::new();
        DeploymentPlan::build_with_directory(file, &directory)
            .await
            .context("planning with simulated registration failed")
    } else {
        DeploymentPlan::build(file).context("planning failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_rows_follow_parameters() {
        let mut file = DeploymentFile::default();
        file.parameters.enable_queue = false;
        file.parameters.principal_id = "user-oid".into();

        let rows = flag_rows(&file);
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), FeatureFlag::ALL.len());
        assert_eq!(rows[0]["flag"], "enable_blob");
        assert_eq!(rows[0]["enabled"], true);
        assert_eq!(rows[1]["flag"], "enable_queue");
        assert_eq!(rows[1]["enabled"], false);
        assert_eq!(rows[3]["enabled"], true);
        assert!(rows.iter().all(|r| !r["description"].as_str().unwrap().is_empty()));
    }
}
