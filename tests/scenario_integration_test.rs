use anyhow::Result;
use kitchen_dispatch::app::run_scenario;
use kitchen_dispatch::utils::validation::Validate;
use kitchen_dispatch::{DispatchError, DispatcherConfig, EmptyOrderPolicy, ScenarioConfig};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_sample_scenario_file_runs() -> Result<()> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("kitchen-scenario.toml");
    let scenario = ScenarioConfig::from_file(path)?;
    scenario.validate()?;

    let report = run_scenario(&scenario, scenario.dispatcher_config()).await?;

    assert_eq!(report.kitchen, "Lunch service");
    assert_eq!(report.on_duty, vec!["w1", "w2"]);
    assert_eq!(report.orders.len(), 3);
    assert_eq!(report.served_count(), 2);
    assert_eq!(report.failed_count(), 1);

    let burger = report.orders[0].result.as_ref().expect("burger is served");
    assert_eq!(burger.staff_id, "w1");
    assert_eq!(burger.result, json!("cooked-burger"));

    let fish = report.orders[1].result.as_ref().expect("fish is served");
    assert_eq!(fish.staff_id, "w2");
    assert_eq!(fish.result, json!("fried-fish-and-chips"));

    assert!(matches!(
        report.orders[2].result,
        Err(DispatchError::NoSuitableStaffFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_scenario_from_temp_file_with_policy() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"
[kitchen]
name = "Breakfast"

[[staff]]
id = "early"
speciality = ["fry", "toast"]

[[orders]]
speciality = []
payload = "surprise"

[[orders]]
speciality = "toast"
payload = { item = "toast", slices = 2 }
"#,
    )?;

    let scenario = ScenarioConfig::from_file(file.path())?;

    let permissive = run_scenario(&scenario, DispatcherConfig::default()).await?;
    assert_eq!(permissive.served_count(), 2);
    assert_eq!(
        permissive.orders[1].result.as_ref().unwrap().result,
        json!(r#"cooked-{"item":"toast","slices":2}"#)
    );

    let strict = run_scenario(
        &scenario,
        DispatcherConfig {
            empty_order_policy: EmptyOrderPolicy::Reject,
            ..DispatcherConfig::default()
        },
    )
    .await?;
    assert_eq!(strict.served_count(), 1);
    assert!(matches!(
        strict.orders[0].result,
        Err(DispatchError::InvalidScope { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_reregistered_staff_serves_with_new_declaration() -> Result<()> {
    let scenario = ScenarioConfig::from_toml_str(
        r#"
[kitchen]
name = "Shift change"

[[staff]]
id = "w1"
speciality = "grill"

[[staff]]
id = "w1"
speciality = "bake"
result_prefix = "baked"

[[orders]]
speciality = "grill"
payload = "burger"

[[orders]]
speciality = "bake"
payload = "bread"
"#,
    )?;
    scenario.validate()?;

    let report = run_scenario(&scenario, DispatcherConfig::default()).await?;
    assert_eq!(report.on_duty, vec!["w1"]);
    assert!(report.orders[0].result.is_err());
    assert_eq!(
        report.orders[1].result.as_ref().unwrap().result,
        json!("baked-bread")
    );
    Ok(())
}
