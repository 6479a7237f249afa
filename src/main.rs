use clap::Parser;
use kitchen_dispatch::app::run_scenario;
use kitchen_dispatch::utils::error::{DispatchError, ErrorSeverity};
use kitchen_dispatch::utils::{logger, validation::Validate};
use kitchen_dispatch::{CliConfig, ScenarioConfig};

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(context: &str, e: &DispatchError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.severity()).max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting kitchen-dispatch");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail("Invalid command line", &e);
    }

    tracing::info!("📁 Loading scenario from: {}", config.scenario);
    let scenario = match ScenarioConfig::from_file(&config.scenario) {
        Ok(scenario) => scenario,
        Err(e) => fail(&format!("Failed to load scenario '{}'", config.scenario), &e),
    };
    if let Err(e) = scenario.validate() {
        fail("Scenario validation failed", &e);
    }

    let dispatcher_config = config.dispatcher_config(&scenario);
    let report = match run_scenario(&scenario, dispatcher_config).await {
        Ok(report) => report,
        Err(e) => fail("Shift aborted", &e),
    };

    println!("🍽  {}", report.kitchen);
    println!("On duty at close: {}", report.on_duty.join(", "));
    for order in &report.orders {
        match &order.result {
            Ok(receipt) => {
                let rendered = match receipt.render() {
                    Ok(rendered) => rendered,
                    Err(e) => fail("Rendering order result", &e),
                };
                println!(
                    "  #{} {} -> {} served {}",
                    order.index, order.speciality, receipt.staff_id, rendered
                );
            }
            Err(e) => println!("  #{} {} -> ❌ {}", order.index, order.speciality, e.user_friendly_message()),
        }
    }
    println!(
        "✅ {} served, {} unavailable",
        report.served_count(),
        report.failed_count()
    );

    let worst = report
        .orders
        .iter()
        .filter_map(|order| order.result.as_ref().err())
        .map(DispatchError::severity)
        .max();
    if let Some(severity) = worst {
        let code = exit_code(severity);
        if code > 0 {
            std::process::exit(code);
        }
    }

    Ok(())
}
