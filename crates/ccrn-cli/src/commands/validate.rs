//! Validate command - check a resource name against the type directory

use ccrn_core::CCRN_FIELD;
use ccrn_directory::{CcrnValidator, SharedDirectory, ValidationResult};
use console::style;

use crate::error::{CliError, Result};

pub async fn run(
    directory: SharedDirectory,
    input: &str,
    template: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let validator = CcrnValidator::new(directory);
    let result = validator
        .validate_with_template(input, template.unwrap_or(""))
        .await;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::rejected(&result))
    }
}

fn print_result(result: &ValidationResult) {
    match (&result.parsed_resource, result.valid) {
        (Some(parsed), true) => {
            println!(
                "{} Valid {} for {}",
                style("✓").green().bold(),
                parsed.format,
                style(parsed.type_key()).cyan()
            );
            for (key, value) in parsed.fields.iter().filter(|(k, _)| k.as_str() != CCRN_FIELD) {
                println!("  {} = {}", style(key).dim(), value);
            }
        }
        _ => {
            println!("{} Invalid resource name", style("✗").red().bold());
            for error in &result.errors {
                println!("  {} {}", style("•").red(), error);
            }
        }
    }
    for warning in &result.warnings {
        println!("  {} {}", style("⚠").yellow(), warning);
    }
}
