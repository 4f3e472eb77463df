//! Convert command - print both surface forms of a valid resource name

use ccrn_directory::{CcrnValidator, SharedDirectory};
use console::style;

use crate::error::{CliError, Result};

pub async fn run(directory: SharedDirectory, input: &str, json_output: bool) -> Result<()> {
    let validator = CcrnValidator::new(directory);
    let result = validator.complete(input).await;

    if !result.valid {
        if json_output {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{} Invalid resource name", style("✗").red().bold());
            for error in &result.errors {
                println!("  {} {}", style("•").red(), error);
            }
        }
        return Err(CliError::rejected(&result));
    }

    if json_output {
        let output = serde_json::json!({
            "fieldList": result.conversion.as_ref().map(|c| c.field_list.clone()),
            "urn": result.conversion.as_ref().and_then(|c| c.urn.clone()),
            "warnings": result.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match &result.conversion {
        Some(conversion) => {
            println!("{}  {}", style("CCRN").bold(), conversion.field_list);
            match &conversion.urn {
                Some(urn) => println!("{}   {}", style("URN").bold(), urn),
                None => println!("{}   {}", style("URN").bold(), style("(none)").dim()),
            }
        }
        None => println!("{} No conversion available", style("⚠").yellow()),
    }
    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }
    Ok(())
}
