//! Types command - list the resource types the directory knows

use ccrn_directory::SharedDirectory;
use console::style;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypeRow {
    type_key: String,
    plural: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    urn_template: Option<String>,
    validator: bool,
}

pub async fn run(directory: SharedDirectory, json_output: bool) -> Result<()> {
    let types = directory.list_types().await?;

    let mut rows = Vec::with_capacity(types.len());
    for info in types {
        let type_key = info.type_key();
        rows.push(TypeRow {
            validator: directory.has_validator(&type_key).await,
            type_key,
            plural: info.plural_name,
            urn_template: Some(info.urn_template).filter(|t| !t.is_empty()),
        });
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("{} No resource types found", style("⚠").yellow());
        return Ok(());
    }

    println!("{} {} resource type(s)", style("→").blue(), rows.len());
    for row in &rows {
        let validator = if row.validator {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {} {}", validator, style(&row.type_key).cyan());
        if let Some(template) = &row.urn_template {
            println!("      {}", style(template).dim());
        }
    }
    Ok(())
}
