//! CLI output formatting

use crate::error::Result;
use crate::variables::VersionVariables;
use console::style;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print the full variable set in the selected format
pub fn display_variables(variables: &VersionVariables, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => display_variable_table(variables),
        OutputFormat::Json => display_json(variables)?,
    }
    Ok(())
}

fn display_variable_table(variables: &VersionVariables) {
    println!(
        "\n{} {}",
        style("Version:").bold(),
        style(&variables.full_sem_ver).green().bold()
    );
    println!();

    let rows = [
        ("Major", variables.major.to_string()),
        ("Minor", variables.minor.to_string()),
        ("Patch", variables.patch.to_string()),
        ("MajorMinorPatch", variables.major_minor_patch.clone()),
        (
            "PreReleaseTag",
            variables.pre_release_tag.clone().unwrap_or_default(),
        ),
        ("SemVer", variables.sem_ver.clone()),
        ("FullSemVer", variables.full_sem_ver.clone()),
        (
            "BuildMetaData",
            variables.build_metadata.clone().unwrap_or_default(),
        ),
        ("BranchName", variables.branch_name.clone()),
        ("Sha", variables.sha.clone()),
        ("ShortSha", variables.short_sha.clone()),
        ("CommitDate", variables.commit_date.clone()),
        (
            "VersionSourceSha",
            variables.version_source_sha.clone().unwrap_or_default(),
        ),
        (
            "CommitsSinceVersionSource",
            variables.commits_since_version_source.to_string(),
        ),
    ];

    for (name, value) in rows {
        println!("  {:<26} {}", style(name).cyan(), value);
    }
}

fn display_json(variables: &VersionVariables) -> Result<()> {
    let json = serde_json::to_string_pretty(variables)
        .map_err(|e| crate::error::GitVerError::cache(format!("Cannot serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Print a single variable's value, or an error when the name is unknown
pub fn display_single_variable(variables: &VersionVariables, name: &str) -> Result<()> {
    match variables.get(name) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(crate::error::GitVerError::config(format!(
            "Unknown variable '{}'",
            name
        ))),
    }
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}
