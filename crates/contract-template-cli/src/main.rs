use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use contract_template_config::Config;
use contract_template_engine::{
    Converter, NodeDescriptor, RoundTrip, WrapperState, check_round_trip, io, nodes,
};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "contract-template")]
#[command(about = "Convert contract templates between stored and editable form")]
#[command(version)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a stored template into the editable fragment
    ToEditable {
        /// Stored template file, or `-` for stdin
        input: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert an editable fragment back into a stored template
    ToStored {
        /// Editable fragment file, or `-` for stdin
        input: PathBuf,

        /// Stored template whose document shell should wrap the result
        #[arg(long)]
        shell: Option<PathBuf>,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that every template in a directory survives an unedited load and save
    Check {
        /// Templates directory (defaults to `templates_path` from the config)
        dir: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the node definitions the host editor registers
    Schema,

    /// Print the editor node for a single template construct
    Describe {
        /// e.g. `{{ rental_value | currency }}` or `{% for t in tenants %}`
        construct: String,
    },
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref())?;
    let converter = Converter::new(
        config
            .as_ref()
            .map(|c| c.converter.clone())
            .unwrap_or_default(),
    );

    match cli.command {
        Commands::ToEditable { input, output } => {
            let stored = read_input(&input)?;
            write_output(output.as_deref(), &converter.to_editable(&stored))?;
        }
        Commands::ToStored {
            input,
            shell,
            output,
        } => {
            let editable = read_input(&input)?;
            let wrapper = match shell {
                Some(path) => WrapperState::capture(&read_input(&path)?),
                None => WrapperState::default(),
            };
            write_output(output.as_deref(), &converter.to_stored(&editable, &wrapper))?;
        }
        Commands::Check { dir, json } => {
            let dir = match dir.or_else(|| config.and_then(|c| c.templates_path)) {
                Some(dir) => dir,
                None => bail!(
                    "No templates directory given and none configured in {}",
                    Config::config_path().display()
                ),
            };
            return check_directory(&dir, &converter, json);
        }
        Commands::Schema => {
            let schema = nodes::schema(&converter.options().page_break_class);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Describe { construct } => match NodeDescriptor::from_template(&construct) {
            Some(descriptor) => {
                println!("{}", serde_json::to_string_pretty(&descriptor.to_json())?)
            }
            None => bail!("Not a single template construct: {construct:?}"),
        },
    }
    Ok(0)
}

fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let config = match path {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file {} not found", path.display()))
            .map(Some)?,
        None => Config::load()?,
    };
    if config.is_some() {
        log::info!(
            "Using config from {}",
            path.map(Path::to_path_buf)
                .unwrap_or_else(Config::config_path)
                .display()
        );
    }
    Ok(config)
}

/// Round-trips every template under `dir`. Returns the process exit code.
fn check_directory(dir: &Path, converter: &Converter, json: bool) -> Result<i32> {
    let templates = io::list_templates(dir)
        .with_context(|| format!("Failed to scan templates in {}", dir.display()))?;
    log::info!("Checking {} templates in {}", templates.len(), dir.display());

    let mut changed = 0;
    let mut results = Vec::with_capacity(templates.len());
    for template in &templates {
        let stored = io::read_template(template.relative_path(), dir)?;
        let result = check_round_trip(&stored, converter);
        if result.is_changed() {
            changed += 1;
        }
        results.push((template.display_path(), result));
    }

    if json {
        let report: Vec<_> = results
            .iter()
            .map(|(path, result)| serde_json::json!({ "path": path, "round_trip": result }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (path, result) in &results {
            println!("{}", describe_result(path, result));
        }
        println!("{} checked, {} changed", results.len(), changed);
    }

    Ok(if changed > 0 { 1 } else { 0 })
}

fn describe_result(path: &str, result: &RoundTrip) -> String {
    match result {
        RoundTrip::Identical => format!("ok        {path}"),
        RoundTrip::Normalized => format!("normalized {path}"),
        RoundTrip::Changed { first_difference } => {
            format!("CHANGED   {path} (first difference at byte {first_difference})")
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_config_after_subcommand() {
        let cli = Cli::parse_from(["contract-template", "schema", "--config", "c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn check_exit_code_reflects_changes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lease.html"), "<p>{{ tenant.name }}</p>").unwrap();
        let converter = Converter::default();
        assert_eq!(check_directory(dir.path(), &converter, true).unwrap(), 0);

        fs::write(
            dir.path().join("broken.html"),
            r#"<div data-type="raw-block" data-raw-html="%3Cb%3E">y</div>"#,
        )
        .unwrap();
        assert_eq!(check_directory(dir.path(), &converter, false).unwrap(), 1);
    }

    #[test]
    fn check_fails_on_missing_directory() {
        let result = check_directory(Path::new("/no/such/templates"), &Converter::default(), false);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn result_lines() {
        assert_eq!(describe_result("a.html", &RoundTrip::Identical), "ok        a.html");
        let changed = describe_result("a.html", &RoundTrip::Changed { first_difference: 3 });
        assert!(changed.contains("byte 3"));
    }
}
