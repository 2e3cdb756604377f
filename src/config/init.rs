use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{expand_home, get_config_path, Config};
use crate::listing::get_store_path;
use crate::scoring::{
    default_group_importance, FlatWeights, Group, HardFilters, ImportanceConfig, MatchConfig,
    ScoringMode,
};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Keep asking until `parse` accepts the answer.
fn prompt_until<T>(
    message: &str,
    default: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T> {
    loop {
        let input = prompt_with_default(message, default)?;
        match parse(&input) {
            Ok(value) => return Ok(value),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(18));
    }
    println!();
}

fn parse_mode(input: &str) -> Result<ScoringMode, String> {
    match input.to_lowercase().as_str() {
        "hierarchical" | "h" => Ok(ScoringMode::Hierarchical),
        "flat" | "f" => Ok(ScoringMode::Flat),
        other => Err(format!("unknown mode '{}', expected hierarchical or flat", other)),
    }
}

fn parse_importance(input: &str) -> Result<i32, String> {
    match input.parse::<i32>() {
        Ok(v) if (1..=5).contains(&v) => Ok(v),
        _ => Err(format!("'{}' is not a whole number from 1 to 5", input)),
    }
}

/// "0" is kept as written; the ranker reads it as no limit.
fn parse_limit(input: &str) -> Result<Option<usize>, String> {
    match input.parse::<usize>() {
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(format!("'{}' is not a non-negative whole number", input)),
    }
}

/// "none" (or nothing) leaves the filter unset.
fn parse_optional<T: std::str::FromStr>(input: &str) -> Result<Option<T>, String> {
    let input = input.trim().trim_start_matches('$').replace(',', "");
    if input.is_empty() || input.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    input
        .parse::<T>()
        .map(Some)
        .map_err(|_| format!("'{}' is not a valid number", input))
}

fn is_empty_filters(filters: &HardFilters) -> bool {
    filters == &HardFilters::default()
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("autofinder Configuration Wizard");
    println!("===============================");
    println!();

    // 1. Scoring mode
    typewriter("Hierarchical mode scores every listing on an absolute 0-100 scale from four groups of criteria.");
    typewriter("Flat mode uses seven simple weights and rescales scores across the listings it sees.");
    let mode = prompt_until("Scoring mode (hierarchical/flat)", "hierarchical", parse_mode)?;

    // 2. Result limit
    println!();
    let limit = prompt_until("How many results to show (0 for all)", "20", parse_limit)?;

    // 3. Importance
    let mut importance = ImportanceConfig::default();
    let mut flat_weights = FlatWeights::default();
    let mut body_style_preference = None;

    println!();
    match mode {
        ScoringMode::Hierarchical => {
            typewriter("Each group gets an importance from 1 (barely matters) to 5 (matters most).");
            typewriter("  economic  -- price and fuel efficiency");
            typewriter("  condition -- miles, year, age category and mechanical state");
            typewriter("  risk      -- title, accidents, odometer issues and open recalls");
            typewriter("  fit       -- seating, snow-ready drivetrain, safety and comfort");
            if !prompt_yes_no("Use the default group importance? (5/4/5/4)", true)? {
                let mut groups = BTreeMap::new();
                for group in Group::ALL {
                    let default = default_group_importance(group).to_string();
                    let level = prompt_until(&format!("  {}", group), &default, parse_importance)?;
                    groups.insert(group, level);
                }
                importance.groups = Some(groups);
            }
        }
        ScoringMode::Flat => {
            typewriter("Each flat weight runs from 0 (ignore) to 5 (matters most).");
            if !prompt_yes_no("Use equal weights for every criterion?", true)? {
                let weight = |name: &str, default: i32| {
                    prompt_until(&format!("  {}", name), &default.to_string(), |s| {
                        match s.parse::<i32>() {
                            Ok(v) if (0..=5).contains(&v) => Ok(v),
                            _ => Err(format!("'{}' is not a whole number from 0 to 5", s)),
                        }
                    })
                };
                let defaults = FlatWeights::default();
                flat_weights = FlatWeights {
                    price: weight("price", defaults.price)?,
                    mileage: weight("mileage", defaults.mileage)?,
                    year: weight("year", defaults.year)?,
                    third_row: weight("third_row", defaults.third_row)?,
                    awd: weight("awd", defaults.awd)?,
                    condition: weight("condition", defaults.condition)?,
                    body_style: weight("body_style", defaults.body_style)?,
                };
            }
            let style = prompt_with_default("Preferred body style (e.g. SUV, or none)", "none")?;
            if !style.eq_ignore_ascii_case("none") {
                body_style_preference = Some(style);
            }
        }
    }

    // 4. Hard filters
    println!();
    typewriter("Hard filters drop listings before scoring. Answer 'none' to skip one.");
    let filters = HardFilters {
        required_rows: prompt_until("Minimum seating rows", "none", parse_optional::<u32>)?,
        min_year: prompt_until("Oldest model year", "none", parse_optional::<i32>)?,
        max_price: prompt_until("Maximum price", "none", parse_optional::<u32>)?,
        max_miles: prompt_until("Maximum miles", "none", parse_optional::<u32>)?,
        ..HardFilters::default()
    };
    let filters = (!is_empty_filters(&filters)).then_some(filters);

    // 5. Listing store
    println!();
    let default_store = get_store_path();
    let store_str = prompt_with_default(
        "Where should ingested listings be kept?",
        &default_store.display().to_string(),
    )?;
    let store_path = expand_home(&PathBuf::from(&store_str));
    let listings = (store_path != default_store).then_some(store_path);

    // 6. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = expand_home(&PathBuf::from(&path_str));

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 7. Write config
    let config = Config {
        listings,
        matching: Some(MatchConfig {
            mode,
            limit,
            filters,
            importance,
            flat_weights,
            body_style_preference,
        }),
        ingest: None,
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    typewriter("Subcriterion importance and the ingest settings can be tuned later in the config file.");
    println!("Run `autofinder ingest <url>` to collect listings, then `autofinder` to rank them.");

    Ok(())
}
