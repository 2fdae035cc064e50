use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

use gainrs::export::{self, text};
use gainrs::{
    ActivityLevel, AppConfig, BasicInfoUpdate, ExportFormat, Gender, GoalSettingsUpdate,
    IssueSeverity, JsonFileStore, PlanReport, PlanSession, ProfileValidator, ValidationIssue,
};

/// gainrs - Weight Gain Nutrition Planner
///
/// Estimates BMR and TDEE, derives a daily calorie target with a lean-gain
/// surplus, splits it into protein, fat and carbohydrate, and projects body
/// weight week by week.
#[derive(Parser)]
#[command(name = "gainrs")]
#[command(version)]
#[command(about = "Weight gain nutrition planner", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the stored profile
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update biometric inputs
    Profile {
        /// male or female
        #[arg(short, long)]
        gender: Option<Gender>,

        /// Age in years
        #[arg(short, long)]
        age: Option<u32>,

        /// Height in centimetres
        #[arg(long)]
        height: Option<f64>,

        /// Current weight in kilograms
        #[arg(short, long)]
        weight: Option<f64>,

        /// sedentary, light, moderate, active or very_active
        #[arg(long)]
        activity: Option<ActivityLevel>,
    },

    /// Update the weight goal
    Goal {
        /// Target weight in kilograms
        #[arg(short, long)]
        target_weight: Option<f64>,

        /// Timeframe in weeks
        #[arg(short = 'w', long)]
        timeframe: Option<u32>,

        /// Remove the target weight
        #[arg(long, conflicts_with = "target_weight")]
        clear_target: bool,
    },

    /// Recompute and store the nutrition plan
    Calculate,

    /// Show the week-by-week weight projection
    Project,

    /// Show the stored profile and last results
    Show,

    /// Export the plan report
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (json, text)
        #[arg(short = 'f', long, default_value = "json")]
        format: String,
    },

    /// Discard the stored profile
    Reset,

    /// Configure application settings
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        list: bool,

        /// Print the configuration file path
        #[arg(short, long)]
        path: bool,

        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default_from(&config_path)?;

    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    if cli.no_color || !config.display.color {
        colored::control::set_override(false);
    }

    let log_config = config.logging.clone().with_verbosity(cli.verbose);
    gainrs::logging::init_logging(&log_config)?;
    tracing::debug!(config = %config_path.display(), "Configuration loaded");

    let store = JsonFileStore::new(&config.storage.data_dir);
    let mut session = PlanSession::open_with_key(store, &config.storage.profile_key)
        .context("Failed to open the stored profile")?;

    match cli.command {
        Commands::Profile {
            gender,
            age,
            height,
            weight,
            activity,
        } => {
            let update = BasicInfoUpdate {
                gender,
                age: age.map(Some),
                height: height.map(Some),
                weight: weight.map(Some),
                activity_level: activity.map(Some),
            };
            if update.is_empty() {
                bail!("Nothing to update; pass at least one of --gender, --age, --height, --weight, --activity");
            }

            let mut candidate = session.profile().clone();
            candidate.apply_basic_info(&update);
            check_issues(&ProfileValidator::validate_basic_info(&candidate))?;

            let changed = session.update_user_info(&update)?;
            print_update_outcome(changed);
        }

        Commands::Goal {
            target_weight,
            timeframe,
            clear_target,
        } => {
            let target_weight = if clear_target {
                Some(None)
            } else {
                target_weight.map(Some)
            };
            let update = GoalSettingsUpdate {
                target_weight,
                timeframe,
            };
            if update.is_empty() {
                bail!("Nothing to update; pass --target-weight, --timeframe or --clear-target");
            }

            let mut candidate = session.profile().clone();
            candidate.apply_goal_settings(&update);
            check_issues(&ProfileValidator::validate_goal_settings(&candidate))?;

            let changed = session.update_goal_settings(&update)?;
            print_update_outcome(changed);
        }

        Commands::Calculate => {
            check_issues(&ProfileValidator::validate(session.profile()))?;

            println!("{}", "Calculating nutrition plan...".blue().bold());
            let result = session.calculate_nutrition()?;
            let report = PlanReport::new(session.profile(), result);

            println!("{}", text::render_nutrition(&report, config.display.table_style));
            print_notes(&report);
            println!("{}", "✓ Plan saved".green());
        }

        Commands::Project => {
            let projection = session.weight_projection();
            if projection.is_empty() {
                println!(
                    "{}",
                    "No projection: set a current weight and a target weight first".yellow()
                );
                return Ok(());
            }

            let report = PlanReport::from_profile(session.profile());
            println!(
                "{}",
                format!(
                    "Projection over {} weeks at {} kg/week",
                    projection.weeks(),
                    projection.weekly_gain()
                )
                .cyan()
                .bold()
            );
            println!("{}", text::render_projection(&report, config.display.table_style));

            let time_to_goal = session.time_to_goal();
            if time_to_goal > 0 {
                println!("Estimated time to goal: {} weeks", time_to_goal);
            }
        }

        Commands::Show => {
            let style = config.display.table_style;
            let profile = session.profile();

            match session.cached_result() {
                Some(result) => {
                    let report = PlanReport::new(profile, result);
                    println!("{}", text::render_inputs(&report, style));
                    println!("{}", text::render_nutrition(&report, style));
                    if session.is_stale() {
                        println!(
                            "{}",
                            "⚠ Inputs changed since the last calculation; run `gainrs calculate`"
                                .yellow()
                        );
                    }
                }
                None => {
                    let report = PlanReport::from_profile(profile);
                    println!("{}", text::render_inputs(&report, style));
                    println!("{}", "No plan calculated yet; run `gainrs calculate`".yellow());
                }
            }
        }

        Commands::Export { output, format } => {
            let format: ExportFormat = format.parse()?;
            let report = match session.cached_result() {
                Some(result) if !session.is_stale() => PlanReport::new(session.profile(), result),
                _ => PlanReport::from_profile(session.profile()),
            };

            export::export_report(&report, format, config.display.table_style, &output)
                .with_context(|| format!("Failed to export report to {}", output.display()))?;
            println!(
                "{}",
                format!("✓ Report written to {}", output.display()).green()
            );
        }

        Commands::Reset => {
            session.reset()?;
            println!("{}", "✓ Profile reset to defaults".green());
        }

        Commands::Config { list, path, init } => {
            handle_config(&mut config, &config_path, list, path, init)?;
        }
    }

    Ok(())
}

fn handle_config(
    config: &mut AppConfig,
    config_path: &Path,
    list: bool,
    path: bool,
    init: bool,
) -> Result<()> {
    if path {
        println!("{}", config_path.display());
    }

    if init {
        if config_path.exists() {
            println!(
                "{}",
                format!("Config already exists at {}", config_path.display()).yellow()
            );
        } else {
            config.save_to_file(config_path)?;
            println!(
                "{}",
                format!("✓ Config written to {}", config_path.display()).green()
            );
        }
    }

    if list || !(path || init) {
        let content = toml::to_string_pretty(config).context("Failed to render configuration")?;
        println!("{}", content);
    }

    Ok(())
}

/// Print warnings; fail when any issue is an error
fn check_issues(issues: &[ValidationIssue]) -> Result<()> {
    for issue in issues {
        match issue.severity {
            IssueSeverity::Error => eprintln!("{} {}", "✗".red(), issue.to_string().red()),
            IssueSeverity::Warning => eprintln!("{} {}", "⚠".yellow(), issue),
        }
    }

    if ProfileValidator::has_errors(issues) {
        bail!("Invalid input, nothing was saved");
    }
    Ok(())
}

fn print_update_outcome(changed: bool) {
    if changed {
        println!("{}", "✓ Profile updated".green());
        println!("{}", "Run `gainrs calculate` to refresh the plan".dimmed());
    } else {
        println!("{}", "Profile unchanged".dimmed());
    }
}

fn print_notes(report: &PlanReport) {
    for note in &report.notes {
        println!("{} {}", "•".cyan(), note);
    }
}
