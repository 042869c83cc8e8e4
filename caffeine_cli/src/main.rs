use caffeine_core::input::{intake_time_today, parse_amount_mg, parse_time_of_day};
use caffeine_core::profile::validate_positive;
use caffeine_core::*;
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "caff")]
#[command(about = "Caffeine intake tracker with half-life residual estimates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Evaluate at a fixed instant (RFC 3339) instead of the current time
    #[arg(long, global = true)]
    now: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current residual estimate and state (default)
    Status {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log an intake
    Add {
        /// Caffeine amount in mg
        #[arg(long, conflicts_with = "preset", required_unless_present = "preset")]
        mg: Option<String>,

        /// Drink preset id (see `caff presets`)
        #[arg(long)]
        preset: Option<String>,

        /// Time of day today (HH:MM); defaults to now
        #[arg(long, conflicts_with = "at")]
        time: Option<String>,

        /// Exact consumption instant (RFC 3339)
        #[arg(long)]
        at: Option<String>,
    },

    /// Delete an intake by id or unique id prefix
    Delete { id: String },

    /// List today's intakes
    List {
        /// List every stored intake
        #[arg(long)]
        all: bool,
    },

    /// List drink presets
    Presets,

    /// Show or change the user profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Print the residual curve around now
    Timeline,

    /// Export all intakes to CSV
    Export { path: PathBuf },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the current profile (default)
    Show,

    /// Change profile fields; each change is saved immediately
    Set {
        /// Body weight
        #[arg(long, conflicts_with = "clear_weight")]
        weight: Option<f64>,

        /// Weight unit (kg or lb)
        #[arg(long)]
        weight_unit: Option<String>,

        /// Remove the stored weight
        #[arg(long)]
        clear_weight: bool,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        /// Bedtime (HH:MM)
        #[arg(long)]
        bedtime: Option<String>,

        /// Sensitivity (low, medium, high)
        #[arg(long)]
        sensitivity: Option<String>,

        /// Enable or disable weight-based hints (true/false)
        #[arg(long)]
        weight_hints: Option<bool>,
    },
}

/// Files the commands operate on
struct Paths {
    records: PathBuf,
    profile: PathBuf,
}

fn main() -> Result<()> {
    caffeine_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths {
        records: caffeine_core::config::records_path_in(&data_dir),
        profile: caffeine_core::config::profile_path_in(&data_dir),
    };
    let now = resolve_now(cli.now.as_deref())?;

    match cli.command {
        Some(Commands::Status { json }) => cmd_status(&paths, &now, json),
        Some(Commands::Add {
            mg,
            preset,
            time,
            at,
        }) => cmd_add(&paths, &now, mg, preset, time, at),
        Some(Commands::Delete { id }) => cmd_delete(&paths, &id),
        Some(Commands::List { all }) => cmd_list(&paths, &now, all),
        Some(Commands::Presets) => cmd_presets(),
        Some(Commands::Profile { action }) => match action {
            Some(ProfileAction::Set {
                weight,
                weight_unit,
                clear_weight,
                height,
                bedtime,
                sensitivity,
                weight_hints,
            }) => cmd_profile_set(
                &paths,
                ProfileChanges {
                    weight,
                    weight_unit,
                    clear_weight,
                    height,
                    bedtime,
                    sensitivity,
                    weight_hints,
                },
            ),
            Some(ProfileAction::Show) | None => cmd_profile_show(&paths),
        },
        Some(Commands::Timeline) => cmd_timeline(&paths, &now, &config),
        Some(Commands::Export { path }) => cmd_export(&paths, &path),
        None => cmd_status(&paths, &now, false),
    }
}

fn resolve_now(arg: Option<&str>) -> Result<DateTime<Local>> {
    match arg {
        Some(text) => Ok(parse_instant(text)?.with_timezone(&Local)),
        None => Ok(Local::now()),
    }
}

fn parse_instant(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidInput(format!("'{}' is not an RFC 3339 instant: {}", text, e)))
}

fn validated_catalog() -> Result<&'static Catalog> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }
    Ok(catalog)
}

fn cmd_status(paths: &Paths, now: &DateTime<Local>, json: bool) -> Result<()> {
    let records = JsonRecordStore::new(&paths.records).records()?;
    let profile = JsonProfileStore::new(&paths.profile).profile()?;

    let report = evaluate(&records, Some(&profile), now);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    display_report(&report, &profile);
    Ok(())
}

fn display_report(report: &CaffeineReport, profile: &UserProfile) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  CAFFEINE ESTIMATE");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Residual now:   {:.1} mg", report.residual_mg);
    println!("  Half-life estimate: {} hours", HALF_LIFE_HOURS);
    println!();
    println!("  {}", report.status.headline);
    println!("  {}", report.status.supporting_text);
    println!("  Warning: {:?}", report.status.warning_level);
    println!();
    println!("  Today's total:  {:.0} mg", report.today_total_mg);

    if let Some(latest) = report.latest_intake_at {
        println!(
            "  Latest intake:  {}",
            latest.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }

    println!(
        "  At bedtime ({}): {:.1} mg",
        profile.bedtime.format("%H:%M"),
        report.bedtime_residual_mg
    );

    if let Some(ratio) = report.latest_intake_mg_per_kg {
        println!("  Latest intake per kg: {:.2} mg/kg", ratio);
    }

    println!();
    println!("  Estimates only, not medical advice.");
    println!();
}

fn cmd_add(
    paths: &Paths,
    now: &DateTime<Local>,
    mg: Option<String>,
    preset: Option<String>,
    time: Option<String>,
    at: Option<String>,
) -> Result<()> {
    let (amount_mg, label) = match (mg, preset) {
        (Some(text), _) => (parse_amount_mg(&text)?, None),
        (None, Some(id)) => {
            let item = validated_catalog()?.require(&id)?;
            (item.fill_amount_mg(), Some(item.display_title()))
        }
        (None, None) => {
            return Err(Error::InvalidInput("either --mg or --preset is required".into()))
        }
    };

    let consumed_at = match (time, at) {
        (_, Some(instant)) => parse_instant(&instant)?,
        (Some(time), None) => {
            intake_time_today(parse_time_of_day(&time)?, now).with_timezone(&Utc)
        }
        (None, None) => now.with_timezone(&Utc),
    };

    let record = IntakeRecord::new(amount_mg, consumed_at);
    let id = record.id;
    JsonRecordStore::new(&paths.records).add(record)?;

    println!(
        "✓ Logged {:.0} mg at {}{}",
        amount_mg,
        consumed_at.with_timezone(&Local).format("%H:%M"),
        label.map(|l| format!(" ({})", l)).unwrap_or_default()
    );
    println!("  id: {}", id);
    Ok(())
}

fn cmd_delete(paths: &Paths, id_text: &str) -> Result<()> {
    let mut store = JsonRecordStore::new(&paths.records);
    let id = resolve_record_id(&store.records()?, id_text)?;

    if store.delete(id)? {
        println!("✓ Deleted intake {}", id);
    } else {
        println!("No intake {} found.", id);
    }
    Ok(())
}

/// Match a full id or a unique prefix of one
fn resolve_record_id(records: &[IntakeRecord], text: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(text) {
        return Ok(id);
    }

    let prefix = text.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(Error::InvalidInput("empty record id".into()));
    }

    let matches: Vec<_> = records
        .iter()
        .filter(|r| r.id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [only] => Ok(only.id),
        [] => Err(Error::Record(format!("no intake matches '{}'", text))),
        _ => Err(Error::Record(format!(
            "'{}' matches {} intakes; use a longer prefix",
            text,
            matches.len()
        ))),
    }
}

fn cmd_list(paths: &Paths, now: &DateTime<Local>, all: bool) -> Result<()> {
    let records = JsonRecordStore::new(&paths.records).records()?;

    let (title, shown) = if all {
        ("All Intakes", records)
    } else {
        ("Today's Intakes", today_records(&records, now))
    };

    println!("{}", title);
    if shown.is_empty() {
        if all {
            println!("  No records yet.");
        } else {
            println!("  No records yet today.");
        }
        return Ok(());
    }

    let format = if all { "%Y-%m-%d %H:%M" } else { "%H:%M" };
    for record in &shown {
        let id = record.id.to_string();
        println!(
            "  {}  {}  {:>5.0} mg",
            &id[..8],
            record.consumed_at.with_timezone(&Local).format(format),
            record.caffeine_mg
        );
    }
    Ok(())
}

fn cmd_presets() -> Result<()> {
    let catalog = validated_catalog()?;

    for category in [DrinkCategory::QuickPresets, DrinkCategory::BrandProducts] {
        println!("{}", category.display_name());
        for item in catalog.by_category(category) {
            println!(
                "  {:<26} {:<24} {:>4.0} mg  [{}]",
                item.id,
                item.display_title(),
                item.caffeine_mg,
                item.source_name
            );
        }
        println!();
    }
    Ok(())
}

fn cmd_profile_show(paths: &Paths) -> Result<()> {
    let profile = JsonProfileStore::new(&paths.profile).profile()?;
    display_profile(&profile);
    Ok(())
}

fn display_profile(profile: &UserProfile) {
    println!("Profile");
    match profile.weight_value {
        Some(w) => println!("  Weight:       {} {}", w, profile.weight_unit.as_str()),
        None => println!("  Weight:       not set"),
    }
    match profile.height_value {
        Some(h) => println!("  Height:       {} cm", h),
        None => println!("  Height:       not set"),
    }
    println!("  Bedtime:      {}", profile.bedtime.format("%H:%M"));
    println!("  Sensitivity:  {}", profile.sensitivity_level);
    println!(
        "  Weight hints: {}",
        if profile.use_weight_based_hints { "on" } else { "off" }
    );
}

struct ProfileChanges {
    weight: Option<f64>,
    weight_unit: Option<String>,
    clear_weight: bool,
    height: Option<f64>,
    bedtime: Option<String>,
    sensitivity: Option<String>,
    weight_hints: Option<bool>,
}

fn cmd_profile_set(paths: &Paths, changes: ProfileChanges) -> Result<()> {
    // Parse everything up front so a bad value changes nothing
    let unit = changes
        .weight_unit
        .as_deref()
        .map(str::parse::<WeightUnit>)
        .transpose()?;
    let bedtime = changes.bedtime.as_deref().map(parse_time_of_day).transpose()?;
    let sensitivity = changes
        .sensitivity
        .as_deref()
        .map(str::parse::<SensitivityLevel>)
        .transpose()?;

    if let Some(weight) = changes.weight {
        validate_positive("weight", weight)?;
    }
    if let Some(height) = changes.height {
        validate_positive("height", height)?;
    }

    let mut store = JsonProfileStore::new(&paths.profile);
    let profile = store.update(|p| {
        if changes.clear_weight {
            p.weight_value = None;
        } else if let Some(weight) = changes.weight {
            p.weight_value = Some(weight);
        }
        if let Some(unit) = unit {
            p.weight_unit = unit;
        }
        if let Some(height) = changes.height {
            p.height_value = Some(height);
        }
        if let Some(bedtime) = bedtime {
            p.bedtime = bedtime;
        }
        if let Some(level) = sensitivity {
            p.sensitivity_level = level;
        }
        if let Some(enabled) = changes.weight_hints {
            p.use_weight_based_hints = enabled;
        }
        Ok(())
    })?;

    println!("✓ Profile saved");
    display_profile(&profile);
    Ok(())
}

fn cmd_timeline(paths: &Paths, now: &DateTime<Local>, config: &Config) -> Result<()> {
    const BAR_WIDTH: f64 = 30.0;

    let records = JsonRecordStore::new(&paths.records).records()?;
    let profile = JsonProfileStore::new(&paths.profile).profile()?;

    let bedtime = bedtime_reference_instant(&profile, now).with_timezone(&Utc);
    let points = build_timeline(
        &records,
        now.with_timezone(&Utc),
        Some(bedtime),
        &config.timeline.window(),
    );

    let peak = points
        .iter()
        .map(|p| p.estimated_residual_mg)
        .fold(0.0_f64, f64::max);

    for point in &points {
        let filled = if peak > 0.0 {
            ((point.estimated_residual_mg.max(0.0) / peak) * BAR_WIDTH).round() as usize
        } else {
            0
        };
        let mut marker = String::new();
        if point.is_now_marker {
            marker.push_str("  ← now");
        }
        if point.is_bedtime_marker {
            marker.push_str("  ← bedtime");
        }

        println!(
            "  {}  {:>6.1} mg  {:<30}{}",
            point.time.with_timezone(&Local).format("%m-%d %H:%M"),
            point.estimated_residual_mg,
            "█".repeat(filled),
            marker
        );
    }
    Ok(())
}

fn cmd_export(paths: &Paths, path: &std::path::Path) -> Result<()> {
    let records = JsonRecordStore::new(&paths.records).records()?;
    let count = caffeine_core::export::export_records_csv(&records, path)?;

    println!("✓ Exported {} intakes to CSV", count);
    println!("  CSV: {}", path.display());
    Ok(())
}
