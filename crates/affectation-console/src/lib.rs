//! Colorful console output for assignment runs.
//!
//! Provides a custom `tracing` layer that formats engine events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (run, validation, demand and solve start/end)
//! - **WARN**: Invalid preference lists and ignored overrides

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static RUN_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directives used when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVES: &str = "affectation_core=info,affectation_solver=info";

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and sets up tracing.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(AffectationConsoleLayer)
            .try_init();
    });
}

// Marks the start of a run for elapsed time tracking.
fn mark_run_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    RUN_START_NANOS.store(nanos, Ordering::Relaxed);
}

// Returns elapsed time since run start.
fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = RUN_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
    _    __  __           _        _   _
   / \  / _|/ _| ___  ___| |_ __ _| |_(_) ___  _ __
  / _ \| |_| |_ / _ \/ __| __/ _` | __| |/ _ \| '_ \
 / ___ \  _|  _|  __/ (__| || (_| | |_| | (_) | | | |
/_/   \_\_| |_|  \___|\___|\__\__,_|\__|_|\___/|_| |_|
"#;

    let version_line = format!("                 v{} - Optimal Posting Assignment\n", VERSION);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats engine events with colors.
pub struct AffectationConsoleLayer;

impl<S: Subscriber> Layer<S> for AffectationConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        // Accept events from engine crates only
        if !metadata.target().starts_with("affectation") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    posting: Option<String>,
    auditor: Option<String>,
    reason: Option<String>,
    detail: Option<String>,
    shape: Option<String>,
    capacity: Option<i64>,
    postings: Option<u64>,
    auditors: Option<u64>,
    overrides: Option<u64>,
    shapes: Option<u64>,
    seed: Option<u64>,
    keep: Option<u64>,
    declared: Option<u64>,
    valid: Option<u64>,
    invalid: Option<u64>,
    overflow: Option<u64>,
    required_count: Option<u64>,
    quotas: Option<bool>,
    zero_demand: Option<u64>,
    unclaimed_capacity: Option<u64>,
    total_capacity: Option<u64>,
    rows: Option<u64>,
    columns: Option<u64>,
    outside: Option<u64>,
    unplaced: Option<u64>,
    guaranteed_outside: Option<u64>,
    guaranteed_unplaced: Option<u64>,
    duration_ms: Option<u64>,
    total_cost: Option<f64>,
    mean_rank: Option<f64>,
    within_top_3_pct: Option<f64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "posting" => self.posting = Some(s),
            "auditor" => self.auditor = Some(s),
            "reason" => self.reason = Some(s),
            "detail" => self.detail = Some(s),
            "shape" => self.shape = Some(s),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "capacity" => self.capacity = Some(value as i64),
            "postings" => self.postings = Some(value),
            "auditors" => self.auditors = Some(value),
            "overrides" => self.overrides = Some(value),
            "shapes" => self.shapes = Some(value),
            "seed" => self.seed = Some(value),
            "keep" => self.keep = Some(value),
            "declared" => self.declared = Some(value),
            "valid" => self.valid = Some(value),
            "invalid" => self.invalid = Some(value),
            "overflow" => self.overflow = Some(value),
            "required_count" => self.required_count = Some(value),
            "zero_demand" => self.zero_demand = Some(value),
            "unclaimed_capacity" => self.unclaimed_capacity = Some(value),
            "total_capacity" => self.total_capacity = Some(value),
            "rows" => self.rows = Some(value),
            "columns" => self.columns = Some(value),
            "outside" => self.outside = Some(value),
            "unplaced" => self.unplaced = Some(value),
            "guaranteed_outside" => self.guaranteed_outside = Some(value),
            "guaranteed_unplaced" => self.guaranteed_unplaced = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match field.name() {
            "capacity" => self.capacity = Some(value),
            _ => self.record_u64(field, value.max(0) as u64),
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "total_cost" => self.total_cost = Some(value),
            "mean_rank" => self.mean_rank = Some(value),
            "within_top_3_pct" => self.within_top_3_pct = Some(value),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "quotas" {
            self.quotas = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "posting" => self.posting = Some(value.to_string()),
            "auditor" => self.auditor = Some(value.to_string()),
            "reason" => self.reason = Some(value.to_string()),
            "detail" => self.detail = Some(value.to_string()),
            "shape" => self.shape = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "run_start" => format_run_start(v),
        "run_end" => format_run_end(v),
        "posting_skipped" => format_posting_skipped(v),
        "posting_unclaimed" => format_posting_unclaimed(v),
        "override_applied" => format_override_applied(v),
        "override_ignored" => format_override_ignored(v),
        "auditor_invalid" => format_auditor_invalid(v, level),
        "validation_end" => format_validation_end(v),
        "demand_end" => format_demand_end(v),
        "solve_start" => format_solve_start(v),
        "solve_end" => format_solve_end(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_run_start(v: &EventVisitor) -> String {
    mark_run_start();

    format!(
        "{} {} Assigning │ {} auditors │ {} postings │ {} overrides │ {} shapes │ seed {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        count(v.auditors).bright_yellow(),
        count(v.postings).bright_yellow(),
        count(v.overrides).bright_yellow(),
        count(v.shapes).bright_yellow(),
        v.seed.unwrap_or(0).bright_magenta()
    )
}

fn format_posting_skipped(v: &EventVisitor) -> String {
    format!(
        "{} {} Posting {} skipped (capacity {})",
        format_elapsed(),
        "·".bright_black(),
        v.posting.as_deref().unwrap_or("?").white(),
        v.capacity.unwrap_or(0)
    )
    .bright_black()
    .to_string()
}

fn format_posting_unclaimed(v: &EventVisitor) -> String {
    format!(
        "{} {} Posting {} unclaimed │ {} seats",
        format_elapsed(),
        "○".yellow(),
        v.posting.as_deref().unwrap_or("?").white().bold(),
        v.capacity.unwrap_or(0).yellow()
    )
}

fn format_override_applied(v: &EventVisitor) -> String {
    format!(
        "{} {} Auditor {} capped at {} of {} preferences",
        format_elapsed(),
        "✂".bright_blue(),
        v.auditor.as_deref().unwrap_or("?").white().bold(),
        count(v.keep).bright_yellow(),
        count(v.declared)
    )
}

fn format_override_ignored(v: &EventVisitor) -> String {
    format!(
        "{} {} Override for unknown auditor {} ignored",
        format_elapsed(),
        "⚠".yellow().bold(),
        v.auditor.as_deref().unwrap_or("?").yellow()
    )
}

fn format_auditor_invalid(v: &EventVisitor, level: Level) -> String {
    let icon = if level == Level::WARN {
        "✗".bright_red().to_string()
    } else {
        "✗".red().to_string()
    };

    format!(
        "{} {} Auditor {} invalid │ {} │ {}",
        format_elapsed(),
        icon,
        v.auditor.as_deref().unwrap_or("?").white().bold(),
        v.reason.as_deref().unwrap_or("?").bright_red(),
        v.detail.as_deref().unwrap_or("").bright_black()
    )
}

fn format_validation_end(v: &EventVisitor) -> String {
    let invalid = v.invalid.unwrap_or(0);
    let invalid_str = if invalid > 0 {
        count(v.invalid).bright_red().to_string()
    } else {
        count(v.invalid).bright_green().to_string()
    };

    let mut output = format!(
        "{} {} Validation │ {} valid │ {} invalid │ {} overflow │ {} required",
        format_elapsed(),
        "◀".bright_blue(),
        count(v.valid).bright_green(),
        invalid_str,
        count(v.overflow).white(),
        count(v.required_count).white()
    );

    if v.quotas == Some(false) {
        output.push_str(&format!(" │ {}", "quotas off".bright_magenta()));
    }

    output
}

fn format_demand_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Demand │ {} postings │ {} unclaimed │ {}/{} seats unclaimed",
        format_elapsed(),
        "◀".bright_blue(),
        count(v.postings).white(),
        count(v.zero_demand).yellow(),
        count(v.unclaimed_capacity).yellow(),
        count(v.total_capacity).white()
    )
}

fn format_solve_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} started │ {} × {} matrix",
        format_elapsed(),
        "▶".bright_blue(),
        v.shape.as_deref().unwrap_or("?").white().bold(),
        count(v.rows).bright_yellow(),
        count(v.columns).bright_yellow()
    )
}

fn format_solve_end(v: &EventVisitor) -> String {
    let outside = v.outside.unwrap_or(0);
    let outside_str = if outside > 0 {
        count(v.outside).yellow().to_string()
    } else {
        count(v.outside).bright_green().to_string()
    };

    let mut output = format!(
        "{} {} {} ended │ {} │ mean rank {} │ top-3 {} │ {} outside",
        format_elapsed(),
        "◀".bright_blue(),
        v.shape.as_deref().unwrap_or("?").white().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        format!("{:.2}", v.mean_rank.unwrap_or(0.0))
            .bright_magenta()
            .bold(),
        format!("{:.1}%", v.within_top_3_pct.unwrap_or(0.0)).bright_magenta(),
        outside_str
    );

    if let Some(unplaced) = v.unplaced.filter(|&n| n > 0) {
        output.push_str(&format!(
            " │ {} unplaced",
            unplaced.to_formatted_string(&Locale::en).bright_red()
        ));
    }

    if let Some(cost) = v.total_cost {
        output.push_str(&format!(" │ cost {}", format_cost(cost).white()));
    }

    output
}

fn format_run_end(v: &EventVisitor) -> String {
    let invalid = v.invalid.unwrap_or(0);
    let guaranteed = v.guaranteed_outside.unwrap_or(0);
    let unplaced = v.guaranteed_unplaced.unwrap_or(0);

    let mut output = format!(
        "{} {} Assignment complete │ {} shapes │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        count(v.shapes).white(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow()
    );

    // Summary box
    output.push_str("\n\n");
    output.push_str(
        &"╔══════════════════════════════════════════════════════════╗"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    let status_text = if invalid == 0 {
        "ALL PREFERENCE LISTS VALID"
    } else {
        "SOME PREFERENCE LISTS INVALID"
    };
    let inner_width: usize = 58;
    let total_pad = inner_width.saturating_sub(status_text.len());
    let left_pad = total_pad / 2;
    let right_pad = total_pad - left_pad;
    let status_colored = if invalid == 0 {
        status_text.bright_green().bold().to_string()
    } else {
        status_text.yellow().bold().to_string()
    };
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');

    output.push_str(
        &"╠══════════════════════════════════════════════════════════╣"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    for (label, value) in [
        ("Valid lists:", count(v.valid)),
        ("Invalid lists:", count(v.invalid)),
        ("Guaranteed outside:", guaranteed.to_formatted_string(&Locale::en)),
        ("Guaranteed unplaced:", unplaced.to_formatted_string(&Locale::en)),
    ] {
        output.push_str(&format!(
            "{}  {:<22}{:>32}  {}",
            "║".bright_cyan(),
            label,
            value,
            "║".bright_cyan()
        ));
        output.push('\n');
    }

    output.push_str(
        &"╚══════════════════════════════════════════════════════════╝"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    output
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

// Penalty-sized costs are shown in scientific notation.
fn format_cost(cost: f64) -> String {
    if cost.abs() >= 1e6 {
        format!("{:.3e}", cost)
    } else {
        format!("{:.2}", cost)
    }
}
