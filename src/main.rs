use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use sayit::config::{Config, DEFAULT_CONFIG_PATH};
use sayit::dismissal::{Dismissal, DismissalEvent, TranscriptEvent};
use sayit::fuzzy::edit_distance;
use sayit::matcher::evaluate;
use sayit::schedule::{describe_time_until, next_alarm_time, time_until};
use sayit::{Alarm, WeeklyRepeat};

#[derive(Parser)]
#[command(name = "sayit", about = "Alarm scheduling and spoken-script dismissal")]
struct Cli {
    /// Config file (alarms and match policy)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show when an alarm would fire next
    Next {
        /// Fire time as HH:MM
        #[arg(long)]
        time: String,
        /// Days to repeat on, e.g. "mon,wed,fri", "weekdays", "daily"
        #[arg(long, default_value = "")]
        repeat: String,
        /// Evaluate as of this RFC 3339 instant instead of the clock
        #[arg(long)]
        now: Option<String>,
    },
    /// Print the edit distance between a script and a transcript
    Distance { target: String, transcript: String },
    /// Check a transcript against a script with the configured policy
    Check { target: String, transcript: String },
    /// List configured alarms, soonest first
    List {
        #[arg(long)]
        now: Option<String>,
    },
    /// Dismiss a configured alarm by reading transcripts from stdin
    /// (one per line; prefix with `~` for a partial result)
    Dismiss { index: usize },
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("sayit=info"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;
    Ok(())
}

fn main() -> Result<ExitCode> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Distance { target, transcript } => {
            println!("{}", edit_distance(&target, &transcript));
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { target, transcript } => {
            let config = Config::load(&cli.config)?;
            let result = evaluate(&target, &transcript, &config.matching);
            println!(
                "{} (distance {}, allowed {})",
                if result.accepted { "accepted" } else { "rejected" },
                result.distance,
                result.allowed
            );
            Ok(if result.accepted {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Next { time, repeat, now } => {
            let (hour, minute) = parse_hhmm(&time)?;
            let repeat: WeeklyRepeat = repeat.parse()?;
            match now {
                Some(now) => print_next(&parse_now(&now)?, hour, minute, &repeat)?,
                None => {
                    let config = Config::load(&cli.config)?;
                    match config.clock.fixed_offset() {
                        Some(offset) => {
                            print_next(&Utc::now().with_timezone(&offset), hour, minute, &repeat)?
                        }
                        None => print_next(&Local::now(), hour, minute, &repeat)?,
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::List { now } => {
            let config = Config::load(&cli.config)?;
            match now {
                Some(now) => list_alarms(&config.alarms, &parse_now(&now)?)?,
                None => match config.clock.fixed_offset() {
                    Some(offset) => {
                        list_alarms(&config.alarms, &Utc::now().with_timezone(&offset))?
                    }
                    None => list_alarms(&config.alarms, &Local::now())?,
                },
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Dismiss { index } => {
            let config = Config::load(&cli.config)?;
            let alarm = config
                .alarms
                .get(index)
                .with_context(|| format!("no alarm #{} in {}", index, cli.config.display()))?;
            info!(alarm = %alarm.title(), "ringing");
            run_dismissal(
                Dismissal::new(&alarm.scripts, config.matching),
                io::stdin().lock(),
            )?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn parse_hhmm(text: &str) -> Result<(u32, u32)> {
    let (hour, minute) = text
        .split_once(':')
        .with_context(|| format!("expected HH:MM, got {:?}", text))?;
    let hour = hour.trim().parse().context("hour is not a number")?;
    let minute = minute.trim().parse().context("minute is not a number")?;
    Ok((hour, minute))
}

fn parse_now(text: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text).with_context(|| format!("invalid RFC 3339 time {:?}", text))
}

fn print_next<Tz: TimeZone>(
    now: &DateTime<Tz>,
    hour: u32,
    minute: u32,
    repeat: &WeeklyRepeat,
) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    let next = next_alarm_time(now, hour, minute, repeat)?;
    debug!(now = %now, repeat = %repeat, "computed next fire");
    println!("{}", next.format("%a %Y-%m-%d %H:%M:%S%.3f %:z"));
    println!("Alarm in {}", describe_time_until(time_until(now, &next)));
    Ok(())
}

fn list_alarms<Tz: TimeZone>(alarms: &[Alarm], now: &DateTime<Tz>) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    if alarms.is_empty() {
        println!("No alarms configured.");
        return Ok(());
    }

    let mut scheduled = Vec::new();
    let mut disabled = Vec::new();
    for (index, alarm) in alarms.iter().enumerate() {
        if alarm.enabled {
            scheduled.push((index, alarm, alarm.next_fire(now)?));
        } else {
            disabled.push((index, alarm));
        }
    }
    scheduled.sort_by(|a, b| a.2.cmp(&b.2));

    for (index, alarm, next) in scheduled {
        println!(
            "#{:<2} {:<24} {:<20} next {} (in {})",
            index,
            alarm.title(),
            alarm.repeat.to_string(),
            next.format("%a %Y-%m-%d %H:%M"),
            describe_time_until(time_until(now, &next))
        );
    }
    for (index, alarm) in disabled {
        println!(
            "#{:<2} {:<24} {:<20} off",
            index,
            alarm.title(),
            alarm.repeat.to_string()
        );
    }
    Ok(())
}

/// Drive a dismissal from line-based transcripts. Fails if input runs out
/// before the last script is read.
fn run_dismissal(mut dismissal: Dismissal, input: impl BufRead) -> Result<()> {
    let mut out = io::stdout().lock();
    if dismissal.is_dismissed() {
        writeln!(out, "No scripts to read, alarm dismissed.")?;
        return Ok(());
    }
    prompt(&mut out, &dismissal)?;

    for line in input.lines() {
        let line = line.context("failed to read transcript")?;
        let event = match line.strip_prefix('~') {
            Some(partial) => TranscriptEvent::Preview(partial.to_string()),
            None => TranscriptEvent::Final(line),
        };

        match dismissal.handle(event) {
            DismissalEvent::Ignored => {}
            DismissalEvent::Rejected { result, .. } => {
                writeln!(
                    out,
                    "Not quite (distance {}, need {} or less). Try again.",
                    result.distance, result.allowed
                )?;
            }
            DismissalEvent::Advanced { .. } => prompt(&mut out, &dismissal)?,
            DismissalEvent::Dismissed { attempts } => {
                writeln!(out, "Alarm dismissed after {} missed attempt(s).", attempts)?;
                return Ok(());
            }
        }
    }

    bail!(
        "input ended with script {} of {} unread",
        dismissal.current_index() + 1,
        dismissal.script_count()
    )
}

fn prompt(out: &mut impl Write, dismissal: &Dismissal) -> Result<()> {
    if let Some(script) = dismissal.current_script() {
        writeln!(
            out,
            "Say ({}/{}): {}",
            dismissal.current_index() + 1,
            dismissal.script_count(),
            script
        )?;
    }
    Ok(())
}
