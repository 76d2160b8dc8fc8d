//! Log line formatter that stamps each event with the wall clock and the simulation tick.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// The tick most recently completed by any simulation in this process.
static SIMULATION_TICK: AtomicU64 = AtomicU64::new(0);

/// Only the low 16 bits of the tick are printed.
const TICK_MASK: u64 = 0xFFFF;

const CLOCK_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:4]");

const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Publishes the tick the formatter prints.
pub fn record_tick(tick: u64) {
    SIMULATION_TICK.store(tick, Ordering::Relaxed);
}

pub fn current_tick() -> u64 {
    SIMULATION_TICK.load(Ordering::Relaxed)
}

/// `HH:MM:SS.ssss 0xTICK LEVEL span{fields}: target: message`
pub struct TickFormatter;

impl<S, N> FormatEvent<S, N> for TickFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let ansi = writer.has_ansi_escapes();
        let meta = event.metadata();

        let clock = OffsetDateTime::now_utc().format(&CLOCK_FORMAT).map_err(|_| fmt::Error)?;
        styled(&mut writer, ansi, DIM, clock)?;
        writer.write_char(' ')?;
        styled(&mut writer, ansi, DIM, format_args!("0x{:04X}", current_tick() & TICK_MASK))?;
        writer.write_char(' ')?;
        level(&mut writer, ansi, meta.level())?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                styled(&mut writer, ansi, BOLD, span.name())?;
                if let Some(fields) = span.extensions().get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                writer.write_str(": ")?;
            }
        }

        styled(&mut writer, ansi, DIM, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn styled(writer: &mut Writer<'_>, ansi: bool, style: &str, value: impl fmt::Display) -> fmt::Result {
    if ansi {
        write!(writer, "{style}{value}{RESET}")
    } else {
        write!(writer, "{value}")
    }
}

fn level(writer: &mut Writer<'_>, ansi: bool, level: &Level) -> fmt::Result {
    let color = match *level {
        Level::TRACE => "\x1b[35m",
        Level::DEBUG => "\x1b[34m",
        Level::INFO => "\x1b[32m",
        Level::WARN => "\x1b[33m",
        Level::ERROR => "\x1b[31m",
    };
    styled(writer, ansi, color, format_args!("{:>5}", level.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tick() {
        record_tick(0x1_2345);
        assert_eq!(current_tick(), 0x1_2345);
        assert_eq!(current_tick() & TICK_MASK, 0x2345);
    }
}
