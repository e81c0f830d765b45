//! Console commands

use core::convert::Infallible;

use defmt::info;
use embedded_io::Write;
use inclino_console::{parse_angle, Command, ConsoleError};

use crate::serial::Port;

/// Gauge state the console can inspect and change
#[derive(Debug, Default)]
pub struct Gauge {
    /// Angle in degrees at which the gauge signals, if set
    pub target: Option<u16>,
}

type Reply = Result<(), ConsoleError<Infallible>>;

pub const COMMANDS: &[Command<Port, Gauge>] = &[
    Command {
        name: "stats",
        arity: 0,
        help: "Show receive drop counters",
        handler: stats,
    },
    Command {
        name: "clear",
        arity: 0,
        help: "Reset receive drop counters",
        handler: clear,
    },
    Command {
        name: "target",
        arity: 1,
        help: "Set the target angle in degrees (0-180)",
        handler: target,
    },
];

fn stats(port: &mut Port, gauge: &mut Gauge, _args: &[&str]) -> Reply {
    let drops = port.drops();
    write!(
        port,
        "Dropped: overflow {}  overrun {}  framing {}  parity {}\r\n",
        drops.rx_overflow, drops.overrun, drops.framing, drops.parity
    )?;
    match gauge.target {
        Some(angle) => write!(port, "Target angle: {angle} degrees\r\n")?,
        None => write!(port, "Target angle: not set\r\n")?,
    }
    Ok(())
}

fn clear(port: &mut Port, _gauge: &mut Gauge, _args: &[&str]) -> Reply {
    port.reset_drops();
    write!(port, "Drop counters cleared\r\n")?;
    Ok(())
}

fn target(port: &mut Port, gauge: &mut Gauge, args: &[&str]) -> Reply {
    let angle = parse_angle(args[0])?;
    gauge.target = Some(angle);
    info!("Target angle set to {}", angle);
    write!(port, "Gauge signals when oriented at {angle} degrees\r\n")?;
    Ok(())
}
