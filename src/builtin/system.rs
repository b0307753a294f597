//! Built-ins that format [`SystemMonitor`](crate::monitor::SystemMonitor) records.

use super::BuiltinCommand;
use crate::command::{Context, ExitCode};
use crate::monitor::{format_bytes, format_uptime};
use anyhow::Result;
use argh::FromArgs;
use chrono::Local;
use std::io::Write;

#[derive(FromArgs)]
/// Display the amount of free and used memory.
pub struct Free {
    #[argh(switch, short = 'h')]
    /// show sizes with unit suffixes instead of kibibytes.
    pub human: bool,
}

impl BuiltinCommand for Free {
    fn name() -> &'static str {
        "free"
    }

    fn summary() -> &'static str {
        "Show memory usage"
    }

    fn usage() -> &'static str {
        "free [-h]"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let mem = ctx.monitor.memory()?;
        let size = |bytes: u64| {
            if self.human {
                format_bytes(bytes)
            } else {
                (bytes / 1024).to_string()
            }
        };
        writeln!(
            ctx.stdout,
            "{:<7}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12}",
            "", "total", "used", "free", "shared", "buff/cache", "available"
        )?;
        writeln!(
            ctx.stdout,
            "{:<7}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12}",
            "Mem:",
            size(mem.total),
            size(mem.used()),
            size(mem.free),
            size(mem.shared),
            size(mem.buffers + mem.cached),
            size(mem.available)
        )?;
        writeln!(
            ctx.stdout,
            "{:<7}{:>12}{:>12}{:>12}",
            "Swap:",
            size(mem.swap_total),
            size(mem.swap_used()),
            size(mem.swap_free)
        )?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Report file system disk space usage.
pub struct Df {
    #[argh(switch, short = 'h')]
    /// show sizes with unit suffixes instead of 1K blocks.
    pub human: bool,
}

impl BuiltinCommand for Df {
    fn name() -> &'static str {
        "df"
    }

    fn summary() -> &'static str {
        "Show disk usage"
    }

    fn usage() -> &'static str {
        "df [-h]"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let disks = ctx.monitor.disks()?;
        let (size_header, width) = if self.human { ("Size", 6) } else { ("1K-blocks", 10) };
        let avail_header = if self.human { "Avail" } else { "Available" };
        writeln!(
            ctx.stdout,
            "{:<20} {:>w$} {:>w$} {:>w$} {:>5} Mounted on",
            "Filesystem",
            size_header,
            "Used",
            avail_header,
            "Use%",
            w = width
        )?;
        for disk in disks {
            let size = |bytes: u64| {
                if self.human {
                    format_bytes(bytes)
                } else {
                    (bytes / 1024).to_string()
                }
            };
            writeln!(
                ctx.stdout,
                "{:<20} {:>w$} {:>w$} {:>w$} {:>4}% {}",
                disk.device,
                size(disk.total),
                size(disk.used),
                size(disk.available),
                disk.use_percent(),
                disk.mount_point,
                w = width
            )?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Report a snapshot of the running processes.
pub struct Ps {}

impl BuiltinCommand for Ps {
    fn name() -> &'static str {
        "ps"
    }

    fn summary() -> &'static str {
        "Show running processes"
    }

    fn usage() -> &'static str {
        "ps"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let processes = ctx.monitor.processes()?;
        writeln!(ctx.stdout, "{:>7} {:>7} {:>1} {:>8} {:>9} CMD", "PID", "PPID", "S", "RSS", "TIME")?;
        for p in processes {
            let secs = p.cpu_time.as_secs();
            writeln!(
                ctx.stdout,
                "{:>7} {:>7} {:>1} {:>8} {:>3}:{:02}:{:02} {}",
                p.pid,
                p.ppid,
                p.state,
                format_bytes(p.rss),
                secs / 3600,
                (secs / 60) % 60,
                secs % 60,
                p.name
            )?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Tell how long the system has been running, and the load averages.
pub struct Uptime {}

impl BuiltinCommand for Uptime {
    fn name() -> &'static str {
        "uptime"
    }

    fn summary() -> &'static str {
        "Show system uptime and load"
    }

    fn usage() -> &'static str {
        "uptime"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let uptime = ctx.monitor.uptime()?;
        let now = Local::now().format("%H:%M:%S");
        match ctx.monitor.cpu() {
            Ok(cpu) => writeln!(
                ctx.stdout,
                " {} up {},  load average: {:.2}, {:.2}, {:.2}",
                now,
                format_uptime(uptime),
                cpu.load[0],
                cpu.load[1],
                cpu.load[2]
            )?,
            Err(_) => writeln!(ctx.stdout, " {} up {}", now, format_uptime(uptime))?,
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Display information about the CPU.
pub struct Lscpu {}

impl BuiltinCommand for Lscpu {
    fn name() -> &'static str {
        "lscpu"
    }

    fn summary() -> &'static str {
        "Show CPU information"
    }

    fn usage() -> &'static str {
        "lscpu"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode> {
        let cpu = ctx.monitor.cpu()?;
        writeln!(ctx.stdout, "{:<16}{}", "Architecture:", std::env::consts::ARCH)?;
        writeln!(ctx.stdout, "{:<16}{}", "CPU(s):", cpu.cores)?;
        writeln!(ctx.stdout, "{:<16}{}", "Model name:", cpu.model)?;
        writeln!(ctx.stdout, "{:<16}{}", "System:", std::env::consts::OS)?;
        writeln!(
            ctx.stdout,
            "{:<16}{:.2}, {:.2}, {:.2}",
            "Load average:", cpu.load[0], cpu.load[1], cpu.load[2]
        )?;
        Ok(0)
    }
}
