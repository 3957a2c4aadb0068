//! Console progress rendering with optional wall-clock pacing.
//!
//! Pacing is presentation only. The tick duration may be zero, in which
//! case bars are drawn instantly and nothing ever sleeps.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;

use vnfvault_core::progress::{phase, ProgressEvent, ProgressReporter};

const BAR_WIDTH: usize = 24;

/// Progress reporter that draws inline bars on stdout.
pub struct ConsolePacer {
    tick: Duration,
}

impl ConsolePacer {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    /// Pacer that draws everything instantly.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    async fn draw_bar(&self, label: &str, work_units: u64) {
        let ticks = work_units.clamp(1, BAR_WIDTH as u64) as usize;
        let mut stdout = std::io::stdout();
        for done in 1..=ticks {
            let filled = BAR_WIDTH * done / ticks;
            let _ = write!(
                stdout,
                "\r  [{}{}] {}",
                "#".repeat(filled),
                "-".repeat(BAR_WIDTH - filled),
                label
            );
            let _ = stdout.flush();
            if !self.tick.is_zero() {
                tokio::time::sleep(self.tick).await;
            }
        }
        let _ = writeln!(stdout);
    }
}

#[async_trait]
impl ProgressReporter for ConsolePacer {
    async fn report(&self, event: ProgressEvent) -> Result<(), String> {
        match event.phase.as_str() {
            phase::WORKFLOW_PHASE => {
                println!("\n=== {} ===", event.message.as_deref().unwrap_or(""));
            }
            phase::ACTION_STARTED => {
                let label = event.message.as_deref().unwrap_or("working");
                if event.total > 0 {
                    println!("  ({}/{}) {}", event.step, event.total, label);
                }
                self.draw_bar(label, event.work_units).await;
            }
            phase::FAULT_DETECTED => {
                println!("  !! {}", event.message.as_deref().unwrap_or("fault detected"));
            }
            _ => {}
        }
        Ok(())
    }
}
