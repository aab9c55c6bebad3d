//! Terminal implementations of the status surface and alert sound

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::process::{Child, Command, Stdio};

use cogno_core::capture::{AlertSound, StatusSurface};
use cogno_core::config::AlertConfig;

/// Prints each status change on its own line, with a marker while tinted
#[derive(Debug, Default)]
pub struct TerminalSurface {
    status: String,
    tinted: bool,
}

impl TerminalSurface {
    fn render(&self) -> String {
        if self.tinted {
            format!("[!] {}", self.status)
        } else {
            format!("    {}", self.status)
        }
    }
}

impl StatusSurface for TerminalSurface {
    fn set_status(&mut self, status: &str) {
        if self.status == status {
            return;
        }
        status.clone_into(&mut self.status);
        log::debug!("Status: {status}");
        println!("{}", self.render());
    }

    fn set_tint(&mut self, tinted: bool) {
        self.tinted = tinted;
    }
}

/// Plays the alert by spawning the configured command, or rings the bell
#[derive(Debug)]
pub struct TerminalAlert {
    command: Vec<String>,
    terminal_bell: bool,
    player: Option<Child>,
}

impl TerminalAlert {
    pub fn from_config(config: &AlertConfig) -> Self {
        Self {
            command: config.command.clone(),
            terminal_bell: config.terminal_bell,
            player: None,
        }
    }

    /// Reap the previous player, cutting it short if it is still playing
    fn reap_player(&mut self) {
        let Some(mut child) = self.player.take() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(_)) => {}
            Ok(None) => {
                if let Err(e) = child.kill() {
                    log::debug!("Failed to stop alert player: {e}");
                }
                if let Err(e) = child.wait() {
                    log::debug!("Failed to reap alert player: {e}");
                }
            }
            Err(e) => log::debug!("Failed to poll alert player: {e}"),
        }
    }
}

impl Drop for TerminalAlert {
    fn drop(&mut self) {
        self.reap_player();
    }
}

impl AlertSound for TerminalAlert {
    fn play(&mut self) -> Result<()> {
        self.reap_player();
        if let Some((program, args)) = self.command.split_first() {
            let child = Command::new(program)
                .args(args)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .with_context(|| format!("Failed to spawn alert command '{program}'"))?;
            self.player = Some(child);
            return Ok(());
        }

        if !self.terminal_bell {
            bail!("No alert command configured and terminal bell disabled");
        }
        let mut stdout = std::io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}
