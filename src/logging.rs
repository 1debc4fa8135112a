use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub struct RunLog {
    file: File,
}

impl RunLog {
    pub fn create(out_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("create {}", out_dir.display()))?;
        let path = out_dir.join("analysis.log");
        let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        Ok(Self { file })
    }

    pub fn log_line(&mut self, message: &str) -> Result<()> {
        info!("{message}");
        writeln!(self.file, "{message}")?;
        Ok(())
    }

    pub fn warn_line(&mut self, message: &str) -> Result<()> {
        warn!("{message}");
        writeln!(self.file, "WARNING: {message}")?;
        Ok(())
    }

    pub fn blank(&mut self) -> Result<()> {
        writeln!(self.file)?;
        Ok(())
    }
}
