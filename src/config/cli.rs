use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "profile-engine")]
#[command(about = "Student profile engine: class lifecycle, teammate recommendations and profile events")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file; built-in defaults are used when omitted")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "JSON array of students used to seed the in-memory store")]
    pub students: PathBuf,

    #[arg(long, help = "Student whose recommended teammates are printed")]
    pub student_id: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}
