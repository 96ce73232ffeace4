use chrono::NaiveDate;
use clap::Parser;
use color_eyre::Result;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use bim_tabulator::config::{ExportConfig, UploadConfig, DEFAULT_OUTPUT, PROGRESS_INTERVAL};
use bim_tabulator::export::{export_model, LogProgress};
use bim_tabulator::parser::load_model;
use bim_tabulator::ui::App;
use bim_tabulator::upload::upload_export;

#[derive(Parser, Debug)]
#[command(name = "bim-tabulator")]
#[command(about = "BIM Tabulator - flatten model elements and their properties into one table")]
#[command(version)]
struct Args {
    /// Model file (.ifc or .json)
    #[arg(required = true)]
    file: PathBuf,

    /// Output table (.xlsx, .csv or .json)
    #[arg(short, long, value_name = "FILE", env = "BIM_TABULATOR_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Export root by name, stable id or GUID (repeatable, default: whole model)
    #[arg(short, long = "select", value_name = "PATTERN")]
    select: Vec<String>,

    /// Export without starting the terminal UI
    #[arg(long, alias = "export")]
    headless: bool,

    /// Elements between progress reports
    #[arg(long, value_name = "N", env = "BIM_TABULATOR_PROGRESS_INTERVAL", default_value_t = PROGRESS_INTERVAL)]
    progress_interval: usize,

    /// Webhook receiving the exported file
    #[arg(long, value_name = "URL", env = "BIM_TABULATOR_UPLOAD_URL")]
    upload_url: Option<String>,

    /// Date sent with the upload (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "upload_url")]
    upload_date: Option<NaiveDate>,

    /// Upload timeout in seconds
    #[arg(long, value_name = "SECS", env = "BIM_TABULATOR_UPLOAD_TIMEOUT", default_value_t = 120)]
    upload_timeout: u64,

    /// Log file (the terminal UI never logs to the screen)
    #[arg(long, value_name = "FILE", env = "BIM_TABULATOR_LOG")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn export_config(&self) -> Result<ExportConfig> {
        let upload = self.upload_url.as_ref().map(|url| UploadConfig {
            url: url.clone(),
            date: self.upload_date,
            timeout: Duration::from_secs(self.upload_timeout),
        });

        let mut config = ExportConfig::new(&self.output)?.with_upload(upload);
        config.progress_interval = self.progress_interval;
        Ok(config)
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bim_tabulator=info"));

    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(&args)?;

    let config = args.export_config()?;
    let model = load_model(&args.file)?;

    if args.headless {
        let summary = export_model(&model, &args.select, &config, &mut LogProgress)?;
        println!(
            "Exported {} elements ({} columns, {} with errors) to {}",
            summary.elements,
            summary.columns,
            summary.error_rows,
            summary.path.display()
        );

        if let Some(upload) = &config.upload {
            match upload_export(&summary.path, upload) {
                Ok(receipt) => println!("Uploaded to {} ({})", upload.url, receipt.status),
                Err(err) => eprintln!("Upload failed: {err}"),
            }
        }
        return Ok(());
    }

    let mut app = App::new(model, config);
    for pattern in &args.select {
        app.mark_matching(pattern);
    }

    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();
    result
}
