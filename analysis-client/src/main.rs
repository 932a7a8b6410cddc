use analysis_client::config::{HandlerSettings, ANALYZE_BASE_URL};
use analysis_client::error::{Result, SubmitError};
use analysis_client::{
    FormData, HtmlBuffer, HttpTransport, SubmissionHandler, SubmitEvent, SubmitOutcome,
};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Submit an analysis form and print the rendered result.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Origin the form is posted to
    #[arg(long, default_value_t = ANALYZE_BASE_URL.to_string())]
    base_url: String,

    /// Write the rendered result here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Form fields, `name=value` or `name=@path` to attach a file
    #[arg(required = true)]
    fields: Vec<String>,
}

fn init() {
    // Initialise logger
    env_logger::init();
}

async fn submit(args: Args) -> Result<bool> {
    let form = FormData::from_args(&args.fields)?;
    let transport = HttpTransport::from_base(&args.base_url)?;
    let handler = SubmissionHandler::new(transport, HtmlBuffer::new(), HandlerSettings::from_env());

    let mut event = SubmitEvent::new(form);
    let outcome = handler.on_submit(&mut event).await;

    let html = handler.target().html();
    match args.output {
        Some(path) => fs::write(&path, html).map_err(|source| SubmitError::Io { path, source })?,
        None => println!("{}", html),
    }

    Ok(matches!(outcome, SubmitOutcome::Rendered(fragment) if !fragment.is_error()))
}

#[actix_rt::main]
async fn main() -> ExitCode {
    init();
    let args = Args::parse();

    match submit(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(2)
        }
    }
}
