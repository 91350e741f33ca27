use clap::Parser;
use cssdiscard_lib::{
    discard, DiscardError, DiscardOptions, MissingReferencePolicy, Pattern, PatternSet,
};
use log::{info, LevelFilter};
use std::fs;
use std::io::{self, Read, Write};

#[derive(Parser)]
#[command(name = "cssdiscard")]
#[command(about = "Discard rules, declarations and at-rules from a stylesheet")]
struct Args {
    /// Input stylesheet ("-" reads stdin).
    input: String,

    /// Output file name (defaults to stdout).
    #[arg(short, long)]
    output: Option<String>,

    /// Reference stylesheet as CSS text or a path. Everything it already covers is discarded.
    #[arg(long)]
    css: Option<String>,

    /// At-rule pattern, matched against `@name` and the params. `/re/flags` for a regex.
    #[arg(long, value_name = "PATTERN")]
    atrule: Vec<String>,

    /// Selector pattern, matched against each selector of a rule.
    #[arg(long, value_name = "PATTERN")]
    rule: Vec<String>,

    /// Declaration pattern, matched against `prop: value`, the property and the value.
    #[arg(long, value_name = "PATTERN")]
    decl: Vec<String>,

    /// Carry on with the explicit patterns when the reference can't be read.
    #[arg(long)]
    ignore_missing_reference: bool,

    /// Log every removal.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args: Args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let options = build_options(args)?;

    let css_text = if args.input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&args.input)?
    };

    let pruned = discard(&css_text, &options)?;
    info!("{} bytes in, {} bytes out", css_text.len(), pruned.len());

    match &args.output {
        Some(path) => fs::write(path, pruned)?,
        None => io::stdout().write_all(pruned.as_bytes())?,
    }
    Ok(())
}

fn build_options(args: &Args) -> Result<DiscardOptions, DiscardError> {
    let mut options = DiscardOptions::new()
        .with_atrule(patterns(&args.atrule)?)
        .with_rule(patterns(&args.rule)?)
        .with_decl(patterns(&args.decl)?);
    if let Some(reference) = &args.css {
        options = options.with_css(reference.as_str());
    }
    if args.ignore_missing_reference {
        options = options.with_missing_reference(MissingReferencePolicy::Ignore);
    }
    Ok(options)
}

fn patterns(args: &[String]) -> Result<PatternSet, DiscardError> {
    args.iter().map(|arg| Pattern::from_cli(arg)).collect()
}
