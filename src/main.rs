use anyhow::{bail, Context};
use base64::Engine as _;
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tablepix::{FontCatalog, RenderConfig, RenderExecutor, TableGrid};

/// Render the first HTML table of a document into a cropped PNG
#[derive(Parser, Debug)]
#[command(name = "tablepix", version, about)]
struct Cli {
    /// HTML file to read; stdin when omitted or "-"
    input: Option<PathBuf>,

    /// Where to write the PNG
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the PNG as base64 on stdout instead of writing a file
    #[arg(long)]
    base64: bool,

    /// JSON file with render settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the parsed table grid as JSON and exit
    #[arg(long)]
    dump_grid: bool,

    /// Print the font fallback chain and exit
    #[arg(long)]
    list_fonts: bool,
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            std::fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RenderConfig::from_json_file(path)?,
        None => RenderConfig::default(),
    };

    if cli.list_fonts {
        let catalog = FontCatalog::system();
        for family in catalog.families() {
            println!("{}", family);
        }
        return Ok(());
    }

    let html = read_input(cli.input.as_ref())?;

    if cli.dump_grid {
        let grid = TableGrid::from_html(&html).map_err(|e| anyhow::anyhow!("no table grid: {}", e))?;
        println!("{}", serde_json::to_string_pretty(&grid)?);
        return Ok(());
    }

    if cli.output.is_none() && !cli.base64 {
        bail!("nothing to do: pass --output <file> or --base64");
    }

    let executor = RenderExecutor::with_system_fonts(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to build runtime")?;
    let png = runtime.block_on(async {
        let png = executor.submit(html).await;
        let _ = executor.shutdown().await;
        png
    });

    let Some(png) = png else {
        eprintln!("tablepix: no image produced (set RUST_LOG=debug for the reason)");
        std::process::exit(1);
    };

    if let Some(path) = &cli.output {
        std::fs::write(path, &png).with_context(|| format!("failed to write {}", path.display()))?;
    }
    if cli.base64 {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
        let mut out = io::stdout().lock();
        writeln!(out, "{}", encoded)?;
    }
    Ok(())
}
