use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::{Command, ExitCode, Stdio},
};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use dot2tex::{
    api::{graph_to_output, graph_to_tex},
    diagnostics::Diagnostics,
    emit::output::render_template,
    graph::Graph,
    options::Options,
};

/// Graphviz layout engines that can be run on input without drawing attributes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum Prog {
    Dot,
    Neato,
    Circo,
    Fdp,
    Twopi,
}

impl Prog {
    fn command(&self) -> &'static str {
        match self {
            Prog::Dot => "dot",
            Prog::Neato => "neato",
            Prog::Circo => "circo",
            Prog::Fdp => "fdp",
            Prog::Twopi => "twopi",
        }
    }
}

/// Convert graphviz graphs to LaTeX (PSTricks, PGF or TikZ).
#[derive(Debug, Parser)]
#[command(name = "dot2tex-rs", version)]
struct Cli {
    /// Input dot file, stdin when omitted
    input: Option<PathBuf>,

    /// Write the output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Document template, with <<figure>>, <<drawcommands>> and other tags to fill
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Convert even when the output file is newer than the input file
    #[arg(long)]
    force: bool,

    /// Layout engine run on input without drawing attributes
    #[arg(long, value_enum, default_value = "dot")]
    prog: Prog,

    /// Extra arguments for the layout engine
    #[arg(long, allow_hyphen_values = true)]
    progoptions: Option<String>,

    #[command(flatten)]
    options: Options,
}

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.options.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> AppResult<()> {
    if let (Some(input), Some(output), false) = (&cli.input, &cli.output, cli.force) {
        if is_up_to_date(input, output) {
            log::info!("skip: {} is newer than {}", output.display(), input.display());
            return Ok(());
        }
    }

    let mut source = read_input(cli.input.as_ref())?;
    if let Some(redirect) = input_redirect(&source).map(str::to_string) {
        log::info!("found \\input{{{redirect}}}");
        source = fs::read_to_string(&redirect)
            .map_err(|err| format!("could not read \\input{{{redirect}}}: {err}"))?;
    }
    let mut graph = Graph::from_dot(&source)?;

    if !graph.has_drawing() {
        log::info!("no drawing attributes found, running {}", cli.prog.command());
        let laid_out = run_layout(cli.prog, cli.progoptions.as_deref(), &source)?;
        graph = Graph::from_dot(&laid_out)?;
    }

    // Warnings are already shown through the log facade.
    let mut diagnostics = Diagnostics::new();
    let tex = match &cli.template {
        Some(path) => {
            let template = fs::read_to_string(path)?;
            let (output, ctx) = graph_to_output(&graph, &cli.options, &mut diagnostics);
            render_template(&template, &output, &ctx)
        }
        None => graph_to_tex(&graph, &cli.options, &mut diagnostics),
    };
    log::debug!("{} diagnostics", diagnostics.entries().len());

    match &cli.output {
        Some(path) => fs::write(path, tex)?,
        None => io::stdout().write_all(tex.as_bytes())?,
    }

    Ok(())
}

/// True when `output` exists and was written after `input` was last modified.
fn is_up_to_date(input: &Path, output: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|meta| meta.modified()).ok();

    match (modified(input), modified(output)) {
        (Some(input), Some(output)) => input < output,
        _ => false,
    }
}

/// A line of the form `\input{file}` makes the graph be read from `file` instead.
fn input_redirect(source: &str) -> Option<&str> {
    source.lines().find_map(|line| {
        let name = line.trim_start().strip_prefix("\\input{")?;
        let end = name.find('}')?;

        Some(&name[..end]).filter(|name| !name.is_empty())
    })
}

fn read_input(input: Option<&PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

/// Pipe `source` through `prog -Txdot` and return the laid out graph.
fn run_layout(prog: Prog, progoptions: Option<&str>, source: &str) -> AppResult<String> {
    let mut command = Command::new(prog.command());
    command.arg("-Txdot");
    if let Some(extra) = progoptions {
        command.args(extra.split_whitespace());
    }

    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|err| format!("could not run {}: {err}", prog.command()))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(source.as_bytes())?;
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(format!("{} failed with {}", prog.command(), output.status).into());
    }

    Ok(String::from_utf8(output.stdout)?)
}
