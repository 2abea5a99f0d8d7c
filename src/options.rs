//! Conversion options and their resolution against in-graph overrides.
//!
//! Options come from three places, lowest precedence first:
//! * graph attributes such as `d2toutputformat` and `d2tfigpreamble` (defaults only),
//! * the command line,
//! * the graph's `d2toptions` attribute, parsed as extra command line arguments.

use clap::{Parser, ValueEnum};

use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::graph::Graph;

/// The LaTeX graphics dialect to generate.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum Dialect {
    #[value(alias = "pst")]
    Pstricks,
    /// PSTricks using native color names.
    Psn,
    Pgf,
    Tikz,
    /// Node positions only, as plain text.
    Positions,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Pstricks => "pstricks",
            Dialect::Psn => "psn",
            Dialect::Pgf => "pgf",
            Dialect::Tikz => "tikz",
            Dialect::Positions => "positions",
        }
    }
}

/// How label text is written to LaTeX.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum TexMode {
    /// Special characters are escaped.
    Verbatim,
    /// Text is wrapped in `$...$`.
    Math,
    /// Text is passed through untouched.
    Raw,
}

impl TexMode {
    pub fn from_name(name: &str) -> Option<Self> {
        TexMode::from_str(name.trim(), true).ok()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum VAlignMode {
    /// Labels are centered on their node.
    Center,
    /// Labels sit on the baseline chosen by the layout engine.
    Dot,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl Encoding {
    /// Option for the inputenc package.
    pub fn inputenc(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Latin1 => "latin1",
        }
    }
}

/// How much of the LaTeX output is produced.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Granularity {
    /// A complete document.
    Document,
    /// The picture environment only (`--figonly`).
    Figure,
    /// The drawing commands only (`--codeonly`).
    Code,
}

/// Options as given on the command line or in a `d2toptions` attribute.
///
/// Every field is a flag or an `Option`, so that two option sets can be merged.
#[derive(Debug, Clone, Default, PartialEq, Parser)]
pub struct Options {
    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<Dialect>,

    /// Text mode
    #[arg(short = 't', long = "texmode", value_enum)]
    pub texmode: Option<TexMode>,

    /// Try to duplicate the layout engine's graphics
    #[arg(short = 'd', long)]
    pub duplicate: bool,

    /// Force straight edges
    #[arg(short = 's', long)]
    pub straightedges: bool,

    /// Draw nodes before edges
    #[arg(short = 'w', long)]
    pub switchdraworder: bool,

    /// Use preview.sty to crop the graph
    #[arg(short = 'c', long, visible_alias = "preview", short_alias = 'p')]
    pub crop: bool,

    /// Preview margin
    #[arg(long)]
    pub margin: Option<String>,

    /// TeX code inserted in the document preamble
    #[arg(long, value_name = "TEXCODE")]
    pub docpreamble: Option<String>,

    /// TeX code inserted in the figure preamble
    #[arg(long, value_name = "TEXCODE")]
    pub figpreamble: Option<String>,

    /// TeX code inserted in the figure postamble
    #[arg(long, value_name = "TEXCODE")]
    pub figpostamble: Option<String>,

    /// Options for the picture environment
    #[arg(long, value_name = "STYLE")]
    pub graphstyle: Option<String>,

    /// Input gvcols.tex, defining the graphviz color names
    #[arg(long)]
    pub gvcols: bool,

    /// Output the picture with no document around it
    #[arg(long)]
    pub figonly: bool,

    /// Output only the drawing commands
    #[arg(long)]
    pub codeonly: bool,

    /// Use the style attribute only, for TikZ nodes and edges
    #[arg(long)]
    pub styleonly: bool,

    /// Show additional debugging information
    #[arg(long)]
    pub debug: bool,

    /// Vertical alignment of labels
    #[arg(long, value_enum)]
    pub valignmode: Option<VAlignMode>,

    /// No minimum node sizes
    #[arg(long)]
    pub nominsize: bool,

    /// Let TikZ place edge labels
    #[arg(long)]
    pub tikzedgelabels: bool,

    /// Options for TikZ nodes
    #[arg(long, value_name = "OPTIONS")]
    pub nodeoptions: Option<String>,

    /// Options for TikZ edges
    #[arg(long, value_name = "OPTIONS")]
    pub edgeoptions: Option<String>,

    /// Text encoding
    #[arg(short = 'e', long, value_enum)]
    pub encoding: Option<Encoding>,

    /// Scale all coordinates by this factor
    #[arg(long)]
    pub scale: Option<f64>,

    /// Input coordinates have their origin at the top (layout engine run with -y)
    #[arg(long)]
    pub inverty: bool,
}

impl Options {
    /// Parse a `d2toptions` string.
    pub fn from_option_string(args: &str) -> Result<Self, clap::Error> {
        Options::try_parse_from(std::iter::once("d2toptions").chain(args.split_whitespace()))
    }

    /// Merge `later` over self: flags accumulate, values given in `later` win.
    pub fn merge(&mut self, later: Options) {
        fn take<T>(value: &mut Option<T>, later: Option<T>) {
            if later.is_some() {
                *value = later;
            }
        }

        take(&mut self.format, later.format);
        take(&mut self.texmode, later.texmode);
        take(&mut self.margin, later.margin);
        take(&mut self.docpreamble, later.docpreamble);
        take(&mut self.figpreamble, later.figpreamble);
        take(&mut self.figpostamble, later.figpostamble);
        take(&mut self.graphstyle, later.graphstyle);
        take(&mut self.valignmode, later.valignmode);
        take(&mut self.nodeoptions, later.nodeoptions);
        take(&mut self.edgeoptions, later.edgeoptions);
        take(&mut self.encoding, later.encoding);
        take(&mut self.scale, later.scale);

        self.duplicate |= later.duplicate;
        self.straightedges |= later.straightedges;
        self.switchdraworder |= later.switchdraworder;
        self.crop |= later.crop;
        self.gvcols |= later.gvcols;
        self.figonly |= later.figonly;
        self.codeonly |= later.codeonly;
        self.styleonly |= later.styleonly;
        self.debug |= later.debug;
        self.nominsize |= later.nominsize;
        self.tikzedgelabels |= later.tikzedgelabels;
        self.inverty |= later.inverty;
    }
}

/// Resolved, read-only configuration for one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterContext {
    pub dialect: Dialect,
    pub texmode: TexMode,
    pub duplicate: bool,
    pub straightedges: bool,
    pub switchdraworder: bool,
    pub crop: bool,
    pub margin: String,
    pub granularity: Granularity,
    pub styleonly: bool,
    pub docpreamble: String,
    pub figpreamble: String,
    pub figpostamble: String,
    pub graphstyle: String,
    pub gvcols: bool,
    pub nodeoptions: String,
    pub edgeoptions: String,
    pub valign: VAlignMode,
    pub nominsize: bool,
    pub tikzedgelabels: bool,
    pub encoding: Encoding,
    pub scale: f64,
    pub inverty: bool,
}

pub const DEFAULT_DIALECT: Dialect = Dialect::Pgf;

impl Default for EmitterContext {
    fn default() -> Self {
        Self::from_options(&Options::default(), None)
    }
}

impl EmitterContext {
    /// Resolve options against a graph's `d2toptions`, `d2toutputformat` and other `d2t*`
    /// attributes.
    pub fn resolve(options: &Options, graph: &Graph, diagnostics: &mut Diagnostics) -> Self {
        let mut options = options.clone();

        if let Some(extra) = graph.attr("d2toptions") {
            match Options::from_option_string(extra) {
                Ok(extra) => {
                    log::debug!("d2toptions in graph: {extra:?}");
                    options.merge(extra);
                }
                Err(err) => diagnostics.warn(Error::InvalidOption {
                    option: format!("d2toptions=\"{extra}\""),
                    message: err.kind().to_string(),
                }),
            }
        }

        let graph_dialect = match graph.attr("d2toutputformat") {
            Some(name) => match Dialect::from_str(name.trim(), true) {
                Ok(dialect) => Some(dialect),
                Err(_) => {
                    diagnostics.warn(Error::InvalidOption {
                        option: format!("d2toutputformat={name}"),
                        message: "unknown output format".to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        let defaults = [
            ("d2tdocpreamble", &mut options.docpreamble),
            ("d2tfigpreamble", &mut options.figpreamble),
            ("d2tfigpostamble", &mut options.figpostamble),
            ("d2tgraphstyle", &mut options.graphstyle),
        ];
        for (attr, value) in defaults {
            if value.is_none() {
                *value = graph.attr(attr).map(str::to_string);
            }
        }

        if let Some(scale) = options.scale {
            if !(scale.is_finite() && scale > 0.0) {
                diagnostics.warn(Error::InvalidOption {
                    option: format!("--scale {scale}"),
                    message: "scale must be a positive number".to_string(),
                });
                options.scale = None;
            }
        }

        Self::from_options(&options, graph_dialect)
    }

    fn from_options(options: &Options, graph_dialect: Option<Dialect>) -> Self {
        let granularity = if options.codeonly {
            Granularity::Code
        } else if options.figonly {
            Granularity::Figure
        } else {
            Granularity::Document
        };
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        EmitterContext {
            dialect: options.format.or(graph_dialect).unwrap_or(DEFAULT_DIALECT),
            texmode: options.texmode.unwrap_or(TexMode::Verbatim),
            duplicate: options.duplicate,
            straightedges: options.straightedges,
            switchdraworder: options.switchdraworder,
            crop: options.crop,
            margin: options.margin.clone().unwrap_or_else(|| "0pt".to_string()),
            granularity,
            styleonly: options.styleonly,
            docpreamble: text(&options.docpreamble),
            figpreamble: text(&options.figpreamble),
            figpostamble: text(&options.figpostamble),
            graphstyle: text(&options.graphstyle),
            gvcols: options.gvcols,
            nodeoptions: text(&options.nodeoptions),
            edgeoptions: text(&options.edgeoptions),
            valign: options.valignmode.unwrap_or(VAlignMode::Center),
            nominsize: options.nominsize,
            tikzedgelabels: options.tikzedgelabels,
            encoding: options.encoding.unwrap_or(Encoding::Utf8),
            scale: options.scale.unwrap_or(1.0),
            inverty: options.inverty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(attributes: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::default();
        for (name, value) in attributes {
            graph.attributes_mut().set(name, value);
        }
        graph
    }

    #[test]
    fn test_defaults() {
        let context = EmitterContext::default();

        assert_eq!(context.dialect, Dialect::Pgf);
        assert_eq!(context.texmode, TexMode::Verbatim);
        assert_eq!(context.granularity, Granularity::Document);
        assert_eq!(context.margin, "0pt");
        assert_eq!(context.scale, 1.0);
    }

    #[test]
    fn test_option_string() {
        let options = Options::from_option_string("-f tikz --straightedges -t math --margin 2pt").unwrap();

        assert_eq!(options.format, Some(Dialect::Tikz));
        assert_eq!(options.texmode, Some(TexMode::Math));
        assert!(options.straightedges);
        assert_eq!(options.margin.as_deref(), Some("2pt"));
        assert_eq!(
            Options::from_option_string("-f pst").unwrap().format,
            Some(Dialect::Pstricks)
        );
        assert!(Options::from_option_string("--no-such-option").is_err());
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = Options {
            format: Some(Dialect::Pstricks),
            duplicate: true,
            ..Options::default()
        };
        base.merge(Options {
            format: Some(Dialect::Tikz),
            crop: true,
            ..Options::default()
        });

        assert_eq!(base.format, Some(Dialect::Tikz));
        assert!(base.duplicate);
        assert!(base.crop);
    }

    #[test]
    fn test_precedence() {
        let mut diagnostics = Diagnostics::new();
        let graph = graph_with(&[("d2toutputformat", "pstricks"), ("d2tfigpreamble", "% fig")]);

        // Graph format only applies when the command line gives none.
        let context = EmitterContext::resolve(&Options::default(), &graph, &mut diagnostics);
        assert_eq!(context.dialect, Dialect::Pstricks);
        assert_eq!(context.figpreamble, "% fig");

        let cli = Options {
            format: Some(Dialect::Tikz),
            figpreamble: Some("% cli".to_string()),
            ..Options::default()
        };
        let context = EmitterContext::resolve(&cli, &graph, &mut diagnostics);
        assert_eq!(context.dialect, Dialect::Tikz);
        assert_eq!(context.figpreamble, "% cli");

        // d2toptions is merged over the command line.
        let graph = graph_with(&[("d2toptions", "-f psn --codeonly")]);
        let context = EmitterContext::resolve(&cli, &graph, &mut diagnostics);
        assert_eq!(context.dialect, Dialect::Psn);
        assert_eq!(context.granularity, Granularity::Code);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_bad_values_warn() {
        let mut diagnostics = Diagnostics::new();
        let graph = graph_with(&[("d2toptions", "--bogus"), ("d2toutputformat", "svg")]);
        let options = Options {
            scale: Some(-1.0),
            ..Options::default()
        };
        let context = EmitterContext::resolve(&options, &graph, &mut diagnostics);

        assert_eq!(context.dialect, DEFAULT_DIALECT);
        assert_eq!(context.scale, 1.0);
        assert_eq!(diagnostics.count_kind("InvalidOption"), 3);
    }
}
