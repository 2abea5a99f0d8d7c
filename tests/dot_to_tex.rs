//! Convert the examples in DOT_EXAMPLES with every dialect.

use dot2tex::api::{dot_to_tex, graph_to_tex};
use dot2tex::diagnostics::Diagnostics;
use dot2tex::dot_examples::{dot_example_graph, dot_example_str};
use dot2tex::error::Error;
use dot2tex::options::{Dialect, Options};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn options(format: Dialect) -> Options {
    Options {
        format: Some(format),
        ..Options::default()
    }
}

fn code_only(format: Dialect) -> Options {
    Options {
        codeonly: true,
        ..options(format)
    }
}

fn convert(title: &str, options: &Options) -> (String, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tex = dot_to_tex(dot_example_str(title), options, &mut diagnostics).unwrap();

    (tex, diagnostics)
}

#[rstest]
fn dot_to_tex_all_dialects(
    #[values("a_to_b", "a_to_b_and_c", "styled", "clustered", "undirected")] title: &str,
    #[values(Dialect::Pstricks, Dialect::Psn, Dialect::Pgf, Dialect::Tikz)] format: Dialect,
) {
    let graph = dot_example_graph(title);
    let mut diagnostics = Diagnostics::new();
    let tex = graph_to_tex(&graph, &options(format), &mut diagnostics);

    assert!(tex.starts_with("\\documentclass{article}\n"), "{tex}");
    assert!(tex.contains("\\begin{document}\n"));
    assert!(tex.ends_with("% End of code\n\\end{document}\n"));
    assert_eq!(diagnostics.count_kind("MalformedDrawingString"), 0);

    let environment = match format {
        Dialect::Pstricks | Dialect::Psn => "pspicture",
        _ => "tikzpicture",
    };
    assert!(tex.contains(&format!("\\begin{{{environment}}}")));
    assert!(tex.contains(&format!("\\end{{{environment}}}")));

    // A second conversion of the same graph gives the same text.
    let again = graph_to_tex(&graph, &options(format), &mut Diagnostics::new());
    assert_eq!(tex, again);
}

#[rstest]
#[case::a_to_b("a_to_b", "a 27 90 54 36\nb 27 18 54 36\n")]
#[case::a_to_b_and_c("a_to_b_and_c", "a 63 90 54 36\nb 27 18 54 36\nc 99 18 54 36\n")]
#[case::clustered("clustered", "x 43 34 54 36\n")]
fn positions(#[case] title: &str, #[case] expected: &str) {
    let (tex, diagnostics) = convert(title, &options(Dialect::Positions));

    assert_eq!(tex, expected);
    assert!(diagnostics.is_empty());
}

#[test]
fn pgf_code() {
    let (tex, diagnostics) = convert("a_to_b", &code_only(Dialect::Pgf));

    assert_eq!(
        tex,
        r"  % Edge: a -> b
  \begin{scope}
  \definecolor{strokecol}{rgb}{0,0,0};
  \pgfsetstrokecolor{strokecol}
  \pgfsetlinewidth{1bp}
  \pgfsetdash{}{0pt}
  \draw (27bp,71.7bp) .. controls (27bp,63.98bp) and (27bp,54.71bp) .. (27bp,46.1bp);
  \definecolor{fillcol}{rgb}{0,0,0};
  \pgfsetfillcolor{fillcol}
  \filldraw (30.5bp,46.1bp) -- (27bp,36.1bp) -- (23.5bp,46.1bp) -- cycle;
  \end{scope}
  % Node: a
  \begin{scope}
  \definecolor{strokecol}{rgb}{0,0,0};
  \pgfsetstrokecolor{strokecol}
  \pgfsetlinewidth{1bp}
  \pgfsetdash{}{0pt}
  \draw (27bp,90bp) ellipse (27bp and 18bp);
  \draw (27bp,90bp) node {a};
  \end{scope}
  % Node: b
  \begin{scope}
  \definecolor{strokecol}{rgb}{0,0,0};
  \pgfsetstrokecolor{strokecol}
  \pgfsetlinewidth{1bp}
  \pgfsetdash{}{0pt}
  \draw (27bp,18bp) ellipse (27bp and 18bp);
  \draw (27bp,18bp) node {b};
  \end{scope}
"
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn tikz_code() {
    let (tex, diagnostics) = convert("a_to_b", &code_only(Dialect::Tikz));

    assert_eq!(
        tex,
        r"  % Node: a
  \node (a) at (27bp,90bp) [draw,ellipse,minimum width=54bp,minimum height=36bp] {a};
  % Node: b
  \node (b) at (27bp,18bp) [draw,ellipse,minimum width=54bp,minimum height=36bp] {b};
  % Edge: a -> b
  \draw [->] (a) .. controls (27bp,63.983bp) and (27bp,54.712bp) .. (b);
"
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn tikz_edges_between_placed_nodes() {
    let dot = r#"digraph {
        a [pos="0,0"];
        b;
        a -> b [pos="0,0 0,3 0,6 0,9"];
        c [pos="0,20"];
        a -> c [pos="0,0 0,3 0,6 0,9 0,12 0,15 0,20"];
    }"#;
    let mut diagnostics = Diagnostics::new();
    let tex = dot_to_tex(dot, &code_only(Dialect::Tikz), &mut diagnostics).unwrap();

    assert_eq!(
        tex,
        r"  % Node: a
  \node (a) at (0bp,0bp) [draw,ellipse,minimum width=54bp,minimum height=36bp] {a};
  % Node: c
  \node (c) at (0bp,20bp) [draw,ellipse,minimum width=54bp,minimum height=36bp] {c};
  % Edge: a -> c
  \draw [->] (a) .. controls (0bp,3bp) and (0bp,6bp) .. (0bp,9bp) .. controls (0bp,12bp) and (0bp,15bp) .. (c);
"
    );
    // Node b has no position, so neither it nor the edge to it is drawn.
    assert_eq!(diagnostics.count_kind("InvalidOption"), 2);
}

#[test]
fn tikz_declares_colors() {
    let (tex, _) = convert("styled", &options(Dialect::Tikz));

    assert!(tex.contains("\\definecolor{blue}{rgb}{0,0,1}\n"));
    assert!(tex.contains("\\definecolor{lightblue}{rgb}"));
    assert!(tex.contains("\\definecolor{red}{rgb}{1,0,0}\n"));
    assert!(tex.contains("[draw,rectangle,draw=blue,fill=lightblue,"));
    // texlbl goes to the output untouched.
    assert!(tex.contains("{$\\omega$};"));
    assert!(tex.contains("\\draw [->,dashed] (start)"));
    assert!(tex.contains("node {go\\_on};"));
}

#[test]
fn straight_edges_from_graph_options() {
    let dot = dot_example_str("a_to_b").replace(
        "graph [bb=\"0,0,54,108\"];",
        "graph [bb=\"0,0,54,108\", d2toptions=\"--straightedges --codeonly\"];",
    );
    let mut diagnostics = Diagnostics::new();
    let tex = dot_to_tex(&dot, &options(Dialect::Pgf), &mut diagnostics).unwrap();

    assert!(tex.starts_with("  % Edge: a -> b\n"));
    assert!(tex.contains("  \\draw (27bp,71.7bp) -- (27bp,46.1bp);\n"));
    assert!(!tex.contains("controls"));
    assert!(diagnostics.is_empty());
}

#[test]
fn psn_flattens_splines() {
    let (tex, diagnostics) = convert("a_to_b", &options(Dialect::Psn));

    assert!(!tex.contains("\\psbezier"));
    assert!(tex.contains("\\psline(27bp,71.7bp)"));
    assert!(tex.contains("\\pspolygon"));
    assert_eq!(diagnostics.count_kind("UnsupportedPrimitive"), 1);
    assert_eq!(diagnostics.warnings().count(), 1);
    assert!(!tex.contains("\\newrgbcolor{black}"));
}

#[test]
fn pstricks_declarations_and_frame() {
    let (tex, diagnostics) = convert("a_to_b", &options(Dialect::Pstricks));

    assert!(tex.contains("\\usepackage{pstricks}"));
    assert!(tex.contains(
        "% Start of code\n\\newrgbcolor{black}{0 0 0}\n\\begin{pspicture}[linewidth=1bp](0bp,0bp)(54bp,108bp)\n"
    ));
    assert!(tex.contains("\\psbezier(27bp,71.7bp)(27bp,63.98bp)(27bp,54.71bp)(27bp,46.1bp)"));
    assert!(diagnostics.is_empty());
}

#[test]
fn crop_with_preview() {
    let options = Options {
        crop: true,
        margin: Some("3pt".to_string()),
        ..options(Dialect::Tikz)
    };
    let (tex, _) = convert("a_to_b", &options);

    assert!(tex.contains(
        "\\usepackage[active,tightpage]{preview}\n\\PreviewEnvironment{tikzpicture}\n\\setlength\\PreviewBorder{3pt}\n\\begin{document}\n"
    ));
}

#[test]
fn figure_only() {
    let options = Options {
        figonly: true,
        figpreamble: Some("\\small".to_string()),
        ..options(Dialect::Pgf)
    };
    let (tex, _) = convert("clustered", &options);

    assert!(tex.starts_with("\\begin{tikzpicture}[>=latex',line join=bevel]\n\\small\n"));
    assert!(tex.ends_with("\\end{tikzpicture}\n"));
    assert!(!tex.contains("\\documentclass"));
    assert!(tex.contains("  % Cluster: cluster_0\n"));
    assert!(tex.contains("node {group};"));
}

#[test]
fn document_preamble() {
    let options = Options {
        gvcols: true,
        docpreamble: Some("\\usepackage{mathptmx}".to_string()),
        ..options(Dialect::Pgf)
    };
    let (tex, _) = convert("a_to_b", &options);

    assert!(tex.starts_with(
        "\\documentclass{article}\n\
         \\usepackage[x11names, svgnames, rgb]{xcolor}\n\
         \\usepackage[utf8]{inputenc}\n\
         \\usepackage{tikz}\n\
         \\usetikzlibrary{arrows,shapes}\n\
         \\usepackage{amsmath}\n\
         \\input{gvcols.tex}\n\
         \\usepackage{mathptmx}\n\
         \\begin{document}\n\
         \\pagestyle{empty}\n\
         \\enlargethispage{100cm}\n\
         % Start of code\n"
    ));
}

#[test]
fn undirected_edge_label() {
    let (tex, _) = convert("undirected", &code_only(Dialect::Tikz));

    assert!(tex.contains("  \\draw (u) .. controls (27bp,77.85bp) and (27bp,46.15bp) .. (v);\n"));
    assert!(tex.contains("  \\draw (40bp,62bp) node {u--v};\n"));
}

#[test]
fn graph_without_layout() {
    let (tex, diagnostics) = convert("no_layout", &code_only(Dialect::Pgf));

    assert_eq!(tex, "");
    assert!(diagnostics.is_empty());
}

#[test]
fn parse_failure() {
    let mut diagnostics = Diagnostics::new();
    let result = dot_to_tex("digraph { a -> ; }", &Options::default(), &mut diagnostics);

    assert!(matches!(result, Err(Error::GraphParseFailure { line: 1, .. })));
}
