//! Examples of graphs to be used for testing and display.
//!
//! All but "no_layout" are as written by `dot -Txdot`, trimmed to the attributes the
//! conversion reads.

use crate::graph::Graph;

pub const DOT_EXAMPLES: [(&str, &str); 6] = [
    (
        "a_to_b",
        r#"digraph G {
	graph [bb="0,0,54,108"];
	node [label="\N"];
	a	[_draw_="c 7 -#000000 e 27 90 27 18 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 27 85.8 0 7 1 -a ",
		height=0.5,
		pos="27,90",
		width=0.75];
	b	[_draw_="c 7 -#000000 e 27 18 27 18 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 27 13.8 0 7 1 -b ",
		height=0.5,
		pos="27,18",
		width=0.75];
	a -> b	[_draw_="c 7 -#000000 B 4 27 71.7 27 63.98 27 54.71 27 46.1 ",
		_hdraw_="S 5 -solid c 7 -#000000 C 7 -#000000 P 3 30.5 46.1 27 36.1 23.5 46.1 ",
		pos="e,27,36.104 27,71.697 27,63.983 27,54.712 27,46.104"];
}"#,
    ),
    (
        "a_to_b_and_c",
        r#"digraph {
	graph [_draw_="c 9 -#fffffe00 C 7 -#ffffff P 4 0 0 0 108 126 108 126 0 ",
		bb="0,0,126,108"];
	node [label="\N"];
	a	[_draw_="c 7 -#000000 e 63 90 27 18 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 63 85.8 0 7 1 -a ",
		height=0.5,
		pos="63,90",
		width=0.75];
	b	[_draw_="c 7 -#000000 e 27 18 27 18 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 27 13.8 0 7 1 -b ",
		height=0.5,
		pos="27,18",
		width=0.75];
	c	[_draw_="c 7 -#000000 e 99 18 27 18 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 99 13.8 0 7 1 -c ",
		height=0.5,
		pos="99,18",
		width=0.75];
	a -> b	[_draw_="c 7 -#000000 B 4 54.65 72.76 50.42 64.54 45.19 54.35 40.42 45.07 ",
		_hdraw_="S 5 -solid c 7 -#000000 C 7 -#000000 P 3 43.42 43.26 35.74 35.96 37.19 46.46 ",
		pos="e,35.738,35.963 54.65,72.765 50.42,64.54 45.19,54.35 40.42,45.07"];
	a -> c	[_draw_="c 7 -#000000 B 4 71.35 72.76 75.58 64.54 80.81 54.35 85.58 45.07 ",
		_hdraw_="S 5 -solid c 7 -#000000 C 7 -#000000 P 3 88.81 46.46 90.26 35.96 82.58 43.26 ",
		pos="e,90.262,35.963 71.35,72.765 75.58,64.54 80.81,54.35 85.58,45.07"];
}"#,
    ),
    (
        "styled",
        r#"digraph styled {
	graph [bb="0,0,152,124"];
	node [label="\N"];
	start	[_draw_="S 6 -filled c 4 -blue C 9 -lightblue P 4 112 124 40 124 40 88 112 88 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 76 101.8 0 33 5 -start ",
		color=blue,
		fillcolor=lightblue,
		height=0.5,
		pos="76,106",
		shape=box,
		style=filled,
		width=1.0];
	end	[_draw_="c 3 -red e 76 22 18 18 c 3 -red e 76 22 22 22 ",
		_ldraw_="F 14 11 -Times-Roman c 3 -red T 76 17.8 0 21 3 -end ",
		color=red,
		fontcolor=red,
		height=0.61,
		pos="76,22",
		shape=doublecircle,
		texlbl="$\omega$",
		width=0.61];
	start -> end	[_draw_="S 6 -dashed c 7 -#000000 B 4 76 87.83 76 78.08 76 64.92 76 54.27 ",
		_hdraw_="S 5 -solid c 7 -#000000 C 7 -#000000 P 3 79.5 54.27 76 44.27 72.5 54.27 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 95.5 58.8 0 39 5 -go_on ",
		label=go_on,
		lp="95.5,63",
		pos="e,76,44.168 76,87.831 76,78.084 76,64.92 76,54.269",
		style=dashed];
}"#,
    ),
    (
        "clustered",
        r#"digraph clustered {
	graph [_draw_="c 9 -#fffffe00 C 7 -#ffffff P 4 0 0 0 132 86 132 86 0 ",
		bb="0,0,86,132"];
	node [label="\N"];
	subgraph cluster_0 {
		graph [_draw_="c 4 -gray P 4 8 8 8 124 78 124 78 8 ",
			_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 43 108.3 0 38 5 -group ",
			bb="8,8,78,124",
			label=group,
			lp="43,112.5"];
		x	[_draw_="c 7 -#000000 e 43 34 27 18 ",
			_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 43 29.8 0 7 1 -x ",
			height=0.5,
			pos="43,34",
			width=0.75];
	}
}"#,
    ),
    (
        "undirected",
        r#"graph U {
	graph [bb="0,0,54,124"];
	node [label="\N"];
	u	[_draw_="c 7 -#000000 e 27 106 27 18 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 27 101.8 0 7 1 -u ",
		height=0.5,
		pos="27,106",
		width=0.75];
	v	[_draw_="c 7 -#000000 e 27 18 27 18 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 27 13.8 0 7 1 -v ",
		height=0.5,
		pos="27,18",
		width=0.75];
	u -- v	[_draw_="c 7 -#000000 B 4 27 87.71 27 77.85 27 46.15 27 36.29 ",
		_ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 40 57.8 0 24 4 -u--v ",
		label="\E",
		lp="40,62",
		pos="27,87.705 27,77.85 27,46.15 27,36.295"];
}"#,
    ),
    ("no_layout", "digraph { a -> b; }"),
];

/// Return the dot source of an example.
pub fn dot_example_str(title: &str) -> &'static str {
    for (dot_title, dot) in DOT_EXAMPLES {
        if title == dot_title {
            return dot;
        }
    }
    panic!("Could not find requested example: {title}")
}

pub fn dot_example_graph(title: &str) -> Graph {
    match Graph::from_dot(dot_example_str(title)) {
        Ok(graph) => graph,
        Err(err) => panic!("Example {title} does not parse: {err}"),
    }
}
