//! The fragments of a converted graph, and their assembly into the requested granularity.

use crate::options::{EmitterContext, Granularity};

/// Generated LaTeX, kept as separate fragments so that callers can embed the figure in
/// their own documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Output {
    /// From `\documentclass` to the start of the figure.
    pub doc_preamble: String,
    /// Definitions the drawing commands refer to, such as declared colors.
    pub declarations: String,
    /// Opens the picture environment.
    pub fig_preamble: String,
    /// The drawing commands.
    pub body: String,
    /// Closes the picture environment.
    pub fig_postamble: String,
    pub doc_postamble: String,
}

impl Output {
    /// Join the fragments needed for `granularity`.
    pub fn assemble(&self, granularity: Granularity) -> String {
        let fragments = match granularity {
            Granularity::Document => vec![
                &self.doc_preamble,
                &self.declarations,
                &self.fig_preamble,
                &self.body,
                &self.fig_postamble,
                &self.doc_postamble,
            ],
            Granularity::Figure => vec![
                &self.declarations,
                &self.fig_preamble,
                &self.body,
                &self.fig_postamble,
            ],
            Granularity::Code => vec![&self.declarations, &self.body],
        };

        fragments.into_iter().map(String::as_str).collect()
    }
}

/// Fill a user supplied document template.
///
/// Recognized tags: `<<figure>>` (the picture with its declarations), `<<declarations>>`,
/// `<<figpreamble>>`, `<<drawcommands>>`, `<<figpostamble>>`, `<<docpreamble>>`,
/// `<<graphstyle>>` and `<<textencoding>>`.  Other text is copied as is.
pub fn render_template(template: &str, output: &Output, ctx: &EmitterContext) -> String {
    let tags = [
        ("<<figure>>", output.assemble(Granularity::Figure)),
        ("<<declarations>>", output.declarations.clone()),
        ("<<figpreamble>>", output.fig_preamble.clone()),
        ("<<drawcommands>>", output.body.clone()),
        ("<<figpostamble>>", output.fig_postamble.clone()),
        ("<<docpreamble>>", ctx.docpreamble.clone()),
        ("<<graphstyle>>", ctx.graphstyle.clone()),
        ("<<textencoding>>", ctx.encoding.inputenc().to_string()),
    ];

    tags.iter()
        .fold(template.to_string(), |text, (tag, value)| text.replace(tag, value))
}

/// Append a line, adding the newline.
pub(crate) fn push_line(text: &mut String, line: &str) {
    text.push_str(line);
    text.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> Output {
        Output {
            doc_preamble: "doc\n".to_string(),
            declarations: "colors\n".to_string(),
            fig_preamble: "begin\n".to_string(),
            body: "draw\n".to_string(),
            fig_postamble: "end\n".to_string(),
            doc_postamble: "enddoc\n".to_string(),
        }
    }

    #[test]
    fn test_assemble() {
        let output = output();

        assert_eq!(
            output.assemble(Granularity::Document),
            "doc\ncolors\nbegin\ndraw\nend\nenddoc\n"
        );
        assert_eq!(output.assemble(Granularity::Figure), "colors\nbegin\ndraw\nend\n");
        assert_eq!(output.assemble(Granularity::Code), "colors\ndraw\n");
    }

    #[test]
    fn test_render_template() {
        let ctx = EmitterContext {
            docpreamble: "\\usepackage{mathptmx}".to_string(),
            ..EmitterContext::default()
        };
        let template = "\\usepackage[<<textencoding>>]{inputenc}\n<<docpreamble>>\n<<figure>>% <<unknown>>\n";

        assert_eq!(
            render_template(template, &output(), &ctx),
            "\\usepackage[utf8]{inputenc}\n\\usepackage{mathptmx}\ncolors\nbegin\ndraw\nend\n% <<unknown>>\n"
        );
        assert_eq!(render_template("<<drawcommands>>", &output(), &ctx), "draw\n");
    }
}
