//! XML rendering of the canonical tree.

use super::{CanonicalBlock, CanonicalProgram, Expression};

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const INDENT: &str = "  ";

/// Renders `program` as an indented XML document ending in a newline.
pub fn to_xml(program: &CanonicalProgram) -> String {
    let mut writer = XmlWriter::new();

    let mut attrs = vec![("language", program.language.to_string())];
    if let Some(description) = &program.description {
        attrs.push(("description", description.clone()));
    }
    writer.open("program", &attrs);
    for class in &program.classes {
        writer.open(
            "class",
            &[("name", class.name.clone()), ("parent", class.parent.clone())],
        );
        for method in &class.methods {
            writer.open("method", &[("selector", method.selector.clone())]);
            write_block(&mut writer, &method.block);
            writer.close();
        }
        writer.close();
    }
    writer.close();

    writer.finish()
}

fn write_block(writer: &mut XmlWriter, block: &CanonicalBlock) {
    writer.open("block", &[("arity", block.arity().to_string())]);
    for (i, param) in block.params.iter().enumerate() {
        writer.leaf(
            "parameter",
            &[("name", param.clone()), ("order", (i + 1).to_string())],
        );
    }
    for (i, assign) in block.assigns.iter().enumerate() {
        writer.open("assign", &[("order", (i + 1).to_string())]);
        writer.leaf("var", &[("name", assign.target.clone())]);
        write_expr(writer, &assign.value);
        writer.close();
    }
    writer.close();
}

fn write_expr(writer: &mut XmlWriter, expr: &Expression) {
    writer.open("expr", &[]);
    match expr {
        Expression::Literal { class, value } => writer.leaf(
            "literal",
            &[("class", class.as_str().to_string()), ("value", value.clone())],
        ),
        Expression::Var(name) => writer.leaf("var", &[("name", name.clone())]),
        Expression::Block(block) => write_block(writer, block),
        Expression::Send {
            selector,
            receiver,
            args,
        } => {
            writer.open("send", &[("selector", selector.clone())]);
            write_expr(writer, receiver);
            for (i, arg) in args.iter().enumerate() {
                writer.open("arg", &[("order", (i + 1).to_string())]);
                write_expr(writer, arg);
                writer.close();
            }
            writer.close();
        }
    }
    writer.close();
}

// ============================================================================
// WRITER
// ============================================================================

/// Minimal streaming writer. An element opened with [`XmlWriter::open`] is
/// self-closed if nothing is written inside it before [`XmlWriter::close`].
struct XmlWriter {
    out: String,
    /// Open elements and whether their start tag is still unterminated.
    stack: Vec<(&'static str, bool)>,
}

impl XmlWriter {
    fn new() -> Self {
        let mut out = String::with_capacity(256);
        out.push_str(HEADER);
        out.push('\n');
        Self {
            out,
            stack: Vec::new(),
        }
    }

    fn open(&mut self, name: &'static str, attrs: &[(&str, String)]) {
        self.terminate_parent();
        self.indent(self.stack.len());
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            escape_attr(&mut self.out, value);
            self.out.push('"');
        }
        self.stack.push((name, true));
    }

    fn leaf(&mut self, name: &'static str, attrs: &[(&str, String)]) {
        self.open(name, attrs);
        self.close();
    }

    fn close(&mut self) {
        let Some((name, pending)) = self.stack.pop() else {
            return;
        };
        if pending {
            self.out.push_str("/>\n");
            return;
        }
        self.indent(self.stack.len());
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    fn terminate_parent(&mut self) {
        if let Some((_, pending)) = self.stack.last_mut() {
            if *pending {
                self.out.push_str(">\n");
                *pending = false;
            }
        }
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    fn finish(mut self) -> String {
        while !self.stack.is_empty() {
            self.close();
        }
        self.out
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::lower;
    use crate::syntax::parse;

    fn render(src: &str, description: Option<&str>) -> String {
        to_xml(&lower(&parse(src).unwrap(), description))
    }

    #[test]
    fn minimal_document() {
        let xml = render("class Main : Object { run [ | ] }", None);
        let expected = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<program language=\"SOL25\">
  <class name=\"Main\" parent=\"Object\">
    <method selector=\"run\">
      <block arity=\"0\"/>
    </method>
  </class>
</program>
";
        assert_eq!(xml, expected);
    }

    #[test]
    fn empty_program_self_closes() {
        assert!(render("", None).ends_with("<program language=\"SOL25\"/>\n"));
    }

    #[test]
    fn description_is_escaped() {
        let xml = render("", Some("a < b & c\nnext"));
        assert!(xml.contains(r#"description="a &lt; b &amp; c&#10;next""#));
    }

    #[test]
    fn send_layout() {
        let xml = render("class Main : Object { run [ :a | x := a plus: 1. ] }", None);
        let expected = "\
      <block arity=\"1\">
        <parameter name=\"a\" order=\"1\"/>
        <assign order=\"1\">
          <var name=\"x\"/>
          <expr>
            <send selector=\"plus:\">
              <expr>
                <var name=\"a\"/>
              </expr>
              <arg order=\"1\">
                <expr>
                  <literal class=\"Integer\" value=\"1\"/>
                </expr>
              </arg>
            </send>
          </expr>
        </assign>
      </block>
";
        assert!(xml.contains(expected), "{xml}");
    }

    #[test]
    fn string_literal_keeps_escapes() {
        let xml = render(r"class Main : Object { run [ | s := 'it\'s'. ] }", None);
        assert!(xml.contains(r#"<literal class="String" value="it\'s"/>"#));
    }
}
