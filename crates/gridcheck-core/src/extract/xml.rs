//! A small element tree over `quick-xml`.
//!
//! Package parts are short, and most facts need to look at siblings and
//! ancestors at the same time, so each part is read into a tree once.
//! Element and attribute names are stored without their namespace prefix
//! (`x14:sparkline` becomes `sparkline`, `r:id` becomes `id`).

use crate::error::{GridcheckError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

fn start_element(e: &BytesStart<'_>, part: &str) -> Result<Element> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| GridcheckError::xml(part, err))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| GridcheckError::xml(part, err))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        ..Element::default()
    })
}

impl Element {
    /// Parse a whole part. `part` names it in error messages.
    pub fn parse(xml: &str, part: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        // Synthetic document node; its only child is the root element.
        let mut stack = vec![Element::default()];

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => stack.push(start_element(&e, part)?),
                Ok(Event::Empty(e)) => {
                    let element = start_element(&e, part)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(element);
                    }
                }
                Ok(Event::End(_)) => {
                    if stack.len() < 2 {
                        return Err(GridcheckError::xml(part, "unbalanced end tag"));
                    }
                    if let Some(done) = stack.pop()
                        && let Some(parent) = stack.last_mut()
                    {
                        parent.children.push(done);
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|err| GridcheckError::xml(part, err))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(t)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Err(err) => return Err(GridcheckError::xml(part, err)),
                _ => {}
            }
            buf.clear();
        }

        if stack.len() != 1 {
            return Err(GridcheckError::xml(part, "unexpected end of document"));
        }
        stack
            .pop()
            .and_then(|doc| doc.children.into_iter().next())
            .ok_or_else(|| GridcheckError::xml(part, "no root element"))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// OOXML boolean attribute (`1`/`true`), with a default when absent.
    pub fn flag(&self, name: &str, default: bool) -> bool {
        match self.attr(name) {
            Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
            None => default,
        }
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a path of child names from this element.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// All elements named `name` below this one, in document order.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    /// Concatenated text of this element and everything below it.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    /// The `val` attribute of a named child (`<c:barDir val="col"/>`).
    pub fn child_val(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.attr("val"))
    }
}
