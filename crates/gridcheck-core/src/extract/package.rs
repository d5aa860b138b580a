//! Reading parts out of an OOXML (`.xlsx` / `.xlsm`) package.

use super::xml::Element;
use crate::error::{GridcheckError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

/// Parts larger than this are refused.
const MAX_PART_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Full part name inside the package.
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Relationship types are URIs; match on their last segment.
    pub fn is(&self, kind: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(kind)
    }
}

pub struct Package {
    archive: ZipArchive<File>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Package> {
        let file = File::open(path)?;
        Ok(Package {
            archive: ZipArchive::new(file)?,
        })
    }

    pub fn read_optional(&mut self, name: &str) -> Result<Option<String>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if entry.size() > MAX_PART_BYTES {
            return Err(GridcheckError::xml(name, "part too large"));
        }
        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        Ok(Some(content))
    }

    pub fn read_part(&mut self, name: &str) -> Result<String> {
        self.read_optional(name)?
            .ok_or_else(|| GridcheckError::MissingPart(name.to_string()))
    }

    pub fn xml(&mut self, name: &str) -> Result<Element> {
        Element::parse(&self.read_part(name)?, name)
    }

    pub fn xml_optional(&mut self, name: &str) -> Result<Option<Element>> {
        match self.read_optional(name)? {
            Some(content) => Ok(Some(Element::parse(&content, name)?)),
            None => Ok(None),
        }
    }

    /// Relationships declared by `part`; an absent `.rels` part means none.
    pub fn relationships(&mut self, part: &str) -> Result<Vec<Relationship>> {
        let rels_name = rels_path_for(part);
        let Some(root) = self.xml_optional(&rels_name)? else {
            return Ok(Vec::new());
        };
        Ok(root
            .children_named("Relationship")
            .filter_map(|rel| {
                let id = rel.attr("Id")?.to_string();
                let raw_target = rel.attr("Target")?;
                let external = rel.attr("TargetMode") == Some("External");
                let target = if external {
                    raw_target.to_string()
                } else {
                    resolve_target(part, raw_target)
                };
                Some(Relationship {
                    id,
                    rel_type: rel.attr("Type").unwrap_or_default().to_string(),
                    target,
                    external,
                })
            })
            .collect())
    }

    /// Part name of the worksheet called `sheet`.
    pub fn sheet_part(&mut self, sheet: &str) -> Result<String> {
        let workbook = self.xml("xl/workbook.xml")?;
        let rels = self.relationships("xl/workbook.xml")?;
        let entry = workbook
            .find(&["sheets"])
            .into_iter()
            .flat_map(|sheets| sheets.children_named("sheet"))
            .find(|s| s.attr("name") == Some(sheet))
            .ok_or_else(|| GridcheckError::SheetNotFound(sheet.to_string()))?;
        let rel_id = entry
            .attr("id")
            .ok_or_else(|| GridcheckError::xml("xl/workbook.xml", "sheet without r:id"))?;
        rels.into_iter()
            .find(|r| r.id == rel_id)
            .map(|r| r.target)
            .ok_or_else(|| GridcheckError::MissingPart(format!("relationship {}", rel_id)))
    }
}

/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
pub fn rels_path_for(part: &str) -> String {
    match part.rfind('/') {
        Some(i) => format!("{}_rels/{}.rels", &part[..=i], &part[i + 1..]),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target relative to the part that declares it.
pub fn resolve_target(base_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_part.split('/').collect();
    segments.pop();
    for piece in target.split('/') {
        match piece {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(piece),
        }
    }
    segments.join("/")
}
