use super::{Node, Param, Scene};
use crate::common::{ExportError, Result, SpectralDistribution};
use itertools::Itertools;
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Writer,
};
use regex::Regex;
use std::{fs, path::Path};

pub const DEFAULT_DECIMALS: usize = 15;

const INDENT_SIZE: usize = 4;

lazy_static::lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^a-z0-9]+").expect("slug pattern compiles");
}

/// Lowercases `name` and collapses every run of characters outside `[a-z0-9]`
/// into a single underscore, trimming underscores at both ends.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_WORD
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_owned()
}

/// [`slugify`], failing when nothing identifier-worthy is left.
pub fn checked_slug(name: &str) -> Result<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ExportError::MalformedIdentifier(name.to_owned()));
    }
    Ok(slug)
}

/// Renders `wavelength:value` pairs with `decimals` fractional digits. Values
/// are floored at zero, renderer spectra cannot be negative.
pub fn format_spectrum(sd: &SpectralDistribution, decimals: usize) -> String {
    sd.iter()
        .map(|(wavelength, value)| {
            let value = if value > 0.0 { value } else { 0.0 };
            format!("{:.*}:{:.*}", decimals, wavelength, decimals, value)
        })
        .join(", ")
}

pub fn format_float(value: f64) -> String {
    format!("{}", value)
}

/// Serializes scene documents as indented UTF-8 XML.
#[derive(Clone, Copy, Debug)]
pub struct SceneWriter {
    pub decimals: usize,
}

impl Default for SceneWriter {
    fn default() -> Self {
        Self::new(DEFAULT_DECIMALS)
    }
}

impl SceneWriter {
    pub fn new(decimals: usize) -> Self {
        SceneWriter { decimals }
    }

    pub fn render(&self, scene: Scene) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let root = BytesStart::new("scene").with_attributes([("version", scene.version())]);
        if scene.is_empty() {
            writer.write_event(Event::Empty(root))?;
        } else {
            writer.write_event(Event::Start(root))?;
            for node in scene.nodes() {
                self.write_node(&mut writer, node)?;
            }
            writer.write_event(Event::End(BytesEnd::new("scene")))?;
        }

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
        let tag = node.kind().tag();
        let element = BytesStart::new(tag)
            .with_attributes([("type", node.kind().type_attr()), ("id", node.id())]);

        if node.params().is_empty() {
            writer.write_event(Event::Empty(element))?;
            return Ok(());
        }

        writer.write_event(Event::Start(element))?;
        for param in node.params() {
            let value = match param {
                Param::Spectrum { value, .. } => format_spectrum(value, self.decimals),
                Param::Float { value, .. } => format_float(*value),
            };
            let element = BytesStart::new(param.tag())
                .with_attributes([("name", param.name()), ("value", value.as_str())]);
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new(tag)))?;

        Ok(())
    }

    /// Renders `scene` and writes it to `path` through a temporary sibling file,
    /// so a failed export never leaves a truncated document behind.
    pub fn write_scene(&self, scene: Scene, path: &Path) -> Result<()> {
        let bytes = self.render(scene)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut temporary = path.as_os_str().to_owned();
        temporary.push(".tmp");
        fs::write(&temporary, &bytes)?;
        if let Err(err) = fs::rename(&temporary, path) {
            // best effort
            let _ = fs::remove_file(&temporary);
            return Err(err.into());
        }

        Ok(())
    }
}

pub fn render(scene: Scene) -> Result<Vec<u8>> {
    SceneWriter::default().render(scene)
}
