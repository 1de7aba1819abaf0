use super::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::*;

#[derive(Debug)]
struct ChipSource {
    source_info: SourceInfo,
    text: Arc<String>,
}

/// The set of HDL sources chips are resolved against.
/// A chip named `Foo` comes from the user's `Foo.hdl` if there is one,
/// and from the built-in catalog otherwise.
/// Compiled classes are cached by name, so every use of a chip shares one [`GateClass`].
#[derive(Debug, Default)]
pub struct Workspace {
    dir: Option<PathBuf>,
    sources: BTreeMap<String, ChipSource>,
    classes: BTreeMap<String, Arc<GateClass>>,
    depends: Depends<String>,
}

impl Workspace {
    pub fn new() -> Workspace {
        Workspace::default()
    }

    /// Reads every `.hdl` file in `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Workspace, HdlError> {
        let dir = dir.as_ref();
        let io_error = |e: std::io::Error| HdlError::Io(dir.to_owned(), e.to_string());

        let mut workspace = Workspace::new();
        workspace.dir = Some(dir.to_owned());
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().map_or(true, |ext| ext != "hdl") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let text = std::fs::read_to_string(&path).map_err(|e| HdlError::Io(path.clone(), e.to_string()))?;
            debug!("Found {}", path.display());
            workspace.sources.insert(
                name.to_string(),
                ChipSource {
                    source_info: SourceInfo::from_file(&path, &text),
                    text: Arc::new(text),
                },
            );
        }
        Ok(workspace)
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Re-reads the directory the workspace came from, so edited and new `.hdl` files are picked up.
    /// Anything compiled so far is forgotten. A workspace without a directory is left alone.
    pub fn reload(&mut self) -> Result<(), HdlError> {
        if let Some(dir) = self.dir() {
            *self = Workspace::from_dir(dir.to_owned())?;
        }
        Ok(())
    }

    /// Adds (or replaces) the source of a chip. A trailing `.hdl` on `name` is ignored.
    /// Anything compiled so far is forgotten.
    pub fn insert<S: Into<String>>(&mut self, name: &str, text: S) {
        let name = name.strip_suffix(".hdl").unwrap_or(name);
        let text = text.into();
        self.sources.insert(
            name.to_string(),
            ChipSource {
                source_info: SourceInfo::from_chip(name, &text),
                text: Arc::new(text),
            },
        );
        self.classes.clear();
        self.depends.clear();
    }

    /// The chips with HDL sources in this workspace.
    pub fn chip_names(&self) -> Vec<&str> {
        self.sources.keys().map(|name| name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name) || builtin(name).is_some()
    }

    /// Compiles the named chip, and everything it is built out of, or returns the cached class.
    pub fn gate_class(&mut self, name: &str) -> Result<Arc<GateClass>, HdlError> {
        self.resolve(name, &Loc::unknown())
    }

    /// Resolves a part used inside `parent`.
    pub(crate) fn part_class(&mut self, part: &str, parent: &str, loc: &Loc) -> Result<Arc<GateClass>, HdlError> {
        self.depends.add_dependency(parent.to_string(), part.to_string());
        if self.depends.sort().is_err() {
            self.depends.remove_dependency(&parent.to_string(), &part.to_string());
            return Err(HdlError::Resolution(
                loc.clone(),
                format!("{parent} can not use {part}: {part} is built out of {parent}"),
            ));
        }
        self.resolve(part, loc)
    }

    fn resolve(&mut self, name: &str, loc: &Loc) -> Result<Arc<GateClass>, HdlError> {
        if let Some(class) = self.classes.get(name) {
            return Ok(class.clone());
        }

        let (source_info, text) = if let Some(source) = self.sources.get(name) {
            (source.source_info.clone(), source.text.clone())
        } else if let Some(def) = builtin(name) {
            (SourceInfo::from_chip(name, def.hdl), Arc::new(def.hdl.to_string()))
        } else {
            return Err(HdlError::Resolution(
                loc.clone(),
                format!("Chip {name} is not in the workspace or the built-in library"),
            ));
        };

        let class = parse::parse_chip(source_info.clone(), &text, self)?;
        if class.name() != name {
            return Err(HdlError::parse(
                &Loc::from(&source_info, 0, 0),
                format!("Chip {} is defined in {name}.hdl", class.name()),
            ));
        }

        if builtin(name).is_some() && !self.sources.contains_key(name) {
            debug!("Compiled built-in {name}");
        } else {
            info!("Compiled {name}");
        }

        let class = Arc::new(class);
        self.classes.insert(name.to_string(), class.clone());
        Ok(class)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtins_resolve() {
        let mut workspace = Workspace::new();
        let not = workspace.gate_class("Not").unwrap();
        assert_eq!(not.primitive(), Some(Primitive::Not));
        assert!(Arc::ptr_eq(&not, &workspace.gate_class("Not").unwrap()));

        for name in builtin_names() {
            assert_eq!(workspace.gate_class(name).unwrap().name(), name);
        }
    }

    #[test]
    fn user_chip_shadows_builtin() {
        let mut workspace = Workspace::new();
        workspace.insert(
            "Not.hdl",
            "CHIP Not { IN in; OUT out; PARTS: Nand(a=in, b=in, out=out); }",
        );
        let not = workspace.gate_class("Not").unwrap();
        assert!(!not.is_builtin());
        assert_eq!(not.parts()[0].name(), "Nand");
    }

    #[test]
    fn unknown_chip() {
        let mut workspace = Workspace::new();
        workspace.insert("X", "CHIP X { IN a; OUT b; PARTS: Frobnicate(in=a, out=b); }");
        let error = workspace.gate_class("X").unwrap_err();
        assert!(matches!(error, HdlError::Resolution(_, _)));
        assert!(error.to_string().contains("Frobnicate"));
        let error = workspace.gate_class("Y").unwrap_err();
        assert!(matches!(error, HdlError::Resolution(_, _)));
        assert_eq!(error.to_string(), "Chip Y is not in the workspace or the built-in library");
    }

    #[test]
    fn circular() {
        let mut workspace = Workspace::new();
        workspace.insert("A", "CHIP A { IN in; OUT out; PARTS: B(in=in, out=out); }");
        workspace.insert("B", "CHIP B { IN in; OUT out; PARTS: A(in=in, out=out); }");
        workspace.insert("C", "CHIP C { IN in; OUT out; PARTS: C(in=in, out=out); }");
        assert!(matches!(workspace.gate_class("A"), Err(HdlError::Resolution(_, _))));
        assert!(matches!(workspace.gate_class("C"), Err(HdlError::Resolution(_, _))));

        workspace.insert("B", "CHIP B { IN in; OUT out; PARTS: Not(in=in, out=out); }");
        assert!(workspace.gate_class("A").is_ok());
    }

    #[test]
    fn name_mismatch() {
        let mut workspace = Workspace::new();
        workspace.insert("Foo", "CHIP Bar { IN in; OUT out; BUILTIN Not; }");
        assert!(workspace.gate_class("Foo").unwrap_err().to_string().contains("Chip Bar is defined in Foo.hdl"));
    }
}
