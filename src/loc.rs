use std::sync::Arc;

type Pos = usize;

/// Where a piece of HDL text came from.
/// Chips loaded from a workspace directory remember their file,
/// built-in skeletons and in-memory sources remember the chip name.
#[derive(Clone, Debug)]
pub enum Source {
    File(Arc<std::path::PathBuf>),
    Chip(Arc<String>),
    Unknown,
}

/// A [`SourceInfo`] is shared by every [`Loc`] produced while lexing one HDL text.
/// It converts byte positions into a [`LineCol`].
#[derive(Clone, Debug)]
pub struct SourceInfo {
    source: Source,
    line_starts: Arc<Vec<Pos>>,
}

impl SourceInfo {
    pub fn unknown() -> SourceInfo {
        SourceInfo {
            source: Source::Unknown,
            line_starts: Arc::new(vec![0]),
        }
    }

    pub fn from_file(filepath: &std::path::Path, contents: &str) -> SourceInfo {
        SourceInfo {
            source: Source::File(Arc::new(filepath.to_owned())),
            line_starts: Arc::new(line_starts(contents)),
        }
    }

    pub fn from_chip(name: &str, contents: &str) -> SourceInfo {
        SourceInfo {
            source: Source::Chip(Arc::new(name.to_owned())),
            line_starts: Arc::new(line_starts(contents)),
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn linecol(&self, pos: Pos) -> LineCol {
        let line = match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LineCol(line, pos - self.line_starts[line])
    }
}

fn line_starts(text: &str) -> Vec<Pos> {
    let mut starts = vec![0];
    for (i, ch) in text.char_indices() {
        if ch == '\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// A [`LineCol`] is a container for a line and column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineCol(usize, usize);

impl LineCol {
    /// The line number. Starts with line 1.
    pub fn line(&self) -> usize {
        self.0 + 1
    }

    /// The column. Starts with column 1.
    pub fn col(&self) -> usize {
        self.1 + 1
    }
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}:{}", self.line(), self.col())
    }
}

/// A [`Loc`] tracks the span of a token.
#[derive(Clone)]
pub struct Loc {
    start: Pos,
    end: Pos,
    source_info: SourceInfo,
}

impl Loc {
    /// When the location of something is unknown, you can use this.
    pub fn unknown() -> Loc {
        Loc {
            start: 0,
            end: 0,
            source_info: SourceInfo::unknown(),
        }
    }

    pub fn from(source_info: &SourceInfo, start: usize, end: usize) -> Loc {
        Loc {
            start,
            end,
            source_info: source_info.clone(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.source(), Source::Unknown)
    }

    /// The start of the span.
    pub fn start(&self) -> LineCol {
        self.source_info.linecol(self.start)
    }

    /// The end of the span.
    pub fn end(&self) -> LineCol {
        self.source_info.linecol(self.end)
    }

    pub fn source(&self) -> &Source {
        self.source_info.source()
    }

    /// The span from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Loc) -> Loc {
        Loc {
            start: self.start,
            end: other.end,
            source_info: self.source_info.clone(),
        }
    }
}

impl std::fmt::Debug for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "[{}-{}]", self.start, self.end)
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self.source() {
            Source::File(path) => write!(f, "{}:{}", path.display(), self.start()),
            Source::Chip(name) => write!(f, "{name}.hdl:{}", self.start()),
            Source::Unknown => write!(f, "<unknown>"),
        }
    }
}

/// Many objects have location information.
/// [`HasLoc`] allows you to call [`HasLoc::loc`] to get the span information.
pub trait HasLoc {
    fn loc(&self) -> Loc;
}

#[test]
fn linecol() {
    let text = "CHIP Not {
    IN in;
    OUT out;";

    let source_info = SourceInfo::from_chip("Not", text);
    assert_eq!(source_info.linecol(0).to_string(), "1:1".to_string());
    assert_eq!(source_info.linecol(5).to_string(), "1:6".to_string());
    assert_eq!(source_info.linecol(10).to_string(), "1:11".to_string());
    assert_eq!(source_info.linecol(11).to_string(), "2:1".to_string());
    assert_eq!(source_info.linecol(15).to_string(), "2:5".to_string());
    assert_eq!(source_info.linecol(22).to_string(), "3:1".to_string());
}
