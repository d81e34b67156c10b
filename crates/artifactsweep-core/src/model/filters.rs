/// Artifact filters: which directory names and file extensions are
/// considered build output.
///
/// Matching is exact: a directory matches only when its final path
/// segment equals a filter, a file only when its extension equals one.
/// Case sensitivity follows the host platform (see [`CaseRule::native`]).
use compact_str::CompactString;
use serde::Serialize;
use std::ffi::OsStr;

/// Directory names removed by default.
pub const DEFAULT_DIRECTORY_NAMES: [&str; 4] = ["bin", "obj", "Debug", "Release"];

/// File extensions removed by default (leading dot included).
pub const DEFAULT_FILE_EXTENSIONS: [&str; 1] = [".user"];

/// How names are compared against filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseRule {
    /// Byte-for-byte equality.
    Sensitive,
    /// ASCII letters compare equal regardless of case.
    AsciiInsensitive,
}

impl CaseRule {
    /// The comparison the host filesystem uses natively: Windows and macOS
    /// volumes are case-insensitive by default, everything else is not.
    pub const fn native() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            Self::AsciiInsensitive
        } else {
            Self::Sensitive
        }
    }

    #[inline]
    pub fn matches(self, name: &str, filter: &str) -> bool {
        match self {
            Self::Sensitive => name == filter,
            Self::AsciiInsensitive => name.eq_ignore_ascii_case(filter),
        }
    }
}

/// The fixed directory-name and file-extension sets a scan looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFilters {
    directory_names: Vec<CompactString>,
    file_extensions: Vec<CompactString>,
    case_rule: CaseRule,
}

impl Default for ArtifactFilters {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY_NAMES, DEFAULT_FILE_EXTENSIONS)
    }
}

impl ArtifactFilters {
    /// Build filters from directory names and extensions.
    ///
    /// Extensions are normalised to carry a leading dot (`user` becomes
    /// `.user`). Blank entries and duplicates are dropped.
    pub fn new<D, E>(directory_names: D, file_extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut dirs: Vec<CompactString> = Vec::new();
        for name in directory_names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !dirs.iter().any(|d| d == name) {
                dirs.push(CompactString::new(name));
            }
        }

        let mut exts: Vec<CompactString> = Vec::new();
        for ext in file_extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.');
            if ext.is_empty() {
                continue;
            }
            let ext = compact_str::format_compact!(".{ext}");
            if !exts.contains(&ext) {
                exts.push(ext);
            }
        }

        Self {
            directory_names: dirs,
            file_extensions: exts,
            case_rule: CaseRule::native(),
        }
    }

    /// Override the platform's native comparison.
    pub fn with_case_rule(mut self, case_rule: CaseRule) -> Self {
        self.case_rule = case_rule;
        self
    }

    pub fn directory_names(&self) -> &[CompactString] {
        &self.directory_names
    }

    pub fn file_extensions(&self) -> &[CompactString] {
        &self.file_extensions
    }

    pub fn case_rule(&self) -> CaseRule {
        self.case_rule
    }

    /// Returns the filter a directory name matches, if any.
    pub fn match_directory(&self, name: &str) -> Option<&CompactString> {
        self.directory_names
            .iter()
            .find(|filter| self.case_rule.matches(name, filter))
    }

    /// Returns the extension filter a file name matches, if any.
    ///
    /// The rest of the name may be any OS string; only the extension has to
    /// be valid UTF-8 to match.
    pub fn match_file<N: AsRef<OsStr> + ?Sized>(&self, name: &N) -> Option<&CompactString> {
        let ext = os_extension(name.as_ref())?;
        self.file_extensions
            .iter()
            .find(|filter| self.case_rule.matches(ext, filter))
    }

    /// `true` if no filter is configured at all, so nothing can match.
    pub fn is_empty(&self) -> bool {
        self.directory_names.is_empty() && self.file_extensions.is_empty()
    }
}

/// The extension of a file name, leading dot included.
///
/// Everything from the last `.` onwards, unless the dot ends the name.
/// Dot-files count as all extension: `.user` yields `.user`.
pub fn file_extension(name: &str) -> Option<&str> {
    os_extension(OsStr::new(name))
}

/// [`file_extension`] for names that are not necessarily UTF-8.
///
/// `None` unless the part from the last `.` onwards is valid UTF-8.
pub fn os_extension(name: &OsStr) -> Option<&str> {
    let bytes = name.as_encoded_bytes();
    let dot = bytes.iter().rposition(|&b| b == b'.')?;
    if dot + 1 == bytes.len() {
        return None;
    }
    std::str::from_utf8(&bytes[dot..]).ok()
}
