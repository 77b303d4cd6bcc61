//! Source files, byte ranges and locations.

use std::fmt;
use std::num::NonZeroU32;
use std::ops::Range;

use codespan_reporting::files::{Error, SimpleFile};

/// File id.
// - `u32` over `usize`, as 4 billion files should be enough for anyone
// - `NonZeroU32` gives `Option<FileRange>` and `Location` a niche
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FileId(NonZeroU32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u32> for FileId {
    type Error = <NonZeroU32 as TryFrom<u32>>::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(FileId(NonZeroU32::try_from(value)?))
    }
}

impl From<FileId> for usize {
    fn from(value: FileId) -> Self {
        value.0.get() as usize
    }
}

/// A database of source files, indexed by [`FileId`].
pub struct Files {
    files: Vec<SimpleFile<String, String>>,
}

impl Files {
    pub fn new() -> Files {
        Files { files: Vec::new() }
    }

    /// Add a file to the database, returning the handle that can be used to
    /// refer to it again.
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> FileId {
        let source = source.into();
        assert!(
            source.len() <= u32::MAX as usize,
            "source files must be less than 4GiB in length"
        );
        self.files.push(SimpleFile::new(name.into(), source));
        let len = u32::try_from(self.files.len())
            .expect("Too many files (maximum amount of files is `u32::MAX`)");
        FileId::try_from(len).expect("file ids start at one")
    }

    pub fn get(&self, file_id: FileId) -> Result<&SimpleFile<String, String>, Error> {
        let index = usize::from(file_id) - 1;
        self.files.get(index).ok_or(Error::FileMissing)
    }

    pub fn source(&self, file_id: FileId) -> Result<&str, Error> {
        Ok(self.get(file_id)?.source().as_str())
    }
}

impl Default for Files {
    fn default() -> Files {
        Files::new()
    }
}

impl<'a> codespan_reporting::files::Files<'a> for Files {
    type FileId = FileId;
    type Name = String;
    type Source = &'a str;

    fn name(&self, file_id: FileId) -> Result<String, Error> {
        Ok(self.get(file_id)?.name().clone())
    }

    fn source(&self, file_id: FileId) -> Result<&str, Error> {
        Files::source(self, file_id)
    }

    fn line_index(&self, file_id: FileId, byte_index: usize) -> Result<usize, Error> {
        self.get(file_id)?.line_index((), byte_index)
    }

    fn line_range(&self, file_id: FileId, line_index: usize) -> Result<Range<usize>, Error> {
        self.get(file_id)?.line_range((), line_index)
    }
}

/// Byte offsets into source files.
pub type BytePos = u32;

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ByteRange {
    start: BytePos,
    end: BytePos,
}

impl fmt::Debug for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteRange({}..{})", self.start, self.end)
    }
}

impl ByteRange {
    pub const fn new(start: BytePos, end: BytePos) -> ByteRange {
        ByteRange { start, end }
    }

    pub const fn start(&self) -> BytePos {
        self.start
    }

    pub const fn end(&self) -> BytePos {
        self.end
    }

    pub fn merge(self, other: ByteRange) -> ByteRange {
        ByteRange::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<ByteRange> for Range<usize> {
    fn from(range: ByteRange) -> Self {
        (range.start as usize)..(range.end as usize)
    }
}

/// Byte ranges in a specific source file.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct FileRange {
    file_id: FileId,
    byte_range: ByteRange,
}

impl fmt::Debug for FileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FileRange({}, {}..{})",
            self.file_id, self.byte_range.start, self.byte_range.end
        )
    }
}

impl FileRange {
    pub const fn new(file_id: FileId, byte_range: ByteRange) -> FileRange {
        FileRange {
            file_id,
            byte_range,
        }
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub const fn byte_range(&self) -> ByteRange {
        self.byte_range
    }

    pub const fn start(&self) -> BytePos {
        self.byte_range.start
    }

    pub const fn end(&self) -> BytePos {
        self.byte_range.end
    }

    /// Merge two ranges, returning `None` if they are in different files.
    pub fn merge(&self, other: &FileRange) -> Option<FileRange> {
        (self.file_id == other.file_id)
            .then(|| FileRange::new(self.file_id, self.byte_range.merge(other.byte_range)))
    }
}

impl From<FileRange> for Range<usize> {
    fn from(file_range: FileRange) -> Self {
        file_range.byte_range.into()
    }
}

/// The location of a node in the source, along with whether elaboration
/// should report information (such as the type of the node) back to the
/// user. Nodes introduced while desugaring have `for_info` switched off, so
/// that each source expression is reported only once.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    range: FileRange,
    for_info: bool,
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({:?}, for_info: {})", self.range, self.for_info)
    }
}

impl Location {
    pub const fn new(range: FileRange) -> Location {
        Location {
            range,
            for_info: true,
        }
    }

    pub const fn range(&self) -> FileRange {
        self.range
    }

    pub const fn for_info(&self) -> bool {
        self.for_info
    }

    /// The same location, with information reporting switched off.
    pub const fn not_for_info(self) -> Location {
        Location {
            range: self.range,
            for_info: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// `ByteRange` is used a lot. Ensure it doesn't grow accidentally.
    fn byte_range_size() {
        assert_eq!(std::mem::size_of::<ByteRange>(), 8);
    }

    #[test]
    /// `FileRange` is used a lot. Ensure it doesn't grow accidentally.
    fn file_range_size() {
        assert_eq!(std::mem::size_of::<FileRange>(), 12);
    }

    #[test]
    /// Every surface node carries a `Location`.
    fn location_size() {
        assert_eq!(std::mem::size_of::<Location>(), 16);
        assert_eq!(std::mem::size_of::<Option<Location>>(), 16);
    }

    #[test]
    fn merge_ranges_in_the_same_file() {
        let file_id = FileId::try_from(1).unwrap();
        let a = FileRange::new(file_id, ByteRange::new(3, 7));
        let b = FileRange::new(file_id, ByteRange::new(5, 12));
        assert_eq!(a.merge(&b), Some(FileRange::new(file_id, ByteRange::new(3, 12))));

        let other_file = FileId::try_from(2).unwrap();
        let c = FileRange::new(other_file, ByteRange::new(0, 1));
        assert_eq!(a.merge(&c), None);
    }

    #[test]
    fn files_are_numbered_from_one() {
        let mut files = Files::new();
        let first = files.add("first.pie", "(claim x Nat)");
        let second = files.add("second.pie", "zero");
        assert_eq!(usize::from(first), 1);
        assert_eq!(files.source(second).unwrap(), "zero");
    }
}
