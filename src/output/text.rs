//! Human-readable terminal output.
//!
//! Every function writes to a caller-supplied writer so the binary can
//! target stdout and tests can target a buffer. Color is decided per
//! [`TextOutput`] rather than globally.

use std::io::{self, Write};
use std::path::Path;

use yansi::{Condition, Paint, Painted};

use crate::analysis::{human_size, Analysis};
use crate::duplicates::{DuplicateGroup, IndexSource};

/// Text renderer for detection results.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput {
    color: bool,
}

impl TextOutput {
    /// Create a renderer, with or without ANSI colors.
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint<'a, T: ?Sized>(&self, painted: Painted<&'a T>) -> Painted<&'a T> {
        if self.color {
            painted
        } else {
            painted.whenever(Condition::NEVER)
        }
    }

    /// Write each duplicate set, numbered from 1, kept file first.
    ///
    /// ```text
    /// 1. 2 files, 100 B each
    ///    keep  /data/a.txt
    ///    junk  /data/b.txt
    /// ```
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_groups<W: Write>(
        &self,
        writer: &mut W,
        groups: &[DuplicateGroup<'_>],
        source: IndexSource,
    ) -> io::Result<()> {
        for (i, group) in groups.iter().enumerate() {
            writeln!(
                writer,
                "{} {} files, {} each",
                self.paint(format!("{}.", i + 1).as_str().bold()),
                group.len(),
                human_size(group.size())
            )?;
            if let Some(keep) = group.keep() {
                writeln!(
                    writer,
                    "   {}  {}",
                    self.paint("keep".green()),
                    keep.full_path.display()
                )?;
            }
            for junk in group.junk() {
                writeln!(
                    writer,
                    "   {}  {}",
                    self.paint("junk".red()),
                    junk.full_path.display()
                )?;
            }
        }

        if source == IndexSource::Size {
            writeln!(
                writer,
                "{}",
                self.paint("note: compared by size only; contents were not checked".yellow())
            )?;
        }
        Ok(())
    }

    /// Write the analysis block.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_analysis<W: Write>(&self, writer: &mut W, analysis: &Analysis) -> io::Result<()> {
        writeln!(
            writer,
            "Total duplicates found: {}",
            self.paint(analysis.total_count.to_string().as_str().bold())
        )?;
        writeln!(
            writer,
            "Reclaimable space: {}",
            self.paint(analysis.reclaimable_display().as_str().bold())
        )?;
        writeln!(
            writer,
            "Most occurrence: {}",
            self.paint(analysis.largest_group.to_string().as_str().bold())
        )
    }

    /// Closing line after a successful search.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_found<W: Write>(&self, writer: &mut W, sets: usize) -> io::Result<()> {
        let noun = if sets == 1 { "set" } else { "sets" };
        writeln!(
            writer,
            "{}",
            self.paint(format!("[+] Found {} duplicate {}.", sets, noun).as_str().green())
        )
    }

    /// Message for a directory with nothing to scan.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_no_files<W: Write>(&self, writer: &mut W, path: &Path) -> io::Result<()> {
        writeln!(
            writer,
            "{}",
            self.paint(format!("[-] No files found in {}.", path.display()).as_str().yellow())
        )
    }

    /// Message for a scan where nothing is duplicated.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_no_duplicates<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", self.paint("[-] No duplicates found.".yellow()))
    }
}
