//! Binary motion vector files.
//!
//! A file is a flat sequence of records with no header. Each record is one
//! vector stored as two little-endian IEEE-754 `f32` values, `x` then `y`,
//! in the raster order of the field. The file does not record the grid, so
//! the reader returns every complete record it finds and leaves checking the
//! count against the expected grid to the caller ([`load_field`] does this).

use crate::field::{MotionField, MotionVector};
use crate::grid::BlockGrid;
use crate::util::MotionResult;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Size of one encoded vector in bytes.
pub const RECORD_BYTES: usize = 8;

/// Writes `vectors` as consecutive records.
pub fn write_vectors<W: Write>(writer: &mut W, vectors: &[MotionVector]) -> MotionResult<()> {
    for vector in vectors {
        let mut record = [0u8; RECORD_BYTES];
        record[..4].copy_from_slice(&vector.x.to_le_bytes());
        record[4..].copy_from_slice(&vector.y.to_le_bytes());
        writer.write_all(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads records until the input ends.
///
/// A trailing partial record, or any read failure after the first complete
/// record, ends the sequence without error.
pub fn read_vectors<R: Read>(mut reader: R) -> MotionResult<Vec<MotionVector>> {
    let mut vectors = Vec::new();
    let mut record = [0u8; RECORD_BYTES];
    while reader.read_exact(&mut record).is_ok() {
        let x = f32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        let y = f32::from_le_bytes([record[4], record[5], record[6], record[7]]);
        vectors.push(MotionVector::new(x, y));
    }
    Ok(vectors)
}

/// Saves `vectors` to `path`, replacing any existing file.
pub fn save_vectors<P: AsRef<Path>>(vectors: &[MotionVector], path: P) -> MotionResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_vectors(&mut writer, vectors)
}

/// Loads every complete record from `path`.
pub fn load_vectors<P: AsRef<Path>>(path: P) -> MotionResult<Vec<MotionVector>> {
    let reader = BufReader::new(File::open(path)?);
    read_vectors(reader)
}

/// Loads a field from `path` and checks it has one vector per block of
/// `grid`.
pub fn load_field<P: AsRef<Path>>(path: P, grid: BlockGrid) -> MotionResult<MotionField> {
    let vectors = load_vectors(path)?;
    MotionField::from_vectors(grid, vectors)
}

impl MotionField {
    /// Saves the field's vectors to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> MotionResult<()> {
        save_vectors(self.vectors(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::{read_vectors, write_vectors, RECORD_BYTES};
    use crate::field::MotionVector;

    #[test]
    fn records_are_little_endian_pairs() {
        let mut buf = Vec::new();
        write_vectors(&mut buf, &[MotionVector::new(1.0, -0.25)]).unwrap();
        assert_eq!(buf.len(), RECORD_BYTES);
        assert_eq!(&buf[..4], &1.0f32.to_le_bytes());
        assert_eq!(&buf[4..], &(-0.25f32).to_le_bytes());
    }

    #[test]
    fn trailing_partial_record_is_ignored() {
        let mut buf = Vec::new();
        let vectors = [MotionVector::new(2.0, 1.0), MotionVector::new(-3.5, 0.75)];
        write_vectors(&mut buf, &vectors).unwrap();
        buf.extend_from_slice(&[0xAB, 0xCD, 0xEF]);
        let loaded = read_vectors(buf.as_slice()).unwrap();
        assert_eq!(loaded, vectors);
    }

    #[test]
    fn empty_input_yields_no_vectors() {
        let loaded = read_vectors(&[][..]).unwrap();
        assert!(loaded.is_empty());
    }
}
