use std::fs;
use std::path::Path;

use tracing::info;

use super::{Sample, PIXEL_MAX};
use crate::error::{ensure_len, Error, Result};
use crate::grid::Grid;
use crate::{GRID_AREA, GRID_SIDE, N_CLASSES};

const IMAGE_MAGIC: u32 = 2051;
const LABEL_MAGIC: u32 = 2049;

// Load up to `limit` samples from a pair of IDX files (the original MNIST
// distribution format). All header integers are big-endian u32.
// - images: magic, count, rows, cols, then one byte per pixel
// - labels: magic, count, then one byte per label
pub fn load_mnist_idx(
    images_path: impl AsRef<Path>,
    labels_path: impl AsRef<Path>,
    limit: usize,
) -> Result<Vec<Sample>> {
    let images = fs::read(images_path.as_ref())?;
    let labels = fs::read(labels_path.as_ref())?;
    let samples = parse_idx(&images, &labels, limit)?;
    info!(
        images = %images_path.as_ref().display(),
        count = samples.len(),
        "loaded idx samples"
    );
    Ok(samples)
}

fn parse_idx(images: &[u8], labels: &[u8], limit: usize) -> Result<Vec<Sample>> {
    let mut image_header = Header::new(images);
    image_header.magic(IMAGE_MAGIC)?;
    let n_images = image_header.read_u32()? as usize;
    ensure_len("idx image rows", GRID_SIDE, image_header.read_u32()? as usize)?;
    ensure_len("idx image columns", GRID_SIDE, image_header.read_u32()? as usize)?;

    let mut label_header = Header::new(labels);
    label_header.magic(LABEL_MAGIC)?;
    let n_labels = label_header.read_u32()? as usize;
    ensure_len("idx label count", n_images, n_labels)?;

    let pixels = image_header.rest();
    let labels = label_header.rest();
    ensure_len("idx image data", n_images * GRID_AREA, pixels.len())?;
    ensure_len("idx label data", n_labels, labels.len())?;

    pixels
        .chunks(GRID_AREA)
        .zip(labels)
        .take(limit)
        .map(|(image, &label)| -> Result<Sample> {
            let label = label as usize;
            if label >= N_CLASSES {
                return Err(Error::InvalidLabel(label));
            }
            let values: Vec<f64> = image.iter().map(|&p| p as f64 / PIXEL_MAX).collect();
            Ok(Sample {
                grid: Grid::from_slice(&values)?,
                label,
            })
        })
        .collect()
}

// Cursor over the big-endian header fields of an IDX file
struct Header<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Header<'a> {
    fn new(data: &'a [u8]) -> Self {
        Header { data, offset: 0 }
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self
            .data
            .get(self.offset..self.offset + 4)
            .ok_or_else(|| Error::shape("idx header", self.offset + 4, self.data.len()))?;
        self.offset += 4;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn magic(&mut self, expected: u32) -> Result<()> {
        let actual = self.read_u32()?;
        if actual != expected {
            return Err(Error::BadMagic { expected, actual });
        }
        Ok(())
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }
}
