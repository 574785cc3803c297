use std::path::Path;

use tracing::info;

use super::{Sample, PIXEL_MAX};
use crate::error::{ensure_len, Error, Result};
use crate::grid::Grid;
use crate::{GRID_AREA, N_CLASSES};

// Load MNIST images from a csv file, stopping after `limit` rows.
// The expected format is:
// - No headers
// - One image per row
// - Each row starts with the class label 0-9
// - The rest of the row consists of 28x28 pixel values, 0-255
pub fn load_mnist_csv(path: impl AsRef<Path>, limit: usize) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    let samples = reader
        .records()
        .take(limit)
        .map(|result| -> Result<Sample> {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            ensure_len("csv record fields", GRID_AREA + 1, record.len())?;

            let label = record[0].trim().parse::<usize>().map_err(|e| Error::Parse {
                line,
                message: format!("label {:?}: {}", &record[0], e),
            })?;
            if label >= N_CLASSES {
                return Err(Error::InvalidLabel(label));
            }

            let pixels = record
                .iter()
                .skip(1) // Skip the label
                .enumerate()
                .map(|(index, field)| match field.trim().parse::<f64>() {
                    Ok(value) if (0.0..=PIXEL_MAX).contains(&value) => Ok(value / PIXEL_MAX),
                    _ => Err(Error::InvalidPixel {
                        index,
                        value: field.to_owned(),
                    }),
                })
                .collect::<Result<Vec<f64>>>()?;

            Ok(Sample {
                grid: Grid::from_slice(&pixels)?,
                label,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(path = %path.display(), count = samples.len(), "loaded csv samples");
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(label: &str, fill: &str) -> String {
        let mut fields = vec![label.to_owned()];
        fields.extend(std::iter::repeat(fill.to_owned()).take(GRID_AREA));
        fields.join(",")
    }

    fn write_csv(rows: &[String]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for r in rows {
            writeln!(file, "{}", r).unwrap();
        }
        file
    }

    #[test]
    fn test_load_and_scale() {
        let file = write_csv(&[row("7", "255"), row("0", "0"), row("3", "51")]);
        let samples = load_mnist_csv(file.path(), usize::MAX).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].label, 7);
        assert_eq!(samples[0].grid.get(27, 27), 1.0);
        assert!(samples[1].grid.is_blank());
        assert!((samples[2].grid.get(0, 0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_limit() {
        let file = write_csv(&[row("1", "0"), row("2", "0"), row("3", "0")]);
        let samples = load_mnist_csv(file.path(), 2).unwrap();
        assert_eq!(samples.iter().map(|s| s.label).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_bad_rows() {
        let file = write_csv(&[row("12", "0")]);
        assert!(matches!(
            load_mnist_csv(file.path(), usize::MAX),
            Err(Error::InvalidLabel(12))
        ));

        let file = write_csv(&[row("1", "300")]);
        assert!(matches!(
            load_mnist_csv(file.path(), usize::MAX),
            Err(Error::InvalidPixel { index: 0, .. })
        ));

        let file = write_csv(&[row("x", "0")]);
        assert!(matches!(
            load_mnist_csv(file.path(), usize::MAX),
            Err(Error::Parse { .. })
        ));

        let file = write_csv(&["1,0,0".to_owned()]);
        assert!(matches!(
            load_mnist_csv(file.path(), usize::MAX),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
