//! PDF417 symbols.
//!
//! [`encode_symbol`] checks that a stream fits the requested symbol before
//! handing it to a [`SymbolEncoder`]. [`Pdf417Writer`] is the encoder backed
//! by the `pdf417` crate.
use image::{GrayImage, Luma};
use pdf417::{pdf417_height, pdf417_width, PDF417Encoder, PDF417};
use tracing::debug;

/// Maximum number of data and error correction codewords in a symbol.
pub const MAX_CODEWORDS: usize = 928;

pub const MAX_ROWS: usize = 90;

pub const MIN_ROWS: usize = 3;

pub const MAX_COLUMNS: u8 = 30;

pub const MAX_ECC_LEVEL: u8 = 8;

/// Light modules around a rendered symbol, on each side.
pub const QUIET_ZONE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("PDF417 symbols have 1 to 30 data columns, not {0}")]
    Columns(u8),

    #[error("PDF417 error correction level must be 0 to 8, not {0}")]
    Level(u8),

    #[error("symbol capacity exceeded: {required} codewords needed, {available} available with {columns} columns")]
    CapacityExceeded {
        required: usize,
        available: usize,
        columns: u8,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SymbolError<E> {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("symbol encoder failed")]
    Encoder(#[source] E),
}

impl<E> SymbolError<E> {
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::Layout(LayoutError::CapacityExceeded { .. }))
    }
}

/// Codeword budget of a PDF417 symbol holding a byte-compacted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pdf417Layout {
    pub columns: u8,
    pub rows: usize,
    pub ecc_level: u8,

    /// Data codewords, including the length descriptor and mode latch.
    pub data_codewords: usize,

    pub ecc_codewords: usize,
}

impl Pdf417Layout {
    /// Plans a symbol of `columns` data columns holding `data_len` bytes at
    /// error correction level `ecc_level`.
    pub fn plan(data_len: usize, columns: u8, ecc_level: u8) -> Result<Self, LayoutError> {
        if columns == 0 || columns > MAX_COLUMNS {
            return Err(LayoutError::Columns(columns));
        }

        if ecc_level > MAX_ECC_LEVEL {
            return Err(LayoutError::Level(ecc_level));
        }

        let data_codewords = 2 + byte_compaction_len(data_len);
        let ecc_codewords = ecc_codeword_count(ecc_level);
        let required = data_codewords + ecc_codewords;
        let available = MAX_CODEWORDS.min(MAX_ROWS * usize::from(columns));

        if required > available {
            return Err(LayoutError::CapacityExceeded {
                required,
                available,
                columns,
            });
        }

        let rows = required.div_ceil(usize::from(columns)).max(MIN_ROWS);

        Ok(Self {
            columns,
            rows,
            ecc_level,
            data_codewords,
            ecc_codewords,
        })
    }

    pub fn total_codewords(&self) -> usize {
        self.data_codewords + self.ecc_codewords
    }

    /// Padding codewords filling the last row.
    pub fn padding(&self) -> usize {
        self.rows * usize::from(self.columns) - self.total_codewords()
    }
}

/// Codewords taken by `len` bytes in byte compaction mode: 5 per full group
/// of 6 bytes, 1 per remaining byte.
pub fn byte_compaction_len(len: usize) -> usize {
    5 * (len / 6) + len % 6
}

pub fn ecc_codeword_count(level: u8) -> usize {
    2 << level
}

/// Rendered symbol, one module per cell, dark modules set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatrix {
    width: usize,
    height: usize,
    modules: Vec<bool>,
}

impl SymbolMatrix {
    /// Builds a matrix from row-major modules. Returns `None` if the module
    /// count doesn't match the dimensions.
    pub fn new(width: usize, height: usize, modules: Vec<bool>) -> Option<Self> {
        if modules.len() != width * height {
            return None;
        }

        Some(Self {
            width,
            height,
            modules,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.modules[y * self.width + x]
    }

    pub fn rows(&self) -> impl '_ + Iterator<Item = &[bool]> {
        self.modules.chunks(self.width.max(1))
    }

    /// Renders the symbol black on white, `scale` pixels per module, with a
    /// quiet zone.
    pub fn to_image(&self, scale: u32) -> GrayImage {
        let scale = scale.max(1);
        let margin = QUIET_ZONE * scale;
        let mut image = GrayImage::from_pixel(
            self.width as u32 * scale + 2 * margin,
            self.height as u32 * scale + 2 * margin,
            Luma([255]),
        );

        for (y, row) in self.rows().enumerate() {
            for (x, _) in row.iter().enumerate().filter(|&(_, &dark)| dark) {
                let left = margin + x as u32 * scale;
                let top = margin + y as u32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        image.put_pixel(left + dx, top + dy, Luma([0]));
                    }
                }
            }
        }

        image
    }
}

/// PDF417 symbol encoder.
pub trait SymbolEncoder {
    type Error: std::error::Error + 'static;

    fn encode(&self, data: &[u8], layout: &Pdf417Layout) -> Result<SymbolMatrix, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Pdf417Error {
    #[error("{rows} rows of {columns} columns is not a PDF417 symbol")]
    Shape { rows: usize, columns: u8 },

    #[error("{required} codewords do not fit in {available} slots")]
    Overflow { required: usize, available: usize },
}

/// Byte-compacting PDF417 encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pdf417Writer;

impl SymbolEncoder for Pdf417Writer {
    type Error = Pdf417Error;

    fn encode(&self, data: &[u8], layout: &Pdf417Layout) -> Result<SymbolMatrix, Pdf417Error> {
        let columns = layout.columns;
        let shape = || Pdf417Error::Shape {
            rows: layout.rows,
            columns,
        };

        if columns == 0 || columns > MAX_COLUMNS || layout.ecc_level > MAX_ECC_LEVEL {
            return Err(shape());
        }

        let rows = u8::try_from(layout.rows)
            .ok()
            .filter(|&rows| (MIN_ROWS..=MAX_ROWS).contains(&usize::from(rows)))
            .ok_or_else(shape)?;

        let available = layout.rows * usize::from(columns);
        let required =
            2 + byte_compaction_len(data.len()) + ecc_codeword_count(layout.ecc_level);
        if required > available {
            return Err(Pdf417Error::Overflow {
                required,
                available,
            });
        }

        let mut codewords = vec![0u16; available];
        PDF417Encoder::new(&mut codewords, false)
            .append_bytes(data)
            .seal(layout.ecc_level);

        let width = pdf417_width!(columns) as usize;
        let height = pdf417_height!(rows) as usize;
        let mut modules = vec![false; width * height];
        PDF417::new(&codewords, rows, columns, layout.ecc_level).render(&mut modules[..]);

        SymbolMatrix::new(width, height, modules).ok_or_else(shape)
    }
}

/// Checks that `data` fits the requested symbol, then encodes it.
pub fn encode_symbol<E: SymbolEncoder>(
    encoder: &E,
    data: &[u8],
    columns: u8,
    ecc_level: u8,
) -> Result<SymbolMatrix, SymbolError<E::Error>> {
    let layout = Pdf417Layout::plan(data.len(), columns, ecc_level)?;
    debug!(
        bytes = data.len(),
        columns,
        rows = layout.rows,
        codewords = layout.total_codewords(),
        "planned PDF417 symbol"
    );

    encoder.encode(data, &layout).map_err(SymbolError::Encoder)
}
