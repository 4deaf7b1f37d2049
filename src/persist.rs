//! Binary model format.
//!
//! Little-endian layout, in order:
//!
//! | field            | type  | count                               |
//! |------------------|-------|-------------------------------------|
//! | size count `L+1` | `i32` | 1                                   |
//! | layer sizes      | `i32` | `L+1`                               |
//! | biases           | `f64` | `sizes[i+1]` for each layer `i`     |
//! | weights          | `f64` | `sizes[i+1] * sizes[i]`, row-major  |
//!
//! All biases come before all weights. Decoding validates the header and the total
//! byte length before any parameter is read, so a short, long or malformed buffer is
//! rejected as [`Error::CorruptModel`] and no partial network is ever returned.

use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::info;

use crate::{Error, Matrix, Network, Result};

const I32_BYTES: usize = 4;
const F64_BYTES: usize = 8;

/// Encodes `network` into a fresh buffer.
pub fn encode(network: &Network) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_len(network.sizes()).unwrap_or(0));
    write_to(network, &mut buf)?;
    Ok(buf)
}

/// Streams `network` into `writer`.
pub fn write_to<W: Write>(network: &Network, mut writer: W) -> Result<()> {
    let sizes = network.sizes();
    let io_err = |e: std::io::Error| Error::Io(format!("failed to write model: {e}"));

    writer
        .write_i32::<LittleEndian>(to_i32(sizes.len())?)
        .map_err(io_err)?;
    for &size in sizes {
        writer
            .write_i32::<LittleEndian>(to_i32(size)?)
            .map_err(io_err)?;
    }
    for b in network.biases() {
        for &v in b.as_slice() {
            writer.write_f64::<LittleEndian>(v).map_err(io_err)?;
        }
    }
    for w in network.weights() {
        for &v in w.as_slice() {
            writer.write_f64::<LittleEndian>(v).map_err(io_err)?;
        }
    }
    writer.flush().map_err(io_err)
}

/// Decodes a complete model buffer.
pub fn decode(bytes: &[u8]) -> Result<Network> {
    let mut cur = Cursor::new(bytes);

    let count = cur
        .read_i32::<LittleEndian>()
        .map_err(|_| corrupt("missing layer count".to_owned()))?;
    if count < 2 {
        return Err(corrupt(format!("layer count must be >= 2, got {count}")));
    }
    let count = count as usize;

    let header_len = count
        .checked_add(1)
        .and_then(|n| n.checked_mul(I32_BYTES))
        .ok_or_else(|| corrupt("layer count overflows".to_owned()))?;
    if bytes.len() < header_len {
        return Err(corrupt(format!(
            "header needs {header_len} bytes, found {}",
            bytes.len()
        )));
    }

    let mut sizes = Vec::with_capacity(count);
    for i in 0..count {
        let size = cur
            .read_i32::<LittleEndian>()
            .map_err(|_| corrupt(format!("missing layer size {i}")))?;
        if size <= 0 {
            return Err(corrupt(format!("layer size {i} must be > 0, got {size}")));
        }
        sizes.push(size as usize);
    }

    let expected = encoded_len(&sizes)
        .ok_or_else(|| corrupt("layer sizes overflow the parameter count".to_owned()))?;
    if bytes.len() != expected {
        return Err(corrupt(format!(
            "sizes {sizes:?} need {expected} bytes, found {}",
            bytes.len()
        )));
    }

    let mut biases = Vec::with_capacity(count - 1);
    for w in sizes.windows(2) {
        biases.push(read_matrix(&mut cur, w[1], 1)?);
    }
    let mut weights = Vec::with_capacity(count - 1);
    for w in sizes.windows(2) {
        weights.push(read_matrix(&mut cur, w[1], w[0])?);
    }

    Network::from_parts(sizes, weights, biases).map_err(|e| corrupt(e.to_string()))
}

/// Reads `reader` to the end and decodes it.
pub fn read_from<R: Read>(mut reader: R) -> Result<Network> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::Io(format!("failed to read model: {e}")))?;
    decode(&bytes)
}

/// Total encoded size for a network with these layer sizes, or `None` on overflow.
pub fn encoded_len(sizes: &[usize]) -> Option<usize> {
    let mut params = 0usize;
    for w in sizes.windows(2) {
        let per_layer = w[0].checked_add(1)?.checked_mul(w[1])?;
        params = params.checked_add(per_layer)?;
    }
    let header = sizes.len().checked_add(1)?.checked_mul(I32_BYTES)?;
    params.checked_mul(F64_BYTES)?.checked_add(header)
}

fn read_matrix(cur: &mut Cursor<&[u8]>, rows: usize, cols: usize) -> Result<Matrix> {
    let mut values = vec![0.0; rows * cols];
    cur.read_f64_into::<LittleEndian>(&mut values)
        .map_err(|_| corrupt("unexpected end of parameter data".to_owned()))?;
    Matrix::from_vec(rows, cols, values)
}

fn to_i32(v: usize) -> Result<i32> {
    i32::try_from(v)
        .map_err(|_| Error::InvalidArgument(format!("layer size {v} does not fit in an i32")))
}

#[inline]
fn corrupt(msg: String) -> Error {
    Error::CorruptModel(msg)
}

impl Network {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }

    /// Save the model to a binary file, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        let file = File::create(p)
            .map_err(|e| Error::Io(format!("failed to create {}: {e}", p.display())))?;
        write_to(self, BufWriter::new(file))
            .map_err(|e| Error::Io(format!("failed to save {}: {e}", p.display())))?;
        info!("saved model {:?} to {}", self.sizes(), p.display());
        Ok(())
    }

    /// Load a model from a binary file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let bytes = std::fs::read(p)
            .map_err(|e| Error::Io(format!("failed to read {}: {e}", p.display())))?;
        let network = decode(&bytes)?;
        info!("loaded model {:?} from {}", network.sizes(), p.display());
        Ok(network)
    }
}
