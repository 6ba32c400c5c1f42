use crate::{error::VarlabelError, utils::util::Result};
use flate2::read::MultiGzDecoder;
use std::{fs::File, io::BufReader, path::Path};

pub fn open_gz_reader(path: &Path) -> Result<BufReader<MultiGzDecoder<File>>> {
    let file = File::open(path).map_err(|error| {
        VarlabelError::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to open file {}: {error}", path.display()),
        ))
    })?;
    let gz_decoder = MultiGzDecoder::new(file);
    if gz_decoder.header().is_some() {
        Ok(BufReader::new(gz_decoder))
    } else {
        Err(VarlabelError::InvalidGzipHeader {
            path: path.to_path_buf(),
        })
    }
}
